//! Sample payloads for testing

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Serialize)]
struct Claims {
    exp: i64,
    user_id: i64,
}

/// Signed JWT expiring `valid_for` from now
pub fn access_token(valid_for: Duration) -> String {
    let claims = Claims {
        exp: (Utc::now() + valid_for).timestamp(),
        user_id: 1,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test-secret")).unwrap()
}

pub fn user_json(role: &str) -> Value {
    json!({
        "id": 1,
        "role": role,
        "first_name": "Ali",
        "last_name": "Valiyev",
        "username": "ali",
        "is_active": true,
        "profile": {"secondary_organization": 5}
    })
}

/// Login response for a user with `role`
pub fn login_json(role: &str) -> Value {
    json!({
        "user_data": user_json(role),
        "access": access_token(Duration::hours(1)),
        "refresh": "refresh-token"
    })
}

/// Bulletin with a text, a number and a classificator column and two rows
pub fn bulletin_json() -> Value {
    json!({
        "id": 12,
        "name": "Oylik hisobot",
        "description": "Har oy topshiriladi",
        "deadline": {"period_type": "monthly", "interval": 1, "day_of_month": 5},
        "columns": [
            {"id": 2, "name": "Soni", "type": "number", "order": 2, "journal": 12},
            {"id": 1, "name": "Nomi", "type": "text", "order": 1, "journal": 12},
            {"id": 3, "name": "Hudud", "type": "classificator", "order": 3, "journal": 12, "classificator": 7}
        ],
        "main_organizations_list": [
            {"id": 10, "name": "Moliya vazirligi", "secondary_organizations": [
                {"id": 100, "name": "Buxgalteriya", "organization_id": 10},
                {"id": 101, "name": "Kadrlar", "organization_id": 10}
            ]},
            {"id": 11, "name": "Statistika qo'mitasi", "secondary_organizations": [
                {"id": 110, "name": "Hisobot bo'limi", "organization_id": 11}
            ]}
        ],
        "employees_list": [{"id": 1, "first_name": "Ali", "last_name": "Valiyev"}],
        "rows": [
            {"id": 501, "order": 1, "values": [{"column": 1, "value": "Birinchi"}, {"column": 2, "value": 4}, {"column": 3, "value": 71}]},
            {"id": 502, "order": 2, "values": [{"column": 1, "value": "Ikkinchi"}]}
        ],
        "files": []
    })
}

pub fn classificator_json() -> Value {
    json!({
        "id": 7,
        "name": "Hududlar",
        "elements": [
            {"id": 70, "name": "Toshkent", "value": "tashkent"},
            {"id": 71, "name": "Samarqand", "value": "samarkand"}
        ]
    })
}
