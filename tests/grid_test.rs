//! Bulletin grid controller integration tests

mod helpers;

use std::sync::Arc;
use assert_matches::assert_matches;
use bulletin_console::grid::{GridController, RowState};
use bulletin_console::notify::{NotificationLevel, Notifier};
use bulletin_console::ConsoleError;
use helpers::*;
use serde_json::json;
use wiremock::{
    matchers::{body_json, method, path, path_regex},
    Mock, ResponseTemplate,
};

async fn controller(ctx: &TestContext) -> GridController {
    ctx.api.mock_bulletin_detail(&bulletin_json()).await;
    ctx.api.mock_get("/classificator/7/", classificator_json()).await;
    let notifier: Arc<dyn Notifier> = ctx.notifier.clone();
    GridController::load(ctx.queries.clone(), notifier, "12").await.unwrap()
}

#[tokio::test]
async fn test_temp_row_delete_makes_no_request() {
    let ctx = TestContext::signed_in("OPERATOR").await;
    Mock::given(method("DELETE"))
        .and(path_regex(r"^/api/.*"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&ctx.api.server)
        .await;
    let mut controller = controller(&ctx).await;

    let temp_id = controller.grid_mut().add_row();
    assert!(temp_id.starts_with("temp-"));
    controller.delete_row(&temp_id).await.unwrap();

    assert!(controller.grid().row(&temp_id).is_none());
    assert_eq!(controller.grid().rows().len(), 2);
}

#[tokio::test]
async fn test_number_column_coerced_before_update() {
    let ctx = TestContext::signed_in("ADMIN").await;
    Mock::given(method("PATCH"))
        .and(path(api_path_of("/journal/row/501/")))
        .and(body_json(json!({
            "journal": "12",
            "values": [
                {"column": "1", "value": "Birinchi"},
                {"column": "2", "value": 0},
                {"column": "3", "value": "71"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 501, "order": 1, "values": []})))
        .expect(1)
        .mount(&ctx.api.server)
        .await;
    let mut controller = controller(&ctx).await;

    controller.grid_mut().begin_edit("501").unwrap();
    controller.grid_mut().set_value("501", "2", "abc").unwrap();
    controller.save_row("501").await.unwrap();

    assert_eq!(controller.grid().row("501").unwrap().state, RowState::Viewing);
    let last = ctx.notifier.last().await.unwrap();
    assert_eq!(last.level, NotificationLevel::Success);
    assert_eq!(last.message, "Qator muvaffaqiyatli yangilandi");
}

#[tokio::test]
async fn test_empty_row_rejected_without_request() {
    let ctx = TestContext::signed_in("ADMIN").await;
    Mock::given(method("POST"))
        .and(path(api_path_of("/journal/row/create/")))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&ctx.api.server)
        .await;
    let mut controller = controller(&ctx).await;

    let temp_id = controller.grid_mut().add_row();
    controller.grid_mut().begin_edit(&temp_id).unwrap();
    controller.grid_mut().set_value(&temp_id, "1", "   ").unwrap();
    controller.grid_mut().set_value(&temp_id, "1", "").unwrap();

    assert_matches!(controller.save_row(&temp_id).await, Err(ConsoleError::EmptyRow));
    assert!(controller.grid().row(&temp_id).unwrap().state.is_editing());
    let last = ctx.notifier.last().await.unwrap();
    assert_eq!(last.level, NotificationLevel::Error);
    assert_eq!(last.message, "Qator bo'sh bo'lmasligi kerak");
}

#[tokio::test]
async fn test_created_row_replaced_by_refetch() {
    let ctx = TestContext::signed_in("ADMIN").await;
    Mock::given(method("POST"))
        .and(path(api_path_of("/journal/row/create/")))
        .and(body_json(json!({"journal": "12", "values": [{"column": "2", "value": 16}]})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 503, "order": 3, "values": []})))
        .expect(1)
        .mount(&ctx.api.server)
        .await;
    let mut controller = controller(&ctx).await;

    let temp_id = controller.grid_mut().add_row();
    controller.grid_mut().begin_edit(&temp_id).unwrap();
    controller.grid_mut().set_value(&temp_id, "2", " 0x10 ").unwrap();
    controller.save_row(&temp_id).await.unwrap();

    assert!(controller.grid().row(&temp_id).is_none());
    assert_eq!(ctx.api.received("GET", "/journal/12/").await, 2);
    assert_eq!(ctx.notifier.last().await.unwrap().message, "Bulletin qatori muvaffaqiyatli yaratildi");
}

#[tokio::test]
async fn test_failed_update_keeps_buffer() {
    let ctx = TestContext::signed_in("ADMIN").await;
    Mock::given(method("PATCH"))
        .and(path(api_path_of("/journal/row/502/")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "Ichki xatolik"})))
        .expect(1)
        .mount(&ctx.api.server)
        .await;
    let mut controller = controller(&ctx).await;

    controller.grid_mut().begin_edit("502").unwrap();
    controller.grid_mut().set_value("502", "1", "Tuzatilgan").unwrap();
    assert!(controller.save_row("502").await.is_err());

    let row = controller.grid().row("502").unwrap();
    assert_eq!(row.state.error(), Some("Ichki xatolik"));
    assert_eq!(row.state.buffer().and_then(|b| b.get("1")).map(String::as_str), Some("Tuzatilgan"));
    assert_eq!(controller.grid().display_value("502", "1"), "Ikkinchi");

    let last = ctx.notifier.last().await.unwrap();
    assert_eq!(last.level, NotificationLevel::Error);
    assert_eq!(last.title, "Qator yangilashda xatolik yuz berdi");
}

#[tokio::test]
async fn test_persisted_row_removed_after_delete() {
    let ctx = TestContext::signed_in("ADMIN").await;
    Mock::given(method("DELETE"))
        .and(path(api_path_of("/journal/row/502/")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&ctx.api.server)
        .await;
    let mut controller = controller(&ctx).await;

    controller.delete_row("502").await.unwrap();
    assert!(controller.grid().row("502").is_none());
    assert_eq!(ctx.notifier.last().await.unwrap().message, "Qator muvaffaqiyatli o'chirildi");
}

#[tokio::test]
async fn test_classificator_cells_show_element_names() {
    let ctx = TestContext::signed_in("ADMIN").await;
    let controller = controller(&ctx).await;

    assert_eq!(controller.grid().display_value("501", "3"), "Samarqand");
    assert_eq!(controller.grid().display_value("501", "2"), "4");
    assert_eq!(controller.grid().options("3").map(|o| o.len()), Some(2));
}
