//! Classificator (controlled vocabulary) models

use serde::{Deserialize, Serialize};
use super::common::{id_string, opt_id_string};
use super::bulletin::CellValue;

/// One name/value pair of a classificator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub value: Option<String>,
}

impl Element {
    /// Whether a stored cell value refers to this element by id, value or name
    pub fn matches(&self, value: &str) -> bool {
        self.id == value || self.value.as_deref() == Some(value) || self.name == value
    }
}

/// A named controlled vocabulary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classificator {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Classificator {
    /// Resolve the display text of a cell value
    ///
    /// Matching falls back from id to value to name; unmatched values are
    /// shown as they are.
    pub fn display_value(&self, value: &CellValue) -> String {
        let raw = value.to_string();
        self.elements
            .iter()
            .find(|element| element.id == raw)
            .or_else(|| self.elements.iter().find(|element| element.value.as_deref() == Some(raw.as_str())))
            .or_else(|| self.elements.iter().find(|element| element.name == raw))
            .map(|element| element.name.clone())
            .unwrap_or(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificatorCreate {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementCreate {
    pub classificator: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classificator() -> Classificator {
        Classificator {
            id: "c1".to_string(),
            name: "Hujjat turi".to_string(),
            elements: vec![
                Element { id: "1".to_string(), name: "Qaror".to_string(), value: Some("q".to_string()) },
                Element { id: "2".to_string(), name: "Farmon".to_string(), value: Some("1".to_string()) },
            ],
        }
    }

    #[test]
    fn test_display_value_prefers_id_match() {
        let classificator = classificator();
        // "1" is both the id of the first element and the value of the second
        assert_eq!(classificator.display_value(&CellValue::from("1")), "Qaror");
        assert_eq!(classificator.display_value(&CellValue::from("q")), "Qaror");
        assert_eq!(classificator.display_value(&CellValue::from("Farmon")), "Farmon");
        assert_eq!(classificator.display_value(&CellValue::Number(2.0)), "Farmon");
        assert_eq!(classificator.display_value(&CellValue::from("zzz")), "zzz");
    }
}
