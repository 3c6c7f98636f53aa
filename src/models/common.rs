//! Shared wire types: the list envelope, paging parameters and id handling

use serde::{Deserialize, Deserializer, Serialize};

/// Envelope returned by every list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: T,
}

impl<T> Paginated<Vec<T>> {
    /// Wrap an already complete list (used for `no_page` responses)
    pub fn single_page(results: Vec<T>) -> Self {
        Self {
            count: results.len() as u64,
            next: None,
            previous: None,
            results,
        }
    }

    /// Whether another page can be requested
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// Paging parameters accepted by list endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_page: Option<bool>,
}

impl PageParams {
    pub fn page(page: u32) -> Self {
        Self { page: Some(page), no_page: None }
    }

    pub fn all() -> Self {
        Self { page: None, no_page: Some(true) }
    }

    /// Query string pairs in a stable order
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(no_page) = self.no_page {
            pairs.push(("no_page".to_string(), no_page.to_string()));
        }
        pairs
    }
}

/// Deserialize an id that the API sends either as a number or a string
pub fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Int(number) => number.to_string(),
    })
}

/// Optional variant of [`id_string`]
pub fn opt_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(text) => text,
        RawId::Int(number) => number.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Item {
        #[serde(deserialize_with = "id_string")]
        id: String,
        #[serde(default, deserialize_with = "opt_id_string")]
        parent: Option<String>,
    }

    #[test]
    fn test_id_accepts_numbers_and_strings() {
        let item: Item = serde_json::from_str(r#"{"id": 12, "parent": "abc"}"#).unwrap();
        assert_eq!(item.id, "12");
        assert_eq!(item.parent.as_deref(), Some("abc"));

        let item: Item = serde_json::from_str(r#"{"id": "x-1", "parent": null}"#).unwrap();
        assert_eq!(item.id, "x-1");
        assert!(item.parent.is_none());

        let item: Item = serde_json::from_str(r#"{"id": "x-2"}"#).unwrap();
        assert!(item.parent.is_none());
    }

    #[test]
    fn test_page_params_query() {
        assert_eq!(PageParams::page(2).to_query(), vec![("page".to_string(), "2".to_string())]);
        assert_eq!(PageParams::all().to_query(), vec![("no_page".to_string(), "true".to_string())]);
        assert!(PageParams::default().to_query().is_empty());
    }

    #[test]
    fn test_envelope_deserialization() {
        let json = r#"{"count": 1, "next": null, "previous": null, "results": [1]}"#;
        let page: Paginated<Vec<u32>> = serde_json::from_str(json).unwrap();
        assert_eq!(page.results, vec![1]);
        assert!(!page.has_next());
    }
}
