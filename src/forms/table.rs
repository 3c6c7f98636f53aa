//! Resource table state
//!
//! Search, column filters and row selection over one page of entities,
//! plus sequential bulk deletion of the selection.

use std::collections::BTreeMap;
use std::future::Future;
use tracing::{info, warn};
use crate::notify::Notification;
use crate::utils::errors::ConsoleError;

/// Entity shown as a table row
pub trait TableRow {
    fn id(&self) -> &str;

    /// Text matched by the free-text search
    fn search_text(&self) -> String;

    /// Value of a named filter column; `None` when the row has no such column
    fn filter_value(&self, _filter: &str) -> Option<String> {
        None
    }
}

/// Outcome of a bulk delete
#[derive(Debug, Default)]
pub struct BulkDeleteReport {
    pub deleted: Vec<String>,
    pub failed: Vec<(String, ConsoleError)>,
}

impl BulkDeleteReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn notification(&self) -> Notification {
        if self.is_complete() {
            Notification::success("O'chirildi", format!("{} items deleted", self.deleted.len()))
        } else {
            Notification::error(
                "Xatolik",
                format!("{} deleted, {} failed", self.deleted.len(), self.failed.len()),
            )
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResourceTable<T: TableRow> {
    rows: Vec<T>,
    search: String,
    filters: BTreeMap<String, String>,
    selected_ids: Vec<String>,
}

impl<T: TableRow> Default for ResourceTable<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            search: String::new(),
            filters: BTreeMap::new(),
            selected_ids: Vec::new(),
        }
    }
}

impl<T: TableRow> ResourceTable<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self { rows, ..Self::default() }
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Replace the rows after a refetch, dropping selections of vanished rows
    pub fn set_rows(&mut self, rows: Vec<T>) {
        self.rows = rows;
        let rows = &self.rows;
        self.selected_ids.retain(|id| rows.iter().any(|row| row.id() == id));
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.trim().to_lowercase();
    }

    /// Set a column filter; an empty value removes it
    pub fn set_filter(&mut self, name: &str, value: &str) {
        if value.is_empty() {
            self.filters.remove(name);
        } else {
            self.filters.insert(name.to_string(), value.to_lowercase());
        }
    }

    pub fn clear_filters(&mut self) {
        self.search.clear();
        self.filters.clear();
    }

    fn matches(&self, row: &T) -> bool {
        if !self.search.is_empty() && !row.search_text().to_lowercase().contains(&self.search) {
            return false;
        }
        self.filters.iter().all(|(name, wanted)| {
            row.filter_value(name)
                .map(|value| value.to_lowercase() == *wanted)
                .unwrap_or(false)
        })
    }

    /// Rows passing the search and every filter
    pub fn filtered(&self) -> Vec<&T> {
        self.rows.iter().filter(|row| self.matches(row)).collect()
    }

    pub fn selected_ids(&self) -> &[String] {
        &self.selected_ids
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_ids.iter().any(|selected| selected == id)
    }

    pub fn select(&mut self, id: &str) {
        if !self.is_selected(id) && self.rows.iter().any(|row| row.id() == id) {
            self.selected_ids.push(id.to_string());
        }
    }

    pub fn deselect(&mut self, id: &str) {
        self.selected_ids.retain(|selected| selected != id);
    }

    pub fn toggle(&mut self, id: &str) {
        if self.is_selected(id) {
            self.deselect(id);
        } else {
            self.select(id);
        }
    }

    /// Select every row currently passing the filters
    pub fn select_all_filtered(&mut self) {
        let ids: Vec<String> = self.filtered().iter().map(|row| row.id().to_string()).collect();
        for id in ids {
            self.select(&id);
        }
    }

    /// True when every filtered row is selected
    pub fn all_filtered_selected(&self) -> bool {
        let filtered = self.filtered();
        !filtered.is_empty() && filtered.iter().all(|row| self.is_selected(row.id()))
    }

    pub fn clear_selection(&mut self) {
        self.selected_ids.clear();
    }

    /// Delete the selection one id at a time
    ///
    /// Failures do not stop the run. Deleted rows leave the table and the
    /// selection; failed ids stay selected for another attempt.
    pub async fn bulk_delete<F, Fut>(&mut self, mut delete: F) -> BulkDeleteReport
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = crate::utils::errors::Result<()>>,
    {
        let mut report = BulkDeleteReport::default();

        for id in self.selected_ids.clone() {
            match delete(id.clone()).await {
                Ok(()) => report.deleted.push(id),
                Err(e) => {
                    warn!(id = %id, error = %e, "Bulk delete item failed");
                    report.failed.push((id, e));
                }
            }
        }

        let deleted = &report.deleted;
        self.rows.retain(|row| !deleted.iter().any(|id| id == row.id()));
        self.selected_ids.retain(|id| !deleted.contains(id));

        info!(deleted = report.deleted.len(), failed = report.failed.len(), "Bulk delete finished");
        report
    }
}
