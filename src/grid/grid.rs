//! Editable data grid of one bulletin
//!
//! One row per [`BulletinRow`], one column per [`BulletinColumn`] in `order`.
//! Typing only touches the row's edit buffer; the row's values change once a
//! save succeeds. Rows with a `temp-` id exist only on this side until their
//! create call succeeds.

use std::collections::{BTreeMap, HashMap};
use tracing::debug;
use crate::models::{
    Bulletin, BulletinColumn, BulletinCreateRow, BulletinRow, CellValue, Classificator, ColumnType, Element,
};
use crate::utils::errors::{ConsoleError, Result};
use crate::utils::helpers::{coerce_number, generate_temp_id, is_temp_id};
use super::row_state::{EditBuffer, RowState};

/// A bulletin row together with its edit state
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub row: BulletinRow,
    pub state: RowState,
}

impl GridRow {
    fn new(row: BulletinRow) -> Self {
        Self { row, state: RowState::Viewing }
    }

    pub fn id(&self) -> &str {
        &self.row.id
    }

    pub fn is_temp(&self) -> bool {
        is_temp_id(&self.row.id)
    }
}

/// Request a save needs
#[derive(Debug, Clone, PartialEq)]
pub enum SaveAction {
    Create(BulletinCreateRow),
    Update { id: String, body: BulletinCreateRow },
}

impl SaveAction {
    pub fn body(&self) -> &BulletinCreateRow {
        match self {
            SaveAction::Create(body) | SaveAction::Update { body, .. } => body,
        }
    }
}

/// What a delete needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteAction {
    /// Unsaved row, already gone
    Local,
    /// Persisted row, locked until the delete call returns
    Remote(String),
}

#[derive(Debug, Clone)]
pub struct BulletinGrid {
    bulletin_id: String,
    columns: Vec<BulletinColumn>,
    rows: Vec<GridRow>,
    // Reconciled values of rows being saved
    pending: HashMap<String, BTreeMap<String, CellValue>>,
    classificators: HashMap<String, Classificator>,
}

impl BulletinGrid {
    pub fn new(bulletin: &Bulletin) -> Self {
        let mut grid = Self {
            bulletin_id: bulletin.id.clone(),
            columns: bulletin.sorted_columns(),
            rows: Vec::new(),
            pending: HashMap::new(),
            classificators: HashMap::new(),
        };
        grid.sync_rows(bulletin.rows.clone());
        grid
    }

    pub fn bulletin_id(&self) -> &str {
        &self.bulletin_id
    }

    /// Columns in display order
    pub fn columns(&self) -> &[BulletinColumn] {
        &self.columns
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    pub fn row(&self, row_id: &str) -> Option<&GridRow> {
        self.rows.iter().find(|r| r.row.id == row_id)
    }

    pub fn is_loading(&self, row_id: &str) -> bool {
        self.row(row_id).is_some_and(|r| r.state.is_loading())
    }

    /// Append an empty unsaved row
    pub fn add_row(&mut self) -> String {
        let id = generate_temp_id();
        let order = self.rows.iter().map(|r| r.row.order).max().unwrap_or(0) + 1;
        self.rows.push(GridRow::new(BulletinRow {
            id: id.clone(),
            order,
            values: BTreeMap::new(),
        }));
        debug!(bulletin_id = %self.bulletin_id, row_id = %id, "Row added");
        id
    }

    /// Open the edit buffer, seeded with the current values as text
    pub fn begin_edit(&mut self, row_id: &str) -> Result<()> {
        let buffer: EditBuffer = {
            let row = self.find(row_id)?;
            self.columns
                .iter()
                .map(|column| {
                    let text = row.row.values.get(&column.id).map(|v| v.to_string()).unwrap_or_default();
                    (column.id.clone(), text)
                })
                .collect()
        };
        self.find_mut(row_id)?.state.begin_edit(buffer)
    }

    pub fn set_value(&mut self, row_id: &str, column_id: &str, text: &str) -> Result<()> {
        self.find_mut(row_id)?.state.set_value(column_id, text)
    }

    pub fn cancel_edit(&mut self, row_id: &str) -> Result<()> {
        self.find_mut(row_id)?.state.cancel()
    }

    /// Reconcile the buffer into the request for this row
    ///
    /// Blank cells are dropped and number columns are coerced. A row with
    /// nothing left is rejected with [`ConsoleError::EmptyRow`] and stays in
    /// edit mode.
    pub fn prepare_save(&mut self, row_id: &str) -> Result<SaveAction> {
        let values = {
            let row = self.find(row_id)?;
            let buffer = match row.state.buffer() {
                Some(buffer) if row.state.is_editing() => buffer,
                _ => {
                    return Err(ConsoleError::InvalidStateTransition {
                        from: row.state.name().to_string(),
                        to: "saving".to_string(),
                    })
                }
            };
            self.reconcile(buffer)
        };

        if values.is_empty() {
            return Err(ConsoleError::EmptyRow);
        }

        let body = BulletinCreateRow::from_values(&self.bulletin_id, &values);
        let row = self.find_mut(row_id)?;
        row.state.begin_save()?;
        let action = if row.is_temp() {
            SaveAction::Create(body)
        } else {
            SaveAction::Update { id: row_id.to_string(), body }
        };
        self.pending.insert(row_id.to_string(), values);
        Ok(action)
    }

    /// Apply the outcome of a save call
    ///
    /// A created temp row is removed; the persisted copy arrives with the
    /// next refetch. An updated row takes the reconciled values. On failure
    /// the row keeps its values and the buffer stays open with the message.
    pub fn complete_save<T>(&mut self, row_id: &str, outcome: &Result<T>) -> Result<()> {
        let values = self.pending.remove(row_id);
        let index = self.index(row_id)?;

        match outcome {
            Ok(_) if self.rows[index].is_temp() => {
                self.rows.remove(index);
            }
            Ok(_) => {
                let row = &mut self.rows[index];
                row.state.save_succeeded()?;
                if let Some(values) = values {
                    row.row.values = values;
                }
            }
            Err(e) => {
                self.rows[index].state.save_failed(&e.user_message())?;
            }
        }
        Ok(())
    }

    /// Start deleting a row
    ///
    /// Unsaved rows are removed right away. A row that is being edited or
    /// has a request in flight cannot be deleted.
    pub fn delete_row(&mut self, row_id: &str) -> Result<DeleteAction> {
        let index = self.index(row_id)?;
        let row = &mut self.rows[index];
        if row.is_temp() {
            if row.state != RowState::Viewing {
                return Err(ConsoleError::InvalidStateTransition {
                    from: row.state.name().to_string(),
                    to: "deleted".to_string(),
                });
            }
            self.rows.remove(index);
            debug!(bulletin_id = %self.bulletin_id, row_id = row_id, "Unsaved row discarded");
            return Ok(DeleteAction::Local);
        }

        row.state.begin_delete()?;
        Ok(DeleteAction::Remote(row_id.to_string()))
    }

    /// Apply the outcome of a delete call
    pub fn complete_delete<T>(&mut self, row_id: &str, outcome: &Result<T>) -> Result<()> {
        let index = self.index(row_id)?;
        match outcome {
            Ok(_) => {
                self.rows.remove(index);
                Ok(())
            }
            Err(_) => self.rows[index].state.delete_failed(),
        }
    }

    /// Take freshly fetched rows
    ///
    /// Server rows replace persisted ones, rows with an open buffer keep it,
    /// unsaved rows stay at the end and state of vanished rows is dropped.
    pub fn sync_rows(&mut self, mut server_rows: Vec<BulletinRow>) {
        server_rows.sort_by_key(|row| row.order);
        let (temp_rows, persisted): (Vec<GridRow>, Vec<GridRow>) = self.rows.drain(..).partition(GridRow::is_temp);
        let mut states: HashMap<String, RowState> =
            persisted.into_iter().map(|r| (r.row.id, r.state)).collect();

        self.rows = server_rows
            .into_iter()
            .map(|row| {
                let state = states.remove(&row.id).unwrap_or_default();
                GridRow { row, state }
            })
            .collect();
        for vanished in states.keys() {
            self.pending.remove(vanished);
        }
        self.rows.extend(temp_rows);
    }

    /// Classificator ids referenced by classificator columns
    pub fn classificator_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .columns
            .iter()
            .filter(|c| c.column_type == ColumnType::Classificator)
            .filter_map(|c| c.classificator.clone())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    pub fn set_classificator(&mut self, classificator: Classificator) {
        self.classificators.insert(classificator.id.clone(), classificator);
    }

    /// Options of a classificator column, once loaded
    pub fn options(&self, column_id: &str) -> Option<&[Element]> {
        self.column_classificator(column_id).map(|c| c.elements.as_slice())
    }

    /// Text shown in a cell
    pub fn display_value(&self, row_id: &str, column_id: &str) -> String {
        let Some(value) = self.row(row_id).and_then(|r| r.row.values.get(column_id)) else {
            return String::new();
        };
        match self.column_classificator(column_id) {
            Some(classificator) => classificator.display_value(value),
            None => value.to_string(),
        }
    }

    fn column_classificator(&self, column_id: &str) -> Option<&Classificator> {
        let column = self.columns.iter().find(|c| c.id == column_id)?;
        if column.column_type != ColumnType::Classificator {
            return None;
        }
        self.classificators.get(column.classificator.as_deref()?)
    }

    fn reconcile(&self, buffer: &EditBuffer) -> BTreeMap<String, CellValue> {
        self.columns
            .iter()
            .filter_map(|column| {
                let text = buffer.get(&column.id)?;
                if text.is_empty() {
                    return None;
                }
                let value = match column.column_type {
                    ColumnType::Number => CellValue::Number(coerce_number(text)),
                    _ => CellValue::Text(text.clone()),
                };
                Some((column.id.clone(), value))
            })
            .collect()
    }

    fn index(&self, row_id: &str) -> Result<usize> {
        self.rows
            .iter()
            .position(|r| r.row.id == row_id)
            .ok_or_else(|| ConsoleError::NotFound(format!("row {}", row_id)))
    }

    fn find(&self, row_id: &str) -> Result<&GridRow> {
        self.index(row_id).map(|index| &self.rows[index])
    }

    fn find_mut(&mut self, row_id: &str) -> Result<&mut GridRow> {
        let index = self.index(row_id)?;
        Ok(&mut self.rows[index])
    }
}
