//! Bulletin data grid
//!
//! Per-row edit state, save reconciliation and the controller that sends
//! the resulting requests.

pub mod controller;
pub mod grid;
pub mod row_state;

pub use controller::GridController;
pub use grid::{BulletinGrid, DeleteAction, GridRow, SaveAction};
pub use row_state::{EditBuffer, RowState};
