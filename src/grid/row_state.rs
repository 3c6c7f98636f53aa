//! Per-row edit state machine

use std::collections::BTreeMap;
use std::fmt;
use crate::utils::errors::{ConsoleError, Result};

/// Text typed into a row's cells, keyed by column id
pub type EditBuffer = BTreeMap<String, String>;

/// Lifecycle of one grid row
///
/// ```text
/// Viewing -> Editing -> Saving -> Viewing
///               ^          |
///               +-- Error -+
/// Viewing -> Deleting -> (removed) | Viewing
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RowState {
    #[default]
    Viewing,
    Editing(EditBuffer),
    Saving(EditBuffer),
    /// The save failed; the buffer is kept for correction
    Error(EditBuffer, String),
    Deleting,
}

impl RowState {
    pub fn name(&self) -> &'static str {
        match self {
            RowState::Viewing => "viewing",
            RowState::Editing(_) => "editing",
            RowState::Saving(_) => "saving",
            RowState::Error(_, _) => "error",
            RowState::Deleting => "deleting",
        }
    }

    pub fn buffer(&self) -> Option<&EditBuffer> {
        match self {
            RowState::Editing(buffer) | RowState::Saving(buffer) | RowState::Error(buffer, _) => Some(buffer),
            RowState::Viewing | RowState::Deleting => None,
        }
    }

    /// The buffer is open for typing
    pub fn is_editing(&self) -> bool {
        matches!(self, RowState::Editing(_) | RowState::Error(_, _))
    }

    /// A request for this row is in flight
    pub fn is_loading(&self) -> bool {
        matches!(self, RowState::Saving(_) | RowState::Deleting)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RowState::Error(_, message) => Some(message),
            _ => None,
        }
    }

    /// `Viewing -> Editing`
    pub fn begin_edit(&mut self, buffer: EditBuffer) -> Result<()> {
        match self {
            RowState::Viewing => {
                *self = RowState::Editing(buffer);
                Ok(())
            }
            _ => Err(self.transition_error("editing")),
        }
    }

    /// Update one cell; an `Error` row goes back to `Editing`
    pub fn set_value(&mut self, column: &str, text: &str) -> Result<()> {
        let mut buffer = match std::mem::take(self) {
            RowState::Editing(buffer) | RowState::Error(buffer, _) => buffer,
            other => {
                *self = other;
                return Err(self.transition_error("editing"));
            }
        };
        buffer.insert(column.to_string(), text.to_string());
        *self = RowState::Editing(buffer);
        Ok(())
    }

    /// `Editing | Error -> Saving`, returning the buffer to reconcile
    pub fn begin_save(&mut self) -> Result<EditBuffer> {
        match std::mem::take(self) {
            RowState::Editing(buffer) | RowState::Error(buffer, _) => {
                *self = RowState::Saving(buffer.clone());
                Ok(buffer)
            }
            other => {
                *self = other;
                Err(self.transition_error("saving"))
            }
        }
    }

    /// `Saving -> Viewing`
    pub fn save_succeeded(&mut self) -> Result<()> {
        match self {
            RowState::Saving(_) => {
                *self = RowState::Viewing;
                Ok(())
            }
            _ => Err(self.transition_error("viewing")),
        }
    }

    /// `Saving -> Error`, keeping the buffer
    pub fn save_failed(&mut self, message: &str) -> Result<()> {
        match std::mem::take(self) {
            RowState::Saving(buffer) => {
                *self = RowState::Error(buffer, message.to_string());
                Ok(())
            }
            other => {
                *self = other;
                Err(self.transition_error("error"))
            }
        }
    }

    /// Drop the buffer; not possible while saving
    pub fn cancel(&mut self) -> Result<()> {
        match self {
            RowState::Editing(_) | RowState::Error(_, _) => {
                *self = RowState::Viewing;
                Ok(())
            }
            RowState::Viewing => Ok(()),
            _ => Err(self.transition_error("viewing")),
        }
    }

    /// `Viewing -> Deleting`
    pub fn begin_delete(&mut self) -> Result<()> {
        match self {
            RowState::Viewing => {
                *self = RowState::Deleting;
                Ok(())
            }
            _ => Err(self.transition_error("deleting")),
        }
    }

    /// `Deleting -> Viewing` after a failed delete
    pub fn delete_failed(&mut self) -> Result<()> {
        match self {
            RowState::Deleting => {
                *self = RowState::Viewing;
                Ok(())
            }
            _ => Err(self.transition_error("viewing")),
        }
    }

    fn transition_error(&self, to: &str) -> ConsoleError {
        ConsoleError::InvalidStateTransition {
            from: self.name().to_string(),
            to: to.to_string(),
        }
    }
}

impl fmt::Display for RowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowState::Error(_, message) => write!(f, "error: {}", message),
            other => write!(f, "{}", other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn buffer(pairs: &[(&str, &str)]) -> EditBuffer {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_edit_save_cycle() {
        let mut state = RowState::Viewing;
        state.begin_edit(buffer(&[("1", "a")])).unwrap();
        state.set_value("1", "b").unwrap();

        let saved = state.begin_save().unwrap();
        assert_eq!(saved, buffer(&[("1", "b")]));
        assert!(state.is_loading());

        state.save_succeeded().unwrap();
        assert_eq!(state, RowState::Viewing);
    }

    #[test]
    fn test_failed_save_keeps_buffer() {
        let mut state = RowState::Editing(buffer(&[("1", "x")]));
        state.begin_save().unwrap();
        state.save_failed("server said no").unwrap();

        assert_eq!(state.error(), Some("server said no"));
        assert_eq!(state.buffer(), Some(&buffer(&[("1", "x")])));

        state.set_value("1", "y").unwrap();
        assert_matches!(state, RowState::Editing(ref b) if b.get("1").map(String::as_str) == Some("y"));
    }

    #[test]
    fn test_invalid_transitions() {
        let mut state = RowState::Viewing;
        assert_matches!(state.set_value("1", "a"), Err(ConsoleError::InvalidStateTransition { .. }));
        assert_matches!(state.begin_save(), Err(ConsoleError::InvalidStateTransition { .. }));
        assert_eq!(state, RowState::Viewing);

        let mut saving = RowState::Saving(EditBuffer::new());
        assert_matches!(saving.cancel(), Err(ConsoleError::InvalidStateTransition { .. }));
        assert_matches!(saving.begin_delete(), Err(ConsoleError::InvalidStateTransition { .. }));
        assert!(saving.is_loading());
    }
}
