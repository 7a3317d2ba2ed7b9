// ============================================================================
// Row Edit State Machine
// ============================================================================
//
// Each loaded record is either Locked (read only) or Editing (its payment
// fields accept input). Transitions:
//
//   Locked ──begin──> Editing ──commit──> Locked   (edits stay pending)
//                        │
//                        └──cancel──> Locked       (edits reverted)
//
// Cancel is also accepted on a Locked row so it can be repeated safely.
// Any number of rows may be Editing at once.
//
// ============================================================================

use crate::core::{GridError, PaymentStatus, RecordId, Result, parse_payment_date};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EditState {
    #[default]
    Locked,
    Editing,
}

impl EditState {
    pub fn is_editing(&self) -> bool {
        matches!(self, EditState::Editing)
    }

    /// Next state for `action`, or `None` if the action is not allowed here.
    pub fn apply(self, action: EditAction) -> Option<EditState> {
        match (self, action) {
            (EditState::Locked, EditAction::Begin) => Some(EditState::Editing),
            (EditState::Editing, EditAction::Commit) => Some(EditState::Locked),
            (_, EditAction::Cancel) => Some(EditState::Locked),
            (EditState::Editing, EditAction::Write) => Some(EditState::Editing),
            _ => None,
        }
    }
}

impl fmt::Display for EditState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditState::Locked => write!(f, "LOCKED"),
            EditState::Editing => write!(f, "EDITING"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    Begin,
    Write,
    Commit,
    Cancel,
}

impl fmt::Display for EditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditAction::Begin => write!(f, "begin editing"),
            EditAction::Write => write!(f, "edit"),
            EditAction::Commit => write!(f, "lock"),
            EditAction::Cancel => write!(f, "cancel editing"),
        }
    }
}

/// A write to one of the two editable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    PaymentStatus(PaymentStatus),
    PaymentDate(Option<NaiveDate>),
}

impl Edit {
    /// Build an edit from a field name and raw input, as a form would send it.
    ///
    /// Field names are the logical ones, in camelCase or snake_case.
    pub fn parse(field: &str, raw: &str) -> Result<Self> {
        match field {
            "paymentStatus" | "payment_status" => raw
                .parse::<PaymentStatus>()
                .map(Edit::PaymentStatus)
                .map_err(|_| invalid_value(field, raw)),
            "paymentDate" | "payment_date" => parse_payment_date(raw)
                .map(Edit::PaymentDate)
                .map_err(|_| invalid_value(field, raw)),
            other => Err(GridError::UnknownField(other.to_string())),
        }
    }
}

fn invalid_value(field: &str, raw: &str) -> GridError {
    GridError::InvalidValue {
        field: field.to_string(),
        value: raw.to_string(),
    }
}

/// Edit state of every record on the current page.
#[derive(Debug, Default)]
pub struct EditBook {
    states: HashMap<RecordId, EditState>,
}

impl EditBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every row and lock the given ones.
    pub fn reset<'a>(&mut self, ids: impl IntoIterator<Item = &'a RecordId>) {
        self.states = ids
            .into_iter()
            .map(|id| (id.clone(), EditState::Locked))
            .collect();
    }

    /// Lock every known row.
    pub fn lock_all(&mut self) {
        for state in self.states.values_mut() {
            *state = EditState::Locked;
        }
    }

    pub fn state(&self, id: &RecordId) -> Option<EditState> {
        self.states.get(id).copied()
    }

    pub fn editing_count(&self) -> usize {
        self.states.values().filter(|s| s.is_editing()).count()
    }

    /// Check `action` against the row's state without changing it.
    pub fn check(&self, id: &RecordId, action: EditAction) -> Result<EditState> {
        let state = self
            .state(id)
            .ok_or_else(|| GridError::NotFound(id.clone()))?;

        state
            .apply(action)
            .ok_or_else(|| GridError::InvalidTransition {
                id: id.clone(),
                state,
                action,
            })
    }

    /// Apply `action` to the row and return its new state.
    pub fn transition(&mut self, id: &RecordId, action: EditAction) -> Result<EditState> {
        let next = self.check(id, action)?;
        self.states.insert(id.clone(), next);
        Ok(next)
    }
}
