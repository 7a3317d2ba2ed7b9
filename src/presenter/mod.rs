//! Presentation layer contract
//!
//! The controller never renders anything itself. It pushes state changes
//! to a [`Presenter`], which may draw a terminal table, update a web view or
//! just record what it was told. Every method has a no-op default.

use crate::core::{Record, Totals};
use crate::criteria::Pagination;
use crate::edit::EditState;
use std::time::Duration;

/// A row as the presentation layer should draw it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowView<'a> {
    pub record: &'a Record,
    pub state: EditState,
    /// Live values differ from the last confirmed ones.
    pub dirty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

/// Transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    /// The presenter should dismiss the notice after this long.
    pub ttl: Duration,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>, ttl: Duration) -> Self {
        Self {
            kind,
            message: message.into(),
            ttl,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

pub trait Presenter {
    /// Loading indicator on or off.
    fn set_loading(&mut self, _loading: bool) {}

    /// Save button busy (disabled) or back at rest.
    fn set_saving(&mut self, _saving: bool) {}

    /// Redraw the whole page. `rows` is empty for an empty result set.
    fn render_page(&mut self, _rows: &[RowView<'_>], _pagination: &Pagination) {}

    /// Redraw one row after its edit state or values changed.
    fn render_row(&mut self, _row: RowView<'_>) {}

    fn render_totals(&mut self, _totals: &Totals) {}

    fn notify(&mut self, _notice: Notice) {}
}
