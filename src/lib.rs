// ============================================================================
// PayGrid Library
// ============================================================================

pub mod config;
pub mod controller;
pub mod core;
pub mod criteria;
pub mod edit;
pub mod presenter;
pub mod remote;
pub mod store;

// Re-export main types for convenience
pub use config::{GridConfig, LockBehavior, RemoteConfig};
pub use controller::{FetchOutcome, FetchTicket, GridController, SubmitOutcome, SubmitTicket};
pub use crate::core::{
    ChangeRecord, GridError, PaymentStatus, Record, RecordId, RemoteError, Result, Totals,
};
pub use criteria::{Criteria, CriteriaPatch, Filters, Pagination, SortDirection, SortKey};
pub use edit::{Edit, EditState};
pub use presenter::{Notice, NoticeKind, Presenter, RowView};
pub use remote::{HttpRemote, RemotePage, RemoteSource, SubmitReport, WireSchema};

// ============================================================================
// High-level entry point
// ============================================================================

/// Grid controller talking to the dashboard backend over HTTP.
pub type HttpGrid<P> = GridController<HttpRemote, P>;

/// Build a controller for the backend described by `remote`.
///
/// # Examples
///
/// ```no_run
/// use paygrid::{CriteriaPatch, Edit, GridConfig, PaymentStatus, Presenter, RecordId, RemoteConfig};
///
/// struct Silent;
/// impl Presenter for Silent {}
///
/// # async fn run() -> paygrid::Result<()> {
/// let remote = RemoteConfig::new("http://localhost:5000");
/// let mut grid = paygrid::connect(remote, GridConfig::default(), Silent)?;
///
/// grid.set_criteria(CriteriaPatch::new().status(Some("Pendente"))).await?;
///
/// let id = RecordId::from("A1");
/// grid.begin_edit(&id)?;
/// grid.apply_edit(&id, Edit::PaymentStatus(PaymentStatus::Yes))?;
/// grid.commit_lock(&id)?;
/// grid.submit().await?;
/// # Ok(())
/// # }
/// ```
pub fn connect<P: Presenter>(
    remote: RemoteConfig,
    grid: GridConfig,
    presenter: P,
) -> Result<HttpGrid<P>> {
    let remote = HttpRemote::new(remote)?;
    GridController::new(remote, presenter, grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;
    impl Presenter for Silent {}

    #[test]
    fn test_connect_validates_config() {
        let grid = connect(RemoteConfig::new("http://localhost:5000"), GridConfig::default(), Silent)
            .unwrap();
        assert_eq!(grid.criteria().page_size, 30);
        assert!(!grid.is_loading());

        let bad = connect(RemoteConfig::new("localhost"), GridConfig::default(), Silent);
        assert!(matches!(bad, Err(GridError::Config(_))));
    }
}
