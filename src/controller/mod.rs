// ============================================================================
// Grid Controller
// ============================================================================
//
// Owns everything one dashboard session needs: the current criteria, the
// record store, per-row edit states and the pager position. It coordinates
// fetches and saves against a RemoteSource and reports every visible change
// to a Presenter.
//
// Requests are split into begin/complete halves. `begin_*` records what is
// about to be sent and hands out a ticket; `complete_*` applies the reply.
// Fetch tickets carry a sequence number and only the most recently issued
// one is applied, so a slow reply can never overwrite a newer page.
// Navigation works on a copy of the criteria; the copy becomes current only
// when its page is applied, so a failed request leaves the grid describing
// the page still on screen.
// Only one save may be in flight at a time.
// `fetch()` and `submit()` run both halves back to back.
//
// ============================================================================

use crate::config::{GridConfig, LockBehavior};
use crate::core::{ChangeRecord, GridError, Record, RecordId, RemoteResult, Result, Totals};
use crate::criteria::{Criteria, CriteriaPatch, Pagination};
use crate::edit::{Edit, EditAction, EditBook, EditState};
use crate::presenter::{Notice, NoticeKind, Presenter, RowView};
use crate::remote::{RemotePage, RemoteSource, SubmitReport};
use crate::store::RecordStore;
use tracing::{debug, error, info, warn};

/// Handle for an issued page request.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    seq: u64,
    criteria: Criteria,
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The criteria the request was issued with.
    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }
}

/// Handle for an issued batch update.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitTicket {
    seq: u64,
    changes: Vec<ChangeRecord>,
}

impl SubmitTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn changes(&self) -> &[ChangeRecord] {
        &self.changes
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A non-empty page replaced the grid.
    Loaded { records: usize, total: u64 },
    /// The query matched nothing; the grid is now empty.
    Empty,
    /// A newer request was issued meanwhile; this reply was dropped.
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    NothingToSubmit,
    Saved(SubmitReport),
}

/// Clears the in-flight save if a `submit()` future is dropped mid-request.
struct SavingGuard<'a, P: Presenter> {
    submitting: &'a mut bool,
    presenter: &'a mut P,
    armed: bool,
}

impl<P: Presenter> Drop for SavingGuard<'_, P> {
    fn drop(&mut self) {
        if self.armed {
            warn!("save abandoned before the reply arrived");
            *self.submitting = false;
            self.presenter.set_saving(false);
        }
    }
}

pub struct GridController<R, P> {
    remote: R,
    presenter: P,
    config: GridConfig,
    criteria: Criteria,
    pagination: Pagination,
    store: RecordStore,
    edits: EditBook,
    fetch_seq: u64,
    loading: bool,
    submit_seq: u64,
    submitting: bool,
}

impl<R: RemoteSource, P: Presenter> GridController<R, P> {
    pub fn new(remote: R, presenter: P, config: GridConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            remote,
            presenter,
            criteria: Criteria::new(config.page_size),
            pagination: Pagination::empty(config.page_size),
            config,
            store: RecordStore::new(),
            edits: EditBook::new(),
            fetch_seq: 0,
            loading: false,
            submit_seq: 0,
            submitting: false,
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Criteria of the page currently shown.
    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    /// Position of the page currently shown.
    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Live records in page order.
    pub fn records(&self) -> &[Record] {
        self.store.records()
    }

    pub fn record(&self, id: &RecordId) -> Option<&Record> {
        self.store.working(id)
    }

    /// Last server-confirmed copy of a record.
    pub fn confirmed(&self, id: &RecordId) -> Option<&Record> {
        self.store.snapshot(id)
    }

    pub fn edit_state(&self, id: &RecordId) -> Option<EditState> {
        self.edits.state(id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    // ------------------------------------------------------------------
    // Criteria and paging
    // ------------------------------------------------------------------

    /// Merge filter changes, go back to page 1 and fetch.
    pub async fn set_criteria(&mut self, patch: CriteriaPatch) -> Result<FetchOutcome> {
        let mut criteria = self.criteria.clone();
        criteria.apply(patch);
        self.fetch_with(criteria).await
    }

    /// Jump to `page`. Pages outside the known range are refused without a request.
    pub async fn set_page(&mut self, page: u32) -> Result<FetchOutcome> {
        if !self.pagination.contains(page) {
            let total_pages = self.pagination.total_pages();
            warn!(page, total_pages, "page out of range, not fetching");
            return Err(GridError::PageOutOfRange {
                requested: page,
                total_pages,
            });
        }
        self.fetch_with(self.criteria.with_page(page)).await
    }

    pub async fn next_page(&mut self) -> Result<FetchOutcome> {
        self.set_page(self.pagination.current_page.saturating_add(1))
            .await
    }

    pub async fn prev_page(&mut self) -> Result<FetchOutcome> {
        self.set_page(self.pagination.current_page.saturating_sub(1))
            .await
    }

    /// Sort by `field`, flipping direction if it is already the sort field.
    pub async fn set_sort(&mut self, field: &str) -> Result<FetchOutcome> {
        let mut criteria = self.criteria.clone();
        let key = criteria.toggle_sort(field);
        debug!(field = %key.field, direction = %key.direction, "sort changed");
        self.fetch_with(criteria).await
    }

    // ------------------------------------------------------------------
    // Fetch coordination
    // ------------------------------------------------------------------

    /// Request the page described by the current criteria and apply the reply.
    pub async fn fetch(&mut self) -> Result<FetchOutcome> {
        self.fetch_with(self.criteria.clone()).await
    }

    async fn fetch_with(&mut self, criteria: Criteria) -> Result<FetchOutcome> {
        let ticket = self.issue_fetch(criteria);
        let result = self.remote.fetch_page(&ticket.criteria).await;
        self.complete_fetch(ticket, result)
    }

    /// Issue a page request for the current criteria.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issue_fetch(self.criteria.clone())
    }

    fn issue_fetch(&mut self, criteria: Criteria) -> FetchTicket {
        self.fetch_seq += 1;
        self.loading = true;
        self.presenter.set_loading(true);
        debug!(seq = self.fetch_seq, page = criteria.page, "fetch issued");

        FetchTicket {
            seq: self.fetch_seq,
            criteria,
        }
    }

    /// Apply the reply to a page request.
    ///
    /// On success the ticket's criteria become current. On failure the
    /// current page and criteria are left exactly as they were. The loading
    /// indicator is cleared whenever the latest request completes.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: RemoteResult<RemotePage>,
    ) -> Result<FetchOutcome> {
        if ticket.seq != self.fetch_seq {
            warn!(seq = ticket.seq, latest = self.fetch_seq, "discarding stale fetch reply");
            return Ok(FetchOutcome::Stale);
        }

        self.loading = false;
        self.presenter.set_loading(false);

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                error!(seq = ticket.seq, error = %err, "fetch failed");
                self.notify(NoticeKind::Error, "Failed to load records.");
                return Err(GridError::FetchFailed(err));
            }
        };

        let returned = page.records.len() as u64;
        let total = match page.total {
            Some(total) if total > 0 => total,
            _ => returned,
        };

        self.store.replace_all(page.records);
        self.edits.reset(self.store.ids());
        self.pagination = Pagination {
            current_page: ticket.criteria.page,
            page_size: ticket.criteria.page_size,
            total_count: total,
        };
        self.criteria = ticket.criteria;
        self.render_page();

        if self.store.is_empty() {
            info!(seq = ticket.seq, "fetch returned no records");
            Ok(FetchOutcome::Empty)
        } else {
            info!(
                seq = ticket.seq,
                page = self.pagination.current_page,
                records = self.store.len(),
                total,
                "page loaded"
            );
            Ok(FetchOutcome::Loaded {
                records: self.store.len(),
                total,
            })
        }
    }

    /// Aggregate figures for the current filters.
    pub async fn refresh_totals(&mut self) -> Result<Totals> {
        match self.remote.fetch_totals(&self.criteria.filters).await {
            Ok(totals) => {
                self.presenter.render_totals(&totals);
                Ok(totals)
            }
            Err(err) => {
                error!(error = %err, "totals request failed");
                self.notify(NoticeKind::Error, "Failed to load totals.");
                Err(GridError::TotalsFailed(err))
            }
        }
    }

    // ------------------------------------------------------------------
    // Row editing
    // ------------------------------------------------------------------

    /// Unlock a row for editing.
    pub fn begin_edit(&mut self, id: &RecordId) -> Result<()> {
        self.row_transition(id, EditAction::Begin)?;
        self.render_row(id);
        Ok(())
    }

    /// Lock a row and put back its last confirmed values.
    pub fn cancel_edit(&mut self, id: &RecordId) -> Result<()> {
        self.row_transition(id, EditAction::Cancel)?;
        self.store.revert(id);
        self.render_row(id);
        Ok(())
    }

    /// Write one editable field of an unlocked row.
    pub fn apply_edit(&mut self, id: &RecordId, edit: Edit) -> Result<()> {
        self.row_transition(id, EditAction::Write)?;
        self.store.write(id, edit);
        self.render_row(id);
        Ok(())
    }

    /// Lock a row, keeping its edits pending for the next save.
    pub fn commit_lock(&mut self, id: &RecordId) -> Result<()> {
        self.row_transition(id, EditAction::Commit)?;
        self.render_row(id);
        Ok(())
    }

    /// The row's lock button: unlock a locked row, lock an unlocked one.
    ///
    /// Whether locking keeps or drops edits follows [`LockBehavior`].
    pub fn toggle_edit(&mut self, id: &RecordId) -> Result<EditState> {
        match self.edits.state(id) {
            Some(EditState::Locked) => self.begin_edit(id)?,
            Some(EditState::Editing) => match self.config.lock_behavior {
                LockBehavior::Keep => self.commit_lock(id)?,
                LockBehavior::Revert => self.cancel_edit(id)?,
            },
            None => {
                warn!(id = %id, "toggle on unknown record ignored");
                return Err(GridError::NotFound(id.clone()));
            }
        }
        Ok(self.edits.state(id).unwrap_or_default())
    }

    fn row_transition(&mut self, id: &RecordId, action: EditAction) -> Result<EditState> {
        if !self.store.contains(id) {
            warn!(id = %id, %action, "action on unknown record ignored");
            return Err(GridError::NotFound(id.clone()));
        }

        match self.edits.transition(id, action) {
            Ok(state) => {
                debug!(id = %id, %action, %state, "row transition");
                Ok(state)
            }
            Err(err) => {
                warn!(id = %id, error = %err, "row action rejected");
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------
    // Diff & submit
    // ------------------------------------------------------------------

    /// Rows whose editable fields differ from the last confirmed state.
    pub fn compute_diff(&self) -> Vec<ChangeRecord> {
        self.store.diff()
    }

    /// Save every pending change, then reload the current page.
    ///
    /// Dropping the future before the reply arrives clears the in-flight
    /// save, leaving the edits pending.
    pub async fn submit(&mut self) -> Result<SubmitOutcome> {
        let Some(ticket) = self.begin_submit()? else {
            return Ok(SubmitOutcome::NothingToSubmit);
        };

        let result = {
            let mut guard = SavingGuard {
                submitting: &mut self.submitting,
                presenter: &mut self.presenter,
                armed: true,
            };
            let result = self.remote.submit_changes(&ticket.changes).await;
            guard.armed = false;
            result
        };
        let outcome = self.complete_submit(ticket, result)?;

        if let Err(err) = self.fetch().await {
            warn!(error = %err, "reload after save failed");
        }
        Ok(outcome)
    }

    /// Collect pending changes and mark the save as in flight.
    ///
    /// Returns `None`, without contacting the server, when there is nothing
    /// to save.
    pub fn begin_submit(&mut self) -> Result<Option<SubmitTicket>> {
        if self.submitting {
            warn!("save requested while another is in flight");
            return Err(GridError::SubmitInProgress);
        }

        let changes = self.store.diff();
        if changes.is_empty() {
            info!("nothing to save");
            self.notify(NoticeKind::Info, "No changes to save.");
            return Ok(None);
        }

        self.submit_seq += 1;
        self.submitting = true;
        self.presenter.set_saving(true);
        debug!(seq = self.submit_seq, rows = changes.len(), "save issued");

        Ok(Some(SubmitTicket {
            seq: self.submit_seq,
            changes,
        }))
    }

    /// Apply the reply to a batch update.
    ///
    /// Success accepts the whole working set as confirmed. Failure leaves
    /// both the edits and the confirmed state untouched so the save can be
    /// retried.
    pub fn complete_submit(
        &mut self,
        ticket: SubmitTicket,
        result: RemoteResult<SubmitReport>,
    ) -> Result<SubmitOutcome> {
        self.submitting = false;
        self.presenter.set_saving(false);

        match result {
            Ok(report) => {
                self.store.promote();
                self.edits.lock_all();
                self.render_page();

                if report.errors.is_empty() {
                    info!(rows = ticket.changes.len(), "changes saved");
                    self.notify(NoticeKind::Success, "Changes saved.");
                } else {
                    warn!(
                        rows = ticket.changes.len(),
                        rejected = report.errors.len(),
                        "server rejected some rows"
                    );
                    let message = format!(
                        "Changes saved; {} row(s) were rejected by the server.",
                        report.errors.len()
                    );
                    self.notify(NoticeKind::Success, message);
                }
                Ok(SubmitOutcome::Saved(report))
            }
            Err(err) => {
                error!(seq = ticket.seq, error = %err, "save failed");
                self.notify(NoticeKind::Error, "Failed to save changes.");
                Err(GridError::SubmitFailed(err))
            }
        }
    }

    // ------------------------------------------------------------------
    // Presentation
    // ------------------------------------------------------------------

    fn render_page(&mut self) {
        let rows: Vec<RowView<'_>> = self
            .store
            .records()
            .iter()
            .map(|record| RowView {
                record,
                state: self.edits.state(&record.id).unwrap_or_default(),
                dirty: self.store.is_dirty(&record.id),
            })
            .collect();
        self.presenter.render_page(&rows, &self.pagination);
    }

    fn render_row(&mut self, id: &RecordId) {
        if let Some(record) = self.store.working(id) {
            let row = RowView {
                record,
                state: self.edits.state(id).unwrap_or_default(),
                dirty: self.store.is_dirty(id),
            };
            self.presenter.render_row(row);
        }
    }

    fn notify(&mut self, kind: NoticeKind, message: impl Into<String>) {
        let notice = Notice::new(kind, message, self.config.notice_ttl);
        self.presenter.notify(notice);
    }
}
