//! Shared fixtures for controller tests: a scripted remote and a presenter
//! that records every call.

#![allow(dead_code)]

use async_trait::async_trait;
use paygrid::core::RemoteResult;
use paygrid::{
    ChangeRecord, Criteria, EditState, Filters, Notice, NoticeKind, Pagination, PaymentStatus,
    Presenter, Record, RecordId, RemotePage, RemoteSource, RowView, SubmitReport, Totals,
};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Remote that replays queued replies and remembers every request.
///
/// When no page reply is queued the last page served is sent again.
/// A stalled save never replies.
#[derive(Default)]
pub struct ScriptedRemote {
    pages: Mutex<VecDeque<RemoteResult<RemotePage>>>,
    submits: Mutex<VecDeque<RemoteResult<SubmitReport>>>,
    totals: Mutex<VecDeque<RemoteResult<Totals>>>,
    last_page: Mutex<RemotePage>,
    fetched: Mutex<Vec<Criteria>>,
    submitted: Mutex<Vec<Vec<ChangeRecord>>>,
    totals_requested: Mutex<Vec<Filters>>,
    stall_submit: AtomicBool,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_page(&self, reply: RemoteResult<RemotePage>) {
        self.pages.lock().unwrap().push_back(reply);
    }

    pub fn push_submit(&self, reply: RemoteResult<SubmitReport>) {
        self.submits.lock().unwrap().push_back(reply);
    }

    pub fn push_totals(&self, reply: RemoteResult<Totals>) {
        self.totals.lock().unwrap().push_back(reply);
    }

    /// The next save hangs until its future is dropped.
    pub fn stall_next_submit(&self) {
        self.stall_submit.store(true, Ordering::SeqCst);
    }

    pub fn fetched(&self) -> Vec<Criteria> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn fetched_pages(&self) -> Vec<u32> {
        self.fetched().iter().map(|c| c.page).collect()
    }

    pub fn submitted(&self) -> Vec<Vec<ChangeRecord>> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn totals_requested(&self) -> Vec<Filters> {
        self.totals_requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteSource for ScriptedRemote {
    async fn fetch_page(&self, criteria: &Criteria) -> RemoteResult<RemotePage> {
        self.fetched.lock().unwrap().push(criteria.clone());

        let queued = self.pages.lock().unwrap().pop_front();
        match queued {
            Some(Ok(page)) => {
                *self.last_page.lock().unwrap() = page.clone();
                Ok(page)
            }
            Some(Err(err)) => Err(err),
            None => Ok(self.last_page.lock().unwrap().clone()),
        }
    }

    async fn submit_changes(&self, changes: &[ChangeRecord]) -> RemoteResult<SubmitReport> {
        self.submitted.lock().unwrap().push(changes.to_vec());
        if self.stall_submit.swap(false, Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.submits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(SubmitReport::updated(changes.len() as u64)))
    }

    async fn fetch_totals(&self, filters: &Filters) -> RemoteResult<Totals> {
        self.totals_requested.lock().unwrap().push(filters.clone());
        self.totals
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Totals::default()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Loading(bool),
    Saving(bool),
    Page {
        ids: Vec<RecordId>,
        current_page: u32,
        total_pages: u32,
    },
    Row {
        id: RecordId,
        state: EditState,
        dirty: bool,
    },
    Totals(Totals),
    Notice(NoticeKind, String),
}

#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub events: Vec<Event>,
    pub notices: Vec<Notice>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_notice(&self) -> Option<&Notice> {
        self.notices.last()
    }

    pub fn loading_events(&self) -> Vec<bool> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Loading(on) => Some(*on),
                _ => None,
            })
            .collect()
    }

    pub fn saving_events(&self) -> Vec<bool> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Saving(on) => Some(*on),
                _ => None,
            })
            .collect()
    }

    pub fn last_row(&self) -> Option<&Event> {
        self.events.iter().rev().find(|e| matches!(e, Event::Row { .. }))
    }
}

impl Presenter for RecordingPresenter {
    fn set_loading(&mut self, loading: bool) {
        self.events.push(Event::Loading(loading));
    }

    fn set_saving(&mut self, saving: bool) {
        self.events.push(Event::Saving(saving));
    }

    fn render_page(&mut self, rows: &[RowView<'_>], pagination: &Pagination) {
        self.events.push(Event::Page {
            ids: rows.iter().map(|r| r.record.id.clone()).collect(),
            current_page: pagination.current_page,
            total_pages: pagination.total_pages(),
        });
    }

    fn render_row(&mut self, row: RowView<'_>) {
        self.events.push(Event::Row {
            id: row.record.id.clone(),
            state: row.state,
            dirty: row.dirty,
        });
    }

    fn render_totals(&mut self, totals: &Totals) {
        self.events.push(Event::Totals(totals.clone()));
    }

    fn notify(&mut self, notice: Notice) {
        self.events
            .push(Event::Notice(notice.kind, notice.message.clone()));
        self.notices.push(notice);
    }
}

pub fn record(id: &str, status: PaymentStatus) -> Record {
    Record::new(id)
        .with_status(status)
        .with_field("employees", "Ana")
        .with_field("service_name", "Massage")
}

/// `count` records named `R1..` with an unset status.
pub fn records(count: usize) -> Vec<Record> {
    (1..=count)
        .map(|i| record(&format!("R{}", i), PaymentStatus::Unset))
        .collect()
}
