use paygrid::{
    EditState, Notice, NoticeKind, Pagination, Presenter, RecordId, RowView, Totals,
};
use serde_json::Value;

/// Display columns shown after the payment fields, by wire name.
const DISPLAY_COLUMNS: [&str; 5] = [
    "employees",
    "service_name",
    "space_name",
    "schedule_date",
    "gross_total",
];

/// Presenter for the terminal.
///
/// Pages are buffered and only the latest one is printed by
/// [`ConsolePresenter::print_page`]; notices go straight to stderr.
#[derive(Debug, Default)]
pub struct ConsolePresenter {
    rows: Vec<(RecordId, String)>,
    footer: Option<String>,
    totals: Option<String>,
}

impl ConsolePresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print_page(&self) {
        let Some(footer) = &self.footer else {
            return;
        };

        if self.rows.is_empty() {
            println!("No records found.");
        } else {
            println!("{}", header());
            for (_, line) in &self.rows {
                println!("{}", line);
            }
        }
        println!("{}", footer);
    }

    pub fn print_totals(&self) {
        if let Some(totals) = &self.totals {
            println!("{}", totals);
        }
    }
}

fn header() -> String {
    let mut line = format!("  {:<12} {:<10} {:<10}", "ID", "PAID", "PAID ON");
    for column in DISPLAY_COLUMNS {
        line.push_str(&format!(" {:<16}", column.to_uppercase()));
    }
    line
}

fn format_row(row: &RowView<'_>) -> String {
    let marker = match (row.state, row.dirty) {
        (EditState::Editing, _) => '>',
        (EditState::Locked, true) => '*',
        (EditState::Locked, false) => ' ',
    };
    let record = row.record;
    let date = record
        .payment_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut line = format!(
        "{} {:<12} {:<10} {:<10}",
        marker,
        record.id.to_string(),
        record.payment_status.to_string(),
        date
    );
    for column in DISPLAY_COLUMNS {
        line.push_str(&format!(" {:<16}", cell(record.field(column))));
    }
    line
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) if s.is_empty() => "-".to_string(),
        Some(Value::String(s)) => s.chars().take(16).collect(),
        Some(other) => other.to_string(),
    }
}

impl Presenter for ConsolePresenter {
    fn render_page(&mut self, rows: &[RowView<'_>], pagination: &Pagination) {
        self.rows = rows
            .iter()
            .map(|row| (row.record.id.clone(), format_row(row)))
            .collect();
        self.footer = Some(format!(
            "Page {} of {} ({} records)",
            pagination.current_page,
            pagination.total_pages(),
            pagination.total_count
        ));
    }

    fn render_row(&mut self, row: RowView<'_>) {
        let line = format_row(&row);
        if let Some(slot) = self.rows.iter_mut().find(|(id, _)| id == &row.record.id) {
            slot.1 = line;
        }
    }

    fn render_totals(&mut self, totals: &Totals) {
        self.totals = Some(format!(
            "Gross total: {:.2} over {} services",
            totals.gross_total_sum, totals.services_count
        ));
    }

    fn notify(&mut self, notice: Notice) {
        let tag = match notice.kind {
            NoticeKind::Info => "info",
            NoticeKind::Success => "ok",
            NoticeKind::Error => "error",
        };
        eprintln!("[{}] {}", tag, notice.message);
    }
}
