use super::ui::ConsolePresenter;
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use paygrid::{
    CriteriaPatch, Edit, GridConfig, HttpGrid, PaymentStatus, RemoteConfig, SortDirection,
    SubmitOutcome,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "paygrid")]
#[command(about = "Browse and settle service payments on the dashboard backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
struct FilterArgs {
    #[arg(long)]
    start_date: Option<NaiveDate>,
    #[arg(long)]
    end_date: Option<NaiveDate>,
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    employee: Option<String>,
    /// Customer or service name, depending on the backend schema
    #[arg(long)]
    customer: Option<String>,
}

impl FilterArgs {
    fn patch(&self) -> CriteriaPatch {
        CriteriaPatch::new()
            .start_date(self.start_date)
            .end_date(self.end_date)
            .status(self.status.as_deref())
            .employee(self.employee.as_deref())
            .customer(self.customer.as_deref())
    }
}

#[derive(Subcommand)]
enum Command {
    /// Show one page of records
    List {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Column to sort by
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,
    },
    /// Show gross total and service count for the filters
    Totals {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Set the payment status (and optionally date) of one record
    Mark {
        id: String,
        #[arg(long)]
        status: PaymentStatus,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[command(flatten)]
        filters: FilterArgs,
        /// Page on which the record is found
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

pub struct App {
    cli: Cli,
    remote: RemoteConfig,
    grid: GridConfig,
}

impl App {
    pub fn from_args() -> Result<Self> {
        let cli = Cli::parse();
        let remote = RemoteConfig::from_env().context("invalid backend configuration")?;
        let grid = GridConfig::from_env().context("invalid grid configuration")?;
        Ok(Self { cli, remote, grid })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut grid = paygrid::connect(
            self.remote.clone(),
            self.grid.clone(),
            ConsolePresenter::new(),
        )
        .context("failed to set up the grid")?;
        info!(backend = %self.remote.base_url, "connected");

        match &self.cli.command {
            Command::List {
                filters,
                page,
                sort,
                desc,
            } => {
                let mut patch = filters.patch();
                if let Some(field) = sort {
                    let direction = if *desc {
                        SortDirection::Desc
                    } else {
                        SortDirection::Asc
                    };
                    patch = patch.sort(field, direction);
                }
                grid.set_criteria(patch).await?;
                goto_page(&mut grid, *page).await?;
                grid.presenter().print_page();
            }
            Command::Totals { filters } => {
                grid.set_criteria(filters.patch()).await?;
                grid.refresh_totals().await?;
                grid.presenter().print_totals();
            }
            Command::Mark {
                id,
                status,
                date,
                filters,
                page,
            } => {
                grid.set_criteria(filters.patch()).await?;
                goto_page(&mut grid, *page).await?;

                let record_id = grid
                    .records()
                    .iter()
                    .map(|r| r.id.clone())
                    .find(|rid| rid.to_string() == *id)
                    .ok_or_else(|| anyhow!("record '{}' is not on page {}", id, page))?;

                grid.begin_edit(&record_id)?;
                grid.apply_edit(&record_id, Edit::PaymentStatus(*status))?;
                if date.is_some() {
                    grid.apply_edit(&record_id, Edit::PaymentDate(*date))?;
                }
                grid.commit_lock(&record_id)?;

                match grid.submit().await? {
                    SubmitOutcome::NothingToSubmit => {}
                    SubmitOutcome::Saved(report) => {
                        info!(updated = ?report.updated, "record updated");
                    }
                }
                grid.presenter().print_page();
            }
        }

        Ok(())
    }
}

async fn goto_page(grid: &mut HttpGrid<ConsolePresenter>, page: u32) -> Result<()> {
    if page > 1 {
        grid.set_page(page)
            .await
            .with_context(|| format!("cannot open page {}", page))?;
    }
    Ok(())
}
