use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use academic_dashboard::config::{self, Config};
use academic_dashboard::dashboard::{Dashboard, RefreshOutcome};
use academic_dashboard::models::Snapshot;
use academic_dashboard::report;
use academic_dashboard::source::SheetSource;
use academic_dashboard::table::{self, StudentQuery};

#[derive(Parser)]
#[command(name = "academic-dashboard")]
#[command(about = "Academic control dashboard over a published student sheet", long_about = None)]
struct Cli {
    /// Published sheet CSV URL or local path (overrides SHEET_CSV_URL)
    #[arg(long, global = true)]
    source: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the headline indicators
    Summary {
        /// Emit the full snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// List students with optional filters
    Students {
        /// Matches name or email (case-insensitive) or CPF
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        curso: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = table::DEFAULT_PAGE_SIZE)]
        per_page: usize,
    },
    /// Show one student's details
    Show { id: String },
    /// Reload the sheet periodically and print the summary after each run
    Watch {
        /// Overrides REFRESH_INTERVAL_MINUTES
        #[arg(long)]
        interval_minutes: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "academic_dashboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let location = config.resolve_source(cli.source.as_deref())?;
    let source = SheetSource::from_location(&location, config.http_timeout)
        .context("failed to set up the sheet source")?;
    let dashboard = Dashboard::new(source);

    match cli.command {
        Commands::Summary { json } => {
            let snapshot = load(&dashboard).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(snapshot.as_ref())?);
            } else {
                print!("{}", report::build_summary(&snapshot));
            }
        }
        Commands::Report { out } => {
            let snapshot = load(&dashboard).await?;
            let report = report::build_report(&snapshot, dashboard.last_error().as_deref());
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Students {
            search,
            status,
            curso,
            page,
            per_page,
        } => {
            let query = StudentQuery {
                search,
                status,
                curso,
                page,
                per_page,
            };
            let snapshot = load(&dashboard).await?;
            let page = table::query_students(&snapshot.records, &query);
            print!("{}", table::render_page(&page));
        }
        Commands::Show { id } => {
            let snapshot = load(&dashboard).await?;
            match table::find_student(&snapshot.records, &id) {
                Some(student) => print!("{}", table::render_detail(student)),
                None => anyhow::bail!("no student with id {id}"),
            }
        }
        Commands::Watch { interval_minutes } => {
            let period = match interval_minutes.filter(|minutes| *minutes > 0) {
                Some(minutes) => config::minutes_to_interval(minutes)
                    .context("--interval-minutes is too large")?,
                None => config.refresh_interval,
            };
            watch(&dashboard, period).await?;
        }
    }

    Ok(())
}

async fn load(dashboard: &Dashboard) -> anyhow::Result<Arc<Snapshot>> {
    dashboard
        .load()
        .await
        .with_context(|| format!("failed to load {}", dashboard.source().label()))
}

async fn watch(dashboard: &Dashboard, period: Duration) -> anyhow::Result<()> {
    tracing::info!("refreshing every {} seconds", period.as_secs());
    let mut ticker = tokio::time::interval(period);

    loop {
        ticker.tick().await;
        match dashboard.refresh().await {
            Ok(RefreshOutcome::Updated(snapshot)) => {
                print!("{}", report::build_summary(&snapshot));
            }
            Ok(RefreshOutcome::Coalesced) => {}
            Err(err) => {
                tracing::warn!("refresh failed, keeping previous snapshot: {}", err);
                if let Some(snapshot) = dashboard.snapshot() {
                    print!("{}", report::build_summary(&snapshot));
                }
            }
        }
    }
}
