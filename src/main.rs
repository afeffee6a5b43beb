use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate};
use clap::{Parser, ValueEnum};
use file_triage::app::events::PipelineEvent;
use file_triage::app::state::PipelineState;
use file_triage::app::view_model::{generate_ui_state, UiState};
use file_triage::app::{commands, tasks};
use file_triage::config::{self, AppConfig};
use file_triage::core::{CoreError, FilterCriteria, NameMatch, TimeMatch};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Inventory a directory tree, narrow it by name and date, and copy the result
/// into one flat directory.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory to scan (defaults to the last one used)
    source: Option<PathBuf>,

    /// Filter by file name
    #[arg(long)]
    name: Option<String>,

    /// How the name filter matches
    #[arg(long, value_enum)]
    name_mode: Option<NameModeArg>,

    /// Filter by creation time
    #[arg(long)]
    created: bool,

    /// Filter by last modification time
    #[arg(long)]
    modified: bool,

    /// First day of the date range (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the date range (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Single day for `--time-mode same-day` (YYYY-MM-DD)
    #[arg(long)]
    on: Option<NaiveDate>,

    /// Threshold instant for `--time-mode after` (RFC 3339)
    #[arg(long)]
    after: Option<DateTime<Local>>,

    /// How the time filters compare timestamps
    #[arg(long, value_enum)]
    time_mode: Option<TimeModeArg>,

    /// Page to print
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Files per page (overrides the config)
    #[arg(long)]
    page_size: Option<usize>,

    /// Copy the filtered files into this directory
    #[arg(long)]
    copy_to: Option<PathBuf>,

    /// After copying, drop the copied files from the list and print it again
    #[arg(long)]
    remove_copied: bool,

    /// Open the file at this position of the printed page (1-based)
    #[arg(long)]
    open: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum NameModeArg {
    Contains,
    DayToken,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TimeModeArg {
    Range,
    SameDay,
    After,
}

impl From<NameModeArg> for NameMatch {
    fn from(arg: NameModeArg) -> Self {
        match arg {
            NameModeArg::Contains => NameMatch::Contains,
            NameModeArg::DayToken => NameMatch::DayToken,
        }
    }
}

impl From<TimeModeArg> for TimeMatch {
    fn from(arg: TimeModeArg) -> Self {
        match arg {
            TimeModeArg::Range => TimeMatch::DateRange,
            TimeModeArg::SameDay => TimeMatch::SameDay,
            TimeModeArg::After => TimeMatch::After,
        }
    }
}

impl Cli {
    fn criteria(&self, config: &AppConfig) -> FilterCriteria {
        FilterCriteria {
            name_query: self.name.clone(),
            name_match: self.name_mode.map(Into::into).unwrap_or(config.name_match),
            start: self.from,
            end: self.to,
            on: self.on,
            after: self.after,
            time_match: self.time_mode.map(Into::into).unwrap_or(config.time_match),
            by_name: self.name.is_some() || matches!(self.name_mode, Some(NameModeArg::DayToken)),
            by_created: self.created,
            by_modified: self.modified,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(core_err) = e.downcast_ref::<CoreError>() {
                if core_err.is_user_input() {
                    eprintln!("error: {core_err}");
                    return ExitCode::from(2);
                }
            }
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Could not load config, using defaults: {}", e);
        AppConfig::default()
    });
    if let Some(size) = cli.page_size {
        config.page_size = size;
    }
    let config = config.normalized();
    let criteria = cli.criteria(&config);

    let state = Arc::new(Mutex::new(PipelineState::new(config)));
    let (proxy, event_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(print_progress(event_rx));

    if cli.source.is_some() {
        commands::select_source(cli.source.clone(), proxy.clone(), state.clone())?;
    }
    if cli.copy_to.is_some() {
        commands::select_target(cli.copy_to.clone(), proxy.clone(), state.clone())?;
    }

    tasks::start_scan(proxy.clone(), state.clone())?
        .await
        .context("scan task panicked")?;

    commands::apply_filter(criteria, proxy.clone(), state.clone())?;
    commands::go_to_page(cli.page, proxy.clone(), state.clone());
    print_page(&snapshot(&state));

    if let Some(position) = cli.open {
        let path = commands::selected_path(position.saturating_sub(1), &state)
            .with_context(|| format!("no file at position {position} on this page"))?;
        commands::open_record(&path)?;
    }

    if cli.copy_to.is_some() {
        tasks::start_copy(proxy.clone(), state.clone())?
            .await
            .context("copy task panicked")?;
        print_failures(&state);

        if cli.remove_copied {
            commands::remove_all_copied(proxy.clone(), state.clone())?;
            print_page(&snapshot(&state));
        }
    }

    remember_directories(&state);

    drop(proxy);
    printer.await.context("progress printer panicked")?;
    Ok(())
}

fn snapshot(state: &Arc<Mutex<PipelineState>>) -> UiState {
    let guard = state.lock().unwrap_or_else(|e| e.into_inner());
    generate_ui_state(&guard)
}

fn print_page(ui: &UiState) {
    println!(
        "Scanned files: {}  Filtered: {}  Page: {}",
        ui.inventory_count, ui.filtered_count, ui.page_label
    );
    for (i, item) in ui.items.iter().enumerate() {
        println!(
            "{:>3}  {:<40}  {:<19}  {:<19}  {}",
            i + 1,
            item.name,
            item.created,
            item.modified,
            item.status
        );
    }
}

fn print_failures(state: &Arc<Mutex<PipelineState>>) {
    let guard = state.lock().unwrap_or_else(|e| e.into_inner());
    for record in guard.filtered.iter() {
        if let file_triage::core::CopyStatus::Failed(reason) = record.status() {
            println!("failed: {}: {}", record.path().display(), reason);
        }
    }
}

fn remember_directories(state: &Arc<Mutex<PipelineState>>) {
    let guard = state.lock().unwrap_or_else(|e| e.into_inner());
    if let Err(e) = config::settings::save_config(&guard.config, None) {
        tracing::warn!("Failed to save config: {}", e);
    }
}

async fn print_progress(mut events: mpsc::UnboundedReceiver<PipelineEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            PipelineEvent::ScanProgress(p) => eprintln!("scanning... {} files", p.files_scanned),
            PipelineEvent::ScanComplete { total } => eprintln!("scan complete: {total} files"),
            PipelineEvent::CopyProgress { completed, total } => {
                eprintln!("copying... {completed}/{total}")
            }
            PipelineEvent::CopyComplete(summary) => println!(
                "Copy complete. Succeeded: {} Failed: {}",
                summary.success_count, summary.failure_count
            ),
            PipelineEvent::ShowError(message) => eprintln!("error: {message}"),
            PipelineEvent::StateUpdate(_) => {}
        }
    }
}
