//! A sortable movie table for the terminal.
//!
//! Run the binary to browse the table and sort it by column, or press `a`
//! to let it cycle through every column on a timer.
//! Run with `--html` to print the table as HTML instead.

mod app;
mod config;
mod core;
mod error;
mod ui;

use std::io::{self, stderr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use tokio::sync::mpsc;

use crate::app::{
    auto_sort::SortCommand,
    event::spawn_event_reader,
    handler,
    state::{ActiveView, AppState},
};
use crate::config::AppConfig;
use crate::core::{
    markup,
    record::{self, SortDirection, SortSpec},
    table::RecordTable,
};
use crate::ui::{layout::AppLayout, popup::HelpPopup, table_widget::RecordTableWidget, theme::Theme};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Sortable movie table")]
struct Cli {
    /// JSON array of `{id, title, year, imdb}` records (defaults to the
    /// built-in movie list).
    #[arg(long)]
    data: Option<PathBuf>,

    /// Initial sort, e.g. `title` or `year:desc`.
    #[arg(long)]
    sort: Option<SortSpec>,

    /// Start auto-sort on launch.
    #[arg(long)]
    auto: bool,

    /// Milliseconds between the ascending and descending auto-sort step.
    #[arg(long = "step-ms")]
    step_ms: Option<u64>,

    /// Print the table as HTML to stdout and exit.
    #[arg(long)]
    html: bool,

    /// Write the effective configuration to the config file and exit.
    #[arg(long = "write-config")]
    write_config: bool,
}

fn load_table(cli: &Cli) -> Result<(RecordTable, String)> {
    let (mut table, source) = match &cli.data {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let table = RecordTable::from_json(&json)
                .with_context(|| format!("loading records from {}", path.display()))?;
            (table, path.display().to_string())
        }
        None => (
            RecordTable::new(record::builtin_records()?),
            "built-in movies".to_string(),
        ),
    };
    tracing::info!(count = table.len(), %source, "records loaded");

    if table.is_empty() {
        tracing::warn!(%source, "no records to show");
    }
    match cli.sort.map(|spec| (spec.field, spec.direction)) {
        Some((field, SortDirection::Ascending)) => table.sort_ascending(field),
        Some((field, SortDirection::Descending)) => table.sort_descending(field),
        None => {}
    }
    Ok((table, source))
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing (only in debug builds / when RUST_LOG is set).
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr) // never pollute stdout
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load();
    if let Some(ms) = cli.step_ms {
        config.set_auto_sort_step_ms(ms);
    }

    if cli.write_config {
        let path = config.save()?;
        println!("{}", path.display());
        return Ok(());
    }

    let (table, source) = load_table(&cli)?;

    // ── HTML mode ─────────────────────────────────────────────
    if cli.html {
        print!("{}", markup::render_html(&table)?);
        return Ok(());
    }

    let (sort_tx, mut sort_rx) = mpsc::unbounded_channel::<SortCommand>();
    let mut state = AppState::new(table, source, config, sort_tx);
    if cli.auto {
        handler::start_auto_sort(&mut state);
    }

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    execute!(stderr(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let outcome = run(&mut terminal, &mut state, &mut sort_rx).await;

    // ── teardown ──────────────────────────────────────────────
    state.auto_sort.stop();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stderr>>,
    state: &mut AppState,
    sort_rx: &mut mpsc::UnboundedReceiver<SortCommand>,
) -> Result<()> {
    let mut events = spawn_event_reader(Duration::from_millis(100));

    loop {
        terminal.draw(|frame| {
            let layout = AppLayout::from_area(frame.area());

            let table_block = Block::default()
                .title(format!(" {} ({} rows) ", state.source, state.table.len()))
                .title_style(Theme::title_style())
                .borders(Borders::ALL)
                .border_style(Theme::border_style());

            let widget = RecordTableWidget::new(&state.table).block(table_block);
            frame.render_stateful_widget(widget, layout.table_area, &mut state.table_state);

            let status_style = if state.auto_sort.is_running() {
                Theme::auto_sort_style()
            } else {
                Theme::status_bar_style()
            };
            let status = Paragraph::new(state.status_line()).style(status_style);
            frame.render_widget(status, layout.status_area);

            if state.active_view == ActiveView::Help {
                frame.render_widget(HelpPopup { config: &state.config }, frame.area());
            }
        })?;

        tokio::select! {
            biased;

            event = events.recv() => handler::handle_event(state, event)?,

            Some(command) = sort_rx.recv() => {
                handler::apply_sort_command(state, command);
            }
        }

        if state.should_quit {
            break;
        }
    }

    Ok(())
}
