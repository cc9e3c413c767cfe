//! Terminal dashboard that polls Omrin and shows upcoming waste collection sensors.

mod app;
mod config;
mod input;
mod scheduler;
mod ui;

use std::{
    fs::OpenOptions,
    io,
    path::Path,
    sync::{Arc, Mutex},
    time::Duration as StdDuration,
};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use omrin_core::{RefreshCoordinator, Session};
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::config::Settings;
use crate::input::Action;
use crate::scheduler::RefreshOutcome;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;
    init_tracing(&settings.log_file)?;

    let session = Session::from_config(
        &settings.postal_code,
        &settings.house_number,
        settings.date_format.as_deref(),
    )
    .context("invalid address or date format")?;

    // HTTP + coordinator setup
    let client = Client::builder().user_agent("omrin-tui/0.1").build()?;
    let port = omrin_provider::port(client, &settings.base_url);
    let coordinator = Arc::new(
        RefreshCoordinator::connect(port, session, settings.coordinator_options())
            .await
            .context("failed to fetch the provider public key")?,
    );

    let (updates_tx, mut updates) = watch::channel(0_u64);
    coordinator.add_listener(move |_summary| {
        updates_tx.send_modify(|generation| *generation = generation.wrapping_add(1));
    });

    // Fetch initial data
    if let Err(err) = coordinator.refresh().await {
        warn!("Initial refresh failed: {err}");
    }
    updates.mark_unchanged();

    let (outcomes_tx, outcomes) = mpsc::unbounded_channel();
    let scheduler_handle = scheduler::spawn(Arc::clone(&coordinator), outcomes_tx.clone());

    let mut app = App::new(Arc::clone(&coordinator));
    if !coordinator.last_update_success() {
        app.error_message = Some("Initial refresh failed, see log".into());
    }

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let channels = Channels {
        updates,
        outcomes,
        outcomes_tx,
    };
    let res = run(&mut terminal, app, channels).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    scheduler_handle.abort();
    info!("Dashboard stopped");

    res
}

struct Channels {
    updates: watch::Receiver<u64>,
    outcomes: mpsc::UnboundedReceiver<RefreshOutcome>,
    outcomes_tx: mpsc::UnboundedSender<RefreshOutcome>,
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    mut channels: Channels,
) -> Result<()> {
    loop {
        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            match input::handle_key_event(key, &mut app) {
                Action::Quit => break,
                Action::None => {}
                Action::RequestRefresh => {
                    app.is_loading = true;
                    app.error_message = None;
                    scheduler::request(&app.coordinator, &channels.outcomes_tx);
                }
            }
        }

        while let Ok(outcome) = channels.outcomes.try_recv() {
            app.apply_outcome(outcome);
        }

        if channels.updates.has_changed()? {
            channels.updates.mark_unchanged();
            app.reload();
        }

        // Yield so spawned refreshes make progress between frames.
        tokio::task::yield_now().await;
    }

    Ok(())
}

fn init_tracing(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    // Log to a file; stdout belongs to the terminal UI.
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "omrin_tui=info,omrin_core=info,omrin_provider=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    info!("Logging to {}", path.display());
    Ok(())
}
