//! vidcache - A terminal client for a remote video collection.
//!
//! Shows the collection as a grid of cards, keeps a local cache so the
//! list survives an unreachable server, and offers add/edit/delete through
//! a form panel.

mod app;
mod ui;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vidcache_core::{ApiClient, ApiError, Config, FileStore, VideoCollection};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file written inside the cache directory
const LOG_FILE_NAME: &str = "vidcache.log";

/// Initialize the tracing subscriber.
///
/// The TUI owns the terminal, so logs go to a file in the cache directory.
/// Use RUST_LOG to control the level (e.g., RUST_LOG=vidcache_core=debug).
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

/// Stderr logging for the one-shot CLI commands
fn init_cli_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--dump" {
        init_cli_tracing();
        return dump_videos().await;
    }
    if args.len() > 1 && args[1] == "--set-url" {
        init_cli_tracing();
        return set_base_url(args.get(2).map(String::as_str));
    }

    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let log_dir = config
        .cache_dir()
        .unwrap_or_else(|_| PathBuf::from("./cache"));
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create {}", log_dir.display()))?;
    let _log_guard = init_tracing(&log_dir);
    info!("vidcache starting");

    if let Some(e) = config_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }

    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.reload();

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("vidcache shutting down");
    Ok(())
}

/// Print the reconciled collection as JSON
async fn dump_videos() -> Result<()> {
    let config = Config::load()?;
    let mut collection = VideoCollection::new(FileStore::new(config.cache_dir()?)?);

    match config.base_url() {
        Some(url) => {
            let api = ApiClient::new(&url, config.request_timeout())?;
            collection.load(&api).await;
        }
        None => {
            collection.begin_load();
            collection.apply_fetch(Err(ApiError::NotConfigured));
        }
    }

    if let Some(error) = collection.error() {
        eprintln!("Warning: {}", error);
    }
    println!("{}", serde_json::to_string_pretty(collection.videos())?);
    Ok(())
}

/// Store the collection endpoint in the config file
fn set_base_url(url: Option<&str>) -> Result<()> {
    let url = url
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Usage: vidcache --set-url <URL>"))?;

    write_base_url(&Config::config_path()?, url)?;
    eprintln!("API base URL set to {}", url);
    Ok(())
}

/// Update `api_base_url` in the config at `path`, keeping the other fields.
/// An unreadable config is left untouched.
fn write_base_url(path: &Path, url: &str) -> Result<()> {
    let mut config = Config::load_from(path)
        .context("Existing config could not be read; fix or remove it before setting the URL")?;
    config.api_base_url = Some(url.to_string());
    config.save_to(path)
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
