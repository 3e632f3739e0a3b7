//! SkillShare+ TUI - A terminal client for the SkillShare+ learning platform.
//!
//! Log in, create accounts and browse the course catalog from the keyboard.
//! The session token survives restarts.

mod app;
mod ui;

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use skillshare_core::views::LoginView;
use skillshare_core::{ApiClient, Config, SessionContext};

use app::{App, AppState, Route, Router};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file written while the terminal UI owns the screen
const LOG_FILE: &str = "skillshare.log";

fn env_filter() -> EnvFilter {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Initialize logging to stderr for one-shot commands
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// Initialize logging to a file in the data directory.
///
/// The alternate screen would swallow stderr output, so the interactive UI
/// logs here instead. The returned guard flushes the writer on drop.
fn init_file_tracing(config: &Config) -> Option<WorkerGuard> {
    let dir = match config.data_dir() {
        Ok(dir) => dir,
        Err(_) => return None,
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return None;
    }

    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();
    Some(guard)
}

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        init_tracing();
        return match args[1].as_str() {
            "--login" => login_command().await,
            "--logout" => logout_command(),
            "--status" => status_command(),
            other => {
                eprintln!("Unknown option: {}", other);
                eprintln!("Usage: skillshare [--login | --logout | --status]");
                std::process::exit(2);
            }
        };
    }

    let config = load_config();
    let _log_guard = init_file_tracing(&config);
    info!("SkillShare+ TUI starting");

    // Create app before touching the terminal so setup errors stay readable
    let mut app = App::new(config)?;

    if app.is_authenticated() {
        app.refresh_courses();
    } else {
        app.start_login();
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("SkillShare+ TUI shutting down");
    Ok(())
}

fn open_session(config: &Config) -> Result<SessionContext> {
    let store = config.open_session()?;
    Ok(SessionContext::new(Arc::new(store)))
}

/// Log in from the command line and save the session
async fn login_command() -> Result<()> {
    let mut config = load_config();
    let session = open_session(&config)?;
    let api = ApiClient::new(config.api_base_url(), session)?;

    let default_email = config.last_email.clone().unwrap_or_default();
    if default_email.is_empty() {
        eprint!("Email: ");
    } else {
        eprint!("Email [{}]: ", default_email);
    }
    io::stderr().flush()?;

    let mut email = String::new();
    io::stdin()
        .lock()
        .read_line(&mut email)
        .context("Failed to read email")?;
    let email = match email.trim() {
        "" => default_email,
        typed => typed.to_string(),
    };

    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;

    let mut view = LoginView::with_email(email);
    view.password = password;

    let mut router = Router::new(Route::Login);
    if view.submit(&api, &mut router).await {
        eprintln!("Logged in as {}", view.email);
        if config.last_email.as_deref() != Some(view.email.as_str()) {
            config.last_email = Some(view.email.clone());
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }
        }
        return Ok(());
    }

    match view.error() {
        Some(message) => anyhow::bail!("{}", message),
        None => anyhow::bail!("Email and password required"),
    }
}

/// Clear the saved session
fn logout_command() -> Result<()> {
    let config = load_config();
    let session = open_session(&config)?;
    session.set_token(None)?;
    eprintln!("Logged out");
    Ok(())
}

/// Report whether a session is saved
fn status_command() -> Result<()> {
    let config = load_config();
    let session = open_session(&config)?;
    println!("API: {}", config.api_base_url());
    if session.is_authenticated() {
        println!("Session: logged in");
    } else {
        println!("Session: not logged in");
    }
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key) {
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
