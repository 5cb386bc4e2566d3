mod app;
mod backend;
mod cli;
mod config;
mod dev_backend;
mod runtime;
mod terminal_view;
mod text_input;
mod ui;

use anyhow::{Context, Result};
use app::App;
use backend::Backend;
use clap::Parser;
use cli::{Cli, Commands};
use config::ReportTuiConfig;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dev_backend::DevBackend;
use incident_report::{HttpTransport, PageSettings, ReportsURL};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Mutex;
use tracing_subscriber::{fmt::time::LocalTime, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "report_tui=info,incident_report=info";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::from_filename(".env.tui").ok();

    let cli = Cli::parse();
    match cli.command {
        Commands::ConfigPath => {
            let path = ReportTuiConfig::config_path()?;
            if !path.exists() {
                ReportTuiConfig::default().save()?;
                println!("Created default config at {}", path.display());
            } else {
                println!("{}", path.display());
            }
            Ok(())
        }
        Commands::Run { number } => {
            let config = ReportTuiConfig::load()?;
            init_logging()?;

            let mut transport = HttpTransport::new(config.request_timeout())?;
            if let Some(token) = &config.auth_token {
                transport = transport.with_auth_token(token);
            }

            let settings = PageSettings {
                reports_url: ReportsURL::new(&config.api_url),
                initial_number: number,
                editing_allowed: config.editing_allowed,
            };
            tracing::info!("Opening incident reports at {}", settings.reports_url);
            run_tui(App::new(Backend::Http(transport), settings)).await
        }
        Commands::Dev { number } => {
            let config = ReportTuiConfig::load()?;
            init_logging()?;

            let dev = DevBackend::new(&config.author);
            let settings = PageSettings {
                reports_url: dev.reports_url().clone(),
                initial_number: number,
                editing_allowed: config.editing_allowed,
            };
            tracing::info!("Running against the in-memory dev backend");
            run_tui(App::new(Backend::Dev(dev), settings)).await
        }
    }
}

/// Log to a file next to the config; the terminal belongs to the UI.
fn init_logging() -> Result<()> {
    let path = ReportTuiConfig::log_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file at {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(LocalTime::rfc_3339())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();

    Ok(())
}

async fn run_tui(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = runtime::run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        tracing::error!("Terminal UI stopped: {:?}", err);
        eprintln!("Error: {:?}", err);
    }

    res
}
