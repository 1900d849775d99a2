mod cli;
mod tui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{io, sync::Arc, time::Duration};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use personabot::{
    api::{Catalog, HttpCatalogSource},
    app::{AppConfig, AppState},
    platform::AppPaths,
};
use tui::{App, Event, EventHandler};

const TICK_RATE: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or_default();

    let paths = AppPaths::new()?;
    paths.ensure_dirs_exist()?;

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(&paths).await?,
    };
    if let Some(api_url) = cli.api_url {
        config.api.base_url = api_url;
    }
    if let Some(delay) = cli.reply_delay_ms {
        config.simulator.reply_delay_ms = delay;
    }
    if let Commands::Chat { no_tutorial: true, .. } = command {
        config.ui.show_tutorial_on_start = false;
    }
    config.validate()?;

    let interactive = matches!(command, Commands::Chat { .. });
    let _guard = init_logging(&config, &paths, interactive, cli.debug);
    info!("Starting PersonaBot {}", env!("CARGO_PKG_VERSION"));

    let source = HttpCatalogSource::new(
        config.api_base_url()?,
        Duration::from_secs(config.api.timeout_seconds),
    )?;
    let mut app_state = AppState::new(config, paths, &source).await?;
    if let Some(path) = cli.config {
        app_state = app_state.with_config_file(path);
    }
    let app_state = Arc::new(app_state);

    match command {
        Commands::Chat { specialist, .. } => run_tui(app_state, specialist).await,
        Commands::Specialists { json } => print_specialists(&app_state.catalog(), json),
        Commands::Settings { json } => print_settings(&app_state.catalog(), json),
    }
}

/// The TUI owns the terminal, so its logs go to a daily file (or nowhere).
/// Other commands log to stderr.
fn init_logging(
    config: &AppConfig,
    paths: &AppPaths,
    interactive: bool,
    debug: bool,
) -> Option<WorkerGuard> {
    let level = if debug { "debug" } else { config.logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("personabot={}", level)));

    if !interactive {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
        return None;
    }

    if !config.logging.file_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::sink)
            .init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(paths.logs_dir(), "personabot.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

async fn run_tui(app_state: Arc<AppState>, specialists: Vec<String>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = run_app(&mut terminal, app_state, specialists).await;

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("PersonaBot exited");
    result
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: Arc<AppState>,
    specialists: Vec<String>,
) -> Result<()> {
    let mut events = EventHandler::new(TICK_RATE);
    let mut app = App::new(app_state, events.sender());

    let unknown = app.preselect(&specialists);
    if !unknown.is_empty() {
        warn!("Unknown specialist ids: {}", unknown.join(", "));
        let _ = events.sender().send(Event::StatusUpdate(format!(
            "Unknown specialist: {}",
            unknown.join(", ")
        )));
    }

    loop {
        terminal.draw(|frame| app.render(frame))?;

        if let Some(event) = events.next().await {
            app.handle_event(event).await;
        }

        if app.should_quit() {
            break;
        }
    }

    info!(
        "Closing after {} ended consultation(s)",
        app.consultation().history().len()
    );
    Ok(())
}

fn print_specialists(catalog: &Catalog, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&catalog.specialists)?);
        return Ok(());
    }

    println!("Specialists ({} data)", catalog.specialists_source);
    for specialist in &catalog.specialists {
        println!(
            "  {:<8} {:<24} {}",
            specialist.id, specialist.full_name, specialist.specialty
        );
    }
    Ok(())
}

fn print_settings(catalog: &Catalog, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&catalog.settings)?);
        return Ok(());
    }

    println!("Persona settings ({} data)", catalog.settings_source);
    for definition in &catalog.settings.behavioral_settings {
        let kind = if definition.multi { " [multi]" } else { "" };
        println!(
            "  {} ({}){}: {}",
            definition.category,
            definition.id,
            kind,
            definition.values.join(", ")
        );
    }
    Ok(())
}
