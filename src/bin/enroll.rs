use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use sgee_enroll::api::session::{self, SessionToken};
use sgee_enroll::api::create_api;
use sgee_enroll::error::{AppError, Result};
use sgee_enroll::event::{Event, EventHandler};
use sgee_enroll::wizard::{WizardAction, WizardApp, WizardConfig};
use std::io::stdout;
use std::panic;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sgee-enroll")]
#[command(author, version, about = "Enrollment wizard for SGEE entrance-exam candidates")]
struct Args {
    /// Path to config file (default: $XDG_CONFIG_HOME/sgee/enroll.toml)
    #[arg(long)]
    config: Option<String>,

    /// Use built-in demo data instead of the backend
    #[arg(long)]
    dryrun: bool,

    /// Backend base URL, overrides the config file
    #[arg(long, env = "SGEE_API_URL")]
    api_url: Option<String>,

    /// Session token file (default: $XDG_DATA_HOME/sgee/session-token)
    #[arg(long)]
    token_file: Option<PathBuf>,

    /// Store this session token before starting
    #[arg(long, env = "SGEE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Log file path (logging disabled if not specified)
    #[arg(long)]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging only if log file is specified
    if let Some(ref log_path) = args.log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .ok();

        if let Some(file) = file {
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"));

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file)
                .with_ansi(false)
                .init();

            info!("Starting sgee-enroll");
        }
    }

    let config = load_config(&args)?;
    let app = build_app(&args, config)?;

    // Set up panic handler to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let result = run_wizard(&mut terminal, app).await;
    restore_terminal()?;

    if let Err(ref e) = result {
        error!("Wizard error: {}", e);
    }

    result
}

/// Config from the given path, the default path, or defaults; flags override it.
fn load_config(args: &Args) -> Result<WizardConfig> {
    let mut config = match args.config.as_deref() {
        Some(path) => WizardConfig::load_from(path)?,
        None => WizardConfig::load().unwrap_or_else(|e| {
            warn!("Ignoring unreadable config: {}", e);
            WizardConfig::default()
        }),
    };

    if args.dryrun {
        config.general.dryrun = true;
    }
    if let Some(ref url) = args.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(ref path) = args.token_file {
        config.api.token_file = Some(path.clone());
    }
    Ok(config)
}

fn build_app(args: &Args, config: WizardConfig) -> Result<(WizardApp, EventHandler)> {
    let token_path = config
        .api
        .token_file
        .clone()
        .or_else(session::default_token_path);

    let token = match (&args.token, &token_path) {
        (Some(raw), Some(path)) => {
            let token = SessionToken::new(raw.trim());
            session::save_token(path, &token)?;
            info!("Saved session token to {:?}", path);
            Some(token)
        }
        (Some(raw), None) => Some(SessionToken::new(raw.trim())),
        (None, Some(path)) => session::load_token(path)?,
        (None, None) => None,
    };

    if token.is_none() && !config.general.dryrun {
        warn!("No session token; the backend will reject the submission");
    }

    let api = create_api(config.general.dryrun, &config.api.base_url, token)?;

    let events = EventHandler::new(Duration::from_millis(250));
    let app = WizardApp::new(config, api, events.wizard_sender());
    Ok((app, events))
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode().map_err(|e| AppError::Terminal(e.to_string()))?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen).map_err(|e| AppError::Terminal(e.to_string()))?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).map_err(|e| AppError::Terminal(e.to_string()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode().map_err(|e| AppError::Terminal(e.to_string()))?;
    execute!(stdout(), LeaveAlternateScreen).map_err(|e| AppError::Terminal(e.to_string()))?;
    Ok(())
}

async fn run_wizard(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    (mut app, mut events): (WizardApp, EventHandler),
) -> Result<()> {
    app.start_reference_fetches();

    loop {
        terminal
            .draw(|frame| sgee_enroll::wizard::ui::draw(frame, &app))
            .map_err(|e| AppError::Terminal(e.to_string()))?;

        if let Some(event) = events.next().await {
            match event {
                Event::Key(key) => {
                    if let Some(action) = app.handle_key(key) {
                        match action {
                            WizardAction::Submit => app.start_submission(),
                            WizardAction::RetryOptions => {
                                app.set_info("Reloading lists...".to_string());
                                app.start_reference_fetches();
                            }
                        }
                    }
                }
                Event::Wizard(msg) => app.handle_wizard_message(msg),
                Event::Resize => {}
                Event::Tick => app.tick(),
            }
        }

        if app.should_exit {
            break;
        }
    }

    Ok(())
}
