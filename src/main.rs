use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;

use quotedeck::api::ApiClient;
use quotedeck::app::{App, AppEvent};
use quotedeck::config::Config;
use quotedeck::session::Session;
use quotedeck::storage::{Database, DatabaseError};
use quotedeck::ui;

/// Get the config directory path (~/.config/quotedeck/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("quotedeck"))
}

#[derive(Parser, Debug)]
#[command(name = "quotedeck", about = "Terminal client for browsing and posting image quotes")]
struct Args {
    /// Config file (default: ~/.config/quotedeck/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Override the media upload URL
    #[arg(long, value_name = "URL")]
    media_url: Option<String>,

    /// Clear the saved session and exit
    #[arg(long)]
    logout: bool,

    /// Delete the session database and exit
    #[arg(long)]
    reset_session: bool,
}

/// Log to `quotedeck.log` in the config directory; the terminal belongs to the TUI.
fn init_logging(config_dir: &std::path::Path) -> Result<()> {
    let log_path = config_dir.join("quotedeck.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quotedeck=info")),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }

    // User-only access: the directory holds the session token.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) =
            std::fs::set_permissions(&config_dir, std::fs::Permissions::from_mode(0o700))
        {
            eprintln!("Warning: could not restrict {}: {e}", config_dir.display());
        }
    }

    init_logging(&config_dir)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    if let Some(url) = args.api_url {
        config.api_base_url = url;
    }
    if let Some(url) = args.media_url {
        config.media_upload_url = url;
    }

    let db_path = config_dir.join("session.db");

    if args.reset_session {
        if db_path.exists() {
            std::fs::remove_file(&db_path).context("Failed to delete session database")?;
        }
        // WAL sidecar files
        for suffix in ["-wal", "-shm"] {
            let _ = std::fs::remove_file(config_dir.join(format!("session.db{suffix}")));
        }
        println!("Session database reset.");
        return Ok(());
    }

    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of quotedeck appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to open session database: {}", e)),
    };

    let mut session = Session::restore(db).await?;

    if args.logout {
        session.logout().await?;
        println!("Logged out.");
        return Ok(());
    }

    let api = ApiClient::new(
        &config.api_base_url,
        &config.media_upload_url,
        config.request_timeout(),
    )
    .context("Invalid API configuration")?;

    tracing::info!(
        api = %config.api_base_url,
        authenticated = session.is_authenticated(),
        "Starting quotedeck"
    );

    let mut app = App::new(api, session, config);
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
