//! eero tracker CLI - headless presence polling agent for eero networks
//!
//! This binary provides a minimal footprint agent that can:
//! - Log in to the eero cloud (email/SMS verification flow)
//! - Run a one-shot presence scan
//! - Poll continuously as a foreground daemon (for systemd integration)

mod daemon;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use eero_tracker_core::{
    ApiClient, DeviceTracker, FileSessionStore, SessionManager, TrackerConfig,
};
use std::io::Write;

#[derive(Parser)]
#[command(name = "eero-tracker")]
#[command(version)]
#[command(about = "Presence polling agent for eero networks")]
#[command(long_about = "
eero-tracker reports which devices are currently connected to the eero
networks on your account. It polls the eero cloud API; nothing runs on the
routers themselves.

Quick start:
  1. Log in:        eero-tracker login
  2. Run a scan:    eero-tracker scan
  3. Start daemon:  eero-tracker daemon

For systemd integration, see: eero-tracker daemon --help
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in to the eero cloud (sends a verification code by email or SMS)
    #[command(alias = "connect")]
    Login {
        /// Your eero login (email address or SMS phone number)
        #[arg(short, long)]
        identifier: Option<String>,
    },

    /// Run one poll and print the devices currently present
    Scan,

    /// Show session status and configuration paths
    Status,

    /// Remove the stored session token
    #[command(alias = "disconnect")]
    Logout,

    /// Poll continuously at the configured interval
    Daemon {
        /// Seconds between polls (clamped to the 25s minimum)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Show configuration paths and settings
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "eero_tracker={},eero_tracker_core={}",
                    log_level, log_level
                )
                .into()
            }),
        )
        .with_target(false)
        .init();

    let config = eero_tracker_core::load_config().context("Failed to load configuration")?;

    match cli.command {
        Commands::Login { ref identifier } => cmd_login(&cli, &config, identifier.clone()),
        Commands::Scan => cmd_scan(&cli, &config),
        Commands::Status => cmd_status(&cli, &config),
        Commands::Logout => cmd_logout(&cli, &config),
        Commands::Daemon { interval } => daemon::run_daemon(&config, interval),
        Commands::Config => cmd_config(&cli, &config),
    }
}

/// Session manager over the configured session file and API endpoint.
fn build_session(config: &TrackerConfig) -> SessionManager<FileSessionStore> {
    SessionManager::new(
        FileSessionStore::new(&config.session_file),
        ApiClient::new(&config.api_url),
    )
}

pub(crate) fn build_tracker(config: &TrackerConfig) -> DeviceTracker<SessionManager<FileSessionStore>> {
    DeviceTracker::new(build_session(config), config.filters())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line.trim().to_string())
}

fn cmd_login(cli: &Cli, config: &TrackerConfig, identifier: Option<String>) -> Result<()> {
    let mut session = build_session(config);

    if session.current_token().is_some() {
        match cli.format {
            OutputFormat::Text => {
                println!("Already logged in (session file: {}).", config.session_file.display());
                println!("Use 'eero-tracker logout' to sign out first.");
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "status": "already_logged_in",
                        "session_file": config.session_file,
                    })
                );
            }
        }
        return Ok(());
    }

    let identifier = match identifier {
        Some(id) => id,
        None => prompt("Your eero login (email address or SMS phone number)")?,
    };

    let user_token = session
        .login(&identifier)
        .context("Login request rejected")?;

    let code = prompt("Verification key from email or SMS")?;
    session
        .verify(&user_token, &code)
        .context("Verification failed")?;

    match cli.format {
        OutputFormat::Text => {
            println!();
            println!(
                "Login successful. Session saved to {}; you can now run 'eero-tracker scan'.",
                config.session_file.display()
            );
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "status": "logged_in",
                    "session_file": config.session_file,
                })
            );
        }
    }

    Ok(())
}

fn cmd_scan(cli: &Cli, config: &TrackerConfig) -> Result<()> {
    let mut tracker = build_tracker(config);

    match cli.format {
        OutputFormat::Text => println!("Polling eero cloud..."),
        OutputFormat::Json => {}
    }

    let result = tracker.poll().context("Poll failed")?;

    match cli.format {
        OutputFormat::Text => {
            println!();
            println!("Found {} connected devices:", result.macs.len());
            println!();
            for mac in &result.macs {
                let name = result.names.get(mac).map(String::as_str).unwrap_or("-");
                println!("  {:17}  {}", mac, name);
            }
            if result.is_empty() {
                println!("  (none)");
                println!();
                println!("If you have not logged in yet, run 'eero-tracker login' first.");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(&result)?);
        }
    }

    Ok(())
}

fn cmd_status(cli: &Cli, config: &TrackerConfig) -> Result<()> {
    let session = build_session(config);
    let authenticated = session.current_token().is_some();

    match cli.format {
        OutputFormat::Text => {
            if authenticated {
                println!("Status: Logged in");
            } else {
                println!("Status: Not logged in");
                println!();
                println!("Run 'eero-tracker login' to authenticate.");
            }
            println!();
            println!("Session file: {}", config.session_file.display());
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "authenticated": authenticated,
                    "session_file": config.session_file,
                })
            );
        }
    }

    Ok(())
}

fn cmd_logout(cli: &Cli, config: &TrackerConfig) -> Result<()> {
    let existed = config.session_file.exists();
    if existed {
        std::fs::remove_file(&config.session_file).with_context(|| {
            format!("Failed to remove session file {}", config.session_file.display())
        })?;
    }

    match cli.format {
        OutputFormat::Text => {
            if existed {
                println!("Logged out; session file removed.");
            } else {
                println!("Not logged in.");
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "status": if existed { "logged_out" } else { "not_logged_in" },
                })
            );
        }
    }

    Ok(())
}

fn cmd_config(cli: &Cli, config: &TrackerConfig) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            println!("Configuration");
            println!("=============");
            println!();
            println!("Config file:    {}", eero_tracker_core::config_file_path_string());
            println!("API endpoint:   {} (from {})", config.api_url, config.api_source);
            println!("Session file:   {}", config.session_file.display());
            println!("Scan interval:  {}s", config.scan_interval.as_secs());
            println!("Only wireless:  {}", config.only_wireless);
            if !config.only_macs.is_empty() {
                println!("Only MACs:      {}", config.only_macs);
            }
            if !config.only_networks.is_empty() {
                println!("Only networks:  {:?}", config.only_networks);
            }
            println!();
            println!("Environment variables:");
            println!("  EERO_TRACKER_API_URL - Override API endpoint");
            println!();
            println!("Example config.toml:");
            println!();
            println!("{}", eero_tracker_core::generate_example_config());
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "config_file": eero_tracker_core::config_file_path_string(),
                    "api_url": config.api_url,
                    "api_source": format!("{}", config.api_source),
                    "session_file": config.session_file,
                    "scan_interval_secs": config.scan_interval.as_secs(),
                    "only_wireless": config.only_wireless,
                    "only_macs": config.only_macs,
                    "only_networks": config.only_networks,
                })
            );
        }
    }

    Ok(())
}
