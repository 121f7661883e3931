//! Foreground daemon mode for continuous presence polling.
//!
//! Polls at the configured interval, logs result counts, and shuts down
//! cleanly on SIGINT/SIGTERM. Daemonization is left to systemd.

use anyhow::{Context, Result};
use eero_tracker_core::{TrackerConfig, MINIMUM_SCAN_INTERVAL_SECS};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How often the loop wakes up to check for shutdown between polls.
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(500);

pub fn run_daemon(config: &TrackerConfig, interval_override: Option<u64>) -> Result<()> {
    let interval = effective_interval(config, interval_override);

    let mut tracker = crate::build_tracker(config);

    // A missing session is a soft-disable for poll(), but a daemon that can
    // never produce results is a misconfiguration worth failing loudly on.
    if !tracker.has_session() {
        eprintln!("Error: not logged in.");
        eprintln!("Run 'eero-tracker login' first to create a session.");
        std::process::exit(1);
    }

    tracing::info!(
        "Starting daemon: polling every {} seconds",
        interval.as_secs()
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    let handler_flag = shutdown.clone();
    ctrlc::set_handler(move || {
        tracing::info!("Shutdown signal received");
        handler_flag.store(true, Ordering::SeqCst);
    })
    .context("Failed to register signal handler")?;

    // Initial poll immediately, then on the interval.
    let mut next_poll = Instant::now();

    while !shutdown.load(Ordering::Relaxed) {
        if Instant::now() >= next_poll {
            match tracker.poll() {
                Ok(result) => {
                    tracing::info!("Poll complete: {} devices present", result.macs.len());
                    for mac in &result.macs {
                        let name = result.names.get(mac).map(String::as_str).unwrap_or("-");
                        tracing::debug!("  {} {}", mac, name);
                    }
                }
                Err(e) => {
                    // Transient failures (network, server errors) should not
                    // kill the daemon; the next poll may succeed.
                    tracing::error!("Poll failed: {}", e);
                }
            }
            next_poll = Instant::now() + interval;
        }

        std::thread::sleep(SHUTDOWN_POLL_INTERVAL);
    }

    tracing::info!("Daemon stopped");
    Ok(())
}

/// Clamp a command-line interval override the same way the config loader
/// clamps the configured one.
fn effective_interval(config: &TrackerConfig, interval_override: Option<u64>) -> Duration {
    match interval_override {
        Some(secs) if secs < MINIMUM_SCAN_INTERVAL_SECS => {
            tracing::warn!(
                "Requested interval {}s is below the {}s minimum; clamping",
                secs,
                MINIMUM_SCAN_INTERVAL_SECS
            );
            Duration::from_secs(MINIMUM_SCAN_INTERVAL_SECS)
        }
        Some(secs) => Duration::from_secs(secs),
        None => config.scan_interval,
    }
}
