//! Headless failboard runner.
//!
//! Usage: `failboard-watch [CONFIG]`. Without an argument the config is read
//! from `<config dir>/failboard/config.json`. Every notification the board
//! emits is written to the log; Ctrl-C stops the poller and exits.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use failboard::broadcast::{Notification, NotificationKind, Notifier};
use failboard::config::{default_config_path, load_config, resolve_api_key};
use failboard::{telemetry, CollectorClient, ConfigError, DashboardState, FailboardError, Poller};

fn config_path() -> Result<PathBuf, ConfigError> {
    match std::env::args_os().nth(1) {
        Some(arg) => Ok(PathBuf::from(arg)),
        None => default_config_path().ok_or(ConfigError::NoDefaultPath),
    }
}

fn log_notification(notification: &Notification) {
    match notification.kind {
        NotificationKind::PollError => log::warn!(
            "[{}] {}: {}",
            notification.kind,
            notification.subject,
            notification.detail
        ),
        _ => log::info!(
            "[{}] {}: {}",
            notification.kind,
            notification.subject,
            notification.detail
        ),
    }
}

fn run() -> failboard::Result<()> {
    let path = config_path()?;
    let config = load_config(&path)?;

    telemetry::init_from_config(&config.logging);
    log::info!("Loaded config from {}", path.display());

    let api_key = resolve_api_key(&config)?;
    let client = CollectorClient::new(
        &config.collector.endpoint,
        api_key,
        config.collector.client_options(),
    )?;

    let notifier = Notifier::new(config.notification_capacity);
    let mut notifications = notifier.subscribe();
    let state = Arc::new(Mutex::new(DashboardState::new(
        &config.operator,
        config.snapshot_policy,
        notifier,
    )));

    let poller = Arc::new(Poller::new(
        Arc::new(client),
        Arc::clone(&state),
        config.poll_interval(),
    ));

    let (trigger_tx, trigger_rx) = broadcast::channel::<()>(4);
    let (stop_tx, mut stop_rx) = broadcast::channel::<()>(1);
    let handle = poller.start(trigger_rx).map_err(FailboardError::Spawn)?;

    {
        let poller = Arc::clone(&poller);
        if let Err(e) = ctrlc::set_handler(move || {
            log::info!("Interrupt received, shutting down");
            poller.stop();
            // Wake the poller out of its interval wait
            let _ = trigger_tx.send(());
            let _ = stop_tx.send(());
        }) {
            log::warn!("Failed to install Ctrl-C handler: {}", e);
        }
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(FailboardError::Spawn)?;

    log::info!(
        "Watching failed jobs as '{}' every {}s",
        config.operator,
        config.poll_interval_secs
    );

    runtime.block_on(async {
        loop {
            tokio::select! {
                received = notifications.recv() => match received {
                    Ok(notification) => log_notification(&notification),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log::warn!("Dropped {} notification(s), consumer too slow", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = stop_rx.recv() => break,
            }
        }
    });

    if handle.join().is_err() {
        log::error!("Poller thread panicked");
    }

    let stats = failboard::poller::lock_state(&state).stats();
    log::info!(
        "Final counts: {} job(s), {} open, {} being checked, {} fixed",
        stats.total,
        stats.open,
        stats.being_checked,
        stats.fixed
    );

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Logging may not be initialized yet if the config failed to load
            eprintln!("failboard-watch: {}", e);
            ExitCode::FAILURE
        }
    }
}
