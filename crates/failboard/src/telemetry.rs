//! Process-wide logging setup.
//!
//! Library code logs through the `log` macros and a few `tracing` spans.
//! [`init_logging`] installs a `tracing-subscriber` registry and bridges
//! `log` records into it.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

static INITIALIZED: AtomicBool = AtomicBool::new(false);

fn build_env_filter(filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber.
///
/// `RUST_LOG` overrides `filter`. Returns `false` if logging was already
/// initialized, by this function or by someone else.
pub fn init_logging(filter: &str, json: bool) -> bool {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return false;
    }

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_names(true)
            .with_span_list(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .boxed()
    };

    let subscriber = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(build_env_filter(filter));

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return false;
    }

    // Bridge `log` records into tracing; ok() in case a logger is already set
    tracing_log::LogTracer::init().ok();

    log::debug!("Logging initialized: filter={}, json={}", filter, json);
    true
}

pub fn init_from_config(config: &LoggingConfig) -> bool {
    init_logging(&config.filter, config.json)
}
