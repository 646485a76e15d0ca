// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `icebreaker serve` command implementation.
//!
//! Starts the scheduler loop against SQLite persistence. The standalone
//! runner has no chat platform attached, so outbound messages go to a
//! logging transport and content always uses the deterministic fallback
//! path; a host bot runtime replaces both adapters with real ones.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use icebreaker_core::{ChatTransport, CompletionHost, HostAdapter, IcebreakerError};
use icebreaker_engine::{install_signal_handler, ConfigSource, Scheduler};
use icebreaker_store::{SqliteKv, TopicStore};
use serde_json::Value;
use tracing::info;

/// Transport that logs outbound messages instead of delivering them.
struct LogTransport;

impl HostAdapter for LogTransport {
    fn name(&self) -> &str {
        "log-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }
}

#[async_trait]
impl ChatTransport for LogTransport {
    async fn send_text(&self, origin: &str, text: &str) -> Result<(), IcebreakerError> {
        info!(origin, %text, "outbound message");
        Ok(())
    }
}

/// Completion host that never resolves a provider, forcing fallback content.
struct NullCompletionHost;

impl HostAdapter for NullCompletionHost {
    fn name(&self) -> &str {
        "null-completion-host"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }
}

#[async_trait]
impl CompletionHost for NullCompletionHost {
    async fn current_provider_id(&self, _origin: &str) -> Result<String, IcebreakerError> {
        Ok(String::new())
    }

    async fn complete(&self, _provider_id: &str, _prompt: &str) -> Result<String, IcebreakerError> {
        Err(IcebreakerError::Provider {
            message: "no completion provider in standalone mode".to_string(),
            source: None,
        })
    }
}

/// Runs the scheduler until SIGTERM or SIGINT.
pub async fn run_serve(raw: Value, db: Option<PathBuf>) -> Result<(), IcebreakerError> {
    init_tracing("info");

    let db_path = match db {
        Some(path) => path,
        None => default_db_path()?,
    };
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(IcebreakerError::storage)?;
    }

    let db_str = db_path.to_string_lossy().into_owned();
    info!(db = %db_str, "opening topic store");
    let kv = Arc::new(SqliteKv::open(&db_str).await?);
    let store = Arc::new(TopicStore::new(kv));

    let shutdown = install_signal_handler();
    let scheduler = Arc::new(Scheduler::new(
        store,
        Arc::new(LogTransport),
        Arc::new(NullCompletionHost),
        Arc::new(ConfigSource::new(raw)),
        shutdown.clone(),
    ));

    let settings = scheduler.settings();
    info!(
        enabled = settings.enabled,
        tick_interval = settings.tick_interval_seconds,
        "icebreaker scheduler starting"
    );

    let loop_handle = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run().await })
    };

    shutdown.cancelled().await;
    loop_handle
        .await
        .map_err(|err| IcebreakerError::Internal(format!("scheduler task panicked: {err}")))?;

    info!("icebreaker stopped");
    Ok(())
}

fn default_db_path() -> Result<PathBuf, IcebreakerError> {
    dirs::data_dir()
        .map(|dir| dir.join("icebreaker/icebreaker.db"))
        .ok_or_else(|| IcebreakerError::Config("no user data directory available".to_string()))
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("icebreaker={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
