// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signal-driven shutdown for the scheduler loop.
//!
//! SIGINT (Ctrl+C) and SIGTERM both cancel a shared [`CancellationToken`].
//! The loop only checks the token between ticks, so a tick that is already
//! evaluating streams runs to completion before the process exits.

use tokio_util::sync::CancellationToken;
use tracing::info;

/// Spawn a background task that waits for SIGINT or SIGTERM and returns the
/// token it will cancel.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let signal_token = token.clone();

    tokio::spawn(async move {
        wait_for_signal().await;
        signal_token.cancel();
    });

    token
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("received SIGINT, stopping scheduler");
        }
        _ = sigterm.recv() => {
            info!("received SIGTERM, stopping scheduler");
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("received Ctrl+C, stopping scheduler");
}
