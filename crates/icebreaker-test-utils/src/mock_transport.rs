// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat transport for deterministic testing.
//!
//! `MockTransport` implements `ChatTransport`, capturing every outbound
//! message for assertion and optionally failing sends on demand.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use icebreaker_core::traits::adapter::HostAdapter;
use icebreaker_core::traits::transport::ChatTransport;
use icebreaker_core::IcebreakerError;

/// A mock messaging transport for testing.
///
/// Messages passed to `send_text()` are captured as `(origin, text)` pairs
/// and retrievable via `sent_messages()`. When the failure switch is on,
/// every send returns a transport error instead.
pub struct MockTransport {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    fail_sends: AtomicBool,
}

impl MockTransport {
    /// Create a new mock transport with an empty capture buffer.
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail_sends: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `send_text()` fail with a transport error.
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Get all `(origin, text)` pairs that were sent.
    pub async fn sent_messages(&self) -> Vec<(String, String)> {
        self.sent.lock().await.clone()
    }

    /// Get the count of sent messages.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Clear all captured messages.
    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HostAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn send_text(&self, origin: &str, text: &str) -> Result<(), IcebreakerError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(IcebreakerError::Transport {
                message: format!("mock send failure for {origin}"),
                source: None,
            });
        }

        self.sent
            .lock()
            .await
            .push((origin.to_string(), text.to_string()));
        Ok(())
    }
}
