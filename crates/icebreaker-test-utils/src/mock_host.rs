// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock language-model host for deterministic testing.
//!
//! `MockCompletionHost` implements `CompletionHost` with pre-configured
//! responses, enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use icebreaker_core::traits::adapter::HostAdapter;
use icebreaker_core::traits::provider::CompletionHost;
use icebreaker_core::IcebreakerError;

/// A mock language-model host that returns pre-configured completions.
///
/// Completions are popped from a FIFO queue; an empty queue yields an empty
/// string, which callers treat as an unusable response. The provider id
/// returned by `current_provider_id()` defaults to none (empty), so tests
/// exercising the language-model path must set one.
pub struct MockCompletionHost {
    responses: Arc<Mutex<VecDeque<String>>>,
    provider_id: Arc<Mutex<String>>,
    prompts: Arc<Mutex<Vec<String>>>,
    fail_completions: AtomicBool,
}

impl MockCompletionHost {
    /// Create a new mock host with no provider and an empty response queue.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            provider_id: Arc::new(Mutex::new(String::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            fail_completions: AtomicBool::new(false),
        }
    }

    /// Create a mock host pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            ..Self::new()
        }
    }

    /// Set the provider id returned by `current_provider_id()`.
    pub async fn set_provider_id(&self, id: &str) {
        *self.provider_id.lock().await = id.to_string();
    }

    /// Add a completion to the end of the queue.
    pub async fn add_response(&self, text: String) {
        self.responses.lock().await.push_back(text);
    }

    /// Make every subsequent `complete()` call fail with a provider error.
    pub fn fail_completions(&self, fail: bool) {
        self.fail_completions.store(fail, Ordering::SeqCst);
    }

    /// Get all prompts passed to `complete()`.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

impl Default for MockCompletionHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostAdapter for MockCompletionHost {
    fn name(&self) -> &str {
        "mock-completion-host"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }
}

#[async_trait]
impl CompletionHost for MockCompletionHost {
    async fn current_provider_id(&self, _origin: &str) -> Result<String, IcebreakerError> {
        Ok(self.provider_id.lock().await.clone())
    }

    async fn complete(&self, provider_id: &str, prompt: &str) -> Result<String, IcebreakerError> {
        if self.fail_completions.load(Ordering::SeqCst) {
            return Err(IcebreakerError::Provider {
                message: format!("mock completion failure for provider {provider_id}"),
                source: None,
            });
        }

        self.prompts.lock().await.push(prompt.to_string());
        Ok(self.responses.lock().await.pop_front().unwrap_or_default())
    }
}
