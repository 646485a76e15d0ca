// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Language-model completion trait backed by the host runtime.

use async_trait::async_trait;

use crate::error::IcebreakerError;
use crate::traits::adapter::HostAdapter;

/// Host-side language-model access.
///
/// Provider lookup and completion are both fallible; the scheduler treats a
/// failed lookup as "no provider" and a failed completion as a signal to use
/// the deterministic fallback content. Neither error propagates out of a tick.
#[async_trait]
pub trait CompletionHost: HostAdapter {
    /// Resolve the id of the provider currently bound to `origin`.
    async fn current_provider_id(&self, origin: &str) -> Result<String, IcebreakerError>;

    /// Request a completion from `provider_id` for `prompt`.
    async fn complete(&self, provider_id: &str, prompt: &str) -> Result<String, IcebreakerError>;
}
