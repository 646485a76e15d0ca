// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value backend trait for the host's persistence store.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::IcebreakerError;

/// Minimal contract over the host's key-value store.
///
/// Documents are self-contained JSON values keyed by fixed string names.
/// Implementations must treat a missing key as `Ok(None)`, never as an
/// error; callers substitute their own empty defaults.
#[async_trait]
pub trait KvBackend: Send + Sync + 'static {
    /// Fetch the document stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Value>, IcebreakerError>;

    /// Store `value` under `key`, replacing any previous document.
    async fn put(&self, key: &str, value: Value) -> Result<(), IcebreakerError>;

    /// Remove the document stored under `key`. Removing a missing key is not
    /// an error.
    async fn delete(&self, key: &str) -> Result<(), IcebreakerError>;
}
