// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Icebreaker scheduler.

use thiserror::Error;

/// The primary error type used across all Icebreaker traits and operations.
#[derive(Debug, Error)]
pub enum IcebreakerError {
    /// Configuration errors (unreadable file, invalid TOML shape).
    #[error("configuration error: {0}")]
    Config(String),

    /// Key-value backend errors (connection failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Outbound message transport errors (send failure, rate limiting).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Language-model completion errors (API failure, model not found).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IcebreakerError {
    /// Wrap an arbitrary error as a storage error.
    pub fn storage<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Storage {
            source: source.into(),
        }
    }
}
