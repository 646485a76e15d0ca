// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Icebreaker proactive-conversation scheduler.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain records used throughout the Icebreaker workspace. Concrete host
//! integrations implement the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::IcebreakerError;
pub use types::{
    DecisionReason, InitiationDecision, MessageSnapshot, SelectedTopic, SkipReason, StreamTarget,
    TopicDraft, TopicRecord,
};

pub use traits::{ChatTransport, CompletionHost, HostAdapter, KvBackend};
