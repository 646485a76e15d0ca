// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain records and decision types shared across the Icebreaker workspace.
//!
//! Records are stored inside KV documents as JSON; every field carries
//! `#[serde(default)]` so a malformed or partially written document degrades
//! to safe defaults instead of failing deserialization.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Draft for a new topic, before the store assigns an id.
#[derive(Debug, Clone)]
pub struct TopicDraft {
    pub title: String,
    pub description: String,
    pub priority: u32,
    pub enabled: bool,
}

impl TopicDraft {
    /// Create a draft with default priority 1, enabled.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            priority: 1,
            enabled: true,
        }
    }
}

/// A persisted candidate subject the bot may raise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicRecord {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_priority")]
    pub priority: u32,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub use_count: u64,
    /// Epoch seconds; 0.0 means never used.
    #[serde(default)]
    pub last_used_at: f64,
    #[serde(default)]
    pub created_at: f64,
    #[serde(default)]
    pub updated_at: f64,
}

/// A bound conversation endpoint the bot may proactively message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamTarget {
    #[serde(default)]
    pub unified_msg_origin: String,
    #[serde(default)]
    pub session_name: String,
    #[serde(default = "default_platform")]
    pub platform: String,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub last_user_message_ts: f64,
    #[serde(default)]
    pub last_bot_initiate_ts: f64,
    #[serde(default)]
    pub created_at: f64,
    #[serde(default)]
    pub updated_at: f64,
}

/// One observed user message, scoped to a stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSnapshot {
    #[serde(default)]
    pub unified_msg_origin: String,
    #[serde(default = "default_unknown")]
    pub sender_id: String,
    #[serde(default = "default_unknown")]
    pub sender_name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: f64,
}

fn default_priority() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_platform() -> String {
    "unknown".to_string()
}

fn default_unknown() -> String {
    "unknown".to_string()
}

/// Reason codes produced by the decision engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum DecisionReason {
    /// Plugin-wide enabled flag is off.
    PluginDisabled,
    /// The stream is not active.
    StreamInactive,
    /// Quiet hours are currently in effect.
    QuietHours,
    /// Forced initiation bypassed the soft gates.
    Force,
    /// Too soon since the last proactive send.
    Cooldown,
    /// The conversation has not been quiet long enough.
    ConversationActive,
    /// The probabilistic trigger did not fire this tick.
    RandomGate,
    /// All gates passed.
    Ready,
}

/// Result of evaluating one stream against the initiation gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitiationDecision {
    pub should_send: bool,
    pub reason: DecisionReason,
}

impl InitiationDecision {
    pub fn go(reason: DecisionReason) -> Self {
        Self {
            should_send: true,
            reason,
        }
    }

    pub fn hold(reason: DecisionReason) -> Self {
        Self {
            should_send: false,
            reason,
        }
    }
}

/// Per-stream skip classes recorded by the orchestrator after a positive
/// decision (selection, rendering, or transport failed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    /// Neither persisted topics nor fallback lines yielded a candidate.
    NoTopic,
    /// Rendering produced no content after truncation.
    EmptyContent,
    /// The transport rejected the outbound message.
    SendFailed,
    /// Unexpected error while processing this stream.
    InternalError,
}

/// Topic chosen for one proactive send.
///
/// `topic_id` is `None` when the topic came from the configured fallback
/// lines, in which case no usage bookkeeping applies.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedTopic {
    pub topic_id: Option<u64>,
    pub title: String,
    pub description: String,
}
