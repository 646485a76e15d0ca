// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduling and decision engine for the Icebreaker proactive-topic bot.
//!
//! The [`Scheduler`] is the central coordinator that:
//! - Runs a periodic tick over every bound conversation
//! - Gates each stream through the ordered decision chain
//! - Selects a topic by priority- and staleness-weighted draw
//! - Renders content via a language model or deterministic fallback
//! - Persists send state and exposes per-stream skip reasons
//!
//! [`CommandHandler`] provides the admin command surface on top of the same
//! store and scheduler.

pub mod commands;
pub mod decision;
pub mod render;
pub mod scheduler;
pub mod selection;
pub mod shutdown;

pub use commands::{format_elapsed, parse_topic_payload, CommandHandler, MessageMeta};
pub use decision::should_initiate;
pub use scheduler::{
    ConfigSource, Scheduler, SettingsSource, TickReport, DEFAULT_FALLBACK_TOPICS,
};
pub use selection::pick_topic;
pub use shutdown::install_signal_handler;
