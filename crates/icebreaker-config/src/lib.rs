// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Icebreaker scheduler.
//!
//! Resolution is total: whatever shape the raw mapping has, a fully
//! defaulted, range-clamped [`PluginSettings`] comes back. See
//! [`PluginSettings::resolve`].

pub mod loader;
pub mod model;
mod resolve;

pub use loader::{load_raw, load_raw_from_path, load_raw_from_str, load_settings};
pub use model::{GroupFilterMode, PluginSettings, QuietHours};
