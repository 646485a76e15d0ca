// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settings model for the Icebreaker scheduler.
//!
//! [`PluginSettings`] is a validated snapshot re-derived from the host's raw
//! configuration mapping on every read; it carries no persisted identity.

use chrono::{Local, TimeZone, Timelike};
use strum::{Display, EnumString};

/// A configured time-of-day window during which proactive sends are
/// suppressed.
///
/// Start and end are minutes since local midnight. A window whose start is
/// greater than its end wraps past midnight; start == end means the window
/// covers the whole day when enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuietHours {
    pub enabled: bool,
    pub start_minutes: u32,
    pub end_minutes: u32,
}

impl Default for QuietHours {
    fn default() -> Self {
        Self {
            enabled: false,
            start_minutes: 23 * 60,
            end_minutes: 8 * 60,
        }
    }
}

impl QuietHours {
    /// Whether the window is active at the given minute of the local day.
    pub fn is_active_at(&self, minute_of_day: u32) -> bool {
        if !self.enabled {
            return false;
        }

        if self.start_minutes == self.end_minutes {
            return true;
        }

        if self.start_minutes < self.end_minutes {
            return self.start_minutes <= minute_of_day && minute_of_day < self.end_minutes;
        }

        minute_of_day >= self.start_minutes || minute_of_day < self.end_minutes
    }

    /// Whether the window is active at the given epoch-second instant,
    /// evaluated in the local timezone.
    pub fn is_active_epoch(&self, now: f64) -> bool {
        let moment = match Local.timestamp_opt(now as i64, 0) {
            chrono::LocalResult::Single(dt) => dt,
            chrono::LocalResult::Ambiguous(dt, _) => dt,
            chrono::LocalResult::None => return false,
        };
        self.is_active_at(moment.hour() * 60 + moment.minute())
    }
}

/// Group filter mode declared by one configuration variant.
///
/// Parsed and carried but not enforced by any live control path; unknown
/// values degrade to [`GroupFilterMode::None`] (allow all).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum GroupFilterMode {
    #[default]
    None,
    Whitelist,
    Blacklist,
}

/// Fully-defaulted, range-clamped settings snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginSettings {
    pub enabled: bool,
    pub tick_interval_seconds: u64,
    pub trigger_probability: f64,
    pub cooldown_seconds: u64,
    pub silence_seconds: u64,
    pub message_window_size: usize,
    pub max_message_chars: usize,
    /// Provider override; empty means "resolve per conversation".
    pub chat_provider_id: String,
    /// Ordered `"title|description"` lines used when no topics are stored.
    pub fallback_topics: Vec<String>,
    pub quiet_hours: QuietHours,
    /// Declared-but-unused extension point, see [`GroupFilterMode`].
    pub auto_bind_on_message: bool,
    pub group_filter_mode: GroupFilterMode,
    pub group_filter_ids: Vec<String>,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_interval_seconds: 300,
            trigger_probability: 0.3,
            cooldown_seconds: 1800,
            silence_seconds: 600,
            message_window_size: 20,
            max_message_chars: 120,
            chat_provider_id: String::new(),
            fallback_topics: Vec::new(),
            quiet_hours: QuietHours::default(),
            auto_bind_on_message: false,
            group_filter_mode: GroupFilterMode::None,
            group_filter_ids: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_hours_disabled_is_never_active() {
        let window = QuietHours {
            enabled: false,
            start_minutes: 0,
            end_minutes: 0,
        };
        assert!(!window.is_active_at(0));
        assert!(!window.is_active_at(720));
    }

    #[test]
    fn quiet_hours_wraps_past_midnight() {
        // 23:00 -> 08:00
        let window = QuietHours {
            enabled: true,
            start_minutes: 1380,
            end_minutes: 480,
        };
        assert!(window.is_active_at(23 * 60 + 30));
        assert!(window.is_active_at(3 * 60));
        assert!(!window.is_active_at(12 * 60));
        // Boundaries: start inclusive, end exclusive.
        assert!(window.is_active_at(1380));
        assert!(!window.is_active_at(480));
    }

    #[test]
    fn quiet_hours_plain_window() {
        // 09:00 -> 17:00
        let window = QuietHours {
            enabled: true,
            start_minutes: 540,
            end_minutes: 1020,
        };
        assert!(window.is_active_at(540));
        assert!(window.is_active_at(700));
        assert!(!window.is_active_at(1020));
        assert!(!window.is_active_at(100));
    }

    #[test]
    fn quiet_hours_equal_bounds_always_active_when_enabled() {
        let window = QuietHours {
            enabled: true,
            start_minutes: 600,
            end_minutes: 600,
        };
        assert!(window.is_active_at(0));
        assert!(window.is_active_at(600));
        assert!(window.is_active_at(1439));
    }

    #[test]
    fn group_filter_mode_parses_known_values() {
        use std::str::FromStr;
        assert_eq!(
            GroupFilterMode::from_str("whitelist").unwrap(),
            GroupFilterMode::Whitelist
        );
        assert!(GroupFilterMode::from_str("unexpected").is_err());
    }
}
