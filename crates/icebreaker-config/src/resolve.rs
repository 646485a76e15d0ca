// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Total resolution of a loose configuration mapping into [`PluginSettings`].
//!
//! The host hands the plugin a loosely-typed mapping: keys may be missing,
//! values may carry the wrong type. Resolution never fails; every field has
//! a safe default and a clamp, and malformed sub-values fall back to their
//! field's default.

use std::str::FromStr;

use serde_json::Value;

use crate::model::{GroupFilterMode, PluginSettings, QuietHours};

impl PluginSettings {
    /// Resolve a raw configuration mapping into a validated snapshot.
    ///
    /// Non-object input resolves to the defaults.
    pub fn resolve(raw: &Value) -> Self {
        let defaults = Self::default();
        let Some(map) = raw.as_object() else {
            return defaults;
        };

        let quiet_hours = map
            .get("quiet_hours")
            .and_then(Value::as_object)
            .map(|section| QuietHours {
                enabled: as_bool(section.get("enabled"), false),
                start_minutes: parse_hhmm(section.get("start"), 23 * 60),
                end_minutes: parse_hhmm(section.get("end"), 8 * 60),
            })
            .unwrap_or_default();

        Self {
            enabled: as_bool(map.get("enabled"), defaults.enabled),
            tick_interval_seconds: as_i64(map.get("tick_interval_seconds"), 300).max(60) as u64,
            trigger_probability: as_f64(map.get("trigger_probability"), 0.3).clamp(0.0, 1.0),
            cooldown_seconds: as_i64(map.get("cooldown_seconds"), 1800).max(0) as u64,
            silence_seconds: as_i64(map.get("silence_seconds"), 600).max(0) as u64,
            message_window_size: as_i64(map.get("message_window_size"), 20).max(1) as usize,
            max_message_chars: as_i64(map.get("max_message_chars"), 120).max(20) as usize,
            chat_provider_id: as_trimmed(map.get("chat_provider_id")),
            fallback_topics: topic_lines(map.get("fallback_topics")),
            quiet_hours,
            auto_bind_on_message: as_bool(map.get("auto_bind_on_message"), false),
            group_filter_mode: as_filter_mode(map.get("group_filter_mode")),
            group_filter_ids: string_list(map.get("group_filter_ids")),
        }
    }
}

/// Lenient boolean coercion: bool, nonzero number, or the usual truthy and
/// falsy string spellings.
fn as_bool(value: Option<&Value>, default: bool) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(default),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        _ => default,
    }
}

fn as_i64(value: Option<&Value>, default: i64) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(default),
        Some(Value::Bool(b)) => *b as i64,
        Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

fn as_f64(value: Option<&Value>, default: f64) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

fn as_trimmed(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        _ => String::new(),
    }
}

/// Parse an `"HH:MM"` time string into minutes since midnight.
///
/// Malformed strings and out-of-range hours/minutes fall back to the default.
fn parse_hhmm(value: Option<&Value>, default_minutes: u32) -> u32 {
    let Some(Value::String(text)) = value else {
        return default_minutes;
    };
    let text = text.trim();

    let Some((hour, minute)) = text.split_once(':') else {
        return default_minutes;
    };
    let (Ok(hour), Ok(minute)) = (hour.parse::<u32>(), minute.parse::<u32>()) else {
        return default_minutes;
    };
    if hour > 23 || minute > 59 {
        return default_minutes;
    }

    hour * 60 + minute
}

/// Fallback topic lines accept a single string or a list of strings; any
/// other shape yields an empty list.
fn topic_lines(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => {
            let line = s.trim();
            if line.is_empty() {
                Vec::new()
            } else {
                vec![line.to_string()]
            }
        }
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn as_filter_mode(value: Option<&Value>) -> GroupFilterMode {
    match value {
        Some(Value::String(s)) => {
            GroupFilterMode::from_str(s.trim()).unwrap_or(GroupFilterMode::None)
        }
        _ => GroupFilterMode::None,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
