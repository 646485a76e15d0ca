// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serde models for the three KV documents.
//!
//! Each logical entity lives in one self-contained JSON document with an
//! internal `items` mapping keyed by stable string identifiers. Decoding is
//! lenient: a missing or malformed document decodes to its empty default.

use std::collections::BTreeMap;

use icebreaker_core::types::{MessageSnapshot, StreamTarget, TopicRecord};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// The `topics` document: a sequential id counter plus records keyed by
/// stringified id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicsDoc {
    #[serde(default = "first_id")]
    pub next_id: u64,
    #[serde(default)]
    pub items: BTreeMap<String, TopicRecord>,
}

impl Default for TopicsDoc {
    fn default() -> Self {
        Self {
            next_id: first_id(),
            items: BTreeMap::new(),
        }
    }
}

fn first_id() -> u64 {
    1
}

/// The `streams` document: targets keyed by unified message origin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamsDoc {
    #[serde(default)]
    pub items: BTreeMap<String, StreamTarget>,
}

/// The `messages` document: per-origin snapshot lists, capped per key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagesDoc {
    #[serde(default)]
    pub items: BTreeMap<String, Vec<MessageSnapshot>>,
}

/// Decode a document fetched from the KV backend, substituting the empty
/// default when the key is missing or the stored blob has the wrong shape.
pub(crate) fn decode_or_default<T>(key: &str, value: Option<Value>) -> T
where
    T: Default + DeserializeOwned,
{
    match value {
        None => T::default(),
        Some(value) => serde_json::from_value(value).unwrap_or_else(|err| {
            warn!(key, %err, "malformed KV document replaced with empty default");
            T::default()
        }),
    }
}
