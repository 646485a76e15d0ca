// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! High-level persistence operations over a [`KvBackend`].
//!
//! The store owns the three entity documents exclusively: id generation,
//! timestamp bookkeeping, and window trimming all happen here, never in the
//! orchestrator. Every mutation follows the same load-mutate-persist shape.

use std::sync::Arc;

use icebreaker_core::types::{MessageSnapshot, StreamTarget, TopicDraft, TopicRecord};
use icebreaker_core::{IcebreakerError, KvBackend};
use serde_json::to_value;
use tracing::debug;

use crate::documents::{decode_or_default, MessagesDoc, StreamsDoc, TopicsDoc};

const TOPICS_KEY: &str = "topics";
const STREAMS_KEY: &str = "streams";
const MESSAGES_KEY: &str = "messages";

/// Persistence adapter mapping topics, streams, and recent messages onto the
/// host's key-value store.
pub struct TopicStore {
    kv: Arc<dyn KvBackend>,
}

impl TopicStore {
    pub fn new(kv: Arc<dyn KvBackend>) -> Self {
        Self { kv }
    }

    /// Create a topic from a draft, assigning the next sequential id.
    pub async fn create_topic(
        &self,
        draft: &TopicDraft,
        now: f64,
    ) -> Result<u64, IcebreakerError> {
        let mut doc = self.topics_doc().await?;

        let id = doc.next_id;
        doc.next_id += 1;
        doc.items.insert(
            id.to_string(),
            TopicRecord {
                id,
                title: draft.title.clone(),
                description: draft.description.clone(),
                priority: draft.priority.max(1),
                enabled: draft.enabled,
                use_count: 0,
                last_used_at: 0.0,
                created_at: now,
                updated_at: now,
            },
        );

        self.put_doc(TOPICS_KEY, &doc).await?;
        debug!(id, title = %draft.title, "topic created");
        Ok(id)
    }

    /// Delete a topic by id. Returns whether a topic was removed.
    pub async fn delete_topic(&self, topic_id: u64) -> Result<bool, IcebreakerError> {
        let mut doc = self.topics_doc().await?;
        let removed = doc.items.remove(&topic_id.to_string()).is_some();
        if removed {
            self.put_doc(TOPICS_KEY, &doc).await?;
        }
        Ok(removed)
    }

    /// List topics sorted by priority descending, then id ascending.
    pub async fn list_topics(
        &self,
        enabled_only: bool,
    ) -> Result<Vec<TopicRecord>, IcebreakerError> {
        let doc = self.topics_doc().await?;

        let mut records: Vec<TopicRecord> = doc
            .items
            .into_values()
            .filter(|record| !enabled_only || record.enabled)
            .collect();
        records.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));
        Ok(records)
    }

    /// Record one use of a topic: increment the counter and stamp the time.
    /// A missing id is ignored.
    pub async fn mark_topic_used(&self, topic_id: u64, now: f64) -> Result<(), IcebreakerError> {
        let mut doc = self.topics_doc().await?;
        let Some(record) = doc.items.get_mut(&topic_id.to_string()) else {
            return Ok(());
        };

        record.use_count += 1;
        record.last_used_at = now;
        record.updated_at = now;
        self.put_doc(TOPICS_KEY, &doc).await
    }

    /// Bind (or rebind) a stream, marking it active.
    ///
    /// Rebinding an existing origin preserves its historical timestamps;
    /// only the descriptive fields and `updated_at` are refreshed.
    pub async fn bind_stream(
        &self,
        origin: &str,
        session_name: &str,
        platform: &str,
        is_group: bool,
        now: f64,
    ) -> Result<(), IcebreakerError> {
        let mut doc = self.streams_doc().await?;

        let old = doc.items.get(origin);
        let target = StreamTarget {
            unified_msg_origin: origin.to_string(),
            session_name: session_name.to_string(),
            platform: platform.to_string(),
            is_group,
            active: true,
            last_user_message_ts: old.map(|s| s.last_user_message_ts).unwrap_or(now),
            last_bot_initiate_ts: old.map(|s| s.last_bot_initiate_ts).unwrap_or(0.0),
            created_at: old.map(|s| s.created_at).unwrap_or(now),
            updated_at: now,
        };
        doc.items.insert(origin.to_string(), target);

        self.put_doc(STREAMS_KEY, &doc).await?;
        debug!(origin, session_name, "stream bound");
        Ok(())
    }

    /// Deactivate a stream without deleting its history. Returns whether the
    /// stream existed.
    pub async fn deactivate_stream(
        &self,
        origin: &str,
        now: f64,
    ) -> Result<bool, IcebreakerError> {
        let mut doc = self.streams_doc().await?;
        let Some(target) = doc.items.get_mut(origin) else {
            return Ok(false);
        };

        target.active = false;
        target.updated_at = now;
        self.put_doc(STREAMS_KEY, &doc).await?;
        Ok(true)
    }

    pub async fn get_stream(
        &self,
        origin: &str,
    ) -> Result<Option<StreamTarget>, IcebreakerError> {
        let doc = self.streams_doc().await?;
        Ok(doc.items.get(origin).cloned())
    }

    /// List active streams, most recently updated first.
    pub async fn list_active_streams(&self) -> Result<Vec<StreamTarget>, IcebreakerError> {
        let doc = self.streams_doc().await?;

        let mut streams: Vec<StreamTarget> =
            doc.items.into_values().filter(|s| s.active).collect();
        streams.sort_by(|a, b| b.updated_at.total_cmp(&a.updated_at));
        Ok(streams)
    }

    /// Stamp the stream's last-user-message time. A missing origin is
    /// ignored.
    pub async fn touch_user_message(
        &self,
        origin: &str,
        now: f64,
    ) -> Result<(), IcebreakerError> {
        let mut doc = self.streams_doc().await?;
        let Some(target) = doc.items.get_mut(origin) else {
            return Ok(());
        };

        target.last_user_message_ts = now;
        target.updated_at = now;
        self.put_doc(STREAMS_KEY, &doc).await
    }

    /// Stamp the stream's last-proactive-send time. A missing origin is
    /// ignored.
    pub async fn mark_bot_initiated(
        &self,
        origin: &str,
        now: f64,
    ) -> Result<(), IcebreakerError> {
        let mut doc = self.streams_doc().await?;
        let Some(target) = doc.items.get_mut(origin) else {
            return Ok(());
        };

        target.last_bot_initiate_ts = now;
        target.updated_at = now;
        self.put_doc(STREAMS_KEY, &doc).await
    }

    /// Append a message snapshot, keeping at most `window` most-recent
    /// entries per origin (newest first).
    pub async fn append_message(
        &self,
        snapshot: MessageSnapshot,
        window: usize,
    ) -> Result<(), IcebreakerError> {
        let mut doc = self.messages_doc().await?;
        let queue = doc
            .items
            .entry(snapshot.unified_msg_origin.clone())
            .or_default();

        queue.push(snapshot);
        queue.sort_by(|a, b| b.created_at.total_cmp(&a.created_at));
        queue.truncate(window.max(1));

        self.put_doc(MESSAGES_KEY, &doc).await
    }

    /// Read back up to `limit` snapshots for an origin, newest first.
    pub async fn list_recent_messages(
        &self,
        origin: &str,
        limit: usize,
    ) -> Result<Vec<MessageSnapshot>, IcebreakerError> {
        let doc = self.messages_doc().await?;

        let mut queue = doc.items.get(origin).cloned().unwrap_or_default();
        queue.sort_by(|a, b| b.created_at.total_cmp(&a.created_at));
        queue.truncate(limit.max(1));
        Ok(queue)
    }

    /// Drop all three documents.
    pub async fn reset_all(&self) -> Result<(), IcebreakerError> {
        self.kv.delete(TOPICS_KEY).await?;
        self.kv.delete(STREAMS_KEY).await?;
        self.kv.delete(MESSAGES_KEY).await?;
        Ok(())
    }

    async fn topics_doc(&self) -> Result<TopicsDoc, IcebreakerError> {
        Ok(decode_or_default(
            TOPICS_KEY,
            self.kv.get(TOPICS_KEY).await?,
        ))
    }

    async fn streams_doc(&self) -> Result<StreamsDoc, IcebreakerError> {
        Ok(decode_or_default(
            STREAMS_KEY,
            self.kv.get(STREAMS_KEY).await?,
        ))
    }

    async fn messages_doc(&self) -> Result<MessagesDoc, IcebreakerError> {
        Ok(decode_or_default(
            MESSAGES_KEY,
            self.kv.get(MESSAGES_KEY).await?,
        ))
    }

    async fn put_doc<T: serde::Serialize>(
        &self,
        key: &str,
        doc: &T,
    ) -> Result<(), IcebreakerError> {
        let value = to_value(doc).map_err(IcebreakerError::storage)?;
        self.kv.put(key, value).await
    }
}
