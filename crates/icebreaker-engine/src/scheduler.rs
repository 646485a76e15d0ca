// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tick scheduler and orchestration.
//!
//! One tick evaluates every candidate stream: gate, select, render, send,
//! persist. A tick-scope mutex serializes periodic and manually forced
//! ticks so they can never interleave; the periodic loop sleeps between
//! ticks with a cancellation-aware wait so shutdown is prompt.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use arc_swap::ArcSwap;
use icebreaker_config::PluginSettings;
use icebreaker_core::types::{DecisionReason, SkipReason, StreamTarget};
use icebreaker_core::{ChatTransport, CompletionHost, IcebreakerError, SelectedTopic};
use icebreaker_store::TopicStore;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{decision, render, selection};

/// Built-in topic set used when the configuration supplies no fallback
/// lines.
pub const DEFAULT_FALLBACK_TOPICS: [&str; 4] = [
    "最近最实用的 AI 工具你推荐哪个？|可以从工作、学习或娱乐角度聊聊。",
    "最近有哪部电影或剧值得补？|聊聊你最推荐的一部和理由。",
    "你现在最想提升的一项能力是什么？|为什么会选它？",
    "如果周末只做一件让你恢复精力的事，会选什么？|分享你的方式。",
];

/// Source of validated settings snapshots.
///
/// Settings carry no persisted identity: every read re-derives them from the
/// raw configuration so host-side config edits take effect on the next tick.
pub trait SettingsSource: Send + Sync + 'static {
    fn snapshot(&self) -> PluginSettings;
}

/// [`SettingsSource`] over a hot-swappable raw configuration mapping.
pub struct ConfigSource {
    raw: ArcSwap<Value>,
}

impl ConfigSource {
    pub fn new(raw: Value) -> Self {
        Self {
            raw: ArcSwap::from_pointee(raw),
        }
    }

    /// Replace the raw mapping; the next snapshot sees the new values.
    pub fn replace(&self, raw: Value) {
        self.raw.store(Arc::new(raw));
    }
}

impl SettingsSource for ConfigSource {
    fn snapshot(&self) -> PluginSettings {
        let raw = self.raw.load();
        let mut settings = PluginSettings::resolve(&raw);
        if settings.fallback_topics.is_empty() {
            settings.fallback_topics = DEFAULT_FALLBACK_TOPICS
                .iter()
                .map(|line| line.to_string())
                .collect();
        }
        settings
    }
}

/// Outcome of one tick: successful sends plus per-stream skip reasons in
/// evaluation order, each formatted as `"{session_name}:{reason}"`.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub sent: usize,
    pub skips: Vec<String>,
}

/// Owns the tick loop and orchestrates one full evaluation cycle.
pub struct Scheduler {
    store: Arc<TopicStore>,
    transport: Arc<dyn ChatTransport>,
    completion: Arc<dyn CompletionHost>,
    settings: Arc<dyn SettingsSource>,
    tick_lock: Mutex<()>,
    shutdown: CancellationToken,
}

impl Scheduler {
    pub fn new(
        store: Arc<TopicStore>,
        transport: Arc<dyn ChatTransport>,
        completion: Arc<dyn CompletionHost>,
        settings: Arc<dyn SettingsSource>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            store,
            transport,
            completion,
            settings,
            tick_lock: Mutex::new(()),
            shutdown,
        }
    }

    /// Current validated settings snapshot.
    pub fn settings(&self) -> PluginSettings {
        self.settings.snapshot()
    }

    /// Run the periodic loop until the shutdown token is cancelled.
    ///
    /// Tick failures are logged and the loop continues to its next scheduled
    /// tick; only cancellation terminates it.
    pub async fn run(&self) {
        info!("scheduler loop started");

        while !self.shutdown.is_cancelled() {
            match self.run_tick(false, None).await {
                Ok(report) if report.sent > 0 || !report.skips.is_empty() => {
                    debug!(sent = report.sent, skips = ?report.skips, "tick complete");
                }
                Ok(_) => {}
                Err(err) => error!(%err, "scheduler tick failed"),
            }

            let interval = Duration::from_secs(self.settings.snapshot().tick_interval_seconds);
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }

        info!("scheduler loop stopped");
    }

    /// Execute one tick under the tick lock.
    ///
    /// `target_origin` restricts the tick to a single stream (which must be
    /// active); otherwise all active streams are evaluated. `force` bypasses
    /// the soft gates for every candidate.
    pub async fn run_tick(
        &self,
        force: bool,
        target_origin: Option<&str>,
    ) -> Result<TickReport, IcebreakerError> {
        let _guard = self.tick_lock.lock().await;

        let settings = self.settings.snapshot();
        if !settings.enabled && !force {
            return Ok(TickReport {
                sent: 0,
                skips: vec![DecisionReason::PluginDisabled.to_string()],
            });
        }

        let now = epoch_now();
        let streams = self.streams_for_tick(target_origin).await?;
        // One topic load covers the whole tick.
        let topics = self.store.list_topics(true).await?;

        let mut report = TickReport::default();
        let mut rng = StdRng::from_entropy();

        for stream in &streams {
            match self
                .process_stream(stream, &settings, &topics, now, force, &mut rng)
                .await
            {
                Ok(None) => report.sent += 1,
                Ok(Some(reason)) => {
                    report.skips.push(format!("{}:{reason}", stream.session_name));
                }
                Err(err) => {
                    // One stream's failure never aborts the rest of the tick.
                    error!(session = %stream.session_name, %err, "stream processing failed");
                    report.skips.push(format!(
                        "{}:{}",
                        stream.session_name,
                        SkipReason::InternalError
                    ));
                }
            }
        }

        Ok(report)
    }

    /// Evaluate one stream. `Ok(None)` means a message was sent and
    /// persisted; `Ok(Some(reason))` is a normal skip.
    async fn process_stream<R: Rng + Send>(
        &self,
        stream: &StreamTarget,
        settings: &PluginSettings,
        topics: &[icebreaker_core::TopicRecord],
        now: f64,
        force: bool,
        rng: &mut R,
    ) -> Result<Option<String>, IcebreakerError> {
        let decision = decision::should_initiate(stream, settings, now, force, rng);
        if !decision.should_send {
            return Ok(Some(decision.reason.to_string()));
        }

        let Some(topic) = selection::pick_topic(topics, &settings.fallback_topics, now, rng)
        else {
            return Ok(Some(SkipReason::NoTopic.to_string()));
        };

        let content = self.build_send_content(settings, stream, &topic).await?;
        if content.is_empty() {
            return Ok(Some(SkipReason::EmptyContent.to_string()));
        }

        if let Err(err) = self
            .transport
            .send_text(&stream.unified_msg_origin, &content)
            .await
        {
            // Leave persisted state untouched on transport failure.
            error!(origin = %stream.unified_msg_origin, %err, "proactive send failed");
            return Ok(Some(SkipReason::SendFailed.to_string()));
        }

        self.store
            .mark_bot_initiated(&stream.unified_msg_origin, now)
            .await?;
        if let Some(topic_id) = topic.topic_id {
            self.store.mark_topic_used(topic_id, now).await?;
        }

        info!(
            origin = %stream.unified_msg_origin,
            topic = %topic.title,
            "proactive topic sent"
        );
        Ok(None)
    }

    /// Build the outbound text: language-model attempt first when a provider
    /// resolves, deterministic fallback otherwise. Both paths are capped at
    /// `max_message_chars`.
    async fn build_send_content(
        &self,
        settings: &PluginSettings,
        stream: &StreamTarget,
        topic: &SelectedTopic,
    ) -> Result<String, IcebreakerError> {
        let recent = self
            .store
            .list_recent_messages(&stream.unified_msg_origin, settings.message_window_size)
            .await?;
        let dialogue: Vec<String> = recent
            .iter()
            .map(|msg| format!("{}: {}", msg.sender_name, msg.content))
            .collect();

        let fallback = render::truncate_chars(
            &render::render_fallback(topic, &dialogue),
            settings.max_message_chars,
        );

        let provider_id = self
            .resolve_provider_id(settings, &stream.unified_msg_origin)
            .await;
        if provider_id.is_empty() {
            return Ok(fallback);
        }

        let prompt = render::build_prompt(topic, &dialogue, settings.max_message_chars);
        match self.completion.complete(&provider_id, &prompt).await {
            Ok(text) => {
                let text = render::truncate_chars(text.trim(), settings.max_message_chars);
                if !text.is_empty() {
                    return Ok(text);
                }
                debug!(provider_id, "completion returned empty text, using fallback");
            }
            Err(err) => {
                warn!(provider_id, %err, "completion failed, using fallback content");
            }
        }

        Ok(fallback)
    }

    /// Resolve the provider id: configured override first, then the host's
    /// per-conversation lookup. A failed lookup means "no provider".
    async fn resolve_provider_id(&self, settings: &PluginSettings, origin: &str) -> String {
        if !settings.chat_provider_id.is_empty() {
            return settings.chat_provider_id.clone();
        }

        match self.completion.current_provider_id(origin).await {
            Ok(id) => id,
            Err(err) => {
                debug!(origin, %err, "provider lookup failed, using fallback content");
                String::new()
            }
        }
    }

    async fn streams_for_tick(
        &self,
        target_origin: Option<&str>,
    ) -> Result<Vec<StreamTarget>, IcebreakerError> {
        match target_origin {
            Some(origin) => Ok(self
                .store
                .get_stream(origin)
                .await?
                .filter(|stream| stream.active)
                .into_iter()
                .collect()),
            None => self.store.list_active_streams().await,
        }
    }
}

/// Current time as epoch seconds.
pub(crate) fn epoch_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
