// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin command surface.
//!
//! The host runtime owns command parsing and permission gating; each handler
//! here takes the already-extracted payload and returns the reply text.
//! Storage errors propagate to the host, which renders its own failure line.

use std::sync::Arc;

use icebreaker_core::types::{MessageSnapshot, TopicDraft};
use icebreaker_core::IcebreakerError;
use icebreaker_store::TopicStore;

use crate::scheduler::{epoch_now, Scheduler, SettingsSource};

/// Metadata the host extracts from an inbound message event.
#[derive(Debug, Clone)]
pub struct MessageMeta {
    /// Unified origin id of the conversation.
    pub origin: String,
    pub platform: String,
    pub sender_id: String,
    pub sender_name: String,
    /// Present for group conversations.
    pub group_id: Option<String>,
}

impl MessageMeta {
    /// Human-readable session name: `group:{id}` or `private:{sender}`.
    pub fn session_name(&self) -> String {
        match &self.group_id {
            Some(group_id) if !group_id.is_empty() => format!("group:{group_id}"),
            _ => format!("private:{}", self.sender_id),
        }
    }

    fn is_group(&self) -> bool {
        self.group_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// Handlers for the `/topic_*` admin commands.
pub struct CommandHandler {
    store: Arc<TopicStore>,
    scheduler: Arc<Scheduler>,
    settings: Arc<dyn SettingsSource>,
}

impl CommandHandler {
    pub fn new(
        store: Arc<TopicStore>,
        scheduler: Arc<Scheduler>,
        settings: Arc<dyn SettingsSource>,
    ) -> Self {
        Self {
            store,
            scheduler,
            settings,
        }
    }

    /// `/topic_help` (unrestricted).
    pub fn help(&self) -> String {
        [
            "Icebreaker 指令：",
            "/topic_bind 绑定当前会话为主动发言目标",
            "/topic_unbind 解除当前会话绑定",
            "/topic_status 查看当前状态",
            "/topic_create 标题|描述 创建话题",
            "/topic_list 查看话题列表",
            "/topic_delete 话题ID 删除话题",
            "/topic_initiate 立即在当前会话触发一次主动发言",
        ]
        .join("\n")
    }

    /// `/topic_bind` — bind the current conversation.
    pub async fn bind(&self, meta: &MessageMeta) -> Result<String, IcebreakerError> {
        self.bind_current(meta).await?;
        Ok("✅ 已绑定当前会话，插件将在满足条件时主动发起话题。".to_string())
    }

    /// `/topic_unbind` — deactivate the current conversation.
    pub async fn unbind(&self, meta: &MessageMeta) -> Result<String, IcebreakerError> {
        let removed = self
            .store
            .deactivate_stream(&meta.origin, epoch_now())
            .await?;
        if removed {
            Ok("✅ 已解绑当前会话。".to_string())
        } else {
            Ok("ℹ️ 当前会话尚未绑定。".to_string())
        }
    }

    /// `/topic_status` (unrestricted).
    pub async fn status(&self, meta: &MessageMeta) -> Result<String, IcebreakerError> {
        let settings = self.settings.snapshot();
        let stream = self.store.get_stream(&meta.origin).await?;
        let active_streams = self.store.list_active_streams().await?;
        let topics = self.store.list_topics(true).await?;

        let provider = if settings.chat_provider_id.is_empty() {
            "自动使用当前会话".to_string()
        } else {
            settings.chat_provider_id.clone()
        };

        let mut lines = vec![
            "Icebreaker 状态：".to_string(),
            format!("- 全局启用: {}", if settings.enabled { "是" } else { "否" }),
            format!("- 绑定会话数: {}", active_streams.len()),
            format!("- 启用话题数: {}", topics.len()),
            format!("- 调度间隔: {}s", settings.tick_interval_seconds),
            format!("- 触发概率: {:.2}", settings.trigger_probability),
            format!("- 冷却时间: {}s", settings.cooldown_seconds),
            format!("- 静默阈值: {}s", settings.silence_seconds),
            format!("- 最大字数: {}", settings.max_message_chars),
            format!("- 指定模型提供商: {provider}"),
        ];

        match stream {
            Some(stream) if stream.active => {
                let now = epoch_now();
                lines.push(format!("- 当前会话: 已绑定({})", stream.session_name));
                lines.push(format!(
                    "- 距上次用户发言: {}",
                    format_elapsed(stream.last_user_message_ts, now)
                ));
                lines.push(format!(
                    "- 距上次主动发言: {}",
                    format_elapsed(stream.last_bot_initiate_ts, now)
                ));
            }
            _ => lines.push("- 当前会话: 未绑定".to_string()),
        }

        Ok(lines.join("\n"))
    }

    /// `/topic_create 标题|描述`.
    pub async fn create(&self, payload: &str) -> Result<String, IcebreakerError> {
        let Some(draft) = parse_topic_payload(payload) else {
            return Ok("❌ 格式错误，请使用：/topic_create 标题|描述".to_string());
        };

        let topic_id = self.store.create_topic(&draft, epoch_now()).await?;
        Ok(format!("✅ 已创建话题 #{topic_id}: {}", draft.title))
    }

    /// `/topic_list` (unrestricted).
    pub async fn list(&self) -> Result<String, IcebreakerError> {
        let topics = self.store.list_topics(true).await?;
        if topics.is_empty() {
            return Ok("📭 当前没有启用的话题，可用 /topic_create 添加。".to_string());
        }

        let mut lines = vec!["📋 已启用话题：".to_string()];
        for topic in topics {
            lines.push(format!(
                "#{} [P{}] {} | 已触发{}次",
                topic.id, topic.priority, topic.title, topic.use_count
            ));
        }
        Ok(lines.join("\n"))
    }

    /// `/topic_delete 话题ID`.
    pub async fn delete(&self, payload: &str) -> Result<String, IcebreakerError> {
        let Ok(topic_id) = payload.trim().parse::<u64>() else {
            return Ok("❌ 格式错误，请使用：/topic_delete 话题ID".to_string());
        };

        if self.store.delete_topic(topic_id).await? {
            Ok(format!("✅ 已删除话题 #{topic_id}"))
        } else {
            Ok(format!("ℹ️ 话题 #{topic_id} 不存在。"))
        }
    }

    /// `/topic_initiate` — force one proactive send in the current
    /// conversation, binding it first if needed.
    pub async fn initiate(&self, meta: &MessageMeta) -> Result<String, IcebreakerError> {
        self.bind_current(meta).await?;

        let report = self.scheduler.run_tick(true, Some(&meta.origin)).await?;
        if report.sent > 0 {
            return Ok("✅ 已在当前会话触发主动发言。".to_string());
        }

        let reason_text = if report.skips.is_empty() {
            "未满足发言条件".to_string()
        } else {
            report.skips[..report.skips.len().min(2)].join("、")
        };
        Ok(format!("ℹ️ 本次未发言：{reason_text}"))
    }

    /// Track one non-command user message in a bound, active stream.
    ///
    /// Returns whether the message was recorded.
    pub async fn track_message(
        &self,
        meta: &MessageMeta,
        text: &str,
    ) -> Result<bool, IcebreakerError> {
        let text = text.trim();
        if text.is_empty() || text.starts_with('/') {
            return Ok(false);
        }

        let Some(stream) = self.store.get_stream(&meta.origin).await? else {
            return Ok(false);
        };
        if !stream.active {
            return Ok(false);
        }

        let now = epoch_now();
        let settings = self.settings.snapshot();
        self.store.touch_user_message(&meta.origin, now).await?;
        self.store
            .append_message(
                MessageSnapshot {
                    unified_msg_origin: meta.origin.clone(),
                    sender_id: meta.sender_id.clone(),
                    sender_name: meta.sender_name.clone(),
                    content: text.to_string(),
                    created_at: now,
                },
                settings.message_window_size,
            )
            .await?;
        Ok(true)
    }

    async fn bind_current(&self, meta: &MessageMeta) -> Result<(), IcebreakerError> {
        let now = epoch_now();
        self.store
            .bind_stream(
                &meta.origin,
                &meta.session_name(),
                &meta.platform,
                meta.is_group(),
                now,
            )
            .await?;
        self.store.touch_user_message(&meta.origin, now).await
    }
}

/// Parse a `标题|描述` payload into a topic draft. Both parts are required;
/// the full-width `｜` delimiter is also accepted.
pub fn parse_topic_payload(payload: &str) -> Option<TopicDraft> {
    let payload = payload.trim();
    if payload.is_empty() {
        return None;
    }

    let delimiter = if payload.contains('|') {
        "|"
    } else if payload.contains('｜') {
        "｜"
    } else {
        return None;
    };

    let (title, description) = payload.split_once(delimiter)?;
    let title = title.trim();
    let description = description.trim();
    if title.is_empty() || description.is_empty() {
        return None;
    }

    Some(TopicDraft::new(title, description))
}

/// Format elapsed time since `ts` as `Ns`/`Nm`/`Nh`/`Nd`, or `从未` when the
/// event never happened.
pub fn format_elapsed(ts: f64, now: f64) -> String {
    if ts <= 0.0 {
        return "从未".to_string();
    }

    let elapsed = (now - ts).max(0.0) as u64;
    if elapsed < 60 {
        format!("{elapsed}s")
    } else if elapsed < 3600 {
        format!("{}m", elapsed / 60)
    } else if elapsed < 86400 {
        format!("{}h", elapsed / 3600)
    } else {
        format!("{}d", elapsed / 86400)
    }
}
