// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end integration tests for the complete Icebreaker pipeline.
//!
//! Each test wires an in-memory store, mock transport, and mock completion
//! host into a real scheduler. Tests are independent and order-insensitive.

use std::sync::Arc;

use serde_json::json;

use icebreaker_config::PluginSettings;
use icebreaker_core::types::TopicDraft;
use icebreaker_engine::{CommandHandler, ConfigSource, MessageMeta, Scheduler, SettingsSource};
use icebreaker_store::{MemoryKv, TopicStore};
use icebreaker_test_utils::{MockCompletionHost, MockTransport};
use tokio_util::sync::CancellationToken;

struct Harness {
    store: Arc<TopicStore>,
    transport: Arc<MockTransport>,
    completion: Arc<MockCompletionHost>,
    config: Arc<ConfigSource>,
    scheduler: Arc<Scheduler>,
    commands: CommandHandler,
}

fn harness(raw: serde_json::Value) -> Harness {
    let store = Arc::new(TopicStore::new(Arc::new(MemoryKv::new())));
    let transport = Arc::new(MockTransport::new());
    let completion = Arc::new(MockCompletionHost::new());
    let config = Arc::new(ConfigSource::new(raw));

    let scheduler = Arc::new(Scheduler::new(
        store.clone(),
        transport.clone(),
        completion.clone(),
        config.clone(),
        CancellationToken::new(),
    ));
    let commands = CommandHandler::new(store.clone(), scheduler.clone(), config.clone());

    Harness {
        store,
        transport,
        completion,
        config,
        scheduler,
        commands,
    }
}

fn eager_config() -> serde_json::Value {
    // Always fire when gates allow: no silence window, certain probability.
    json!({
        "enabled": true,
        "trigger_probability": 1.0,
        "silence_seconds": 0,
    })
}

fn group_meta(group_id: &str) -> MessageMeta {
    MessageMeta {
        origin: format!("qq:group:{group_id}"),
        platform: "qq".to_string(),
        sender_id: "u1".to_string(),
        sender_name: "alice".to_string(),
        group_id: Some(group_id.to_string()),
    }
}

// ---- Forced initiation ----

#[tokio::test]
async fn forced_initiate_sends_and_persists_state() {
    let h = harness(eager_config());
    let meta = group_meta("g1");

    h.commands.bind(&meta).await.unwrap();
    let reply = h
        .commands
        .create("夏日饮品|你最爱哪种？")
        .await
        .unwrap();
    assert!(reply.contains("✅ 已创建话题 #1"));

    let reply = h.commands.initiate(&meta).await.unwrap();
    assert_eq!(reply, "✅ 已在当前会话触发主动发言。");

    let sent = h.transport.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, meta.origin);
    assert!(sent[0].1.contains("夏日饮品"));

    let topics = h.store.list_topics(false).await.unwrap();
    assert_eq!(topics[0].use_count, 1);
    assert!(topics[0].last_used_at > 0.0);

    let stream = h.store.get_stream(&meta.origin).await.unwrap().unwrap();
    assert!(stream.last_bot_initiate_ts > 0.0);
}

#[tokio::test]
async fn initiate_auto_binds_unbound_session() {
    let h = harness(eager_config());
    let meta = group_meta("g2");

    assert!(h.store.get_stream(&meta.origin).await.unwrap().is_none());

    let reply = h.commands.initiate(&meta).await.unwrap();
    assert_eq!(reply, "✅ 已在当前会话触发主动发言。");

    let stream = h.store.get_stream(&meta.origin).await.unwrap().unwrap();
    assert!(stream.active);
    assert_eq!(stream.session_name, "group:g2");
    assert_eq!(h.transport.sent_count().await, 1);
}

#[tokio::test]
async fn initiate_without_topics_uses_built_in_fallback() {
    // No persisted topics and no configured lines: the built-in topic set
    // still produces a message.
    let h = harness(eager_config());
    let meta = group_meta("g3");

    h.commands.initiate(&meta).await.unwrap();
    assert_eq!(h.transport.sent_count().await, 1);

    // Fallback picks carry no topic id, so no use counter moves.
    assert!(h.store.list_topics(false).await.unwrap().is_empty());
}

/// Settings source with no fallback lines at all; raw-config inputs can
/// never produce this because empty lists get the built-in topic set.
struct NoFallbackSettings;

impl SettingsSource for NoFallbackSettings {
    fn snapshot(&self) -> PluginSettings {
        PluginSettings {
            silence_seconds: 0,
            ..PluginSettings::default()
        }
    }
}

#[tokio::test]
async fn initiate_reports_no_topic_when_no_candidates_exist() {
    let store = Arc::new(TopicStore::new(Arc::new(MemoryKv::new())));
    let transport = Arc::new(MockTransport::new());
    let settings: Arc<dyn SettingsSource> = Arc::new(NoFallbackSettings);
    let scheduler = Arc::new(Scheduler::new(
        store.clone(),
        transport.clone(),
        Arc::new(MockCompletionHost::new()),
        settings.clone(),
        CancellationToken::new(),
    ));
    let commands = CommandHandler::new(store, scheduler, settings);
    let meta = group_meta("g4");

    let reply = commands.initiate(&meta).await.unwrap();
    assert_eq!(reply, "ℹ️ 本次未发言：group:g4:no_topic");
    assert_eq!(transport.sent_count().await, 0);
}

// ---- Periodic ticks ----

#[tokio::test]
async fn tick_with_no_streams_does_nothing() {
    let h = harness(eager_config());

    let report = h.scheduler.run_tick(false, None).await.unwrap();
    assert_eq!(report.sent, 0);
    assert!(report.skips.is_empty());
    assert_eq!(h.transport.sent_count().await, 0);
}

#[tokio::test]
async fn disabled_plugin_short_circuits_the_tick() {
    let h = harness(json!({"enabled": false}));
    let meta = group_meta("g5");
    h.commands.bind(&meta).await.unwrap();

    let report = h.scheduler.run_tick(false, None).await.unwrap();
    assert_eq!(report.sent, 0);
    assert_eq!(report.skips, vec!["plugin_disabled".to_string()]);
}

#[tokio::test]
async fn cooldown_blocks_the_next_unforced_tick() {
    let h = harness(eager_config());
    let meta = group_meta("g6");

    h.commands.initiate(&meta).await.unwrap();
    assert_eq!(h.transport.sent_count().await, 1);

    let report = h.scheduler.run_tick(false, None).await.unwrap();
    assert_eq!(report.sent, 0);
    assert_eq!(report.skips, vec!["group:g6:cooldown".to_string()]);
}

#[tokio::test]
async fn unbound_tick_covers_all_active_streams() {
    let h = harness(eager_config());
    let first = group_meta("g7");
    let second = group_meta("g8");

    h.commands.initiate(&first).await.unwrap();
    h.commands.initiate(&second).await.unwrap();
    assert_eq!(h.transport.sent_count().await, 2);

    h.commands.unbind(&second).await.unwrap();
    h.transport.clear_sent().await;

    // Both streams are now cooling down; only the bound one is evaluated.
    let report = h.scheduler.run_tick(false, None).await.unwrap();
    assert_eq!(report.skips, vec!["group:g7:cooldown".to_string()]);
}

#[tokio::test]
async fn config_replacement_takes_effect_on_next_tick() {
    let h = harness(eager_config());
    let meta = group_meta("g9");
    h.commands.bind(&meta).await.unwrap();

    h.config.replace(json!({"enabled": false}));
    let report = h.scheduler.run_tick(false, None).await.unwrap();
    assert_eq!(report.skips, vec!["plugin_disabled".to_string()]);
}

// ---- Failure handling ----

#[tokio::test]
async fn send_failure_leaves_state_untouched() {
    let h = harness(eager_config());
    let meta = group_meta("ga");

    h.commands.bind(&meta).await.unwrap();
    h.store
        .create_topic(&TopicDraft::new("t", "d"), 100.0)
        .await
        .unwrap();
    h.transport.fail_sends(true);

    let reply = h.commands.initiate(&meta).await.unwrap();
    assert_eq!(reply, "ℹ️ 本次未发言：group:ga:send_failed");

    let stream = h.store.get_stream(&meta.origin).await.unwrap().unwrap();
    assert_eq!(stream.last_bot_initiate_ts, 0.0);
    let topics = h.store.list_topics(false).await.unwrap();
    assert_eq!(topics[0].use_count, 0);

    // A retry after the transport recovers succeeds.
    h.transport.fail_sends(false);
    let reply = h.commands.initiate(&meta).await.unwrap();
    assert_eq!(reply, "✅ 已在当前会话触发主动发言。");
}

// ---- Language-model content path ----

#[tokio::test]
async fn completion_text_is_sent_when_a_provider_resolves() {
    let h = harness(eager_config());
    let meta = group_meta("gb");

    h.completion.set_provider_id("openai").await;
    h.completion
        .add_response("大家最近都在喝什么夏日饮品？".to_string())
        .await;
    h.store
        .create_topic(&TopicDraft::new("夏日饮品", "你最爱哪种？"), 100.0)
        .await
        .unwrap();

    h.commands.initiate(&meta).await.unwrap();

    let sent = h.transport.sent_messages().await;
    assert_eq!(sent[0].1, "大家最近都在喝什么夏日饮品？");

    let prompts = h.completion.prompts().await;
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("话题标题: 夏日饮品"));
}

#[tokio::test]
async fn completion_failure_falls_back_to_deterministic_content() {
    let h = harness(eager_config());
    let meta = group_meta("gc");

    h.completion.set_provider_id("openai").await;
    h.completion.fail_completions(true);
    h.store
        .create_topic(&TopicDraft::new("周末计划", "打算做什么？"), 100.0)
        .await
        .unwrap();

    h.commands.initiate(&meta).await.unwrap();

    let sent = h.transport.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("周末计划"));
}

#[tokio::test]
async fn empty_completion_falls_back_to_deterministic_content() {
    let h = harness(eager_config());
    let meta = group_meta("gd");

    h.completion.set_provider_id("openai").await;
    h.completion.add_response("   ".to_string()).await;
    h.store
        .create_topic(&TopicDraft::new("读书", "最近读什么"), 100.0)
        .await
        .unwrap();

    h.commands.initiate(&meta).await.unwrap();

    let sent = h.transport.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("读书"));
}

#[tokio::test]
async fn long_completion_is_truncated_to_the_configured_cap() {
    let mut raw = eager_config();
    raw["max_message_chars"] = json!(20);
    let h = harness(raw);
    let meta = group_meta("ge");

    h.completion.set_provider_id("openai").await;
    h.completion.add_response("话".repeat(100)).await;
    h.store
        .create_topic(&TopicDraft::new("t", "d"), 100.0)
        .await
        .unwrap();

    h.commands.initiate(&meta).await.unwrap();

    let sent = h.transport.sent_messages().await;
    assert_eq!(sent[0].1.chars().count(), 20);
}

// ---- Message tracking and admin surface ----

#[tokio::test]
async fn tracked_messages_feed_the_prompt_context() {
    let h = harness(eager_config());
    let meta = group_meta("gf");

    h.commands.bind(&meta).await.unwrap();
    assert!(h
        .commands
        .track_message(&meta, "今天好热啊")
        .await
        .unwrap());

    h.completion.set_provider_id("openai").await;
    h.completion.add_response("回应".to_string()).await;
    h.store
        .create_topic(&TopicDraft::new("t", "d"), 100.0)
        .await
        .unwrap();
    h.commands.initiate(&meta).await.unwrap();

    let prompts = h.completion.prompts().await;
    assert!(prompts[0].contains("alice: 今天好热啊"));
}

#[tokio::test]
async fn messages_are_not_tracked_for_unbound_or_command_input() {
    let h = harness(eager_config());
    let meta = group_meta("gg");

    // Unbound stream: nothing recorded.
    assert!(!h.commands.track_message(&meta, "hello").await.unwrap());

    h.commands.bind(&meta).await.unwrap();
    assert!(!h.commands.track_message(&meta, "/topic_list").await.unwrap());
    assert!(!h.commands.track_message(&meta, "   ").await.unwrap());
    assert!(h.commands.track_message(&meta, "hello").await.unwrap());
}

#[tokio::test]
async fn admin_commands_round_trip_topics() {
    let h = harness(eager_config());

    let reply = h.commands.create("bad payload").await.unwrap();
    assert!(reply.starts_with("❌"));

    h.commands.create("标题|描述").await.unwrap();
    let listing = h.commands.list().await.unwrap();
    assert!(listing.contains("#1 [P1] 标题"));

    let reply = h.commands.delete("1").await.unwrap();
    assert_eq!(reply, "✅ 已删除话题 #1");
    let reply = h.commands.delete("1").await.unwrap();
    assert_eq!(reply, "ℹ️ 话题 #1 不存在。");

    let listing = h.commands.list().await.unwrap();
    assert!(listing.starts_with("📭"));
}

#[tokio::test]
async fn status_reflects_binding_state() {
    let h = harness(eager_config());
    let meta = group_meta("gh");

    let status = h.commands.status(&meta).await.unwrap();
    assert!(status.contains("- 全局启用: 是"));
    assert!(status.contains("- 当前会话: 未绑定"));

    h.commands.bind(&meta).await.unwrap();
    let status = h.commands.status(&meta).await.unwrap();
    assert!(status.contains("- 当前会话: 已绑定(group:gh)"));
    assert!(status.contains("- 绑定会话数: 1"));

    h.commands.unbind(&meta).await.unwrap();
    let status = h.commands.status(&meta).await.unwrap();
    assert!(status.contains("- 当前会话: 未绑定"));
}
