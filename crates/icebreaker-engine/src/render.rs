// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message content rendering.
//!
//! The fallback path is fully deterministic and used whenever no language
//! model is available or its output is unusable. Truncation counts
//! characters, not bytes; content is predominantly CJK.

use icebreaker_core::types::SelectedTopic;

/// Render deterministic fallback text for a topic.
///
/// With recent dialogue, the newest message is quoted (40 chars) before the
/// topic; otherwise the topic is presented directly with an invitational
/// closing line.
pub fn render_fallback(topic: &SelectedTopic, recent_dialogue: &[String]) -> String {
    if let Some(context) = recent_dialogue.first() {
        let quoted: String = context.chars().take(40).collect();
        return format!(
            "看到大家刚刚聊到：{quoted}...\n想延展一个话题：{}\n{}",
            topic.title, topic.description
        )
        .trim()
        .to_string();
    }

    let mut lines = vec![format!("换个话题聊聊：{}", topic.title)];
    if !topic.description.is_empty() {
        lines.push(topic.description.clone());
    }
    lines.push("大家怎么看？".to_string());
    lines.join("\n")
}

/// Build the language-model prompt for a proactive topic message.
///
/// At most twelve recent dialogue lines are included, newest first.
pub fn build_prompt(
    topic: &SelectedTopic,
    recent_dialogue: &[String],
    max_message_chars: usize,
) -> String {
    let history = if recent_dialogue.is_empty() {
        "(最近消息为空)".to_string()
    } else {
        recent_dialogue
            .iter()
            .take(12)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n")
    };

    let topic_desc = if topic.description.is_empty() {
        "请围绕该话题抛出一个自然的问题。"
    } else {
        &topic.description
    };
    let lower_bound = max_message_chars.min(50);

    format!(
        "你是群聊里的自然参与者，不要自称机器人。\
         基于最近聊天上下文，发一条简短且自然的引导发言。\n\n\
         话题标题: {}\n\
         话题描述: {topic_desc}\n\n\
         最近聊天:\n\
         {history}\n\n\
         要求:\n\
         1) 输出简体中文。\n\
         2) {lower_bound}-{max_message_chars}字。\n\
         3) 语气自然，不要模板腔。\n\
         4) 结尾尽量带一个开放问题，引导群友回复。\n\
         5) 只输出最终发言内容，不要解释。",
        topic.title
    )
}

/// Cut `text` to at most `max_chars` characters. Zero yields an empty
/// string.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(title: &str, description: &str) -> SelectedTopic {
        SelectedTopic {
            topic_id: None,
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn fallback_quotes_newest_message() {
        let dialogue = vec!["alice: 今天好热".to_string(), "bob: 是啊".to_string()];
        let text = render_fallback(&topic("夏日饮品", "你最爱哪种？"), &dialogue);
        assert!(text.contains("看到大家刚刚聊到：alice: 今天好热..."));
        assert!(text.contains("想延展一个话题：夏日饮品"));
        assert!(text.contains("你最爱哪种？"));
    }

    #[test]
    fn fallback_quote_is_capped_at_forty_chars() {
        let long = "x".repeat(100);
        let dialogue = vec![long];
        let text = render_fallback(&topic("t", ""), &dialogue);
        let quoted_line = text.lines().next().unwrap();
        // "看到大家刚刚聊到：" + 40 chars + "..."
        assert_eq!(quoted_line.chars().count(), 9 + 40 + 3);
    }

    #[test]
    fn fallback_without_dialogue_invites_discussion() {
        let text = render_fallback(&topic("周末计划", "打算做什么？"), &[]);
        assert_eq!(text, "换个话题聊聊：周末计划\n打算做什么？\n大家怎么看？");

        let bare = render_fallback(&topic("周末计划", ""), &[]);
        assert_eq!(bare, "换个话题聊聊：周末计划\n大家怎么看？");
    }

    #[test]
    fn prompt_includes_topic_and_limits() {
        let prompt = build_prompt(&topic("读书", "最近读什么"), &[], 120);
        assert!(prompt.contains("话题标题: 读书"));
        assert!(prompt.contains("话题描述: 最近读什么"));
        assert!(prompt.contains("(最近消息为空)"));
        assert!(prompt.contains("50-120字"));
    }

    #[test]
    fn prompt_caps_history_at_twelve_lines() {
        let dialogue: Vec<String> = (0..20).map(|i| format!("m{i}")).collect();
        let prompt = build_prompt(&topic("t", "d"), &dialogue, 120);
        assert!(prompt.contains("m11"));
        assert!(!prompt.contains("m12"));
    }

    #[test]
    fn prompt_lower_bound_tracks_small_caps() {
        let prompt = build_prompt(&topic("t", "d"), &[], 30);
        assert!(prompt.contains("30-30字"));
    }

    #[test]
    fn truncation_is_character_exact() {
        assert_eq!(truncate_chars("你好世界", 2), "你好");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("anything", 0), "");

        let cut = truncate_chars(&"话".repeat(200), 120);
        assert_eq!(cut.chars().count(), 120);
    }
}
