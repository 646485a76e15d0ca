// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Weighted topic selection.
//!
//! Persisted topics are drawn with weight `max(priority, 1) * (1 + boost)`
//! where the boost grows with staleness (hours since last use / 24, capped
//! at 2.0). A never-used topic counts as one day stale, giving it
//! above-baseline but not runaway weight. With no persisted topics the
//! configured fallback lines are parsed and one is drawn uniformly.

use icebreaker_core::types::{SelectedTopic, TopicRecord};
use rand::Rng;

/// Pick one topic, or `None` when neither topics nor fallback lines yield a
/// candidate. `topics` must already be filtered to enabled-only.
pub fn pick_topic<R: Rng>(
    topics: &[TopicRecord],
    fallback_lines: &[String],
    now: f64,
    rng: &mut R,
) -> Option<SelectedTopic> {
    if !topics.is_empty() {
        let weights: Vec<f64> = topics.iter().map(|topic| weight(topic, now)).collect();
        let total: f64 = weights.iter().sum();

        let choice = if total <= 0.0 {
            &topics[0]
        } else {
            let draw = rng.gen_range(0.0..total);
            let mut acc = 0.0;
            let mut choice = &topics[topics.len() - 1];
            for (topic, weight) in topics.iter().zip(&weights) {
                acc += weight;
                if draw <= acc {
                    choice = topic;
                    break;
                }
            }
            choice
        };

        return Some(SelectedTopic {
            topic_id: Some(choice.id),
            title: choice.title.clone(),
            description: choice.description.clone(),
        });
    }

    let candidates: Vec<SelectedTopic> = fallback_lines
        .iter()
        .filter_map(|line| parse_fallback_line(line))
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let index = rng.gen_range(0..candidates.len());
    Some(candidates[index].clone())
}

fn weight(topic: &TopicRecord, now: f64) -> f64 {
    let staleness_hours = if topic.last_used_at > 0.0 {
        (now - topic.last_used_at).max(0.0) / 3600.0
    } else {
        24.0
    };
    let freshness_boost = (staleness_hours / 24.0).min(2.0);
    topic.priority.max(1) as f64 * (1.0 + freshness_boost)
}

/// Parse one `"title|description"` fallback line (full-width `｜` also
/// accepted). A line without a usable delimiter becomes a title-only topic;
/// blank lines yield `None`.
pub fn parse_fallback_line(line: &str) -> Option<SelectedTopic> {
    let stripped = line.trim();
    if stripped.is_empty() {
        return None;
    }

    for delimiter in ["|", "｜"] {
        if let Some((title, description)) = stripped.split_once(delimiter) {
            let title = title.trim();
            let description = description.trim();
            if !title.is_empty() && !description.is_empty() {
                return Some(SelectedTopic {
                    topic_id: None,
                    title: title.to_string(),
                    description: description.to_string(),
                });
            }
        }
    }

    Some(SelectedTopic {
        topic_id: None,
        title: stripped.to_string(),
        description: String::new(),
    })
}
