// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Initiation gating: decides whether a stream may receive a proactive
//! message right now.
//!
//! The gate chain is ordered; the first failing gate wins and later gates
//! are not evaluated. A forced evaluation bypasses the soft gates (quiet
//! hours, cooldown, silence, probability) but never the two hard gates
//! (plugin enabled, stream active).

use icebreaker_config::PluginSettings;
use icebreaker_core::types::{DecisionReason, InitiationDecision, StreamTarget};
use rand::Rng;

/// Evaluate the gate chain for one stream at epoch-second `now`.
///
/// The RNG is injected so the probabilistic gate is deterministic under
/// test; production callers pass a freshly seeded [`rand::rngs::StdRng`].
pub fn should_initiate<R: Rng>(
    stream: &StreamTarget,
    settings: &PluginSettings,
    now: f64,
    force: bool,
    rng: &mut R,
) -> InitiationDecision {
    if !settings.enabled {
        return InitiationDecision::hold(DecisionReason::PluginDisabled);
    }

    if !stream.active {
        return InitiationDecision::hold(DecisionReason::StreamInactive);
    }

    if !force && settings.quiet_hours.is_active_epoch(now) {
        return InitiationDecision::hold(DecisionReason::QuietHours);
    }

    if force {
        return InitiationDecision::go(DecisionReason::Force);
    }

    // Cooldown and silence both use strict `<`: an elapsed time exactly
    // equal to the threshold passes the gate.
    if stream.last_bot_initiate_ts > 0.0
        && now - stream.last_bot_initiate_ts < settings.cooldown_seconds as f64
    {
        return InitiationDecision::hold(DecisionReason::Cooldown);
    }

    if stream.last_user_message_ts > 0.0
        && now - stream.last_user_message_ts < settings.silence_seconds as f64
    {
        return InitiationDecision::hold(DecisionReason::ConversationActive);
    }

    if rng.gen_range(0.0..1.0) >= settings.trigger_probability {
        return InitiationDecision::hold(DecisionReason::RandomGate);
    }

    InitiationDecision::go(DecisionReason::Ready)
}

#[cfg(test)]
mod tests {
    use super::*;
    use icebreaker_config::QuietHours;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn stream() -> StreamTarget {
        StreamTarget {
            unified_msg_origin: "qq:1".to_string(),
            session_name: "group:1".to_string(),
            platform: "qq".to_string(),
            is_group: true,
            active: true,
            last_user_message_ts: 0.0,
            last_bot_initiate_ts: 0.0,
            created_at: 0.0,
            updated_at: 0.0,
        }
    }

    fn settings() -> PluginSettings {
        PluginSettings {
            trigger_probability: 1.0,
            ..PluginSettings::default()
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn disabled_plugin_wins_over_everything() {
        let mut settings = settings();
        settings.enabled = false;
        let mut inactive = stream();
        inactive.active = false;

        // Even an inactive stream under force reports plugin_disabled first.
        let decision = should_initiate(&inactive, &settings, 1000.0, true, &mut rng());
        assert!(!decision.should_send);
        assert_eq!(decision.reason, DecisionReason::PluginDisabled);
    }

    #[test]
    fn inactive_stream_blocks_even_forced() {
        let mut inactive = stream();
        inactive.active = false;

        let decision = should_initiate(&inactive, &settings(), 1000.0, true, &mut rng());
        assert!(!decision.should_send);
        assert_eq!(decision.reason, DecisionReason::StreamInactive);
    }

    #[test]
    fn force_bypasses_quiet_hours_cooldown_silence_and_probability() {
        let mut settings = settings();
        settings.quiet_hours = QuietHours {
            enabled: true,
            start_minutes: 0,
            end_minutes: 0, // always active when enabled
        };
        settings.trigger_probability = 0.0;
        let mut target = stream();
        target.last_bot_initiate_ts = 999.0;
        target.last_user_message_ts = 999.0;

        let decision = should_initiate(&target, &settings, 1000.0, true, &mut rng());
        assert!(decision.should_send);
        assert_eq!(decision.reason, DecisionReason::Force);
    }

    #[test]
    fn quiet_hours_block_unforced_ticks() {
        let mut settings = settings();
        settings.quiet_hours = QuietHours {
            enabled: true,
            start_minutes: 0,
            end_minutes: 0,
        };

        let decision = should_initiate(&stream(), &settings, 1000.0, false, &mut rng());
        assert_eq!(decision.reason, DecisionReason::QuietHours);
    }

    #[test]
    fn cooldown_boundary_is_strict() {
        let mut settings = settings();
        settings.cooldown_seconds = 100;
        settings.silence_seconds = 0;
        let mut target = stream();
        target.last_bot_initiate_ts = 1000.0;

        // Exactly at the boundary: not blocked.
        let at = should_initiate(&target, &settings, 1100.0, false, &mut rng());
        assert!(at.should_send, "elapsed == cooldown must pass");

        // One second short: blocked.
        let under = should_initiate(&target, &settings, 1099.0, false, &mut rng());
        assert_eq!(under.reason, DecisionReason::Cooldown);
    }

    #[test]
    fn silence_boundary_is_strict() {
        let mut settings = settings();
        settings.silence_seconds = 60;
        let mut target = stream();
        target.last_user_message_ts = 1000.0;

        let at = should_initiate(&target, &settings, 1060.0, false, &mut rng());
        assert!(at.should_send, "elapsed == silence must pass");

        let under = should_initiate(&target, &settings, 1059.0, false, &mut rng());
        assert_eq!(under.reason, DecisionReason::ConversationActive);
    }

    #[test]
    fn never_seen_timestamps_skip_their_gates() {
        // Zero timestamps mean "never happened"; cooldown and silence do
        // not apply.
        let decision = should_initiate(&stream(), &settings(), 1000.0, false, &mut rng());
        assert!(decision.should_send);
        assert_eq!(decision.reason, DecisionReason::Ready);
    }

    #[test]
    fn probability_zero_never_fires() {
        let mut settings = settings();
        settings.trigger_probability = 0.0;

        let mut rng = rng();
        for _ in 0..50 {
            let decision = should_initiate(&stream(), &settings, 1000.0, false, &mut rng);
            assert_eq!(decision.reason, DecisionReason::RandomGate);
        }
    }

    #[test]
    fn probability_one_always_fires() {
        let mut rng = rng();
        for _ in 0..50 {
            let decision = should_initiate(&stream(), &settings(), 1000.0, false, &mut rng);
            assert_eq!(decision.reason, DecisionReason::Ready);
        }
    }
}
