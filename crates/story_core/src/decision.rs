//! crates/story_core/src/decision.rs
//!
//! Picks the story source for a request. Pure: no I/O, no failure path.

use crate::domain::{DecisionContext, Phase, StorySource};

/// Maps a decision context to a story source. First matching rule wins.
pub fn decide_story_source(ctx: &DecisionContext) -> StorySource {
    if ctx.is_offline {
        return if ctx.has_story_for_today {
            StorySource::Archive
        } else {
            StorySource::Emergency
        };
    }

    match ctx.phase {
        // Fresh content right after setup, even if something is cached.
        Phase::OnboardingEnd => StorySource::AiDaily,
        // One generation per calendar day.
        Phase::ReturningUser if ctx.has_story_for_today => StorySource::Archive,
        Phase::ReturningUser => StorySource::AiDaily,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(phase: Phase, has_story_for_today: bool, is_offline: bool) -> DecisionContext {
        DecisionContext {
            phase,
            has_story_for_today,
            is_offline,
            last_story_date: None,
        }
    }

    #[test]
    fn offline_replays_todays_story() {
        for phase in [Phase::OnboardingEnd, Phase::ReturningUser] {
            assert_eq!(decide_story_source(&ctx(phase, true, true)), StorySource::Archive);
        }
    }

    #[test]
    fn offline_without_todays_story_is_emergency() {
        for phase in [Phase::OnboardingEnd, Phase::ReturningUser] {
            assert_eq!(decide_story_source(&ctx(phase, false, true)), StorySource::Emergency);
        }
    }

    #[test]
    fn onboarding_end_always_generates_when_online() {
        assert_eq!(
            decide_story_source(&ctx(Phase::OnboardingEnd, true, false)),
            StorySource::AiDaily
        );
        assert_eq!(
            decide_story_source(&ctx(Phase::OnboardingEnd, false, false)),
            StorySource::AiDaily
        );
    }

    #[test]
    fn returning_user_generates_at_most_once_a_day() {
        assert_eq!(
            decide_story_source(&ctx(Phase::ReturningUser, true, false)),
            StorySource::Archive
        );
        assert_eq!(
            decide_story_source(&ctx(Phase::ReturningUser, false, false)),
            StorySource::AiDaily
        );
    }

    #[test]
    fn last_story_date_does_not_affect_routing() {
        let mut context = ctx(Phase::ReturningUser, false, false);
        context.last_story_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1);
        assert_eq!(decide_story_source(&context), StorySource::AiDaily);
    }
}
