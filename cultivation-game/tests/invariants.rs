use cultivation_game::{
    Action, GameConfig, GameSession, LAST_STAGE, STAGES, SpiritualRoot, UpgradeId,
};
use proptest::prelude::*;

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => Just(Action::GatherQi),
        1 => Just(Action::StartMeditation),
        1 => Just(Action::StopMeditation),
        2 => Just(Action::AttemptBreakthrough),
        1 => Just(Action::AttemptComprehension),
        1 => Just(Action::RecruitDisciple),
        1 => Just(Action::TrainDisciples),
        1 => Just(Action::ExpandSect),
        1 => prop::sample::select(UpgradeId::ALL.to_vec())
            .prop_map(|upgrade| Action::PurchaseUpgrade { upgrade }),
        1 => prop::sample::select(SpiritualRoot::ALL.to_vec())
            .prop_map(|root| Action::SelectRoot { root }),
        1 => Just(Action::RefinePill),
        1 => Just(Action::ConsumePill),
        1 => any::<bool>().prop_map(|confirmed| Action::AttemptRebirth { confirmed }),
    ]
}

#[test]
fn stage_thresholds_are_strictly_increasing() {
    assert!(STAGES[0].qi_threshold.abs() <= f64::EPSILON);
    for pair in STAGES.windows(2) {
        assert!(pair[0].qi_threshold < pair[1].qi_threshold);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn random_play_keeps_state_consistent(
        seed in any::<u64>(),
        starting_qi in 0.0f64..200_000.0,
        stones in 0u64..2_000,
        script in prop::collection::vec((action_strategy(), 0u64..20_000), 1..60),
    ) {
        let mut session = GameSession::seeded(GameConfig::default(), seed);
        session.state_mut().qi = starting_qi;
        session.state_mut().spirit_stones = stones;

        let mut achievements = session.state().achievements.clone();
        let mut insights = session.state().dao_insights.clone();
        let mut rebirths = session.state().rebirths;

        for (action, wait) in script {
            let stage_before = session.state().current_stage;
            let breakthrough = action == Action::AttemptBreakthrough;
            session.perform(action);
            let stage_after = session.state().current_stage;
            if breakthrough {
                prop_assert!(stage_after == stage_before || stage_after == stage_before + 1);
            }
            session.advance(wait);

            let state = session.state();
            prop_assert!(state.qi >= 0.0);
            prop_assert!(state.qi.is_finite());
            prop_assert!(state.current_stage <= LAST_STAGE);
            prop_assert_eq!(state.meditating, session.is_meditating());

            // Rebirth is the only step allowed to change these sets, and it
            // carries them forward under the default configuration.
            prop_assert!(state.achievements.is_superset(&achievements));
            prop_assert!(state.dao_insights.is_superset(&insights));
            prop_assert!(state.rebirths >= rebirths);
            achievements = state.achievements.clone();
            insights = state.dao_insights.clone();
            rebirths = state.rebirths;
        }
    }

    #[test]
    fn passive_time_never_breaks_through(
        seed in any::<u64>(),
        qi in 0.0f64..1_000_000.0,
        minutes in 1u64..30,
    ) {
        let mut session = GameSession::seeded(GameConfig::default(), seed);
        session.state_mut().qi = qi;
        session.advance(minutes * 60_000);
        prop_assert_eq!(session.state().current_stage, 0);
    }

    #[test]
    fn snapshots_restore_identically(
        seed in any::<u64>(),
        gathers in 0usize..300,
    ) {
        let mut session = GameSession::seeded(GameConfig::default(), seed);
        for _ in 0..gathers {
            session.gather_qi();
        }
        let json = session.snapshot().unwrap();
        let restored = cultivation_game::load_snapshot(&json).unwrap();
        let live = session.state();
        prop_assert!((restored.qi - live.qi).abs() <= 1e-9 * live.qi.max(1.0));
        prop_assert_eq!(restored.current_stage, live.current_stage);
        prop_assert_eq!(restored.spirit_stones, live.spirit_stones);
        prop_assert_eq!(&restored.achievements, &live.achievements);
        prop_assert_eq!(&restored.dao_insights, &live.dao_insights);
    }
}
