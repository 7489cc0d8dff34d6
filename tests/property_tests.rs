//! Property tests over random play.

use std::collections::BTreeMap;

use memory_match::core::{CardIndex, Phase, PlayerId, SessionConfig};
use memory_match::session::{FlipOutcome, SessionController};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Step {
    Flip(u16),
    Tick,
    RunDeferred,
    Switch,
    Restart,
    Start,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        8 => (0u16..24).prop_map(Step::Flip),
        3 => Just(Step::Tick),
        3 => Just(Step::RunDeferred),
        1 => Just(Step::Switch),
        1 => Just(Step::Restart),
        1 => Just(Step::Start),
    ]
}

fn value_counts(values: &[u8]) -> BTreeMap<u8, usize> {
    let mut counts = BTreeMap::new();
    for &v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    counts
}

proptest! {
    #[test]
    fn prop_invariants_hold(
        seed in any::<u64>(),
        pairs in 1u8..=10,
        steps in prop::collection::vec(step(), 0..200),
    ) {
        let config = SessionConfig::default()
            .with_seed(seed)
            .with_pairs(pairs)
            .with_turn_seconds(3);
        let mut session = SessionController::new(config).unwrap();
        session.start_game();
        let mut pending = Vec::new();

        for step in steps {
            let before = session.snapshot();
            match step {
                Step::Flip(i) => {
                    let outcome = session.flip_card(CardIndex::new(i));
                    if let FlipOutcome::Matched { player, .. } = outcome {
                        prop_assert_eq!(player, before.current_player);
                        prop_assert_eq!(session.state().current_player(), before.current_player);
                    }
                }
                Step::Tick => { session.tick(); }
                Step::RunDeferred => {
                    if !pending.is_empty() {
                        let task = pending.remove(0);
                        session.run_deferred(task);
                    }
                }
                Step::Switch => { session.switch_turn(); }
                Step::Restart => session.restart_game(),
                Step::Start => { session.start_game(); }
            }
            pending.extend(session.take_scheduled().into_iter().map(|s| s.task));

            let snap = session.snapshot();
            prop_assert!(snap.flipped.len() <= 2);
            prop_assert_eq!(snap.matched.len() % 2, 0);
            let total: u32 = snap.scores.values().sum();
            prop_assert_eq!(total as usize * 2, snap.matched.len());
            prop_assert!(snap.flipped.iter().all(|i| !snap.matched.contains(i)));
            prop_assert!(snap.turn_timer <= 3);

            match snap.phase {
                Phase::NotStarted => prop_assert!(snap.deck.is_empty()),
                Phase::InProgress => {
                    prop_assert_eq!(snap.deck.len(), pairs as usize * 2);
                    prop_assert!(value_counts(&snap.deck.values()).values().all(|&c| c == 2));
                    prop_assert!(snap.outcome.is_none());
                }
                Phase::GameOver => {
                    prop_assert_eq!(snap.matched.len(), snap.deck.len());
                    prop_assert!(snap.outcome.is_some());
                }
            }

            // The deal never changes mid-game
            if before.phase == Phase::InProgress && snap.phase != Phase::NotStarted {
                prop_assert_eq!(before.deck.values(), snap.deck.values());
            }
        }
    }

    #[test]
    fn prop_perfect_play_ends_with_one_winner(seed in any::<u64>(), pairs in 1u8..=10) {
        let config = SessionConfig::default().with_seed(seed).with_pairs(pairs);
        let mut session = SessionController::new(config).unwrap();
        session.start_game();

        let values = session.snapshot().deck.values();
        let mut positions: BTreeMap<u8, Vec<u16>> = BTreeMap::new();
        for (i, v) in values.iter().enumerate() {
            positions.entry(*v).or_default().push(i as u16);
        }
        for pair in positions.values() {
            session.flip_card(CardIndex::new(pair[0]));
            session.flip_card(CardIndex::new(pair[1]));
        }

        let snap = session.snapshot();
        prop_assert_eq!(snap.phase, Phase::GameOver);
        prop_assert_eq!(snap.scores[PlayerId::ONE], u32::from(pairs));
        prop_assert_eq!(snap.scores[PlayerId::TWO], 0);
    }
}
