//! Integration test: tier transitions and pity
//!
//! Checks the Normal → Rare numbers end to end and that no tier can go
//! `pity_cap` attempts without transitioning when driven through real
//! slot attempts.

use cube_optimizer::catalogue::Position;
use cube_optimizer::slots::SlotState;
use cube_optimizer::stats::{ClassConfig, DamageFormula, Evaluator, StatBundle};
use cube_optimizer::tiers::{Tier, TierTable, TransitionParams};
use cube_optimizer::GameData;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

fn evaluator() -> Evaluator {
    Evaluator::new(
        Arc::new(DamageFormula::default()),
        Some(ClassConfig::warrior()),
        StatBundle::default(),
    )
    .unwrap()
}

// =============================================================================
// Normal → Rare scenario
// =============================================================================

#[test]
fn test_normal_pity_edge_is_certain() {
    let tiers = TierTable::default();
    assert_eq!(tiers.transition_probability(Tier::Normal, 16), 1.0);
    assert_eq!(tiers.transition_probability(Tier::Normal, 15), 0.06);
    assert_eq!(tiers.transition_probability(Tier::Normal, 0), 0.06);
}

#[test]
fn test_normal_empirical_rate() {
    let tiers = TierTable::default();
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let draws = 1_000_000;
    let hits = (0..draws)
        .filter(|_| tiers.should_transition(Tier::Normal, 0, &mut rng))
        .count();
    let rate = hits as f64 / draws as f64;
    assert!((0.058..=0.062).contains(&rate), "rate {rate}");
}

// =============================================================================
// Pity through slot attempts
// =============================================================================

#[test]
fn test_no_tier_outlasts_its_pity_cap() {
    let data = GameData::builtin().unwrap();
    let eval = evaluator();
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    for tier in Tier::ALL {
        let Some(params) = data.tiers.params(tier).copied() else {
            continue;
        };
        for _ in 0..5 {
            let mut slot = SlotState::new(0, Position::Ring, tier);
            let mut attempts = 0;
            while slot.tier == tier {
                slot.roll(&data, &eval, &mut rng);
                attempts += 1;
                assert!(
                    attempts <= params.pity_cap,
                    "{} took {attempts} attempts",
                    tier.name()
                );
            }
            assert_eq!(slot.tier, params.next);
        }
    }
}

#[test]
fn test_zero_rate_transitions_exactly_at_cap() {
    let tiers = TierTable::new([(
        Tier::Normal,
        TransitionParams {
            rate: 0.0,
            pity_cap: 4,
            next: Tier::Rare,
        },
    )])
    .unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let outcomes: Vec<bool> = (0..4)
        .map(|rc| tiers.should_transition(Tier::Normal, rc, &mut rng))
        .collect();
    assert_eq!(outcomes, vec![false, false, false, true]);
    assert_eq!(tiers.expected_attempts(Tier::Normal), Some(4.0));
}

#[test]
fn test_terminal_tier_never_transitions() {
    let data = GameData::builtin().unwrap();
    let eval = evaluator();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut slot = SlotState::new(0, Position::Weapon, Tier::Ancient);
    for _ in 0..200 {
        assert!(!slot.roll(&data, &eval, &mut rng).transitioned);
    }
    assert_eq!(slot.tier, Tier::Ancient);
    assert_eq!(slot.roll_count, 200);
}
