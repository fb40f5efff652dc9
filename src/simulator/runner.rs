//! Trial execution: one policy spending a budget, and the parallel grid of
//! trials behind a strategy comparison.

use super::config::SimConfig;
use super::policy::Policy;
use super::report::StrategyReport;
use crate::game_data::GameData;
use crate::slots::{aggregate_gain, SlotState};
use crate::stats::Evaluator;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

/// Read-only inputs shared by every trial.
#[derive(Debug, Clone, Copy)]
pub struct TrialContext<'a> {
    pub data: &'a GameData,
    pub evaluator: &'a Evaluator,
    /// Estimator samples per slot for the greedy policy
    pub sample_size: usize,
}

/// End state of one trial.
#[derive(Debug, Clone)]
pub struct TrialResult {
    pub policy: Policy,
    pub trial: u32,
    pub attempts_spent: u32,
    pub final_gain: f64,
    pub slots: Vec<SlotState>,
}

/// Spend up to `budget` attempts on a copy of `initial_slots`, one attempt
/// at a time, letting `policy` pick each slot. Stops early only when the
/// policy has nothing to choose.
pub fn run_strategy<R: Rng>(
    policy: Policy,
    budget: u32,
    initial_slots: &[SlotState],
    ctx: &TrialContext<'_>,
    rng: &mut R,
) -> Vec<SlotState> {
    run_trial(policy, budget, initial_slots, ctx, rng).0
}

fn run_trial<R: Rng>(
    policy: Policy,
    budget: u32,
    initial_slots: &[SlotState],
    ctx: &TrialContext<'_>,
    rng: &mut R,
) -> (Vec<SlotState>, u32) {
    let mut slots = initial_slots.to_vec();
    let mut spent = 0;
    while spent < budget {
        let Some(index) = policy.choose(&slots, ctx.data, ctx.evaluator, ctx.sample_size, rng)
        else {
            break;
        };
        slots[index].roll(ctx.data, ctx.evaluator, rng);
        spent += 1;
    }
    (slots, spent)
}

fn trial_rng(seed: Option<u64>, cell: u64) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(cell)),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Run `config.num_trials` trials of every policy in parallel and summarize.
///
/// Each cell of the policy × trial grid owns its slots and RNG; with a seed,
/// cell `policy_index * num_trials + trial` uses `seed + cell`.
pub fn compare_strategies(
    policies: &[Policy],
    config: &SimConfig,
    initial_slots: &[SlotState],
    data: &GameData,
    evaluator: &Evaluator,
) -> StrategyReport {
    let start = Instant::now();
    let ctx = TrialContext {
        data,
        evaluator,
        sample_size: config.greedy_sample_size,
    };
    let trials = config.num_trials as u64;
    let cells = policies.len() as u64 * trials;

    let results: Vec<(usize, TrialResult)> = (0..cells)
        .into_par_iter()
        .map(|cell| {
            let policy_index = (cell / trials) as usize;
            let policy = policies[policy_index];
            let trial = (cell % trials) as u32;
            let mut rng = trial_rng(config.seed, cell);
            let (slots, attempts_spent) =
                run_trial(policy, config.budget, initial_slots, &ctx, &mut rng);
            let final_gain = aggregate_gain(&slots);
            if config.verbosity >= 2 {
                debug!(policy = policy.name(), trial, final_gain, "trial finished");
            }
            let result = TrialResult {
                policy,
                trial,
                attempts_spent,
                final_gain,
                slots,
            };
            (policy_index, result)
        })
        .collect();

    let mut per_policy: Vec<Vec<TrialResult>> = policies.iter().map(|_| Vec::new()).collect();
    for (i, result) in results {
        per_policy[i].push(result);
    }

    let report = StrategyReport::from_trials(
        config,
        aggregate_gain(initial_slots),
        initial_slots.len(),
        policies,
        per_policy,
    );
    if config.verbosity >= 1 {
        for summary in &report.summaries {
            info!(
                policy = %summary.policy,
                mean = summary.mean,
                p50 = summary.p50,
                "policy summary"
            );
        }
        info!(
            trials = cells,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "strategy comparison finished"
        );
    }
    report
}
