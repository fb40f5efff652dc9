//! The engine context: game data, the active class and baseline, the ranking
//! cache and the RNG used for guidance.

use crate::catalogue::{Position, WeightedLine};
use crate::error::GuidanceError;
use crate::estimator::{self, MarginalGain, SlotChoice, GUIDANCE_SAMPLE_SIZE};
use crate::game_data::GameData;
use crate::ranking::{
    rank_of, RankingCache, RankingClaim, RankingEntry, RankingJob, RankingKey, RankingOutcome,
    RankingProgress, RANKING_CHUNK_SIZE,
};
use crate::simulator::{compare_strategies, Policy, SimConfig, StrategyReport};
use crate::slots::{refresh_all, SlotState};
use crate::stats::{ClassConfig, Evaluator, StatBundle, ValueFunction};
use crate::tiers::Tier;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct Engine {
    data: Arc<GameData>,
    value_fn: Arc<dyn ValueFunction>,
    class: Option<ClassConfig>,
    baseline: StatBundle,
    cache: RankingCache,
    rng: ChaCha8Rng,
    chunk_size: usize,
    guidance_sample_size: usize,
}

/// A ranking running on the rayon pool.
///
/// The key stays claimed while this handle is alive. Dropping it lets the
/// key be scheduled again; the worker's result is then lost.
#[derive(Debug)]
pub struct PendingRanking {
    key: RankingKey,
    generation: u64,
    rx: Receiver<RankingOutcome>,
    _claim: RankingClaim,
}

impl PendingRanking {
    pub fn key(&self) -> RankingKey {
        self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait up to `timeout` for the result. A timeout is not an error: it
    /// is logged and the caller may wait again later.
    pub fn wait(&self, timeout: Duration) -> Option<RankingOutcome> {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    position = ?self.key.0,
                    tier = ?self.key.1,
                    timeout_ms = timeout.as_millis() as u64,
                    "ranking not ready"
                );
                None
            }
            Err(RecvTimeoutError::Disconnected) => {
                warn!(position = ?self.key.0, tier = ?self.key.1, "ranking worker went away");
                None
            }
        }
    }
}

/// Everything a player needs to decide where the next attempt goes.
#[derive(Debug, Clone, Serialize)]
pub struct Advice {
    pub choice: Option<SlotChoice>,
    /// Transition probability of the chosen slot's next attempt
    pub transition_probability: Option<f64>,
    /// Gain of the chosen slot's current lines under the active baseline
    pub current_gain: Option<f64>,
    /// Share of possible combinations the chosen slot's current lines meet or beat
    pub current_rank: Option<f64>,
    /// Best combinations for the chosen slot's position and tier
    pub top_entries: Vec<RankingEntry>,
}

impl Engine {
    pub fn new(data: GameData, value_fn: Arc<dyn ValueFunction>) -> Self {
        Self::with_rng(data, value_fn, ChaCha8Rng::from_entropy())
    }

    /// Engine with reproducible guidance.
    pub fn with_seed(data: GameData, value_fn: Arc<dyn ValueFunction>, seed: u64) -> Self {
        Self::with_rng(data, value_fn, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(data: GameData, value_fn: Arc<dyn ValueFunction>, rng: ChaCha8Rng) -> Self {
        Self {
            data: Arc::new(data),
            value_fn,
            class: None,
            baseline: StatBundle::default(),
            cache: RankingCache::new(),
            rng,
            chunk_size: RANKING_CHUNK_SIZE,
            guidance_sample_size: GUIDANCE_SAMPLE_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Estimator samples per slot used by `advise`.
    pub fn with_guidance_sample_size(mut self, sample_size: usize) -> Self {
        self.guidance_sample_size = sample_size.max(1);
        self
    }

    pub fn guidance_sample_size(&self) -> usize {
        self.guidance_sample_size
    }

    pub fn data(&self) -> &GameData {
        &self.data
    }

    pub fn class(&self) -> Option<&ClassConfig> {
        self.class.as_ref()
    }

    pub fn baseline(&self) -> &StatBundle {
        &self.baseline
    }

    pub fn cache(&self) -> &RankingCache {
        &self.cache
    }

    /// Replace the baseline. Cached and in-flight rankings become stale.
    pub fn set_baseline(&mut self, baseline: StatBundle) {
        self.baseline = baseline;
        self.cache.invalidate();
    }

    /// Replace the active class. Cached and in-flight rankings become stale.
    pub fn set_class(&mut self, class: Option<ClassConfig>) {
        self.class = class;
        self.cache.invalidate();
    }

    pub fn evaluator(&self) -> Result<Evaluator, GuidanceError> {
        Evaluator::new(
            Arc::clone(&self.value_fn),
            self.class.clone(),
            self.baseline.clone(),
        )
    }

    fn job(&self, position: Position, tier: Tier) -> Result<RankingJob, GuidanceError> {
        let evaluator = self.evaluator()?;
        let empty: [WeightedLine; 3] = Default::default();
        let lines = self.data.rolls.lines(position, tier).unwrap_or(&empty);
        Ok(RankingJob::new(
            (position, tier),
            self.cache.generation(),
            lines,
            evaluator,
        ))
    }

    /// Every distinct combination for `position` at `tier`, best first.
    /// Empty when the catalogue has nothing to roll there.
    pub fn rank_combinations(
        &mut self,
        position: Position,
        tier: Tier,
    ) -> Result<Arc<[RankingEntry]>, GuidanceError> {
        self.rank_combinations_with_progress(position, tier, |_| {})
    }

    /// As `rank_combinations`, reporting progress after every chunk.
    pub fn rank_combinations_with_progress(
        &mut self,
        position: Position,
        tier: Tier,
        on_chunk: impl FnMut(RankingProgress),
    ) -> Result<Arc<[RankingEntry]>, GuidanceError> {
        let key = (position, tier);
        if let Some(entries) = self.cache.get(&key) {
            debug!(?position, ?tier, "ranking cache hit");
            return Ok(entries);
        }

        let start = Instant::now();
        let job = self.job(position, tier)?;
        let total = job.progress().total;
        let outcome = job.run(self.chunk_size, on_chunk);
        info!(
            ?position,
            ?tier,
            combinations = total,
            kept = outcome.entries.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "ranking finished"
        );

        // Built for the current generation, so the store cannot refuse it
        Ok(self
            .cache
            .store(outcome)
            .unwrap_or_else(|| Arc::from(Vec::new())))
    }

    /// Start a ranking on the rayon pool. `None` when `key` is already
    /// cached or being computed.
    pub fn spawn_ranking(
        &mut self,
        key: RankingKey,
    ) -> Result<Option<PendingRanking>, GuidanceError> {
        let job = self.job(key.0, key.1)?;
        let Some(claim) = self.cache.begin(key) else {
            return Ok(None);
        };

        let (tx, rx) = mpsc::channel();
        let chunk_size = self.chunk_size;
        let generation = job.generation();
        rayon::spawn(move || {
            let outcome = job.run(chunk_size, |_| {});
            // The receiver may have been dropped; the result is simply lost
            let _ = tx.send(outcome);
        });
        debug!(position = ?key.0, tier = ?key.1, generation, "ranking spawned");

        Ok(Some(PendingRanking {
            key,
            generation,
            rx,
            _claim: claim,
        }))
    }

    /// Store a background result. Results computed for an older baseline
    /// are discarded and `None` is returned.
    pub fn accept(&mut self, outcome: RankingOutcome) -> Option<Arc<[RankingEntry]>> {
        self.cache.store(outcome)
    }

    /// Give up on a spawned ranking so the key can be scheduled again.
    pub fn abandon(&mut self, pending: PendingRanking) {
        if pending.generation == self.cache.generation() {
            self.cache.abandon(&pending.key);
        }
    }

    pub fn cached_ranking(&self, key: &RankingKey) -> Option<Arc<[RankingEntry]>> {
        self.cache.get(key)
    }

    /// Marginal gain of one more attempt on `slot`. The slot's current gain
    /// is recomputed for the active class and baseline first.
    pub fn expected_marginal_gain(
        &mut self,
        slot: &SlotState,
        sample_size: usize,
    ) -> Result<MarginalGain, GuidanceError> {
        let evaluator = self.evaluator()?;
        let mut slot = slot.clone();
        slot.refresh_gain(&evaluator);
        Ok(estimator::expected_marginal_gain(
            &slot,
            &self.data,
            &evaluator,
            sample_size,
            &mut self.rng,
        ))
    }

    /// Slot with the highest marginal gain, judged against gains recomputed
    /// for the active class and baseline.
    pub fn select_best_slot(
        &mut self,
        slots: &[SlotState],
        sample_size: usize,
    ) -> Result<Option<SlotChoice>, GuidanceError> {
        let evaluator = self.evaluator()?;
        let slots = refreshed(slots, &evaluator);
        Ok(estimator::select_best_slot(
            &slots,
            &self.data,
            &evaluator,
            sample_size,
            &mut self.rng,
        ))
    }

    /// Recommend a slot and show how its current lines compare with the
    /// best `top_n` it could roll.
    pub fn advise(&mut self, slots: &[SlotState], top_n: usize) -> Result<Advice, GuidanceError> {
        let evaluator = self.evaluator()?;
        let slots = refreshed(slots, &evaluator);
        let choice = estimator::select_best_slot(
            &slots,
            &self.data,
            &evaluator,
            self.guidance_sample_size,
            &mut self.rng,
        );
        let Some(choice) = choice else {
            return Ok(Advice {
                choice: None,
                transition_probability: None,
                current_gain: None,
                current_rank: None,
                top_entries: Vec::new(),
            });
        };

        let slot = &slots[choice.index];
        let entries = self.rank_combinations(slot.position, slot.tier)?;
        Ok(Advice {
            choice: Some(choice),
            transition_probability: Some(
                self.data
                    .tiers
                    .transition_probability(slot.tier, slot.roll_count),
            ),
            current_gain: Some(slot.cached_value_gain),
            current_rank: rank_of(&entries, slot.cached_value_gain),
            top_entries: entries.iter().take(top_n).copied().collect(),
        })
    }

    /// Run every policy in `policies` against `slots` as configured. Slot
    /// gains are recomputed for the active class and baseline before the
    /// first trial.
    pub fn compare_strategies(
        &self,
        policies: &[Policy],
        config: &SimConfig,
        slots: &[SlotState],
    ) -> Result<StrategyReport, GuidanceError> {
        let evaluator = self.evaluator()?;
        let slots = refreshed(slots, &evaluator);
        Ok(compare_strategies(
            policies,
            config,
            &slots,
            &self.data,
            &evaluator,
        ))
    }
}

fn refreshed(slots: &[SlotState], evaluator: &Evaluator) -> Vec<SlotState> {
    let mut slots = slots.to_vec();
    refresh_all(&mut slots, evaluator);
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::DamageFormula;

    fn engine() -> Engine {
        let mut engine = Engine::with_seed(GameData::builtin().unwrap(), Arc::new(DamageFormula::default()), 3);
        engine.set_class(Some(ClassConfig::warrior()));
        engine
    }

    #[test]
    fn test_guidance_requires_class() {
        let mut engine = Engine::with_seed(GameData::builtin().unwrap(), Arc::new(DamageFormula::default()), 1);
        assert_eq!(
            engine.rank_combinations(Position::Hat, Tier::Rare).unwrap_err(),
            GuidanceError::NoActiveClass
        );
        let slot = SlotState::new(0, Position::Hat, Tier::Rare);
        assert!(engine.expected_marginal_gain(&slot, 5).is_err());
    }

    #[test]
    fn test_rank_is_cached_and_invalidated() {
        let mut engine = engine();
        let first = engine.rank_combinations(Position::Hat, Tier::Rare).unwrap();
        let second = engine.rank_combinations(Position::Hat, Tier::Rare).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let mut baseline = StatBundle::default();
        baseline.primary_stat = 2000.0;
        engine.set_baseline(baseline);
        assert!(engine.cached_ranking(&(Position::Hat, Tier::Rare)).is_none());
    }

    #[test]
    fn test_progress_reported_per_chunk() {
        let mut engine = engine().with_chunk_size(10);
        let mut seen = Vec::new();
        engine
            .rank_combinations_with_progress(Position::Weapon, Tier::Epic, |p| seen.push(p.processed))
            .unwrap();
        assert!(!seen.is_empty());
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_spawned_ranking_round_trip() {
        let mut engine = engine();
        let key = (Position::Gloves, Tier::Unique);
        let pending = engine.spawn_ranking(key).unwrap().unwrap();
        assert!(engine.spawn_ranking(key).unwrap().is_none());

        let outcome = pending.wait(Duration::from_secs(30)).unwrap();
        assert!(engine.accept(outcome).is_some());
        assert!(engine.cached_ranking(&key).is_some());
    }

    #[test]
    fn test_stale_spawned_ranking_discarded() {
        let mut engine = engine();
        let key = (Position::Hat, Tier::Epic);
        let pending = engine.spawn_ranking(key).unwrap().unwrap();
        engine.set_baseline(StatBundle::default());

        let outcome = pending.wait(Duration::from_secs(30)).unwrap();
        assert!(engine.accept(outcome).is_none());
        assert!(engine.cached_ranking(&key).is_none());
        // the key can be scheduled again for the new baseline
        assert!(engine.spawn_ranking(key).unwrap().is_some());
    }

    #[test]
    fn test_advise_empty_slots() {
        let mut engine = engine();
        let advice = engine.advise(&[], 5).unwrap();
        assert!(advice.choice.is_none());
        assert!(advice.top_entries.is_empty());
    }

    #[test]
    fn test_advise_picks_a_slot() {
        let mut engine = engine();
        let slots = vec![
            SlotState::new(4, Position::Hat, Tier::Rare),
            SlotState::new(9, Position::Weapon, Tier::Rare),
        ];
        let advice = engine.advise(&slots, 3).unwrap();
        let choice = advice.choice.unwrap();
        assert!(choice.slot_id == 4 || choice.slot_id == 9);
        assert!(advice.top_entries.len() <= 3);
        assert!(advice.transition_probability.is_some());
    }

    #[test]
    fn test_dropped_pending_ranking_releases_key() {
        let mut engine = engine();
        let key = (Position::Belt, Tier::Rare);
        let pending = engine.spawn_ranking(key).unwrap().unwrap();
        assert!(engine.cache().is_in_progress(&key));
        drop(pending);

        assert!(!engine.cache().is_in_progress(&key));
        let again = engine.spawn_ranking(key).unwrap().unwrap();
        let outcome = again.wait(Duration::from_secs(30)).unwrap();
        assert!(engine.accept(outcome).is_some());
    }

    #[test]
    fn test_advise_uses_gains_for_current_baseline() {
        use crate::catalogue::{RewardOption, RewardStat};

        let mut engine = engine();
        let boss = RewardOption::new(RewardStat::BossDamage, 40.0, 1.0);
        let mut slot = SlotState::new(1, Position::Hat, Tier::Rare).with_lines([Some(boss), None, None]);
        slot.refresh_gain(&engine.evaluator().unwrap());

        let mut baseline = StatBundle::default();
        baseline.boss_damage_pct = 200.0;
        engine.set_baseline(baseline);
        let fresh = engine.evaluator().unwrap().lines_gain(&slot.current_lines);
        assert!((slot.cached_value_gain - fresh).abs() > 1.0);

        let advice = engine.advise(std::slice::from_ref(&slot), 3).unwrap();
        assert_eq!(advice.current_gain, Some(fresh));
        let entries = engine.rank_combinations(Position::Hat, Tier::Rare).unwrap();
        assert_eq!(advice.current_rank, rank_of(&entries, fresh));

        let estimate = engine.expected_marginal_gain(&slot, 50).unwrap();
        assert_eq!(
            estimate.marginal_gain,
            estimate.expected_value_after - fresh
        );
    }

    #[test]
    fn test_guidance_sample_size_is_configurable() {
        assert_eq!(engine().guidance_sample_size(), GUIDANCE_SAMPLE_SIZE);
        let clamped = engine().with_guidance_sample_size(0);
        assert_eq!(clamped.guidance_sample_size(), 1);
        let larger = clamped.with_guidance_sample_size(64);
        assert_eq!(larger.guidance_sample_size(), 64);
    }
}
