//! Cartesian enumeration of line combinations, split into resumable chunks.

use super::types::*;
use crate::catalogue::{RewardOption, WeightedLine};
use crate::stats::Evaluator;
use std::collections::HashSet;

/// A ranking in progress for one `(position, tier)` pair.
///
/// The job owns everything it needs, so it can be driven on any thread and
/// in any chunk size. `generation` identifies the baseline it was built for.
#[derive(Debug, Clone)]
pub struct RankingJob {
    key: RankingKey,
    generation: u64,
    lines: [Vec<RewardOption>; 3],
    evaluator: Evaluator,
    cursor: usize,
    total: usize,
    scored: Vec<RankingEntry>,
}

/// Finished job output, tagged with the baseline generation it used.
#[derive(Debug, Clone)]
pub struct RankingOutcome {
    pub key: RankingKey,
    pub generation: u64,
    pub entries: Vec<RankingEntry>,
}

impl RankingJob {
    pub fn new(
        key: RankingKey,
        generation: u64,
        lines: &[WeightedLine; 3],
        evaluator: Evaluator,
    ) -> Self {
        let lines = [0, 1, 2].map(|i| lines[i].options().to_vec());
        let total = lines.iter().map(Vec::len).product();
        Self {
            key,
            generation,
            lines,
            evaluator,
            cursor: 0,
            total,
            scored: Vec::with_capacity(total),
        }
    }

    pub fn key(&self) -> RankingKey {
        self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn progress(&self) -> RankingProgress {
        RankingProgress {
            processed: self.cursor,
            total: self.total,
        }
    }

    pub fn is_done(&self) -> bool {
        self.cursor >= self.total
    }

    /// Evaluate up to `max_items` more combinations.
    pub fn step(&mut self, max_items: usize) -> RankingProgress {
        let n2 = self.lines[1].len();
        let n3 = self.lines[2].len();
        let end = self.cursor.saturating_add(max_items.max(1)).min(self.total);

        for index in self.cursor..end {
            let combo = [
                self.lines[0][index / (n2 * n3)],
                self.lines[1][(index / n3) % n2],
                self.lines[2][index % n3],
            ];
            let value_gain = self.evaluator.options_gain(combo.iter());
            self.scored.push(RankingEntry {
                lines: combo,
                value_gain,
            });
        }

        self.cursor = end;
        self.progress()
    }

    /// Drive the job to completion, calling `on_chunk` after every chunk.
    pub fn run(mut self, chunk_size: usize, mut on_chunk: impl FnMut(RankingProgress)) -> RankingOutcome {
        while !self.is_done() {
            let progress = self.step(chunk_size);
            on_chunk(progress);
        }
        self.finish()
    }

    /// Sort, deduplicate and filter the evaluated combinations. Unevaluated
    /// combinations are simply absent.
    pub fn finish(self) -> RankingOutcome {
        RankingOutcome {
            key: self.key,
            generation: self.generation,
            entries: finalize_entries(self.scored),
        }
    }
}

/// Descending by gain, one entry per unordered combination, negligible
/// gains removed.
pub fn finalize_entries(mut entries: Vec<RankingEntry>) -> Vec<RankingEntry> {
    entries.sort_by(|a, b| b.value_gain.total_cmp(&a.value_gain));

    let mut seen = HashSet::with_capacity(entries.len());
    entries.retain(|entry| seen.insert(entry.combo_key()));
    entries.retain(|entry| entry.value_gain >= MIN_RANKING_GAIN);
    entries
}

/// Fraction of ranked combinations that `gain` meets or beats, 0.0-1.0.
/// An empty ranking yields `None`.
pub fn rank_of(entries: &[RankingEntry], gain: f64) -> Option<f64> {
    if entries.is_empty() {
        return None;
    }
    // Entries are sorted descending, so count those strictly better
    let better = entries.partition_point(|e| e.value_gain > gain);
    Some(1.0 - better as f64 / entries.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{Position, RewardStat};
    use crate::stats::{ClassConfig, StatBundle};
    use crate::tiers::Tier;
    use std::sync::Arc;

    /// Linear in damage% so gains are easy to predict.
    fn evaluator() -> Evaluator {
        let value = |s: &StatBundle| 100.0 + s.damage_pct + s.boss_damage_pct;
        Evaluator::new(Arc::new(value), Some(ClassConfig::warrior()), StatBundle::default()).unwrap()
    }

    fn damage(magnitude: f64) -> RewardOption {
        RewardOption::new(RewardStat::Damage, magnitude, 1.0)
    }

    fn weighted(options: Vec<RewardOption>) -> WeightedLine {
        WeightedLine::new(options)
    }

    fn job(lines: [Vec<RewardOption>; 3]) -> RankingJob {
        let [a, b, c] = lines;
        RankingJob::new(
            (Position::Hat, Tier::Rare),
            0,
            &[weighted(a), weighted(b), weighted(c)],
            evaluator(),
        )
    }

    #[test]
    fn test_full_product_evaluated() {
        let line = vec![damage(1.0), damage(2.0)];
        let mut j = job([line.clone(), line.clone(), line]);
        assert_eq!(j.progress().total, 8);
        let progress = j.step(100);
        assert!(progress.is_done());

        // Multisets of size 3 over {1, 2}: {1,1,1} {1,1,2} {1,2,2} {2,2,2}
        let entries = j.finish().entries;
        assert_eq!(entries.len(), 4);
        let gains: Vec<f64> = entries.iter().map(|e| e.value_gain).collect();
        for (got, want) in gains.iter().zip([6.0, 5.0, 4.0, 3.0]) {
            assert!((got - want).abs() < 1e-9);
        }
    }

    #[test]
    fn test_chunked_progress_is_monotonic() {
        let line: Vec<RewardOption> = (1..=5).map(|m| damage(m as f64)).collect();
        let j = job([line.clone(), line.clone(), line]);
        let mut last = 0;
        let mut chunks = 0;
        let outcome = j.run(7, |p| {
            assert!(p.processed > last);
            last = p.processed;
            chunks += 1;
        });
        assert_eq!(last, 125);
        assert_eq!(chunks, 18);
        // C(5 + 2, 3) multisets
        assert_eq!(outcome.entries.len(), 35);
    }

    #[test]
    fn test_chunking_does_not_change_result() {
        let line: Vec<RewardOption> = (1..=4).map(|m| damage(m as f64)).collect();
        let whole = job([line.clone(), line.clone(), line.clone()]).run(1_000, |_| {});
        let pieces = job([line.clone(), line.clone(), line]).run(3, |_| {});
        assert_eq!(whole.entries, pieces.entries);
    }

    #[test]
    fn test_empty_line_gives_empty_ranking() {
        let line = vec![damage(1.0)];
        let mut j = job([line.clone(), Vec::new(), line]);
        assert!(j.is_done());
        j.step(10);
        assert!(j.finish().entries.is_empty());
    }

    #[test]
    fn test_negligible_gains_dropped() {
        let useless = RewardOption::new(RewardStat::MaxHp, 100.0, 1.0);
        let j = job([vec![useless], vec![useless], vec![useless, damage(0.005)]]);
        assert!(j.run(10, |_| {}).entries.is_empty());
    }

    #[test]
    fn test_rank_of() {
        let line = vec![damage(1.0), damage(2.0)];
        let entries = job([line.clone(), line.clone(), line]).run(100, |_| {}).entries;
        assert_eq!(rank_of(&entries, 100.0), Some(1.0));
        assert_eq!(rank_of(&entries, 4.5), Some(0.5));
        assert_eq!(rank_of(&entries, -1.0), Some(0.0));
        assert_eq!(rank_of(&[], 1.0), None);
    }
}
