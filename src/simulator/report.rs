//! Strategy comparison report generation.

use super::config::SimConfig;
use super::policy::Policy;
use super::runner::TrialResult;
use crate::slots::SlotState;
use crate::utils::sample_stats::{mean, percentile};
use chrono::Utc;
use serde::Serialize;

/// Counts of trial gains over `[lower, upper]` split into equal buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub lower: f64,
    pub upper: f64,
    pub counts: Vec<u32>,
}

impl Histogram {
    pub fn build(values: &[f64], lower: f64, upper: f64, bins: usize) -> Self {
        let bins = bins.max(1);
        let mut counts = vec![0; bins];
        let width = upper - lower;
        for &v in values {
            let bin = if width > 0.0 {
                (((v - lower) / width) * bins as f64).floor().max(0.0) as usize
            } else {
                0
            };
            counts[bin.min(bins - 1)] += 1;
        }
        Self {
            lower,
            upper,
            counts,
        }
    }

    pub fn bin_width(&self) -> f64 {
        (self.upper - self.lower) / self.counts.len() as f64
    }
}

/// Outcome distribution of one policy across its trials.
#[derive(Debug, Clone, Serialize)]
pub struct PolicySummary {
    pub policy: String,
    /// Final aggregate gain of each trial, in trial order
    pub gains: Vec<f64>,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub avg_attempts_spent: f64,
    /// End state of the best trial
    pub best_slots: Vec<SlotState>,
    pub histogram: Histogram,
}

impl PolicySummary {
    pub fn from_trials(
        policy: Policy,
        mut trials: Vec<TrialResult>,
        hist_lower: f64,
        hist_upper: f64,
        bins: usize,
    ) -> Self {
        trials.sort_by_key(|t| t.trial);
        let gains: Vec<f64> = trials.iter().map(|t| t.final_gain).collect();

        let mut sorted = gains.clone();
        sorted.sort_by(f64::total_cmp);

        let attempts: Vec<f64> = trials.iter().map(|t| t.attempts_spent as f64).collect();

        // First trial wins ties for best
        let mut best: Option<&TrialResult> = None;
        for t in &trials {
            if best.map_or(true, |b| t.final_gain > b.final_gain) {
                best = Some(t);
            }
        }

        Self {
            policy: policy.name().to_string(),
            mean: mean(&gains).unwrap_or(0.0),
            min: sorted.first().copied().unwrap_or(0.0),
            max: sorted.last().copied().unwrap_or(0.0),
            p25: percentile(&sorted, 0.25).unwrap_or(0.0),
            p50: percentile(&sorted, 0.5).unwrap_or(0.0),
            p75: percentile(&sorted, 0.75).unwrap_or(0.0),
            avg_attempts_spent: mean(&attempts).unwrap_or(0.0),
            best_slots: best.map(|b| b.slots.clone()).unwrap_or_default(),
            histogram: Histogram::build(&gains, hist_lower, hist_upper, bins),
            gains,
        }
    }
}

/// Aggregated results of a strategy comparison.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyReport {
    /// Unix timestamp of report creation
    pub generated_at: i64,
    pub config: SimConfig,
    pub slot_count: usize,
    pub initial_gain: f64,
    /// One summary per policy, in the order the policies were given
    pub summaries: Vec<PolicySummary>,
}

impl StrategyReport {
    /// Summarize per-policy trial results. Histograms of all policies share
    /// one range so they can be compared bucket by bucket.
    pub fn from_trials(
        config: &SimConfig,
        initial_gain: f64,
        slot_count: usize,
        policies: &[Policy],
        per_policy: Vec<Vec<TrialResult>>,
    ) -> Self {
        let all = per_policy.iter().flatten().map(|t| t.final_gain);
        let lower = all.clone().fold(f64::INFINITY, f64::min);
        let upper = all.fold(f64::NEG_INFINITY, f64::max);
        let (lower, upper) = if lower.is_finite() && upper.is_finite() {
            (lower, upper)
        } else {
            (initial_gain, initial_gain)
        };

        let summaries = policies
            .iter()
            .zip(per_policy)
            .map(|(&policy, trials)| {
                PolicySummary::from_trials(policy, trials, lower, upper, config.histogram_bins)
            })
            .collect();

        Self {
            generated_at: Utc::now().timestamp(),
            config: config.clone(),
            slot_count,
            initial_gain,
            summaries,
        }
    }

    /// Summary with the highest mean; earlier policies win ties.
    pub fn best_policy(&self) -> Option<&PolicySummary> {
        let mut best: Option<&PolicySummary> = None;
        for s in &self.summaries {
            if best.map_or(true, |b| s.mean > b.mean) {
                best = Some(s);
            }
        }
        best
    }

    /// Generate a text report.
    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str("═══════════════════════════════════════════════════════════════\n");
        report.push_str("                  STRATEGY COMPARISON REPORT\n");
        report.push_str("═══════════════════════════════════════════════════════════════\n\n");

        report.push_str(&format!(
            "Trials: {} per policy, budget {} attempts, {} slots\n",
            self.config.num_trials, self.config.budget, self.slot_count
        ));
        match self.config.seed {
            Some(seed) => report.push_str(&format!("Seed: {}\n", seed)),
            None => report.push_str("Seed: random\n"),
        }
        report.push_str(&format!("Initial Gain: {:.2}%\n\n", self.initial_gain));

        report.push_str("── SUMMARY ──────────────────────────────────────────────────────\n");
        report.push_str("  Policy               Mean      Min      P25      P50      P75      Max\n");
        report.push_str("  ──────               ────      ───      ───      ───      ───      ───\n");
        for s in &self.summaries {
            report.push_str(&format!(
                "  {:<18} {:>7.2}  {:>7.2}  {:>7.2}  {:>7.2}  {:>7.2}  {:>7.2}\n",
                s.policy, s.mean, s.min, s.p25, s.p50, s.p75, s.max
            ));
        }
        report.push('\n');

        report.push_str("── DISTRIBUTION ─────────────────────────────────────────────────\n");
        for s in &self.summaries {
            report.push_str(&format!("  {}\n", s.policy));
            let peak = s.histogram.counts.iter().copied().max().unwrap_or(0).max(1);
            let width = s.histogram.bin_width();
            for (i, &count) in s.histogram.counts.iter().enumerate() {
                if count == 0 {
                    continue;
                }
                let from = s.histogram.lower + width * i as f64;
                let bar_len = (count as f64 / peak as f64 * 30.0).ceil() as usize;
                report.push_str(&format!(
                    "    {:>8.2}%  {:>5}  {}\n",
                    from,
                    count,
                    "█".repeat(bar_len)
                ));
            }
        }
        report.push('\n');

        report.push_str("── VERDICT ──────────────────────────────────────────────────────\n");
        if let Some(best) = self.best_policy() {
            report.push_str(&format!(
                "  Best Mean:  {} ({:.2}%, {:+.2} over initial)\n",
                best.policy,
                best.mean,
                best.mean - self.initial_gain
            ));
            let stalled: Vec<&str> = self
                .summaries
                .iter()
                .filter(|s| s.avg_attempts_spent < self.config.budget as f64)
                .map(|s| s.policy.as_str())
                .collect();
            if !stalled.is_empty() {
                report.push_str(&format!(
                    "  ⚠️  Budget not fully spent by: {}\n",
                    stalled.join(", ")
                ));
            }
        } else {
            report.push_str("  No policies were run\n");
        }

        report.push_str("\n═══════════════════════════════════════════════════════════════\n");

        report
    }

    /// Generate a JSON report for further analysis.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
