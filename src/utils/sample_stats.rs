//! Small numeric helpers shared by the estimator and the strategy report.

/// Mean accumulated relative to the first observation.
///
/// Identical observations therefore average to exactly that value, which
/// plain summation does not guarantee.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchoredMean {
    anchor: Option<f64>,
    offset_sum: f64,
    count: usize,
}

impl AnchoredMean {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        match self.anchor {
            None => self.anchor = Some(value),
            Some(anchor) => self.offset_sum += value - anchor,
        }
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// `None` until a value has been pushed.
    pub fn mean(&self) -> Option<f64> {
        let anchor = self.anchor?;
        Some(anchor + self.offset_sum / self.count as f64)
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    let mut acc = AnchoredMean::new();
    for &v in values {
        acc.push(v);
    }
    acc.mean()
}

/// Linear-interpolated percentile of an ascending slice, `q` in 0.0-1.0.
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    if lower == upper {
        return Some(sorted[lower]);
    }
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}
