/// Display units for a progress bar, independent of the underlying step
/// count a task reports.
pub const PROGRESS_UNITS: f64 = 102.0;

/// The contract step counters drive: advance by completed steps, then snap
/// to full at the end regardless of rounding along the way.
pub trait Progress {
    fn update(&self, n: usize);
    fn complete(&self);
}

/// Maps an arbitrary step total onto the fixed display range: each update
/// advances by `n / total` of the range, and `complete` snaps to the
/// maximum so accumulated float drift never leaves a bar stuck short of
/// full.
#[derive(Debug, Clone)]
pub struct ScaledProgress {
    total: usize,
    displayed: f64,
}

impl ScaledProgress {
    pub fn new(total: usize) -> Self {
        Self {
            total: total.max(1),
            displayed: 0.0,
        }
    }

    pub fn update(&mut self, n: usize) {
        let advance = (n as f64 / self.total as f64) * PROGRESS_UNITS;
        self.displayed = (self.displayed + advance).min(PROGRESS_UNITS);
    }

    pub fn complete(&mut self) {
        self.displayed = PROGRESS_UNITS;
    }

    pub fn displayed(&self) -> f64 {
        self.displayed
    }

    /// Completed fraction in `0.0..=1.0`.
    pub fn ratio(&self) -> f64 {
        self.displayed / PROGRESS_UNITS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_updates_reach_the_maximum() {
        let mut progress = ScaledProgress::new(7);
        for _ in 0..7 {
            progress.update(1);
        }
        assert!((progress.displayed() - PROGRESS_UNITS).abs() < 1e-9);
        assert!((progress.ratio() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn complete_snaps_regardless_of_prior_updates() {
        let mut progress = ScaledProgress::new(10);
        progress.update(3);
        progress.complete();
        assert_eq!(progress.displayed(), PROGRESS_UNITS);

        let mut untouched = ScaledProgress::new(10);
        untouched.complete();
        assert_eq!(untouched.displayed(), PROGRESS_UNITS);
    }

    #[test]
    fn updates_never_overshoot_the_maximum() {
        let mut progress = ScaledProgress::new(4);
        progress.update(9);
        assert_eq!(progress.displayed(), PROGRESS_UNITS);
    }

    #[test]
    fn zero_step_totals_are_clamped() {
        let mut progress = ScaledProgress::new(0);
        progress.update(1);
        assert_eq!(progress.displayed(), PROGRESS_UNITS);
    }
}
