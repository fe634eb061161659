//! Small numeric helpers shared by X01 and Cricket statistics.

/// Three-dart average of `score` over `darts`, rounded to two decimals.
pub fn three_dart_average(score: u32, darts: u32) -> f64 {
    if darts == 0 {
        return 0.0;
    }
    round2(score as f64 / darts as f64 * 3.0)
}

/// Percentage of `successes` over `attempts`, rounded to two decimals.
pub fn percentage(successes: u32, attempts: u32) -> f64 {
    if attempts == 0 {
        return 0.0;
    }
    round2(successes as f64 / attempts as f64 * 100.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Running mean without keeping the samples around.
#[derive(Debug, Default, Clone, Copy)]
pub struct Average {
    sum: f64,
    count: usize,
}

impl Average {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}
