//! Power-usage simulation behind the dashboard chart.
//!
//! The estimate is a pure function of which devices are switched on,
//! smoothed toward its target by exponential decay on a fixed tick.

use std::collections::VecDeque;
use std::time::Duration;

/// Chart ceiling in kWh; the target is clamped to it.
pub const Y_MAX: f64 = 3.5;

/// Number of samples kept on the chart.
pub const MAX_POINTS: usize = 120;

pub const TICK: Duration = Duration::from_secs(1);

/// Smoothing time constant.
pub const TAU: Duration = Duration::from_secs(4);

/// Nominal draw of a device in kWh, keyed by dashboard card name.
pub fn device_power(device: &str) -> f64 {
    match device {
        "fan" => 0.5,
        "bedroom" => 0.8,
        "kitchen" => 0.6,
        "geyser" => 1.2,
        _ => 0.0,
    }
}

/// Total draw of the devices that are on, clamped to [`Y_MAX`].
pub fn target_power<S: AsRef<str>>(active: &[S]) -> f64 {
    let sum: f64 = active.iter().map(|d| device_power(d.as_ref())).sum();
    sum.min(Y_MAX)
}

/// Exponentially smoothed power reading with a bounded sample history.
#[derive(Debug, Clone)]
pub struct PowerSmoother {
    current: f64,
    target: f64,
    samples: VecDeque<f64>,
}

impl PowerSmoother {
    /// Starts at `current` heading toward `target`.
    pub fn new(current: f64, target: f64) -> Self {
        Self {
            current,
            target,
            samples: VecDeque::with_capacity(MAX_POINTS),
        }
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target.min(Y_MAX);
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Advances one tick and records the rounded sample.
    pub fn tick(&mut self) -> f64 {
        let alpha = 1.0 - (-TICK.as_secs_f64() / TAU.as_secs_f64()).exp();
        self.current += (self.target - self.current) * alpha;

        let sample = (self.current * 1000.0).round() / 1000.0;
        self.samples.push_back(sample);
        while self.samples.len() > MAX_POINTS {
            self.samples.pop_front();
        }
        sample
    }

    /// Recorded samples, oldest first.
    pub fn samples(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }
}
