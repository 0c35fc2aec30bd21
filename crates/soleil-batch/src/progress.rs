//! Batch progress reporting

use std::time::{Duration, Instant};
use tracing::info;

pub struct Progress {
    total: usize,
    done: usize,
    every: usize,
    started: Instant,
}

impl Progress {
    pub fn new(total: usize, every: usize) -> Self {
        Self {
            total,
            done: 0,
            every: every.max(1),
            started: Instant::now(),
        }
    }

    /// Count one finished point, logging every `every` points
    pub fn record(&mut self) {
        self.done += 1;
        if self.done % self.every == 0 {
            let elapsed = self.elapsed();
            info!(
                done = self.done,
                total = self.total,
                percent = self.percent(),
                rate = %format!("{:.1}", self.rate(elapsed)),
                elapsed_secs = elapsed.as_secs(),
                eta_secs = self.eta(elapsed).as_secs(),
                "Batch progress"
            );
        }
    }

    pub fn done(&self) -> usize {
        self.done
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        (self.done * 100 / self.total) as u32
    }

    /// Points per second over `elapsed`
    pub fn rate(&self, elapsed: Duration) -> f64 {
        let secs = elapsed.as_secs_f64();
        if secs > 0.0 {
            self.done as f64 / secs
        } else {
            0.0
        }
    }

    /// Remaining time at the current rate, zero when the rate is unknown
    pub fn eta(&self, elapsed: Duration) -> Duration {
        let rate = self.rate(elapsed);
        let remaining = self.total.saturating_sub(self.done);
        if rate > 0.0 {
            Duration::from_secs_f64(remaining as f64 / rate)
        } else {
            Duration::ZERO
        }
    }
}
