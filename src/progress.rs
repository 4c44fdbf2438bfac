//! Progress logging for the collector
//!
//! The collector is the only consumer of outcomes, so the tracker is a plain
//! counter owned by it and logs whenever the count crosses an interval boundary.

use log::info;

/// Default number of records between two progress messages
pub const DEFAULT_INTERVAL: u64 = 100_000;

/// Logs progress every `interval` records. An interval of zero disables logging.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    message: String,
    interval: u64,
    total: u64,
    count: u64,
}
impl ProgressTracker {
    /// Creates a tracker expecting `total` items in all
    #[must_use]
    pub fn new(message: impl Into<String>, total: u64) -> Self {
        Self {
            message: message.into(),
            interval: DEFAULT_INTERVAL,
            total,
            count: 0,
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: u64) -> Self {
        self.interval = interval;
        self
    }

    /// Adds one item and logs if an interval boundary was reached
    ///
    /// Returns `true` if a message was logged.
    pub fn tick(&mut self) -> bool {
        self.count += 1;
        if self.interval == 0 || self.count % self.interval != 0 {
            return false;
        }
        info!(
            "{} {}/{} ({})",
            self.message,
            self.count,
            self.total,
            format_percent(self.count, self.total)
        );
        true
    }

    /// Logs the final count unless the last tick already did
    pub fn finish(&self) {
        if self.interval == 0 || (self.count > 0 && self.count % self.interval == 0) {
            return;
        }
        info!("{} {}/{} (complete)", self.message, self.count, self.total);
    }

    #[must_use]
    pub fn interval(&self) -> u64 {
        self.interval
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }
}

fn format_percent(count: u64, total: u64) -> String {
    if total == 0 {
        return "100.0%".to_string();
    }
    #[allow(clippy::cast_precision_loss)]
    let fraction = count as f64 / total as f64;
    format!("{:.1}%", fraction * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_logs_on_interval() {
        let mut tracker = ProgressTracker::new("Reduced records", 250).with_interval(100);
        let logged: Vec<bool> = (0..250).map(|_| tracker.tick()).collect();
        assert_eq!(logged.iter().filter(|&&l| l).count(), 2);
        assert!(logged[99]);
        assert!(logged[199]);
        assert_eq!(tracker.count(), 250);
    }

    #[test]
    fn test_disabled_tracker() {
        let mut tracker = ProgressTracker::new("Reduced records", 10).with_interval(0);
        assert!(!(0..10).any(|_| tracker.tick()));
        tracker.finish();
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(1, 4), "25.0%");
        assert_eq!(format_percent(0, 0), "100.0%");
    }
}
