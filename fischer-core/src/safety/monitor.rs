//! Boundary monitor implementation
//!
//! Each axis has two boundaries: the physical limit switch at the clockwise
//! hard stop and a software range on the rotation count for
//! counterclockwise travel. The same rules gate new commands and drive the
//! background auto-stop.

use crate::state::{Direction, MotorStatus};

/// Default period of the background boundary poll
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Result of one boundary check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryStatus {
    /// Keep going
    Clear,
    /// Limit switch opened while driving clockwise; zero the count and stop
    HomeReached,
    /// Count passed the range while driving counterclockwise; stop
    RangeExceeded,
}

impl BoundaryStatus {
    /// Check if the motor must be stopped
    pub fn requires_stop(self) -> bool {
        self != BoundaryStatus::Clear
    }

    /// Check if the rotation count must be zeroed before stopping
    ///
    /// Only the hard stop re-references the count.
    pub fn resets_counter(self) -> bool {
        self == BoundaryStatus::HomeReached
    }
}

/// Boundary rules for one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryMonitor {
    /// Maximum counterclockwise pulse count
    range: i32,
}

impl BoundaryMonitor {
    /// Create a monitor for an axis with the given counterclockwise range
    pub fn new(range: i32) -> Self {
        Self { range }
    }

    /// Counterclockwise range in pulses
    pub fn range(&self) -> i32 {
        self.range
    }

    /// Check whether a clockwise command may start
    ///
    /// `limit_clear` is the limit switch level: true while the arm is away
    /// from the hard stop.
    pub fn clockwise_allowed(&self, limit_clear: bool) -> bool {
        limit_clear
    }

    /// Check whether a counterclockwise command may start
    pub fn counterclockwise_allowed(&self, count: i32) -> bool {
        count < self.range
    }

    /// Check whether the current motion has hit a boundary
    ///
    /// The start guard uses `count < range` while the stop uses
    /// `count > range`, so a motor started at `range - 1` may travel one
    /// pulse past `range` before stopping.
    pub fn check(&self, status: MotorStatus, limit_clear: bool, count: i32) -> BoundaryStatus {
        if !status.running {
            return BoundaryStatus::Clear;
        }

        match status.direction {
            Direction::Clockwise if !limit_clear => BoundaryStatus::HomeReached,
            Direction::CounterClockwise if count > self.range => BoundaryStatus::RangeExceeded,
            _ => BoundaryStatus::Clear,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn running(direction: Direction) -> MotorStatus {
        MotorStatus::driving(direction)
    }

    #[test]
    fn test_idle_motor_is_always_clear() {
        let monitor = BoundaryMonitor::new(200);
        assert_eq!(
            monitor.check(MotorStatus::IDLE, false, 10_000),
            BoundaryStatus::Clear
        );
    }

    #[test]
    fn test_home_reached() {
        let monitor = BoundaryMonitor::new(200);
        let status = monitor.check(running(Direction::Clockwise), false, 57);
        assert_eq!(status, BoundaryStatus::HomeReached);
        assert!(status.requires_stop());
        assert!(status.resets_counter());
    }

    #[test]
    fn test_limit_ignored_when_driving_away() {
        let monitor = BoundaryMonitor::new(200);
        assert_eq!(
            monitor.check(running(Direction::CounterClockwise), false, 10),
            BoundaryStatus::Clear
        );
    }

    #[test]
    fn test_range_exceeded_keeps_count() {
        let monitor = BoundaryMonitor::new(200);
        assert_eq!(
            monitor.check(running(Direction::CounterClockwise), true, 200),
            BoundaryStatus::Clear
        );

        let status = monitor.check(running(Direction::CounterClockwise), true, 201);
        assert_eq!(status, BoundaryStatus::RangeExceeded);
        assert!(status.requires_stop());
        assert!(!status.resets_counter());
    }

    #[test]
    fn test_range_ignored_when_driving_clockwise() {
        let monitor = BoundaryMonitor::new(200);
        assert_eq!(
            monitor.check(running(Direction::Clockwise), true, 5000),
            BoundaryStatus::Clear
        );
    }

    #[test]
    fn test_command_guards() {
        let monitor = BoundaryMonitor::new(28);
        assert!(monitor.clockwise_allowed(true));
        assert!(!monitor.clockwise_allowed(false));
        assert!(monitor.counterclockwise_allowed(27));
        assert!(!monitor.counterclockwise_allowed(28));
        assert!(monitor.counterclockwise_allowed(-40));
    }

    proptest! {
        #[test]
        fn prop_allowed_start_is_not_an_immediate_stop(
            range in 1i32..5000,
            count in -5000i32..5000,
            limit_clear in any::<bool>(),
        ) {
            let monitor = BoundaryMonitor::new(range);
            if monitor.clockwise_allowed(limit_clear) {
                prop_assert!(!monitor
                    .check(running(Direction::Clockwise), limit_clear, count)
                    .requires_stop());
            }
            if monitor.counterclockwise_allowed(count) {
                prop_assert!(!monitor
                    .check(running(Direction::CounterClockwise), limit_clear, count)
                    .requires_stop());
            }
        }
    }
}
