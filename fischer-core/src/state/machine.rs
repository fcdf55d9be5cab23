//! Direction state definition

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Commanded drive direction of a DC motor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Both drive pins low
    #[default]
    Idle,
    /// Positive pin high, toward the limit switch
    Clockwise,
    /// Negative pin high, away from the limit switch
    CounterClockwise,
}

impl Direction {
    /// Check if this direction energizes a winding
    pub fn is_moving(self) -> bool {
        self != Direction::Idle
    }

    /// Change applied to the rotation count for one sensor pulse
    ///
    /// The count trusts the commanded direction rather than a sensed one,
    /// so a coasting or back-driven motor miscounts. Zero sits at the
    /// clockwise hard stop; counterclockwise travel counts up.
    pub fn count_delta(self) -> i32 {
        match self {
            Direction::Idle => 0,
            Direction::Clockwise => -1,
            Direction::CounterClockwise => 1,
        }
    }

    /// Encode for lock-free publication (see [`Direction::from_u8`])
    pub const fn as_u8(self) -> u8 {
        match self {
            Direction::Idle => 0,
            Direction::Clockwise => 1,
            Direction::CounterClockwise => 2,
        }
    }

    /// Decode a value produced by [`Direction::as_u8`]
    ///
    /// Unknown values decode as `Idle`, which never moves the count.
    pub const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Direction::Clockwise,
            2 => Direction::CounterClockwise,
            _ => Direction::Idle,
        }
    }

    /// Short human-readable name
    pub fn label(self) -> &'static str {
        match self {
            Direction::Idle => "stop",
            Direction::Clockwise => "clockwise",
            Direction::CounterClockwise => "counterclockwise",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Snapshot of a motor's running state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotorStatus {
    /// Commanded direction
    pub direction: Direction,
    /// Whether a winding is energized
    pub running: bool,
}

impl MotorStatus {
    /// Stopped motor
    pub const IDLE: Self = Self {
        direction: Direction::Idle,
        running: false,
    };

    /// Status for a motor driven in `direction`
    pub fn driving(direction: Direction) -> Self {
        Self {
            direction,
            running: direction.is_moving(),
        }
    }

    /// Check the `running == (direction != Idle)` invariant
    pub fn is_consistent(&self) -> bool {
        self.running == self.direction.is_moving()
    }
}
