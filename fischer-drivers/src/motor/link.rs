//! Sensor-to-motor back-reference

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use fischer_core::state::Direction;

/// Read-only view of a motor's commanded direction
///
/// Handed to the motor's rotation sensor so its edge callback can sign each
/// pulse without touching the motor's lock. Does not keep the motor alive.
#[derive(Debug, Clone, Default)]
pub struct MotorLink {
    direction: Arc<AtomicU8>,
}

impl MotorLink {
    /// Create a link reporting `Idle`
    pub fn new() -> Self {
        Self::default()
    }

    /// Commanded direction at this instant
    pub fn direction(&self) -> Direction {
        Direction::from_u8(self.direction.load(Ordering::SeqCst))
    }

    /// Publish a new direction; only the owning motor calls this
    pub(crate) fn publish(&self, direction: Direction) {
        self.direction.store(direction.as_u8(), Ordering::SeqCst);
    }
}
