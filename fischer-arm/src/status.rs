//! Periodic status reporter
//!
//! Polls the robot at the configured rate and logs the axes whose state
//! changed since the previous poll.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use fischer_drivers::{AxisStatus, MonitorHandle, Robot};
use fischer_hal::Gpio;
use tracing::info;

/// One status line for an axis
pub fn format_status(status: &AxisStatus) -> String {
    let limit = match status.limit_clear {
        Some(true) => "clear",
        Some(false) => "reached",
        None => "fault",
    };
    let motion = if status.motor.running {
        "running"
    } else {
        "stopped"
    };
    format!(
        "[{}] {}: {} {}, count {}, limit {}",
        status.id,
        status.name,
        status.motor.direction.label(),
        motion,
        status.count,
        limit
    )
}

/// Axes in `next` that differ from the same slot in `previous`
pub fn changed<'a>(previous: &[AxisStatus], next: &'a [AxisStatus]) -> Vec<&'a AxisStatus> {
    next.iter()
        .enumerate()
        .filter(|(i, status)| previous.get(*i) != Some(*status))
        .map(|(_, status)| status)
        .collect()
}

/// Background thread logging axis changes
pub struct StatusReporter {
    monitor: MonitorHandle,
}

impl StatusReporter {
    /// Start polling `robot` every `interval`
    pub fn spawn<G>(robot: Arc<Robot<G>>, interval: Duration) -> io::Result<Self>
    where
        G: Gpio + Send + Sync + 'static,
    {
        let mut last = Vec::new();
        let monitor = MonitorHandle::spawn("status", interval, move || {
            let now = robot.status();
            for status in changed(&last, &now) {
                info!("{}", format_status(status));
            }
            last = now;
        })?;
        Ok(Self { monitor })
    }

    /// Stop polling and join the thread
    pub fn shutdown(self) {
        self.monitor.shutdown();
    }
}
