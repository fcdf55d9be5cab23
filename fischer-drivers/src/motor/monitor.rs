//! Background monitor thread
//!
//! Runs a check at a fixed period until cancelled. A failing or panicking
//! cycle is logged and the loop carries on: the monitor is the only
//! automatic stop for a running motor.

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error};

/// Cooperative stop flag for a monitor loop
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to exit after its current cycle
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Handle to a running monitor thread
pub struct MonitorHandle {
    token: CancelToken,
    thread: JoinHandle<()>,
}

impl MonitorHandle {
    /// Spawn a thread running `cycle` every `interval`
    pub fn spawn<F>(name: &str, interval: Duration, cycle: F) -> io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let token = CancelToken::new();
        let loop_token = token.clone();
        let loop_name = name.to_owned();
        let thread = thread::Builder::new()
            .name(format!("monitor-{}", name))
            .spawn(move || run(&loop_name, interval, &loop_token, cycle))?;

        Ok(Self { token, thread })
    }

    /// Token that stops this monitor
    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Check if the thread has exited
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Cancel the loop and wait for the thread to exit
    pub fn shutdown(self) {
        self.token.cancel();
        self.thread.thread().unpark();
        if self.thread.join().is_err() {
            error!("Monitor thread exited with a panic");
        }
    }
}

fn run<F: FnMut()>(name: &str, interval: Duration, token: &CancelToken, mut cycle: F) {
    debug!("Monitor {} started ({:?} period)", name, interval);

    while !token.is_cancelled() {
        if panic::catch_unwind(AssertUnwindSafe(&mut cycle)).is_err() {
            error!("Monitor {} cycle panicked; continuing", name);
        }
        // Woken early by shutdown(); a spurious wake just polls sooner
        thread::park_timeout(interval);
    }

    debug!("Monitor {} stopped", name);
}
