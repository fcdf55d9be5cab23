//! Fischer robot arm controller
//!
//! Brings up the four axes on the Pi's GPIO header and serves the control
//! console on stdin/stdout. An optional first argument names a TOML wiring
//! table; without it the embedded `arm.toml` is used.

#![deny(unsafe_code)]

mod command;
mod config;
mod console;
mod status;

use std::env;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use fischer_drivers::Robot;
use fischer_hal_rpi::RpiGpio;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::status::StatusReporter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    info!("Fischer arm v{}", env!("CARGO_PKG_VERSION"));

    let path = env::args_os().nth(1).map(PathBuf::from);
    let config = config::load(path.as_deref()).context("Failed to load configuration")?;

    let gpio = RpiGpio::new().context("Failed to initialize GPIO")?;
    let robot = Arc::new(Robot::new(gpio, &config).context("Failed to bring up the arm")?);
    info!("Arm ready: {} axes", robot.len());

    let reporter = StatusReporter::spawn(
        robot.clone(),
        Duration::from_millis(config.status_interval_ms),
    )
    .context("Failed to start status reporter")?;

    let served = console::run(&robot, io::stdin().lock(), io::stdout().lock());

    reporter.shutdown();
    robot.shutdown().context("Shutdown incomplete")?;
    served.context("Console I/O failed")?;

    info!("Bye");
    Ok(())
}
