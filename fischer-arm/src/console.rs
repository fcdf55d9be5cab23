//! Line-oriented control console
//!
//! Reads commands from `input` and writes one reply per command to `out`:
//! `ok`, `blocked` when a motion guard refused the move, or `error: ...`.

use std::io::{self, BufRead, Write};

use fischer_drivers::{Outcome, Robot, RobotError};
use fischer_hal::Gpio;
use tracing::{debug, warn};

use crate::command::{Command, HELP};
use crate::status::format_status;

/// Whether the console keeps reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Serve commands until `quit` or end of input
pub fn run<G, R, W>(robot: &Robot<G>, input: R, mut out: W) -> io::Result<()>
where
    G: Gpio,
    R: BufRead,
    W: Write,
{
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "error: {}", e)?;
                writeln!(out, "{}", HELP)?;
                continue;
            }
        };

        debug!("Console: {:?}", command);
        if execute(robot, command, &mut out)? == Flow::Quit {
            break;
        }
        out.flush()?;
    }
    Ok(())
}

fn execute<G, W>(robot: &Robot<G>, command: Command, out: &mut W) -> io::Result<Flow>
where
    G: Gpio,
    W: Write,
{
    let result = match command {
        Command::Clockwise(axis) => robot
            .resolve(&axis)
            .and_then(|id| robot.motor(id).clockwise().map_err(RobotError::from)),
        Command::CounterClockwise(axis) => robot
            .resolve(&axis)
            .and_then(|id| robot.motor(id).counterclockwise().map_err(RobotError::from)),
        Command::Stop(Some(axis)) => robot
            .resolve(&axis)
            .and_then(|id| robot.motor(id).stop().map_err(RobotError::from))
            .map(|()| Outcome::Moved),
        Command::Stop(None) => robot.stop_all().map(|()| Outcome::Moved),
        Command::Reset(axis) => robot.resolve(&axis).map(|id| {
            robot.rotation_sensor(id).reset();
            Outcome::Moved
        }),
        Command::Home => robot.auto_home().map(|()| Outcome::Moved),
        Command::Status => {
            for status in robot.status() {
                writeln!(out, "{}", format_status(&status))?;
            }
            return Ok(Flow::Continue);
        }
        Command::Quit => {
            writeln!(out, "bye")?;
            return Ok(Flow::Quit);
        }
    };

    reply(out, result)?;
    Ok(Flow::Continue)
}

fn reply<W: Write>(out: &mut W, result: Result<Outcome, RobotError>) -> io::Result<()> {
    match result {
        Ok(Outcome::Moved) => writeln!(out, "ok"),
        Ok(Outcome::Blocked) => writeln!(out, "blocked"),
        Err(e) => {
            warn!("Console command failed: {}", e);
            writeln!(out, "error: {}", e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fischer_core::config::ArmConfig;
    use fischer_core::state::Direction;
    use fischer_hal::sim::SimGpio;
    use fischer_hal::Level;

    fn session(robot: &Robot<SimGpio>, script: &str) -> Vec<String> {
        let mut out = Vec::new();
        run(robot, script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    fn robot() -> (SimGpio, Robot<SimGpio>) {
        let gpio = SimGpio::new();
        let robot = Robot::new(gpio.clone(), &ArmConfig::default()).unwrap();
        (gpio, robot)
    }

    #[test]
    fn test_motion_by_index_and_name() {
        let (gpio, robot) = robot();

        assert_eq!(session(&robot, "ccw 1\n"), ["ok"]);
        let first = robot.axis(0).unwrap();
        assert_eq!(robot.motor(first).direction(), Direction::CounterClockwise);
        assert_eq!(gpio.output_level(27), Some(Level::High));

        assert_eq!(session(&robot, "cw axis2\nstop 1\n"), ["ok", "ok"]);
        let second = robot.axis(1).unwrap();
        assert_eq!(robot.motor(first).direction(), Direction::Idle);
        assert_eq!(robot.motor(second).direction(), Direction::Clockwise);

        assert_eq!(session(&robot, "stop\n"), ["ok"]);
        assert!(robot.axes().all(|id| !robot.motor(id).is_running()));
        robot.shutdown().unwrap();
    }

    #[test]
    fn test_blocked_at_limit() {
        let (gpio, robot) = robot();
        gpio.set_input(11, Level::Low);

        assert_eq!(session(&robot, "cw 1\n"), ["blocked"]);
        assert!(!robot.motor(robot.axis(0).unwrap()).is_running());
        robot.shutdown().unwrap();
    }

    #[test]
    fn test_reset_zeroes_count() {
        let (gpio, robot) = robot();
        let id = robot.axis(3).unwrap();

        assert_eq!(session(&robot, "ccw 4\n"), ["ok"]);
        gpio.pulses(6, 5);
        assert_eq!(robot.rotation_sensor(id).counter(), 5);

        assert_eq!(session(&robot, "stop 4\nreset axis4\n"), ["ok", "ok"]);
        assert_eq!(robot.rotation_sensor(id).counter(), 0);
        robot.shutdown().unwrap();
    }

    #[test]
    fn test_errors_and_help() {
        let (_gpio, robot) = robot();

        let lines = session(&robot, "spin 1\ncw 9\n");
        assert_eq!(lines[0], "error: unknown command \"spin\"");
        assert_eq!(lines[1], HELP);
        assert!(lines[2].starts_with("error: unknown axis"));
        robot.shutdown().unwrap();
    }

    #[test]
    fn test_status_and_quit() {
        let (_gpio, robot) = robot();

        let lines = session(&robot, "\nstatus\nquit\nccw 1\n");
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "[1] axis1: stop stopped, count 0, limit clear");
        assert_eq!(lines[4], "bye");
        assert!(!robot.motor(robot.axis(0).unwrap()).is_running());
        robot.shutdown().unwrap();
    }
}
