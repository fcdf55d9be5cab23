//! Console commands
//!
//! One command per line. Axes are named by their 1-based number or by the
//! configured name:
//!
//! ```text
//! cw <axis>       clockwise, toward the limit switch
//! ccw <axis>      counterclockwise, away from it
//! stop [<axis>]   stop one axis, or all of them
//! reset <axis>    zero the rotation count
//! home            drive every axis to its limit switch
//! status          print every axis
//! quit            stop everything and exit
//! ```

use thiserror::Error;

/// Usage line printed for unrecognized input
pub const HELP: &str = "commands: cw <axis> | ccw <axis> | stop [<axis>] | reset <axis> | home | status | quit";

/// One parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Drive clockwise
    Clockwise(String),
    /// Drive counterclockwise
    CounterClockwise(String),
    /// Stop one axis, or every axis when `None`
    Stop(Option<String>),
    /// Zero the rotation count
    Reset(String),
    /// Home every axis
    Home,
    /// Print status
    Status,
    /// Exit
    Quit,
}

/// Reasons a line is not a command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Blank line
    #[error("empty command")]
    Empty,
    /// First word not recognized
    #[error("unknown command {0:?}")]
    Unknown(String),
    /// Command needs an axis
    #[error("{0} needs an axis")]
    MissingAxis(&'static str),
    /// Extra words after the command
    #[error("unexpected argument {0:?}")]
    Trailing(String),
}

impl Command {
    /// Parse one line of console input
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or(ParseError::Empty)?;
        let arg = words.next().map(str::to_owned);
        if let Some(extra) = words.next() {
            return Err(ParseError::Trailing(extra.to_owned()));
        }

        let axis = |name| arg.clone().ok_or(ParseError::MissingAxis(name));
        let command = match verb.to_ascii_lowercase().as_str() {
            "cw" | "clockwise" => Command::Clockwise(axis("cw")?),
            "ccw" | "counterclockwise" => Command::CounterClockwise(axis("ccw")?),
            "reset" => Command::Reset(axis("reset")?),
            "stop" => return Ok(Command::Stop(arg)),
            "home" => Command::Home,
            "status" | "s" => Command::Status,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(ParseError::Unknown(other.to_owned())),
        };

        match (&command, arg) {
            (Command::Home | Command::Status | Command::Quit, Some(extra)) => {
                Err(ParseError::Trailing(extra))
            }
            _ => Ok(command),
        }
    }
}
