//! Console input source.
//!
//! Stands in for the three physical buttons (plus a few simulation knobs)
//! by reading one command per line:
//!
//! | Line          | Command                        |
//! |---------------|--------------------------------|
//! | `m`           | cycle mode                     |
//! | `+`           | setpoint up                    |
//! | `-`           | setpoint down                  |
//! | `t <celsius>` | set simulated temperature      |
//! | `x`           | toggle simulated sensor fault  |
//! | `q` / EOF     | quit                           |

use std::io::BufRead;

use crate::app::input::InputEvent;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleCommand {
    Input(InputEvent),
    SetTemperature(f32),
    ToggleFault,
    Quit,
}

/// Parse one line; `None` for blank or unrecognised input.
pub fn parse_command(line: &str) -> Option<ConsoleCommand> {
    let line = line.trim();
    let mut parts = line.split_whitespace();
    let head = parts.next()?;
    let cmd = match head {
        "m" | "M" => ConsoleCommand::Input(InputEvent::CycleMode),
        "+" => ConsoleCommand::Input(InputEvent::Increment),
        "-" => ConsoleCommand::Input(InputEvent::Decrement),
        "x" | "X" => ConsoleCommand::ToggleFault,
        "q" | "Q" => ConsoleCommand::Quit,
        "t" | "T" => {
            let celsius: f32 = parts.next()?.parse().ok()?;
            if !celsius.is_finite() {
                return None;
            }
            ConsoleCommand::SetTemperature(celsius)
        }
        _ => return None,
    };
    // Trailing garbage makes the whole line invalid.
    if parts.next().is_some() {
        return None;
    }
    Some(cmd)
}

pub struct ConsoleInput<R> {
    reader: R,
    line: String,
}

impl<R: BufRead> ConsoleInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
        }
    }

    /// Block for the next recognised command.  End of input (or a read
    /// error) is reported as [`ConsoleCommand::Quit`].
    pub fn next_command(&mut self) -> ConsoleCommand {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) | Err(_) => return ConsoleCommand::Quit,
                Ok(_) => {
                    if let Some(cmd) = parse_command(&self.line) {
                        return cmd;
                    }
                    if !self.line.trim().is_empty() {
                        log::warn!("console: unrecognised input {:?}", self.line.trim());
                    }
                }
            }
        }
    }
}
