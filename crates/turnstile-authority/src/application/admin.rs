//! Operator console commands.
//!
//! The console is a line-oriented text interface on the authority's
//! stdin.  Most commands are bare words; the two lock-bound commands use
//! a call-like syntax with hour and minute arguments:
//!
//! ```text
//! update_local_list
//! set_lock_start(22, 0)
//! set_lock_end(5, 0)
//! clear_lock
//! status
//! help
//! exit
//! ```
//!
//! Parsing is strict about command names (exact, case-sensitive) and
//! forgiving about whitespace inside the argument parentheses, which is
//! how operators actually type.  A malformed line never touches state;
//! it is reported and the prior state stands.

use thiserror::Error;

use turnstile_core::{ClockError, TimeOfDay};

/// A parsed operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    /// Broadcast the current roster to every connected reader.
    UpdateLocalList,
    /// Set the start bound of the lock window.
    SetLockStart(TimeOfDay),
    /// Set the end bound of the lock window.
    SetLockEnd(TimeOfDay),
    /// Clear both lock bounds.
    ClearLock,
    /// Print roster, lock window, lock state, and connection count.
    Status,
    /// Print the command list.
    Help,
    /// Graceful shutdown.
    Exit,
}

/// Errors produced by [`parse_command`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminParseError {
    /// The line was empty; the console ignores these silently.
    #[error("empty command")]
    Empty,

    /// Not a known command word.
    #[error("unknown command {0:?} (try `help`)")]
    UnknownCommand(String),

    /// A lock-bound command without a well-formed `(H, M)` argument list.
    #[error("expected {command}(H, M), e.g. {command}(8, 45)")]
    MalformedArguments {
        /// The command the operator was attempting.
        command: &'static str,
    },

    /// Arguments parsed as numbers but are not a valid time of day.
    #[error("invalid time: {0}")]
    InvalidTime(#[from] ClockError),
}

/// Parses one console line into an [`AdminCommand`].
///
/// # Errors
///
/// See [`AdminParseError`]; every variant leaves authority state
/// untouched.
pub fn parse_command(line: &str) -> Result<AdminCommand, AdminParseError> {
    let line = line.trim();
    match line {
        "" => Err(AdminParseError::Empty),
        "update_local_list" => Ok(AdminCommand::UpdateLocalList),
        "clear_lock" => Ok(AdminCommand::ClearLock),
        "status" => Ok(AdminCommand::Status),
        "help" => Ok(AdminCommand::Help),
        "exit" => Ok(AdminCommand::Exit),
        _ => {
            if let Some(rest) = line.strip_prefix("set_lock_start") {
                return Ok(AdminCommand::SetLockStart(parse_time_args(
                    "set_lock_start",
                    rest,
                )?));
            }
            if let Some(rest) = line.strip_prefix("set_lock_end") {
                return Ok(AdminCommand::SetLockEnd(parse_time_args(
                    "set_lock_end",
                    rest,
                )?));
            }
            Err(AdminParseError::UnknownCommand(line.to_string()))
        }
    }
}

/// Parses the `(H, M)` tail of a lock-bound command.
fn parse_time_args(command: &'static str, rest: &str) -> Result<TimeOfDay, AdminParseError> {
    let malformed = || AdminParseError::MalformedArguments { command };

    let inner = rest
        .trim()
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(malformed)?;

    let (h, m) = inner.split_once(',').ok_or_else(malformed)?;
    let hour: u32 = h.trim().parse().map_err(|_| malformed())?;
    let minute: u32 = m.trim().parse().map_err(|_| malformed())?;

    Ok(TimeOfDay::new(hour, minute)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(hour: u32, minute: u32) -> TimeOfDay {
        TimeOfDay::new(hour, minute).unwrap()
    }

    #[test]
    fn test_parses_bare_word_commands() {
        assert_eq!(
            parse_command("update_local_list"),
            Ok(AdminCommand::UpdateLocalList)
        );
        assert_eq!(parse_command("clear_lock"), Ok(AdminCommand::ClearLock));
        assert_eq!(parse_command("status"), Ok(AdminCommand::Status));
        assert_eq!(parse_command("help"), Ok(AdminCommand::Help));
        assert_eq!(parse_command("exit"), Ok(AdminCommand::Exit));
    }

    #[test]
    fn test_parses_lock_bound_commands() {
        assert_eq!(
            parse_command("set_lock_start(22, 0)"),
            Ok(AdminCommand::SetLockStart(t(22, 0)))
        );
        assert_eq!(
            parse_command("set_lock_end(5,0)"),
            Ok(AdminCommand::SetLockEnd(t(5, 0)))
        );
    }

    #[test]
    fn test_tolerates_operator_whitespace() {
        // Surrounding the line, and inside the parentheses.
        assert_eq!(
            parse_command("  set_lock_start( 8 , 45 )  "),
            Ok(AdminCommand::SetLockStart(t(8, 45)))
        );
        assert_eq!(parse_command("  status  "), Ok(AdminCommand::Status));
    }

    #[test]
    fn test_empty_line_is_its_own_error() {
        assert_eq!(parse_command(""), Err(AdminParseError::Empty));
        assert_eq!(parse_command("   "), Err(AdminParseError::Empty));
    }

    #[test]
    fn test_unknown_commands_are_reported_verbatim() {
        assert_eq!(
            parse_command("open_door"),
            Err(AdminParseError::UnknownCommand("open_door".to_string()))
        );
        // Command words are case-sensitive, like the rest of the system.
        assert_eq!(
            parse_command("STATUS"),
            Err(AdminParseError::UnknownCommand("STATUS".to_string()))
        );
    }

    #[test]
    fn test_malformed_argument_lists_are_rejected() {
        for line in [
            "set_lock_start",
            "set_lock_start()",
            "set_lock_start(8)",
            "set_lock_start(8, 45",
            "set_lock_start 8, 45",
            "set_lock_start(eight, ten)",
        ] {
            assert_eq!(
                parse_command(line),
                Err(AdminParseError::MalformedArguments {
                    command: "set_lock_start"
                }),
                "line {line:?} must be malformed"
            );
        }
    }

    #[test]
    fn test_out_of_range_times_surface_the_clock_error() {
        assert_eq!(
            parse_command("set_lock_start(25, 0)"),
            Err(AdminParseError::InvalidTime(ClockError::HourOutOfRange(25)))
        );
        assert_eq!(
            parse_command("set_lock_end(8, 99)"),
            Err(AdminParseError::InvalidTime(ClockError::MinuteOutOfRange(
                99
            )))
        );
    }

    #[test]
    fn test_extra_arguments_are_malformed() {
        // split_once keeps "45, 3" as the minute field, which fails to
        // parse as a number.
        assert_eq!(
            parse_command("set_lock_start(8, 45, 3)"),
            Err(AdminParseError::MalformedArguments {
                command: "set_lock_start"
            })
        );
    }
}
