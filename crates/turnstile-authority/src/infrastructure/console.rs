//! Operator console: blocking stdin reader plus async command dispatch.
//!
//! Terminal input is blocking I/O, so a dedicated OS thread reads stdin
//! line by line and hands lines to the async world over an mpsc channel
//! with `blocking_send`.  The dispatch loop parses each line, executes
//! the command against [`AuthorityState`], and prints the result to
//! stdout (this is an interactive console; `tracing` is for telemetry,
//! `println!` is the operator's screen).
//!
//! If stdin closes (for example under a service manager) the console
//! simply stops; the server keeps serving readers.  The stdin thread
//! may stay parked in `read_line` until process exit, which is harmless
//! because the process never joins it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::application::admin::{parse_command, AdminCommand, AdminParseError};
use crate::application::state::{local_time_of_day, AuthorityState, LockBounds};
use crate::infrastructure::network::broadcast_roster;
use turnstile_core::LockWindow;

/// Spawns the stdin reader thread and returns the line channel.
///
/// Lines arrive with the trailing newline removed.  When stdin reaches
/// EOF or the receiver is dropped, the thread exits on its own.
pub fn spawn_console_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel::<String>(16);

    let spawn_result = std::thread::Builder::new()
        .name("console-stdin".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            let mut line = String::new();
            loop {
                line.clear();
                match stdin.read_line(&mut line) {
                    Ok(0) => {
                        debug!("stdin reached EOF; console reader exiting");
                        break;
                    }
                    Ok(_) => {
                        if tx.blocking_send(line.trim_end().to_string()).is_err() {
                            // Dispatch loop is gone; nothing left to do.
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("failed to read console input: {e}");
                        break;
                    }
                }
            }
        });

    if let Err(e) = spawn_result {
        // The server still works without a console, so this is not fatal.
        warn!("could not start console reader thread: {e}");
    }

    rx
}

/// Runs the command dispatch loop until shutdown.
///
/// Uses a short timeout around `recv` so the loop notices the `running`
/// flag even when the operator types nothing.
pub async fn run_console(
    state: Arc<AuthorityState>,
    running: Arc<AtomicBool>,
    mut lines: mpsc::Receiver<String>,
) {
    println!("turnstile authority console ready; type `help` for commands");

    while running.load(Ordering::Relaxed) {
        match timeout(Duration::from_millis(200), lines.recv()).await {
            // No input in this tick; loop back and re-check the flag.
            Err(_) => continue,
            Ok(None) => {
                info!("console input closed; operator commands unavailable");
                break;
            }
            Ok(Some(line)) => handle_line(&state, &running, &line).await,
        }
    }
}

/// Parses and executes one console line.
async fn handle_line(state: &AuthorityState, running: &AtomicBool, line: &str) {
    match parse_command(line) {
        Ok(cmd) => execute(state, running, cmd).await,
        // Bare Enter at the prompt; not worth an error message.
        Err(AdminParseError::Empty) => {}
        Err(e) => println!("{e}"),
    }
}

/// Executes a parsed command against the shared state.
async fn execute(state: &AuthorityState, running: &AtomicBool, cmd: AdminCommand) {
    match cmd {
        AdminCommand::UpdateLocalList => {
            let delivered = broadcast_roster(state).await;
            println!("roster pushed to {delivered} reader(s)");
        }
        AdminCommand::SetLockStart(t) => {
            state.set_lock_start(t).await;
            println!("lock start set to {t}");
        }
        AdminCommand::SetLockEnd(t) => {
            state.set_lock_end(t).await;
            println!("lock end set to {t}");
        }
        AdminCommand::ClearLock => {
            state.clear_lock().await;
            println!("lock window cleared");
        }
        AdminCommand::Status => print_status(state).await,
        AdminCommand::Help => print_help(),
        AdminCommand::Exit => {
            println!("shutting down");
            running.store(false, Ordering::Relaxed);
        }
    }
}

/// Prints the `status` report.
async fn print_status(state: &AuthorityState) {
    let roster = state.roster_snapshot().await;
    let bounds = state.lock_bounds().await;
    let locked = state.is_locked(local_time_of_day()).await;
    let readers = state.client_count().await;

    if roster.is_empty() {
        println!("authorized badges (0): none");
    } else {
        let ids: Vec<&str> = roster.iter().map(|id| id.as_str()).collect();
        println!("authorized badges ({}): {}", roster.len(), ids.join(", "));
    }
    println!("lock window: {}", describe_bounds(bounds));
    println!("locked right now: {}", if locked { "yes" } else { "no" });
    println!("connected readers: {readers}");
}

/// Renders the lock bounds for the status report, including the
/// half-configured states.
fn describe_bounds(bounds: LockBounds) -> String {
    match (bounds.start, bounds.end) {
        (None, None) => "not set".to_string(),
        (Some(start), None) => format!("start {start}, end not set"),
        (None, Some(end)) => format!("start not set, end {end}"),
        (Some(start), Some(end)) => {
            let window = LockWindow::new(start, end);
            if window.wraps_midnight() {
                format!("{window} (wraps past midnight)")
            } else {
                window.to_string()
            }
        }
    }
}

/// Prints the `help` listing.
fn print_help() {
    println!("commands:");
    println!("  update_local_list      push the roster to all connected readers");
    println!("  set_lock_start(H, M)   set the lock window start");
    println!("  set_lock_end(H, M)     set the lock window end");
    println!("  clear_lock             clear the lock window");
    println!("  status                 show roster, lock window, and connections");
    println!("  help                   show this list");
    println!("  exit                   graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use turnstile_core::TimeOfDay;

    fn t(hour: u32, minute: u32) -> TimeOfDay {
        TimeOfDay::new(hour, minute).unwrap()
    }

    #[test]
    fn test_describe_bounds_not_set() {
        assert_eq!(describe_bounds(LockBounds::default()), "not set");
    }

    #[test]
    fn test_describe_bounds_partial() {
        assert_eq!(
            describe_bounds(LockBounds {
                start: Some(t(22, 0)),
                end: None,
            }),
            "start 22:00, end not set"
        );
        assert_eq!(
            describe_bounds(LockBounds {
                start: None,
                end: Some(t(5, 0)),
            }),
            "start not set, end 05:00"
        );
    }

    #[test]
    fn test_describe_bounds_full_windows() {
        assert_eq!(
            describe_bounds(LockBounds {
                start: Some(t(8, 0)),
                end: Some(t(17, 0)),
            }),
            "08:00-17:00"
        );
        assert_eq!(
            describe_bounds(LockBounds {
                start: Some(t(22, 0)),
                end: Some(t(5, 0)),
            }),
            "22:00-05:00 (wraps past midnight)"
        );
    }

    #[tokio::test]
    async fn test_execute_lock_commands_mutate_state() {
        // Arrange
        let state = AuthorityState::new(Default::default(), LockBounds::default());
        let running = AtomicBool::new(true);

        // Act / Assert
        execute(&state, &running, AdminCommand::SetLockStart(t(22, 0))).await;
        execute(&state, &running, AdminCommand::SetLockEnd(t(5, 0))).await;
        assert!(state.is_locked(t(23, 0)).await);

        execute(&state, &running, AdminCommand::ClearLock).await;
        assert!(!state.is_locked(t(23, 0)).await);
    }

    #[tokio::test]
    async fn test_execute_exit_clears_running_flag() {
        let state = AuthorityState::new(Default::default(), LockBounds::default());
        let running = AtomicBool::new(true);

        execute(&state, &running, AdminCommand::Exit).await;

        assert!(!running.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn test_broadcast_with_no_readers_delivers_zero() {
        let state = AuthorityState::new(Default::default(), LockBounds::default());
        let running = AtomicBool::new(true);

        // Must not error or hang with an empty client set.
        execute(&state, &running, AdminCommand::UpdateLocalList).await;
        assert_eq!(state.client_count().await, 0);
    }

    #[tokio::test]
    async fn test_handle_line_reports_parse_errors_without_mutating() {
        let state = AuthorityState::new(Default::default(), LockBounds::default());
        let running = AtomicBool::new(true);

        handle_line(&state, &running, "set_lock_start(25, 0)").await;
        handle_line(&state, &running, "no_such_command").await;
        handle_line(&state, &running, "").await;

        assert_eq!(state.lock_bounds().await, LockBounds::default());
        assert!(running.load(Ordering::Relaxed));
    }
}
