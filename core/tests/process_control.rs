//! Termination of real processes through the system process table.

#![cfg(unix)]

use std::process::{Child, Command};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use portpilot_core::{EscalationPolicy, KillResult, ProcessTerminator, SystemProcessTable};

/// Spawn `sh -c script` and reap it in the background so it never lingers as a zombie.
fn spawn_reaped(script: &str) -> (u32, JoinHandle<()>) {
    let mut child: Child = Command::new("sh").args(["-c", script]).spawn().unwrap();
    let pid = child.id();
    let reaper = thread::spawn(move || {
        let _ = child.wait();
    });
    (pid, reaper)
}

fn quick_terminator() -> ProcessTerminator {
    ProcessTerminator::with_policy(
        SystemProcessTable::new(),
        EscalationPolicy::new(Duration::from_millis(500), Duration::from_secs(2)),
    )
}

#[test]
fn graceful_kill_of_cooperative_process() {
    let (pid, reaper) = spawn_reaped("exec sleep 30");
    let terminator = quick_terminator();
    assert!(terminator.is_running(pid));

    let outcome = terminator.kill(pid, false);
    assert_eq!(outcome.result, KillResult::Success, "{}", outcome.message);
    assert!(outcome.message.ends_with(&format!("(PID: {})", pid)));

    reaper.join().unwrap();
    assert!(!terminator.is_running(pid));
}

#[test]
fn escalates_when_sigterm_is_ignored() {
    let (pid, reaper) = spawn_reaped("trap '' TERM; exec sleep 30");
    // Give the shell time to install the trap
    thread::sleep(Duration::from_millis(200));

    let terminator = quick_terminator();
    let start = Instant::now();
    let outcome = terminator.kill(pid, false);

    assert_eq!(outcome.result, KillResult::Success, "{}", outcome.message);
    assert!(start.elapsed() >= Duration::from_millis(500));
    assert!(start.elapsed() < terminator.policy().total() + Duration::from_secs(1));
    reaper.join().unwrap();
}

#[test]
fn force_kill_returns_immediately() {
    let (pid, reaper) = spawn_reaped("trap '' TERM; exec sleep 30");
    thread::sleep(Duration::from_millis(200));

    let terminator = quick_terminator();
    let start = Instant::now();
    let outcome = terminator.kill(pid, true);

    assert_eq!(outcome.result, KillResult::Success, "{}", outcome.message);
    assert!(start.elapsed() < Duration::from_millis(500));
    reaper.join().unwrap();
}

#[test]
fn missing_process_is_not_found() {
    let terminator = ProcessTerminator::system();
    let outcome = terminator.kill(999_999_999, false);

    assert_eq!(outcome.result, KillResult::NotFound);
    assert_eq!(outcome.message, "Process with PID 999999999 not found");
    assert!(!terminator.is_running(999_999_999));

    let details = terminator.get_process_info(999_999_999);
    assert!(details.info().is_none());
    assert_eq!(
        serde_json::to_value(&details).unwrap(),
        serde_json::json!({"pid": 999_999_999, "error": "Unable to get process info"})
    );
}
