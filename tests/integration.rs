//! End-to-end tests for the console harness
//!
//! These tests drive the harness against the `mock-guest` binary, a
//! synthetic guest console that echoes commands and emits the canned
//! responses a real guest would.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use guest_harness::harness::{self, CommandStep, Indicator, Session, SessionPlan, SessionState};

/// Path to the mock guest binary, built alongside the tests
fn mock_guest() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_mock-guest"))
}

/// Path to the harness CLI binary
fn harness_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_guest-harness"))
}

/// A plan against the mock guest with test-friendly timing
fn mock_plan(args: &[&str]) -> SessionPlan {
    let mut plan = SessionPlan::new(mock_guest());
    plan.args = args.iter().map(|s| s.to_string()).collect();
    plan.boot_delay = Duration::from_millis(100);
    plan.drain_timeout = Duration::from_secs(5);
    plan.grace_period = Duration::from_millis(500);
    plan
}

#[tokio::test]
async fn test_commands_arrive_in_order_with_newlines() {
    let mut session = Session::launch(&mock_guest(), &[], None).await.unwrap();
    session.boot_wait(Duration::from_millis(100)).await;

    let steps = vec![
        CommandStep::new("alpha", Duration::from_millis(20)),
        CommandStep::new("bravo", Duration::from_millis(20)),
        CommandStep::new("charlie", Duration::from_millis(20)),
    ];
    session.drive(&steps).await.unwrap();

    let timed_out = session.drain(Duration::from_secs(5)).await.unwrap();
    assert!(!timed_out);
    session.teardown(Duration::from_millis(500)).await.unwrap();

    // The mock echoes each received line exactly once, so the echoes prove
    // the commands arrived whole, newline-terminated, and in order.
    let text = session.captured().text();
    let a = text.find("$ alpha\n").expect("alpha not echoed");
    let b = text.find("$ bravo\n").expect("bravo not echoed");
    let c = text.find("$ charlie\n").expect("charlie not echoed");
    assert!(a < b && b < c, "echoes out of order: {}", text);
    // Exactly one newline per command: no doubled blank echo lines.
    assert!(!text.contains("$ \n"), "spurious empty command: {}", text);
}

#[tokio::test]
async fn test_empty_script_still_closes_input_before_draining() {
    let mut session = Session::launch(&mock_guest(), &[], None).await.unwrap();
    session.boot_wait(Duration::from_millis(50)).await;
    session.drive(&[]).await.unwrap();

    // The mock blocks on stdin until EOF, so draining can only complete
    // without a timeout if the input was closed before the first read.
    let timed_out = session.drain(Duration::from_secs(5)).await.unwrap();
    assert!(!timed_out);
    assert!(session.exit_status().unwrap().success());

    session.teardown(Duration::from_millis(500)).await.unwrap();
    assert_eq!(session.state(), SessionState::Terminated);
}

#[tokio::test]
async fn test_never_exiting_guest_is_terminated_within_bounds() {
    let mut session = Session::launch(&mock_guest(), &["--never-exit".to_string()], None)
        .await
        .unwrap();
    let pid = session.id().expect("child should be running");

    session.boot_wait(Duration::from_millis(50)).await;
    session
        .drive(&[CommandStep::new("exit", Duration::from_millis(50))])
        .await
        .unwrap();

    let drain_timeout = Duration::from_millis(500);
    let grace = Duration::from_millis(500);
    let start = Instant::now();

    let timed_out = session.drain(drain_timeout).await.unwrap();
    assert!(timed_out, "guest should outlive the drain timeout");

    session.teardown(grace).await.unwrap();
    assert_eq!(session.state(), SessionState::Terminated);

    // Returned within the drain timeout plus the grace period, with slack
    // for scheduling.
    assert!(
        start.elapsed() < drain_timeout + grace + Duration::from_secs(2),
        "teardown took {:?}",
        start.elapsed()
    );

    // The process must actually be gone (signal 0 probes existence).
    #[cfg(unix)]
    {
        let alive = unsafe { libc::kill(pid as i32, 0) } == 0;
        assert!(!alive, "guest pid {} still running after teardown", pid);
    }

    // Partial output captured before the timeout is kept.
    assert!(session.captured().text().contains("exiting"));
}

#[tokio::test]
async fn test_teardown_is_idempotent() {
    let mut session = Session::launch(&mock_guest(), &[], None).await.unwrap();

    session.teardown(Duration::from_millis(500)).await.unwrap();
    assert_eq!(session.state(), SessionState::Terminated);

    // Second invocation is a no-op, not an error.
    session.teardown(Duration::from_millis(500)).await.unwrap();
    assert_eq!(session.state(), SessionState::Terminated);
}

#[tokio::test]
async fn test_broken_pipe_aborts_steps_but_not_the_run() {
    let mut plan = mock_plan(&["--die-after", "1"]);
    plan.steps = vec![
        CommandStep::new("animctl start", Duration::from_millis(500)),
        CommandStep::new("animctl view", Duration::from_millis(500)),
        CommandStep::new("exit", Duration::from_millis(100)),
    ];
    plan.indicators = vec![Indicator::new("stopped", "Stopped.")];

    let report = harness::run(&plan).await.unwrap();

    assert!(
        report.io_error.is_some(),
        "expected a contained stream error, got {:?}",
        report.io_error
    );
    // The verdict is still computed over whatever was captured.
    assert_eq!(report.verdict.present("stopped"), Some(false));
}

#[tokio::test]
async fn test_end_to_end_smoke_script() {
    let mut plan = mock_plan(&[]);
    plan.steps = vec![
        CommandStep::new("animctl start", Duration::from_millis(200)),
        CommandStep::new("animctl view", Duration::from_millis(300)),
        CommandStep::new("animctl stop", Duration::from_millis(200)),
        CommandStep::new("exit", Duration::from_millis(100)),
    ];
    plan.indicators = vec![
        Indicator::new("stopped", "Stopped."),
        Indicator::new("exited", "exiting"),
    ];

    let report = harness::run(&plan).await.unwrap();

    assert!(!report.timed_out);
    assert!(report.io_error.is_none());
    assert_eq!(report.verdict.present("stopped"), Some(true));
    assert_eq!(report.verdict.present("exited"), Some(true));
    assert!(
        report.tail.contains("Stopped."),
        "trailing excerpt missing stop acknowledgment: {}",
        report.tail
    );
    assert!(report.exit_status.unwrap().success());
}

#[tokio::test]
async fn test_launch_failure_is_fatal() {
    let plan = SessionPlan::new("/no/such/emulator-binary");
    let err = harness::run(&plan).await.unwrap_err();
    assert!(
        matches!(err, guest_harness::Error::Launch { .. }),
        "unexpected error: {}",
        err
    );
}

// ============== CLI surface ==============

#[test]
fn test_cli_run_reports_indicators_and_exits_zero() {
    let output = std::process::Command::new(harness_bin())
        .args([
            "run",
            "--program",
            mock_guest().to_str().unwrap(),
            "--boot-delay",
            "0",
            "--drain-timeout",
            "5",
            "--grace-period",
            "1",
            "--send",
            "animctl stop@0.2",
            "--send",
            "exit@0.1",
            "--indicator",
            "stopped=Stopped.",
            "--indicator",
            "exited=exiting",
        ])
        .output()
        .expect("failed to run harness binary");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "harness exited nonzero:\nstdout: {}\nstderr: {}",
        stdout,
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("indicator 'stopped' detected"), "{}", stdout);
    assert!(stdout.contains("indicator 'exited' detected"), "{}", stdout);
    assert!(stdout.contains("Stopped."), "{}", stdout);
}

#[test]
fn test_cli_run_exit_code_ignores_missing_indicators() {
    // Indicator results are advisory: absence must not change the exit code.
    let output = std::process::Command::new(harness_bin())
        .args([
            "run",
            "--program",
            mock_guest().to_str().unwrap(),
            "--boot-delay",
            "0",
            "--send",
            "exit@0.1",
            "--indicator",
            "stopped=Stopped.",
        ])
        .output()
        .expect("failed to run harness binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("indicator 'stopped' not detected"), "{}", stdout);
}

#[test]
fn test_cli_launch_error_exits_nonzero() {
    let output = std::process::Command::new(harness_bin())
        .args(["run", "--program", "/no/such/emulator-binary", "--boot-delay", "0"])
        .output()
        .expect("failed to run harness binary");

    assert!(!output.status.success());
}

#[test]
fn test_cli_scenario_file() {
    let dir = tempfile::tempdir().unwrap();
    let scenario_path = dir.path().join("smoke.yaml");
    std::fs::write(
        &scenario_path,
        format!(
            r#"
name: mock smoke
emulator:
  program: "{}"
boot_delay_secs: 0.1
drain_timeout_secs: 5
grace_period_secs: 1
steps:
  - send: animctl stop
    delay_secs: 0.2
  - send: exit
    delay_secs: 0.1
indicators:
  - name: stopped
    phrase: "Stopped."
"#,
            mock_guest().display()
        ),
    )
    .unwrap();

    let output = std::process::Command::new(harness_bin())
        .args(["scenario", scenario_path.to_str().unwrap()])
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run harness binary");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "scenario run failed:\nstdout: {}\nstderr: {}",
        stdout,
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("'stopped' detected"), "{}", stdout);
}
