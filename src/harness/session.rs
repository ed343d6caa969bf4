//! Session lifecycle and console interaction
//!
//! A `Session` exclusively owns one emulator child process and its three
//! standard streams. Control flow is strictly sequential: launch, fixed boot
//! wait, scripted command injection, bounded drain, teardown. Teardown is
//! idempotent and runs on every exit path, so the child is gone by the time
//! the harness returns.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};

use crate::common::{Error, Result};

use super::capture::CapturedOutput;
use super::evaluator::{self, evaluate, Indicator, Verdict};
use super::script::{self, CommandStep};

/// Session state
///
/// Transitions are strictly forward; Terminated is the sole terminal state
/// and is reachable from every other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Emulator launched, warm-up wait in progress
    Booting,
    /// Scripted commands being sent
    Interacting,
    /// Input closed, remaining output being read
    Draining,
    /// Teardown has run; the capture is frozen
    Terminated,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Booting => write!(f, "booting"),
            Self::Interacting => write!(f, "interacting"),
            Self::Draining => write!(f, "draining"),
            Self::Terminated => write!(f, "terminated"),
        }
    }
}

/// Everything one session needs, fixed before launch
#[derive(Debug, Clone)]
pub struct SessionPlan {
    /// Emulator executable
    pub program: PathBuf,
    /// Arguments to pass to the emulator
    pub args: Vec<String>,
    /// Working directory for the emulator process
    pub working_dir: Option<PathBuf>,
    /// Fixed warm-up wait before the first command
    pub boot_delay: Duration,
    /// Ordered command script
    pub steps: Vec<CommandStep>,
    /// Hard bound on the draining phase
    pub drain_timeout: Duration,
    /// Grace period between terminate and kill
    pub grace_period: Duration,
    /// Indicator phrases to evaluate over the final capture
    pub indicators: Vec<Indicator>,
    /// Size of the trailing excerpt in the report, in characters
    pub tail_chars: usize,
}

impl SessionPlan {
    /// Plan with the built-in script and indicators and default timing
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            boot_delay: Duration::from_secs(6),
            steps: script::default_script(),
            drain_timeout: Duration::from_secs(5),
            grace_period: Duration::from_secs(2),
            indicators: evaluator::default_indicators(),
            tail_chars: 1000,
        }
    }
}

/// What a completed session produced
///
/// Contained stream/timeout problems are carried alongside the partial
/// results instead of replacing them.
#[derive(Debug)]
pub struct SessionReport {
    /// Indicator results, computed once from the final capture
    pub verdict: Verdict,
    /// Trailing excerpt of the decoded console output
    pub tail: String,
    /// Stream error that cut the session short, if any
    pub io_error: Option<String>,
    /// Whether draining hit its hard timeout
    pub timed_out: bool,
    /// Emulator exit status, if it was observed
    pub exit_status: Option<ExitStatus>,
}

/// One live emulator session
pub struct Session {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
    state: SessionState,
    started: Instant,
    captured: CapturedOutput,
    exit_status: Option<ExitStatus>,
}

impl Session {
    /// Launch the emulator with all three standard streams piped
    ///
    /// A launch failure is fatal to the run: there is no child to tear down
    /// and retrying does not help in practice.
    pub async fn launch(
        program: &Path,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> Result<Self> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = working_dir {
            command.current_dir(dir);
        }

        let mut child = command
            .spawn()
            .map_err(|e| Error::launch(program.display().to_string(), e))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Config("Could not get emulator stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Config("Could not get emulator stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Config("Could not get emulator stderr".to_string()))?;

        tracing::info!(
            program = %program.display(),
            pid = child.id(),
            "emulator launched"
        );

        Ok(Self {
            child,
            stdin: Some(stdin),
            stdout: Some(stdout),
            stderr: Some(stderr),
            state: SessionState::Booting,
            started: Instant::now(),
            captured: CapturedOutput::new(),
            exit_status: None,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// OS process id, while the child is running
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    pub fn captured(&self) -> &CapturedOutput {
        &self.captured
    }

    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.exit_status
    }

    /// Fixed warm-up wait before any interaction
    ///
    /// The guest console has no machine-checkable ready signal, so a
    /// conservative delay substitutes for a handshake.
    pub async fn boot_wait(&mut self, delay: Duration) {
        tracing::info!(delay_secs = delay.as_secs_f64(), "waiting for guest to boot");
        tokio::time::sleep(delay).await;
        self.transition(SessionState::Interacting);
    }

    /// Send the scripted commands in order, pacing each with its delay
    ///
    /// Each command is written as one newline-terminated line and flushed
    /// immediately. A write failure (broken pipe when the child exited
    /// early) aborts the remaining steps; the caller proceeds to draining.
    pub async fn drive(&mut self, steps: &[CommandStep]) -> Result<()> {
        for step in steps {
            let stdin = self.stdin.as_mut().ok_or_else(|| {
                Error::Stream(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "console input already closed",
                ))
            })?;

            tracing::info!(command = %step.text, "sending console command");
            stdin
                .write_all(step.text.as_bytes())
                .await
                .map_err(Error::Stream)?;
            stdin.write_all(b"\n").await.map_err(Error::Stream)?;
            stdin.flush().await.map_err(Error::Stream)?;

            tokio::time::sleep(step.delay).await;
        }
        Ok(())
    }

    /// Close the console input and read remaining output until end-of-stream
    /// or the timeout, whichever comes first
    ///
    /// Returns whether the timeout was hit. Partial output stays captured
    /// either way; a timeout is a valid, non-error result.
    pub async fn drain(&mut self, timeout: Duration) -> Result<bool> {
        self.transition(SessionState::Draining);

        // Closing stdin before the first read tells the guest shell that no
        // more commands are coming; some shells will not exit otherwise.
        drop(self.stdin.take());

        let mut stdout = self.stdout.take();
        let mut stderr = self.stderr.take();
        let deadline = tokio::time::Instant::now() + timeout;
        let mut out_buf = [0u8; 4096];
        let mut err_buf = [0u8; 4096];

        while stdout.is_some() || stderr.is_some() {
            tokio::select! {
                read = read_chunk(&mut stdout, &mut out_buf) => {
                    match read? {
                        Some(n) => self.captured.push(&out_buf[..n]),
                        None => stdout = None,
                    }
                }
                read = read_chunk(&mut stderr, &mut err_buf) => {
                    match read? {
                        Some(n) => self.captured.push(&err_buf[..n]),
                        None => stderr = None,
                    }
                }
                () = tokio::time::sleep_until(deadline) => {
                    tracing::warn!(
                        captured_bytes = self.captured.len(),
                        "drain timed out, keeping partial output"
                    );
                    return Ok(true);
                }
            }
        }

        // Both streams hit EOF; give the child the rest of the budget to
        // actually exit so the status can be reaped here.
        match tokio::time::timeout_at(deadline, self.child.wait()).await {
            Ok(status) => {
                let status = status?;
                self.exit_status = Some(status);
                tracing::info!(%status, "emulator exited");
                Ok(false)
            }
            Err(_) => Ok(true),
        }
    }

    /// Tear the session down: graceful terminate, bounded grace wait, then
    /// forced kill, then reap
    ///
    /// Idempotent: invoking it again is a no-op. The session is Terminated
    /// afterwards on every path, including the failure one.
    pub async fn teardown(&mut self, grace: Duration) -> Result<()> {
        if self.state == SessionState::Terminated {
            tracing::debug!("teardown already ran");
            return Ok(());
        }
        self.transition(SessionState::Terminated);

        drop(self.stdin.take());
        drop(self.stdout.take());
        drop(self.stderr.take());

        if self.exit_status.is_some() {
            tracing::debug!(
                elapsed_secs = self.started.elapsed().as_secs_f64(),
                "emulator already reaped"
            );
            return Ok(());
        }

        // Graceful first: SIGTERM lets the emulator restore the terminal
        // and flush before it goes away.
        #[cfg(unix)]
        if let Some(pid) = self.child.id() {
            unsafe { libc::kill(pid as i32, libc::SIGTERM) };
        }
        #[cfg(not(unix))]
        let _ = self.child.start_kill();

        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(Ok(status)) => {
                self.exit_status = Some(status);
                tracing::info!(
                    %status,
                    elapsed_secs = self.started.elapsed().as_secs_f64(),
                    "emulator terminated gracefully"
                );
                return Ok(());
            }
            Ok(Err(e)) => return Err(Error::Termination(e.to_string())),
            Err(_) => {
                tracing::warn!("grace period elapsed, killing emulator");
            }
        }

        // kill() also awaits the exit, so no zombie is left behind.
        match self.child.kill().await {
            Ok(()) => {
                self.exit_status = self.child.try_wait().unwrap_or(None);
                tracing::info!("emulator killed");
                Ok(())
            }
            Err(e) => Err(Error::Termination(e.to_string())),
        }
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(from = %self.state, to = %next, "session state");
        self.state = next;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Backstop only: teardown is the real cleanup path. This is
        // best-effort since we can't await in drop.
        if self.state != SessionState::Terminated {
            let _ = self.child.start_kill();
        }
    }
}

/// Read one chunk from an optional stream; `None` means end-of-stream
async fn read_chunk<R>(stream: &mut Option<R>, buf: &mut [u8]) -> Result<Option<usize>>
where
    R: tokio::io::AsyncRead + Unpin,
{
    match stream {
        Some(reader) => match reader.read(buf).await {
            Ok(0) => Ok(None),
            Ok(n) => Ok(Some(n)),
            Err(e) => Err(Error::Stream(e)),
        },
        // Stream already closed; never resolve so the other select arms win.
        None => std::future::pending().await,
    }
}

/// Run one complete session according to the plan
///
/// Only a launch failure propagates. Stream errors and the drain timeout
/// are contained: they redirect the flow to teardown and are reported in
/// the `SessionReport` alongside whatever partial output exists.
pub async fn run(plan: &SessionPlan) -> Result<SessionReport> {
    let mut session =
        Session::launch(&plan.program, &plan.args, plan.working_dir.as_deref()).await?;

    session.boot_wait(plan.boot_delay).await;

    let io_error = match session.drive(&plan.steps).await {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!(error = %e, "console write failed, aborting remaining steps");
            Some(e.to_string())
        }
    };

    let mut timed_out = false;
    let drain_error = match session.drain(plan.drain_timeout).await {
        Ok(hit_timeout) => {
            timed_out = hit_timeout;
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "console read failed");
            Some(e.to_string())
        }
    };

    if let Err(e) = session.teardown(plan.grace_period).await {
        // The harness has exhausted its recovery options; the run still
        // returns its results.
        tracing::error!(error = %e, "emulator could not be terminated");
    }

    let text = session.captured().text();
    let verdict = evaluate(&text, &plan.indicators);

    Ok(SessionReport {
        verdict,
        tail: session.captured().tail(plan.tail_chars),
        io_error: io_error.or(drain_error),
        timed_out,
        exit_status: session.exit_status(),
    })
}
