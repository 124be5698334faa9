//! Compiler process driver.
//!
//! A compile joins two independent event sources: the compiler process
//! exiting and its output file changing. The compiler may exit before its
//! final write reaches the watcher, so a clean exit with no content seen yet
//! waits a bounded settle period for that write instead of finishing early.
//!
//! ```text
//! Idle ──> Compiling ──exit 0, content seen──────────> Done
//!              │      └─exit 0, nothing yet─> AwaitingSettle ──> Done
//!              └──exit != 0 / spawn error──> Failed
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::time::{interval, timeout, Instant, MissedTickBehavior};
use tracing::{debug, trace};

use super::CompilerInvocation;
use crate::watch::{ContentEvent, OutputWatcher, DEFAULT_DEBOUNCE};

/// Lifecycle of one [`CompilerDriver::compile`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Compiling,
    AwaitingSettle,
    Done,
    Failed,
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DriverState::Idle => "idle",
            DriverState::Compiling => "compiling",
            DriverState::AwaitingSettle => "awaiting-settle",
            DriverState::Done => "done",
            DriverState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// How long to wait for a late output write after a clean exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleOptions {
    /// Poll interval while awaiting settle
    pub tick: Duration,
    /// Upper bound on the whole settle phase
    pub timeout: Duration,
}

impl Default for SettleOptions {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            timeout: Duration::from_secs(1),
        }
    }
}

/// Errors that end a compile.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The compiler exited with a non-zero status.
    #[error("compiler exited with code {code}")]
    Exit { code: i32 },

    /// The compiler could not be started or awaited.
    #[error("unable to run compiler: {0}")]
    Spawn(#[source] std::io::Error),

    /// The output file could not be watched.
    #[error("unable to watch output file: {0}")]
    Watch(#[from] notify::Error),
}

impl CompileError {
    /// Process exit code to report for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            CompileError::Exit { code } => *code,
            _ => 1,
        }
    }
}

/// Receives compiler output while a compile is running.
///
/// Both callbacks run on the driver's task, never concurrently.
#[async_trait]
pub trait CompileHandler: Send {
    /// One line of compiler stdout or stderr.
    fn on_diagnostic(&mut self, line: &str);

    /// New content at the output path.
    async fn on_content(&mut self, content: String);
}

/// Summary of a finished compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOutcome {
    /// Content events delivered to the handler
    pub content_events: usize,
    /// True when the settle timeout elapsed without any content
    pub settled_by_timeout: bool,
}

pub struct CompilerDriver {
    state: DriverState,
    settle: SettleOptions,
    debounce: Duration,
}

impl Default for CompilerDriver {
    fn default() -> Self {
        Self::new(SettleOptions::default(), DEFAULT_DEBOUNCE)
    }
}

impl CompilerDriver {
    pub fn new(settle: SettleOptions, debounce: Duration) -> Self {
        Self {
            state: DriverState::Idle,
            settle,
            debounce,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    fn transition(&mut self, next: DriverState) {
        debug!("compiler driver: {} -> {}", self.state, next);
        self.state = next;
    }

    /// Run the compiler until it exits and its output has settled.
    ///
    /// In watch mode the compiler never exits on its own; the future keeps
    /// delivering content until it is dropped, which kills the process.
    pub async fn compile<H>(
        &mut self,
        invocation: &CompilerInvocation,
        out_file: &Path,
        handler: &mut H,
    ) -> Result<CompileOutcome, CompileError>
    where
        H: CompileHandler + ?Sized,
    {
        self.transition(DriverState::Compiling);

        let (mut watcher, mut content_rx) = match OutputWatcher::watch(out_file, self.debounce) {
            Ok(pair) => pair,
            Err(err) => {
                self.transition(DriverState::Failed);
                return Err(err.into());
            }
        };

        let result = self.run(invocation, &mut content_rx, handler).await;
        watcher.dispose();

        match &result {
            Ok(_) => self.transition(DriverState::Done),
            Err(_) => self.transition(DriverState::Failed),
        }
        result
    }

    async fn run<H>(
        &mut self,
        invocation: &CompilerInvocation,
        content_rx: &mut mpsc::Receiver<ContentEvent>,
        handler: &mut H,
    ) -> Result<CompileOutcome, CompileError>
    where
        H: CompileHandler + ?Sized,
    {
        debug!("running {}", invocation.display());
        let mut child = invocation.command().spawn().map_err(CompileError::Spawn)?;

        let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, line_tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, line_tx.clone()));
        }
        drop(line_tx);

        let mut content_events = 0usize;
        let status = loop {
            tokio::select! {
                status = child.wait() => break status.map_err(CompileError::Spawn)?,
                Some(event) = content_rx.recv() => {
                    content_events += 1;
                    handler.on_content(event.content).await;
                }
                Some(line) = line_rx.recv() => handler.on_diagnostic(&line),
            }
        };

        // Output still buffered in the pipes after exit.
        while let Ok(Some(line)) = timeout(self.settle.tick, line_rx.recv()).await {
            handler.on_diagnostic(&line);
        }

        if !status.success() {
            let code = status.code().unwrap_or(-1);
            return Err(CompileError::Exit { code });
        }

        if content_events > 0 {
            return Ok(CompileOutcome {
                content_events,
                settled_by_timeout: false,
            });
        }

        self.transition(DriverState::AwaitingSettle);
        let deadline = Instant::now() + self.settle.timeout;
        let mut ticker = interval(self.settle.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let settled_by_timeout = loop {
            tokio::select! {
                Some(event) = content_rx.recv() => {
                    content_events += 1;
                    handler.on_content(event.content).await;
                    break false;
                }
                _ = ticker.tick() => {
                    if Instant::now() >= deadline {
                        break true;
                    }
                    trace!("awaiting output");
                }
            }
        };

        Ok(CompileOutcome {
            content_events,
            settled_by_timeout,
        })
    }
}

async fn forward_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if tx.send(line).is_err() {
            break;
        }
    }
}
