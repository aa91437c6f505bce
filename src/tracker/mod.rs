//! Run status tracking
//!
//! After submission every run is polled until the server reports it
//! finished or failed. On a terminal the runs are followed concurrently with
//! a progress bar each; otherwise they are followed one after another with
//! plain status lines.

mod interactive;
mod plain;

pub use interactive::track_interactive;
pub use plain::track_plain;

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use indicatif::MultiProgress;

use crate::api::{Backend, RunId, RunStatus};
use crate::common::{Error, Result};

/// Display name and estimated step count of a tracked run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressInfo {
    pub name: String,
    pub total: u64,
}

/// A submitted run to follow
#[derive(Debug, Clone)]
pub struct TrackedRun {
    pub id: RunId,
    pub info: ProgressInfo,
}

/// Final result of following one run
#[derive(Debug)]
pub struct RunOutcome {
    pub name: String,
    pub result: Result<()>,
}

/// Lifecycle of a tracked run as seen by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Pending,
    Running { progress: u64, total: u64 },
    Succeeded,
    Failed(String),
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Succeeded | RunState::Failed(_))
    }

    /// Fold a status snapshot into the state
    ///
    /// Progress never goes backwards and the total grows when the server
    /// reports more steps than estimated. Reaching the total is not
    /// terminal; only `finished` or an error ends a run.
    pub fn advance(&self, status: &RunStatus, estimate: u64) -> RunState {
        if self.is_terminal() {
            return self.clone();
        }
        if status.is_terminal() {
            return match &status.error {
                Some(error) => RunState::Failed(error.clone()),
                None => RunState::Succeeded,
            };
        }

        let (shown, total) = match self {
            RunState::Running { progress, total } => (*progress, *total),
            _ => (0, estimate),
        };
        let progress = shown.max(status.steps);
        let total = total.max(status.total.unwrap_or(0)).max(progress);
        RunState::Running { progress, total }
    }
}

/// How runs are presented while they are followed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Concurrent progress bars
    Interactive,
    /// Sequential plain lines, for logs and pipes
    Plain,
}

impl Mode {
    /// Interactive when both stdout and stderr are terminals
    pub fn detect() -> Self {
        if std::io::stdout().is_terminal() && std::io::stderr().is_terminal() {
            Mode::Interactive
        } else {
            Mode::Plain
        }
    }
}

/// Poll a run until it reaches a terminal state
///
/// `on_change` is called whenever the state changes. A failed status request
/// ends tracking of the run; there are no retries.
pub(crate) async fn follow<F>(
    backend: &dyn Backend,
    run: &TrackedRun,
    interval: Duration,
    mut on_change: F,
) -> Result<RunState>
where
    F: FnMut(&RunState, &RunStatus) -> Result<()>,
{
    let mut state = RunState::Pending;
    loop {
        let status = backend.run_status(&run.id).await?;
        tracing::trace!(run = %run.id, ?status, "polled run status");

        let next = state.advance(&status, run.info.total);
        if next != state {
            on_change(&next, &status)?;
            state = next;
        }
        if state.is_terminal() {
            tracing::debug!(run = %run.id, ?state, "run reached terminal state");
            return Ok(state);
        }
        tokio::time::sleep(interval).await;
    }
}

/// Map the final state of a run to its outcome
pub(crate) fn outcome_of(name: &str, tracked: Result<RunState>) -> Result<()> {
    match tracked {
        Ok(RunState::Failed(reason)) => Err(Error::tracking(name, reason)),
        Ok(_) => Ok(()),
        Err(e) if e.is_tracking() => Err(e),
        Err(e) => Err(Error::tracking(name, e)),
    }
}

/// Follow every run to completion and report failures
///
/// Plain mode writes to `out`; progress bars draw on stderr. Failures never
/// stop the other runs from being followed. Once all runs are done, any
/// failure turns into [`Error::TrackingFailed`].
pub async fn track<W: std::io::Write>(
    backend: Arc<dyn Backend>,
    runs: Vec<TrackedRun>,
    interval: Duration,
    mode: Mode,
    out: &mut W,
) -> Result<()> {
    let failed = match mode {
        Mode::Interactive => {
            let outcomes = track_interactive(backend, runs, interval, MultiProgress::new()).await;
            let mut failed = 0;
            for outcome in outcomes {
                if let Err(e) = outcome.result {
                    failed += 1;
                    eprintln!("{} {}", "Error:".red().bold(), e);
                }
            }
            failed
        }
        Mode::Plain => {
            let outcomes = track_plain(backend.as_ref(), &runs, interval, out).await;
            outcomes.iter().filter(|o| o.result.is_err()).count()
        }
    };

    if failed > 0 {
        Err(Error::TrackingFailed(failed))
    } else {
        Ok(())
    }
}
