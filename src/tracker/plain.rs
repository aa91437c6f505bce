//! Sequential tracking with plain status lines

use std::io::Write;
use std::time::Duration;

use colored::Colorize;

use crate::api::Backend;

use super::{follow, outcome_of, RunOutcome, RunState, TrackedRun};

/// Follow runs one at a time, writing a line per state change
///
/// A run is followed to its end before the next one is polled. Failures are
/// written as soon as they happen.
pub async fn track_plain<W: Write>(
    backend: &dyn Backend,
    runs: &[TrackedRun],
    interval: Duration,
    out: &mut W,
) -> Vec<RunOutcome> {
    let mut outcomes = Vec::with_capacity(runs.len());

    for run in runs {
        let name = run.info.name.as_str();
        let tracked = follow(backend, run, interval, |state, status| {
            match state {
                RunState::Pending => {}
                RunState::Running { progress, total } => match status.message.as_deref() {
                    Some(message) => writeln!(out, "{}: step {}/{} {}", name, progress, total, message)?,
                    None => writeln!(out, "{}: step {}/{}", name, progress, total)?,
                },
                RunState::Succeeded => writeln!(out, "{}: {}", name, "completed".green())?,
                RunState::Failed(_) => {}
            }
            Ok(())
        })
        .await;

        let result = outcome_of(name, tracked);
        if let Err(e) = &result {
            if let Err(io) = writeln!(out, "{} {}", "Error:".red().bold(), e) {
                tracing::warn!("failed to write tracking output: {}", io);
            }
        }
        outcomes.push(RunOutcome {
            name: name.to_string(),
            result,
        });
    }

    outcomes
}
