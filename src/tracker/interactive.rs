//! Concurrent tracking with one progress bar per run

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tokio::sync::oneshot;

use crate::api::Backend;
use crate::common::{Error, Result};

use super::{follow, outcome_of, RunOutcome, RunState, TrackedRun};

const PENDING: &str = "pending";

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:>16.bold} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

/// Follow all runs at once, each in its own task
///
/// Every task owns its bar and sends its outcome through a dedicated
/// one-shot channel. The channels are only read after every task has
/// finished, so reading them never waits. Outcomes are returned in the order
/// of `runs`.
pub async fn track_interactive(
    backend: Arc<dyn Backend>,
    runs: Vec<TrackedRun>,
    interval: Duration,
    progress: MultiProgress,
) -> Vec<RunOutcome> {
    let style = bar_style();
    let mut tasks = Vec::with_capacity(runs.len());
    let mut receivers = Vec::with_capacity(runs.len());

    for run in runs {
        let bar = progress.add(ProgressBar::new(run.info.total));
        bar.set_style(style.clone());
        bar.set_prefix(run.info.name.clone());
        bar.set_message(PENDING);

        let (tx, rx) = oneshot::channel::<Result<()>>();
        receivers.push((run.info.name.clone(), rx));

        let backend = Arc::clone(&backend);
        tasks.push(tokio::spawn(async move {
            let tracked = follow(backend.as_ref(), &run, interval, |state, status| {
                render(&bar, state, status.message.as_deref());
                Ok(())
            })
            .await;

            if let Err(e) = &tracked {
                bar.abandon_with_message(format!("error: {}", e));
            }
            // The receiver is only dropped if the coordinator gave up.
            let _ = tx.send(outcome_of(&run.info.name, tracked));
        }));
    }

    for joined in join_all(tasks).await {
        if let Err(e) = joined {
            tracing::error!("tracking task panicked: {}", e);
        }
    }

    receivers
        .into_iter()
        .map(|(name, mut rx)| {
            let result = rx.try_recv().unwrap_or_else(|_| {
                Err(Error::tracking(&name, "tracking stopped without an outcome"))
            });
            RunOutcome { name, result }
        })
        .collect()
}

fn render(bar: &ProgressBar, state: &RunState, message: Option<&str>) {
    match state {
        RunState::Pending => {}
        RunState::Running { progress, total } => {
            bar.set_length(*total);
            bar.set_position(*progress);
            if let Some(message) = message {
                bar.set_message(message.to_string());
            } else if bar.message() == PENDING {
                bar.set_message("running");
            }
        }
        RunState::Succeeded => {
            if let Some(len) = bar.length() {
                bar.set_position(len);
            }
            bar.finish_with_message("done");
        }
        RunState::Failed(reason) => {
            bar.abandon_with_message(format!("failed: {}", reason));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use indicatif::ProgressDrawTarget;

    fn hidden() -> MultiProgress {
        MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
    }

    #[tokio::test]
    async fn test_all_runs_reach_terminal_state() {
        let backend = Arc::new(
            ScriptedStatus::new()
                .script("r1", vec![running(1), running(2), finished()])
                .script("r2", vec![running(1), finished()]),
        );
        let runs = vec![tracked("r1", "alpha", 3), tracked("r2", "beta", 2)];

        let outcomes =
            track_interactive(backend.clone(), runs, Duration::from_millis(1), hidden()).await;

        let names: Vec<_> = outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["alpha", "beta"]);
        assert!(outcomes.iter().all(|o| o.result.is_ok()));
    }

    #[tokio::test]
    async fn test_one_failure_does_not_hide_others() {
        let backend = Arc::new(
            ScriptedStatus::new()
                .script("r1", vec![running(1), failed("container exited 137")])
                .script("r2", vec![Err(Error::Internal("502 Bad Gateway".to_string()))])
                .script("r3", vec![running(4), finished()]),
        );
        let runs = vec![
            tracked("r1", "alpha", 5),
            tracked("r2", "beta", 5),
            tracked("r3", "gamma", 5),
        ];

        let outcomes = track_interactive(backend, runs, Duration::from_millis(1), hidden()).await;

        let alpha = outcomes[0].result.as_ref().unwrap_err();
        assert_eq!(alpha.to_string(), "alpha: container exited 137");
        let beta = outcomes[1].result.as_ref().unwrap_err();
        assert!(beta.to_string().contains("502 Bad Gateway"));
        assert!(outcomes[2].result.is_ok());
    }

    #[test]
    fn test_render_replaces_pending_without_server_message() {
        let bar = ProgressBar::hidden();
        bar.set_message(PENDING);

        render(&bar, &RunState::Running { progress: 1, total: 4 }, None);
        assert_eq!(bar.message(), "running");
        assert_eq!(bar.position(), 1);

        render(&bar, &RunState::Running { progress: 2, total: 4 }, Some("deploying geth"));
        render(&bar, &RunState::Running { progress: 3, total: 4 }, None);
        assert_eq!(bar.message(), "deploying geth");
    }

    #[tokio::test]
    async fn test_no_runs() {
        let backend = Arc::new(ScriptedStatus::new());
        let outcomes =
            track_interactive(backend, Vec::new(), Duration::from_millis(1), hidden()).await;
        assert!(outcomes.is_empty());
    }
}
