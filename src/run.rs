//! The `run` command: submit a definition and follow its runs
//!
//! Submission is strictly sequential and the first failure aborts it: load,
//! convert, process, name, upload, submit. Nothing is retried and nothing
//! already uploaded is rolled back.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::api::{Backend, HttpBackend, RunId, RunMeta};
use crate::common::config::{self, Config, State};
use crate::common::{Error, Result};
use crate::definition::{self, Definition, TestSpec};
use crate::naming;
use crate::report::{self, Submission};
use crate::tracker::{self, Mode, ProgressInfo, TrackedRun};

/// Options of a single `run` invocation
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub file: PathBuf,
    pub org: Option<String>,
    pub no_dns: bool,
    pub docker_compose: bool,
    pub no_await: bool,
    pub first_dns_name: Option<String>,
    pub meta: RunMeta,
}

/// Result of a successful submission
///
/// `tests`, `dns` (when not empty) and `run_ids` are index-aligned.
#[derive(Debug)]
pub struct Submitted {
    pub definition_id: String,
    pub definition: Definition,
    pub tests: Vec<TestSpec>,
    pub dns: Vec<String>,
    pub run_ids: Vec<RunId>,
}

impl Submitted {
    /// Runs to follow, with their estimated step counts
    pub fn tracked_runs(&self) -> Vec<TrackedRun> {
        self.tests
            .iter()
            .zip(&self.run_ids)
            .map(|(test, id)| TrackedRun {
                id: id.clone(),
                info: ProgressInfo {
                    name: test.name.clone(),
                    total: test.guess_steps(),
                },
            })
            .collect()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Upload the definition and start one run per test
pub async fn submit(backend: &dyn Backend, org: &str, opts: &RunOptions) -> Result<Submitted> {
    let loaded = definition::load(&opts.file, opts.docker_compose)?;
    let (tests, definition) = definition::process(&loaded.canonical)?;
    tracing::debug!(tests = tests.len(), "processed definition");

    let dns = naming::assign_names(tests.len(), opts.no_dns, opts.first_dns_name.as_deref())?;

    let name = file_name(&opts.file);
    let definition_id = backend
        .upload_files(org, &name, loaded.raw, loaded.canonical)
        .await?;
    tracing::info!(%definition_id, "uploaded definition");

    let run_ids = backend
        .run_test(org, &definition_id, &opts.meta, &dns)
        .await?;
    if run_ids.len() != tests.len() {
        return Err(Error::Submission(format!(
            "expected {} run IDs, server returned {}",
            tests.len(),
            run_ids.len()
        )));
    }
    tracing::info!(runs = run_ids.len(), "submitted test runs");

    Ok(Submitted {
        definition_id,
        definition,
        tests,
        dns,
        run_ids,
    })
}

/// Submit, print the report and, unless disabled, follow the runs
///
/// `on_submitted` runs once the remote side has accepted the runs and never
/// when submission fails. Tracking stops on Ctrl-C; the remote runs are left
/// running.
pub async fn execute<W, F>(
    backend: Arc<dyn Backend>,
    config: &Config,
    org: &str,
    opts: &RunOptions,
    mode: Mode,
    out: &mut W,
    on_submitted: F,
) -> Result<()>
where
    W: Write,
    F: FnOnce(&Submitted),
{
    let submitted = submit(backend.as_ref(), org, opts).await?;
    on_submitted(&submitted);

    report::write_submission(
        out,
        &Submission {
            definition_id: &submitted.definition_id,
            tests: &submitted.tests,
            dns: &submitted.dns,
            run_ids: &submitted.run_ids,
            dns_zone: &config.dns_zone,
        },
    )?;
    out.flush()?;

    if opts.no_await {
        return Ok(());
    }

    let runs = submitted.tracked_runs();
    let interrupted = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::debug!("Ctrl-C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };
    tokio::select! {
        result = tracker::track(backend, runs, config.poll_interval(), mode, out) => result,
        _ = interrupted => Err(Error::Interrupted),
    }
}

/// Entry point of the `run` command
pub async fn run(config: &Config, opts: RunOptions) -> Result<()> {
    let state = State::load();
    let (org, remember) = config::resolve_org(opts.org.as_deref(), &state, config)?;

    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(config)?);
    let mut stdout = std::io::stdout();
    execute(backend, config, &org, &opts, Mode::detect(), &mut stdout, |_| {
        if remember {
            remember_org(&org);
        }
    })
    .await
}

/// Save the organization for later runs; failure only warns
fn remember_org(org: &str) {
    let updated = State {
        org: Some(org.to_string()),
    };
    if let Err(e) = updated.save() {
        tracing::warn!("could not remember organization: {}", e);
    }
}
