//! Sequencing of the clone, fetch and index stages.
//!
//! # Design
//!
//! - One deadline covers the whole run; every stage shares the same scope.
//! - A failing stage is logged and counted but never stops the sequence.
//! - Only a repository path that cannot be resolved ends a run early.
//! - Runs for the same repository id are not serialised. Two overlapping
//!   requests can clone, fetch and index the same bare repository at once.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use dynindex_config::ServiceConfig;
use tracing::{Instrument, info, info_span, warn};

use crate::error::{PipelineError, PipelineResult};
use crate::invocation::CommandInvocation;
use crate::outcome::CommandOutcome;
use crate::request::IndexRequest;
use crate::runner::CommandRunner;
use crate::scope::ExecutionScope;

/// Program that creates the bare clone.
pub const CLONE_PROGRAM: &str = "zoekt-git-clone";
/// Program that refreshes the bare clone.
pub const GIT_PROGRAM: &str = "git";
/// Program that writes index shards.
pub const INDEX_PROGRAM: &str = "zoekt-git-index";

const BARE_REPO_SUFFIX: &str = ".git";

/// Stages of one pipeline run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    /// `zoekt-git-clone` into the repo directory.
    Clone,
    /// `git fetch` inside the bare clone.
    Fetch,
    /// `zoekt-git-index` into the index directory.
    Index,
}

impl PipelineStage {
    /// All stages in execution order.
    pub const ALL: [Self; 3] = [Self::Clone, Self::Fetch, Self::Index];

    /// Stable label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clone => "clone",
            Self::Fetch => "fetch",
            Self::Index => "index",
        }
    }
}

/// Outcome of a single stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    /// Stage that ran.
    pub stage: PipelineStage,
    /// Result reported by the command runner.
    pub outcome: CommandOutcome,
}

/// Ordered stage outcomes of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Repository the run was for.
    pub repo_id: u32,
    /// Absolute path of the bare clone.
    pub repo_path: PathBuf,
    /// Stage outcomes in execution order.
    pub stages: Vec<StageReport>,
    /// Wall-clock time of the whole run.
    pub elapsed: Duration,
}

impl PipelineReport {
    /// Stages that did not finish successfully.
    pub fn failed_stages(&self) -> impl Iterator<Item = &StageReport> {
        self.stages
            .iter()
            .filter(|report| !report.outcome.succeeded())
    }

    /// Whether every stage succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failed_stages().next().is_none()
    }
}

/// Absolute path of the bare clone for `repo_id` under `repo_dir`.
///
/// The path is made absolute lexically; it does not have to exist.
///
/// # Errors
///
/// Returns [`PipelineError::ResolveRepoPath`] when the current directory is
/// needed but cannot be read.
pub fn resolve_repo_path(repo_dir: &Path, repo_id: u32) -> PipelineResult<PathBuf> {
    let path = repo_dir.join(format!("{repo_id}{BARE_REPO_SUFFIX}"));
    std::path::absolute(&path).map_err(|source| PipelineError::ResolveRepoPath {
        repo_id,
        path,
        source,
    })
}

/// Runs the clone, fetch and index stages for index requests.
#[derive(Clone)]
pub struct PipelineDriver {
    runner: Arc<dyn CommandRunner>,
    repo_dir: PathBuf,
    index_dir: PathBuf,
    timeout: Duration,
}

impl PipelineDriver {
    /// Driver using the directories and deadline of `config`.
    #[must_use]
    pub fn new(config: &ServiceConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            repo_dir: config.repo_dir().to_path_buf(),
            index_dir: config.index_dir().to_path_buf(),
            timeout: config.index_timeout(),
        }
    }

    /// Clone, fetch and index the repository named by `request`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ResolveRepoPath`] when the bare clone path
    /// cannot be made absolute. The clone stage has already run by then; the
    /// fetch and index stages are skipped.
    pub async fn run(&self, request: &IndexRequest) -> PipelineResult<PipelineReport> {
        let span = info_span!("pipeline", repo_id = request.repo_id);
        self.run_stages(request).instrument(span).await
    }

    async fn run_stages(&self, request: &IndexRequest) -> PipelineResult<PipelineReport> {
        let mut run = PipelineRun::start(self.timeout);
        let repo_id = request.repo_id.to_string();

        run.stage(
            self.runner.as_ref(),
            PipelineStage::Clone,
            CommandInvocation::new(CLONE_PROGRAM)
                .arg("-dest")
                .arg(&self.repo_dir)
                .arg("-name")
                .arg(&repo_id)
                .arg("-repoid")
                .arg(&repo_id)
                .arg(&request.clone_url),
        )
        .await;

        let repo_path = resolve_repo_path(&self.repo_dir, request.repo_id).inspect_err(|err| {
            warn!(error = %err, repo_dir = %self.repo_dir.display(), "repository path unavailable");
        })?;

        run.stage(
            self.runner.as_ref(),
            PipelineStage::Fetch,
            CommandInvocation::new(GIT_PROGRAM)
                .arg("-C")
                .arg(&repo_path)
                .arg("fetch"),
        )
        .await;

        run.stage(
            self.runner.as_ref(),
            PipelineStage::Index,
            CommandInvocation::new(INDEX_PROGRAM)
                .arg("-index")
                .arg(&self.index_dir)
                .arg(&repo_path),
        )
        .await;

        let report = run.finish(request.repo_id, repo_path);
        info!(
            failed_stages = report.failed_stages().count(),
            elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
            "index pipeline finished"
        );
        Ok(report)
    }
}

impl std::fmt::Debug for PipelineDriver {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("PipelineDriver")
            .field("repo_dir", &self.repo_dir)
            .field("index_dir", &self.index_dir)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

struct PipelineRun {
    scope: ExecutionScope,
    stages: Vec<StageReport>,
}

impl PipelineRun {
    fn start(timeout: Duration) -> Self {
        Self {
            scope: ExecutionScope::with_timeout(timeout),
            stages: Vec::with_capacity(PipelineStage::ALL.len()),
        }
    }

    async fn stage(
        &mut self,
        runner: &dyn CommandRunner,
        stage: PipelineStage,
        invocation: CommandInvocation,
    ) {
        let outcome = runner.run(&self.scope, invocation).await;
        self.stages.push(StageReport { stage, outcome });
    }

    fn finish(self, repo_id: u32, repo_path: PathBuf) -> PipelineReport {
        PipelineReport {
            repo_id,
            repo_path,
            stages: self.stages,
            elapsed: self.scope.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::CommandStatus;
    use crate::runner::RecordingRunner;
    use std::error::Error;

    type TestResult<T> = Result<T, Box<dyn Error>>;

    fn request(repo_id: u32) -> IndexRequest {
        IndexRequest {
            clone_url: "https://example.com/repo.git".to_string(),
            repo_id,
        }
    }

    fn driver(runner: Arc<RecordingRunner>, timeout: Duration) -> PipelineDriver {
        let config = ServiceConfig::new("/data")
            .with_repo_dir("/repo_dir")
            .with_index_dir("/index_dir")
            .with_index_timeout(timeout);
        PipelineDriver::new(&config, runner)
    }

    fn strings(parts: &[&str]) -> Vec<String> {
        parts.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn stages_run_with_expected_arguments() -> TestResult<()> {
        let runner = Arc::new(RecordingRunner::new());
        let report = driver(runner.clone(), Duration::from_secs(60))
            .run(&request(100))
            .await?;

        assert_eq!(
            runner.argv_history(),
            vec![
                strings(&[
                    "zoekt-git-clone",
                    "-dest",
                    "/repo_dir",
                    "-name",
                    "100",
                    "-repoid",
                    "100",
                    "https://example.com/repo.git",
                ]),
                strings(&["git", "-C", "/repo_dir/100.git", "fetch"]),
                strings(&["zoekt-git-index", "-index", "/index_dir", "/repo_dir/100.git"]),
            ]
        );
        assert_eq!(report.repo_path, PathBuf::from("/repo_dir/100.git"));
        assert_eq!(
            report
                .stages
                .iter()
                .map(|stage| stage.stage)
                .collect::<Vec<_>>(),
            PipelineStage::ALL
        );
        assert!(report.all_succeeded());
        Ok(())
    }

    #[tokio::test]
    async fn failing_stage_does_not_stop_sequence() -> TestResult<()> {
        let runner = Arc::new(RecordingRunner::new().with_status(
            CLONE_PROGRAM,
            CommandStatus::SpawnFailed {
                reason: "No such file or directory".to_string(),
            },
        ));
        let report = driver(runner.clone(), Duration::from_secs(60))
            .run(&request(7))
            .await?;

        assert_eq!(runner.history().len(), 3);
        let failed: Vec<_> = report.failed_stages().map(|stage| stage.stage).collect();
        assert_eq!(failed, vec![PipelineStage::Clone]);
        assert!(!report.all_succeeded());
        Ok(())
    }

    #[tokio::test]
    async fn stages_after_deadline_see_cancelled_scope() -> TestResult<()> {
        let runner =
            Arc::new(RecordingRunner::new().with_delay(CLONE_PROGRAM, Duration::from_secs(30)));
        let report = driver(runner.clone(), Duration::from_millis(20))
            .run(&request(3))
            .await?;

        let cancelled: Vec<bool> = runner
            .history()
            .iter()
            .map(|entry| entry.scope_cancelled)
            .collect();
        assert_eq!(cancelled, vec![false, true, true]);

        let statuses: Vec<&CommandStatus> = report
            .stages
            .iter()
            .map(|stage| &stage.outcome.status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                &CommandStatus::DeadlineExceeded,
                &CommandStatus::Cancelled,
                &CommandStatus::Cancelled,
            ]
        );
        Ok(())
    }

    #[test]
    fn relative_repo_dir_is_made_absolute() -> TestResult<()> {
        let resolved = resolve_repo_path(Path::new("repos"), 12)?;
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("repos/12.git"));
        Ok(())
    }

    #[test]
    fn stage_labels_are_stable() {
        let labels: Vec<_> = PipelineStage::ALL.iter().map(|stage| stage.as_str()).collect();
        assert_eq!(labels, vec!["clone", "fetch", "index"]);
    }
}
