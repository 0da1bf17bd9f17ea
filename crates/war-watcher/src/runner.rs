//! Action runner: executes the command chain when a path settles.
//!
//! [`ChainRunner`] walks the [`CommandChain`] in order. Each command is
//! launched as a child process with its output captured; the output is
//! logged line by line once the process exits. The first command that fails
//! to launch or exits non-zero ends the chain, and the remaining commands are
//! skipped for this trigger only.
//!
//! The runner is reached through the [`ActionHandler`] trait so the debounce
//! engine does not depend on process execution.

use std::fmt;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::process::Command;
use tracing::{debug, info, warn};
use war_core::{CommandChain, CommandSpec};

use crate::events::WatchEvent;

/// Work performed when a path's debounce timer fires.
///
/// Implementations run on the timer's own task, so they may take as long as
/// they need without holding up the event loop or other paths.
pub trait ActionHandler: Send + Sync + 'static {
    /// Handles the most recent relevant event of a settled path.
    fn handle(&self, event: WatchEvent) -> BoxFuture<'_, ()>;
}

/// How a single command ended.
#[derive(Debug)]
pub enum StepStatus {
    /// The process exited successfully.
    Succeeded,
    /// The process ran and exited unsuccessfully.
    Failed(ExitStatus),
    /// The process could not be started.
    LaunchFailed(std::io::Error),
}

impl StepStatus {
    /// Returns `true` if the command succeeded.
    #[inline]
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => f.write_str("ok"),
            Self::Failed(status) => write!(f, "{status}"),
            Self::LaunchFailed(error) => write!(f, "{error}"),
        }
    }
}

/// The result of running one command of the chain.
#[derive(Debug)]
pub struct StepReport {
    /// The command line that ran.
    pub command: String,

    /// How the command ended.
    pub status: StepStatus,

    /// Captured standard output followed by standard error.
    pub output: String,
}

/// The result of one pass over the command chain.
#[derive(Debug, Default)]
pub struct ChainOutcome {
    /// Commands that ran, in order. Only the last one can have failed.
    pub steps: Vec<StepReport>,

    /// Commands that did not run because an earlier command failed.
    pub skipped: usize,
}

impl ChainOutcome {
    /// Returns `true` if every command ran and succeeded.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.skipped == 0 && self.steps.iter().all(|step| step.status.is_success())
    }

    /// Returns the command that ended the chain early, if any.
    #[must_use]
    pub fn failed_step(&self) -> Option<&StepReport> {
        self.steps.last().filter(|step| !step.status.is_success())
    }

    /// Returns the command lines that ran, in order.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|step| step.command.as_str())
    }

    /// Summarizes the outcome for structured logging.
    #[must_use]
    pub fn summary(&self) -> ChainSummary {
        ChainSummary {
            ran: self.steps.len(),
            skipped: self.skipped,
            succeeded: self.succeeded(),
            failed_command: self.failed_step().map(|step| step.command.clone()),
        }
    }
}

/// Compact view of a [`ChainOutcome`], logged once the chain finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainSummary {
    /// Number of commands that ran.
    pub ran: usize,

    /// Number of commands skipped after a failure.
    pub skipped: usize,

    /// Whether every command succeeded.
    pub succeeded: bool,

    /// The command that failed, if any.
    pub failed_command: Option<String>,
}

/// Runs a [`CommandChain`] with stop-on-first-failure semantics.
///
/// The chain is shared read-only; cloning the runner is cheap.
#[derive(Debug, Clone)]
pub struct ChainRunner {
    chain: Arc<CommandChain>,
}

impl ChainRunner {
    /// Creates a runner for the given chain.
    #[must_use]
    pub fn new(chain: CommandChain) -> Self {
        Self {
            chain: Arc::new(chain),
        }
    }

    /// Returns the chain this runner executes.
    #[must_use]
    pub fn chain(&self) -> &CommandChain {
        &self.chain
    }

    /// Runs the chain once, in order, stopping at the first failure.
    pub async fn run(&self) -> ChainOutcome {
        let mut outcome = ChainOutcome::default();

        for (index, spec) in self.chain.iter().enumerate() {
            let step = run_step(spec).await;

            for line in step.output.lines() {
                info!("{line}");
            }

            let failed = !step.status.is_success();
            if failed {
                warn!("failed to run {}: {}", step.command, step.status);
            }
            outcome.steps.push(step);

            if failed {
                outcome.skipped = self.chain.len() - index - 1;
                break;
            }
        }

        outcome
    }
}

impl ActionHandler for ChainRunner {
    fn handle(&self, event: WatchEvent) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            info!("{event}");
            let summary = self.run().await.summary();
            debug!(
                path = %event.path,
                ran = summary.ran,
                skipped = summary.skipped,
                succeeded = summary.succeeded,
                failed_command = summary.failed_command.as_deref(),
                "Command chain finished"
            );
        })
    }
}

/// Launches one command and waits for it, capturing its output.
async fn run_step(spec: &CommandSpec) -> StepReport {
    debug!(command = %spec, "Running command");

    let result = Command::new(spec.program())
        .args(spec.args())
        .stdin(Stdio::null())
        .output()
        .await;

    let (status, output) = match result {
        Ok(output) => {
            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&output.stderr));

            let status = if output.status.success() {
                StepStatus::Succeeded
            } else {
                StepStatus::Failed(output.status)
            };
            (status, text)
        }
        Err(error) => (StepStatus::LaunchFailed(error), String::new()),
    };

    StepReport {
        command: spec.line().to_owned(),
        status,
        output,
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn runner(lines: &[&str]) -> ChainRunner {
        ChainRunner::new(CommandChain::parse(lines).unwrap())
    }

    #[tokio::test]
    async fn test_runs_every_command_in_order() {
        let outcome = runner(&["echo A", "echo B"]).run().await;

        assert!(outcome.succeeded());
        assert_eq!(outcome.commands().collect::<Vec<_>>(), ["echo A", "echo B"]);
        assert_eq!(outcome.steps[0].output, "A\n");
        assert_eq!(outcome.steps[1].output, "B\n");
        assert_eq!(outcome.skipped, 0);
    }

    #[tokio::test]
    async fn test_stops_at_first_failure() {
        let outcome = runner(&["false", "echo never"]).run().await;

        assert!(!outcome.succeeded());
        assert_eq!(outcome.commands().collect::<Vec<_>>(), ["false"]);
        assert_eq!(outcome.skipped, 1);
        assert!(matches!(outcome.steps[0].status, StepStatus::Failed(_)));
        assert!(outcome.steps.iter().all(|step| !step.output.contains("never")));
    }

    #[tokio::test]
    async fn test_failure_in_middle_skips_the_rest() {
        let outcome = runner(&["echo A", "false", "echo C"]).run().await;

        assert_eq!(outcome.commands().collect::<Vec<_>>(), ["echo A", "false"]);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.failed_step().map(|s| s.command.as_str()), Some("false"));
    }

    #[tokio::test]
    async fn test_launch_failure_stops_chain() {
        let outcome = runner(&["war-test-no-such-program-xyz", "echo never"])
            .run()
            .await;

        assert_eq!(outcome.steps.len(), 1);
        assert!(matches!(
            outcome.steps[0].status,
            StepStatus::LaunchFailed(_)
        ));
        assert_eq!(outcome.skipped, 1);
    }

    #[tokio::test]
    async fn test_captures_stderr_after_stdout() {
        let outcome = runner(&["ls /war-test-missing-directory"]).run().await;

        let step = &outcome.steps[0];
        assert!(matches!(step.status, StepStatus::Failed(_)));
        assert!(step.output.contains("war-test-missing-directory"));
    }

    #[tokio::test]
    async fn test_summary() {
        let outcome = runner(&["true", "false", "true", "true"]).run().await;

        assert_eq!(
            outcome.summary(),
            ChainSummary {
                ran: 2,
                skipped: 2,
                succeeded: false,
                failed_command: Some("false".to_owned()),
            }
        );
    }

    #[tokio::test]
    async fn test_empty_chain_runs_nothing() {
        let outcome = ChainRunner::new(CommandChain::default()).run().await;

        assert!(outcome.succeeded());
        assert!(outcome.steps.is_empty());
        assert_eq!(
            outcome.summary(),
            ChainSummary {
                succeeded: true,
                ..ChainSummary::default()
            }
        );
    }
}
