//! Ordered command stacks
//!
//! A stack runs its commands strictly in order. With `stop_on_fail` the first
//! non-zero exit ends the run and becomes the stack's result.

use crate::exec::{CommandRunner, CommandSpec, ExecResult};
use crate::Result;
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct ExecStack {
    steps: Vec<CommandSpec>,
    stop_on_fail: bool,
    dir: Option<PathBuf>,
}

/// Aggregate outcome of a stack run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackResult {
    /// Number of commands actually executed
    pub executed: usize,

    /// Index of the first failing command, if any
    pub failed_step: Option<usize>,

    /// Result of the first failing command, or the last one run
    pub result: ExecResult,
}

impl StackResult {
    pub fn success(&self) -> bool {
        self.failed_step.is_none()
    }

    pub fn exit_code(&self) -> i32 {
        self.result.exit_code
    }
}

impl ExecStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop_on_fail(mut self) -> Self {
        self.stop_on_fail = true;
        self
    }

    /// Working directory for steps that do not set their own
    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Queue a command
    pub fn exec(&mut self, command: CommandSpec) -> &mut Self {
        self.steps.push(command);
        self
    }

    pub fn steps(&self) -> &[CommandSpec] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub async fn run(&self, runner: &dyn CommandRunner) -> Result<StackResult> {
        let mut outcome = StackResult::default();

        for (index, step) in self.steps.iter().enumerate() {
            let step = match (&step.dir, &self.dir) {
                (None, Some(dir)) => step.clone().dir(dir),
                _ => step.clone(),
            };

            let result = runner.run(&step).await?;
            outcome.executed += 1;

            if !result.success() {
                warn!("Command exited with code {}: {}", result.exit_code, step);
                if outcome.failed_step.is_none() {
                    outcome.failed_step = Some(index);
                    outcome.result = result;
                }
                if self.stop_on_fail {
                    debug!("Stopping stack after step {} of {}", index + 1, self.steps.len());
                    break;
                }
            } else if outcome.failed_step.is_none() {
                outcome.result = result;
            }
        }

        Ok(outcome)
    }
}
