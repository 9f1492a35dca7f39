//! Recording command runner for tests
//!
//! Enabled for this crate's unit tests and, through the `testing` feature,
//! for dependent crates.

use crate::exec::{CommandRunner, CommandSpec, ExecResult};
use crate::Result;
use async_trait::async_trait;
use parking_lot::Mutex;

/// Records every command it is asked to run and answers from a script.
///
/// Responses are matched by substring against the rendered command line;
/// the first match wins and unmatched commands succeed with empty output.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<CommandSpec>>,
    responses: Vec<(String, ExecResult)>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands containing `pattern` with `result`
    pub fn respond(mut self, pattern: impl Into<String>, result: ExecResult) -> Self {
        self.responses.push((pattern.into(), result));
        self
    }

    /// Answer commands containing `pattern` with exit code `code`
    pub fn fail(self, pattern: impl Into<String>, code: i32) -> Self {
        self.respond(pattern, ExecResult::from_code(code))
    }

    /// Answer commands containing `pattern` with success and `stdout`
    pub fn output(self, pattern: impl Into<String>, stdout: impl Into<String>) -> Self {
        self.respond(
            pattern,
            ExecResult {
                exit_code: 0,
                stdout: stdout.into(),
                stderr: String::new(),
            },
        )
    }

    /// Every command run so far, in order
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().clone()
    }

    /// Rendered command lines run so far, in order
    pub fn command_lines(&self) -> Vec<String> {
        self.calls.lock().iter().map(ToString::to_string).collect()
    }

    /// Number of commands whose rendered line contains `pattern`
    pub fn count_matching(&self, pattern: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.to_string().contains(pattern))
            .count()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &CommandSpec) -> Result<ExecResult> {
        self.calls.lock().push(command.clone());
        let rendered = command.to_string();
        let result = self
            .responses
            .iter()
            .find(|(pattern, _)| rendered.contains(pattern.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or_default();
        Ok(result)
    }
}
