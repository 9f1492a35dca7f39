//! Coding standard checks via phpcs/phpcbf

use crate::config::Context;
use crate::exec::{CommandRunner, CommandSpec};
use crate::stack::{ExecStack, StackResult};
use crate::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Linter {
    phpcs: PathBuf,
    phpcbf: PathBuf,
    sniffer_path: PathBuf,
    project_dir: PathBuf,
    standards: Vec<String>,
    extensions: Vec<String>,
}

impl Linter {
    pub fn from_context(ctx: &Context) -> Self {
        Self {
            phpcs: ctx.vendor_bin("phpcs"),
            phpcbf: ctx.vendor_bin("phpcbf"),
            sniffer_path: ctx.sniffer_path(),
            project_dir: ctx.project_dir.clone(),
            standards: ctx.config.lint.standards.clone(),
            extensions: ctx.config.lint.extensions.clone(),
        }
    }

    /// Registers the custom sniffs with phpcs
    pub fn register_rules(&self) -> CommandSpec {
        CommandSpec::for_path(&self.phpcs)
            .args(["--config-set", "installed_paths"])
            .arg(self.sniffer_path.to_string_lossy())
    }

    fn configured(&self, binary: &Path) -> CommandSpec {
        CommandSpec::for_path(binary)
            .arg(format!("--standard={}", self.standards.join(",")))
            .arg(format!("--extensions={}", self.extensions.join(",")))
    }

    fn resolve<'a>(&'a self, paths: &'a [String]) -> impl Iterator<Item = String> + 'a {
        paths
            .iter()
            .map(move |p| self.project_dir.join(p).to_string_lossy().into_owned())
    }

    /// Rule registration, then phpcs over `paths` (project-relative)
    pub fn check_stack(&self, paths: &[String]) -> ExecStack {
        let mut stack = ExecStack::new().stop_on_fail();
        stack
            .exec(self.register_rules())
            .exec(self.configured(&self.phpcs).args(self.resolve(paths)));
        stack
    }

    /// Rule registration, then phpcbf over `paths` (project-relative)
    pub fn fix_stack(&self, paths: &[String]) -> ExecStack {
        let mut stack = ExecStack::new().stop_on_fail();
        stack
            .exec(self.register_rules())
            .exec(self.configured(&self.phpcbf).args(self.resolve(paths)));
        stack
    }

    /// Rule registration, then phpcs with raw arguments
    pub fn phpcs_stack(&self, args: &[String]) -> ExecStack {
        let mut stack = ExecStack::new().stop_on_fail();
        stack
            .exec(self.register_rules())
            .exec(CommandSpec::for_path(&self.phpcs).args(args.iter().cloned()));
        stack
    }

    /// phpcbf with raw arguments
    pub fn phpcbf_stack(&self, args: &[String]) -> ExecStack {
        let mut stack = ExecStack::new();
        stack.exec(CommandSpec::for_path(&self.phpcbf).args(args.iter().cloned()));
        stack
    }

    pub async fn check(&self, runner: &dyn CommandRunner, paths: &[String]) -> Result<StackResult> {
        debug!("Linting {} path(s)", paths.len());
        self.check_stack(paths).run(runner).await
    }

    pub async fn fix(&self, runner: &dyn CommandRunner, paths: &[String]) -> Result<StackResult> {
        debug!("Fixing {} path(s)", paths.len());
        self.fix_stack(paths).run(runner).await
    }
}
