//! Test tool invocation
//!
//! A [`TestSuite`] binds a tool family to a test directory. Running it checks
//! the tool's config files, bootstraps the environment, then runs the tool
//! with its fixed flags followed by the caller's arguments.

use crate::bootstrap::Bootstrapper;
use crate::config::Context;
use crate::exec::{CommandRunner, CommandSpec, ExecResult};
use crate::stack::{ExecStack, StackResult};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Suite name of the platform behat tests
pub const PLATFORM_SUITE: &str = "dkan";

/// Suite name of the project-specific behat tests
pub const CUSTOM_SUITE: &str = "custom";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolFamily {
    Behat,
    Phpunit,
}

impl ToolFamily {
    /// Binary, relative to the test directory
    pub fn binary(&self) -> &'static str {
        match self {
            ToolFamily::Behat => "bin/behat",
            ToolFamily::Phpunit => "bin/phpunit",
        }
    }

    /// Config files that must exist in the test directory
    pub fn required_files(&self) -> &'static [&'static str] {
        match self {
            ToolFamily::Behat => &["behat.yml", "behat.docker.yml"],
            ToolFamily::Phpunit => &["phpunit/phpunit.xml"],
        }
    }

    fn config_label(&self) -> &'static str {
        match self {
            ToolFamily::Behat => "Behat config file",
            ToolFamily::Phpunit => "PhpUnit config file",
        }
    }

    /// Fixed flags, in the order they are passed
    pub fn base_args(&self, suite: Option<&str>) -> Vec<String> {
        match self {
            ToolFamily::Behat => {
                let mut args = vec!["--colors".to_string()];
                if let Some(suite) = suite {
                    args.push(format!("--suite={}", suite));
                }
                args.extend(
                    [
                        "--format=pretty",
                        "--out=std",
                        "--format=junit",
                        "--out=assets/junit",
                        "--config=behat.docker.yml",
                    ]
                    .map(String::from),
                );
                args
            }
            ToolFamily::Phpunit => vec!["--verbose".to_string(), "--configuration=phpunit".to_string()],
        }
    }
}

/// A tool family bound to a test directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSuite {
    pub family: ToolFamily,
    pub dir: PathBuf,
    pub suite: Option<String>,
}

impl TestSuite {
    pub fn behat(dir: impl Into<PathBuf>, suite: impl Into<String>) -> Self {
        Self {
            family: ToolFamily::Behat,
            dir: dir.into(),
            suite: Some(suite.into()),
        }
    }

    pub fn phpunit(dir: impl Into<PathBuf>) -> Self {
        Self {
            family: ToolFamily::Phpunit,
            dir: dir.into(),
            suite: None,
        }
    }

    pub fn platform_behat(ctx: &Context) -> Self {
        Self::behat(ctx.test_dir(), PLATFORM_SUITE)
    }

    pub fn custom_behat(ctx: &Context) -> Self {
        Self::behat(ctx.custom_test_dir(), CUSTOM_SUITE)
    }

    pub fn platform_phpunit(ctx: &Context) -> Self {
        Self::phpunit(ctx.test_dir())
    }

    pub fn custom_phpunit(ctx: &Context) -> Self {
        Self::phpunit(ctx.custom_test_dir())
    }

    /// Fail on the first missing config file
    pub fn check_preconditions(&self) -> Result<()> {
        for file in self.family.required_files() {
            let path = self.dir.join(file);
            if !path.exists() {
                return Err(Error::MissingPrecondition {
                    what: self.family.config_label().to_string(),
                    path,
                });
            }
        }
        Ok(())
    }

    /// Base command followed by `passthrough`, verbatim and in order
    pub fn command(&self, passthrough: &[String]) -> CommandSpec {
        CommandSpec::for_path(&self.dir.join(self.family.binary()))
            .args(self.family.base_args(self.suite.as_deref()))
            .args(passthrough.iter().cloned())
            .dir(&self.dir)
    }
}

/// Runs test suites after bootstrapping their environment
pub struct TestInvoker {
    runner: Arc<dyn CommandRunner>,
    bootstrapper: Bootstrapper,
}

impl TestInvoker {
    pub fn new(runner: Arc<dyn CommandRunner>, bootstrapper: Bootstrapper) -> Self {
        Self {
            runner,
            bootstrapper,
        }
    }

    pub async fn run(&self, suite: &TestSuite, passthrough: &[String]) -> Result<ExecResult> {
        suite.check_preconditions()?;
        self.bootstrapper.init().await?;

        let command = suite.command(passthrough);
        info!("Running {:?} tests in {}", suite.family, suite.dir.display());
        debug!("Command: {}", command);
        self.runner.run(&command).await
    }
}

/// Installs and runs cypress against the site
#[derive(Debug, Clone)]
pub struct Cypress {
    project_dir: PathBuf,
    npm: String,
    base_url: String,
}

impl Cypress {
    pub fn new(project_dir: &Path, npm: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            project_dir: project_dir.to_path_buf(),
            npm: npm.into(),
            base_url: base_url.into(),
        }
    }

    pub fn from_context(ctx: &Context) -> Self {
        Self::new(
            &ctx.project_dir,
            ctx.config.tools.npm.clone(),
            ctx.config.cypress.base_url.clone(),
        )
    }

    pub fn stack(&self) -> ExecStack {
        let binary = self
            .project_dir
            .join("node_modules")
            .join("cypress")
            .join("bin")
            .join("cypress");

        let mut stack = ExecStack::new().stop_on_fail().dir(&self.project_dir);
        stack
            .exec(CommandSpec::new(&self.npm).args(["install", "cypress"]))
            .exec(
                CommandSpec::for_path(&binary)
                    .arg("run")
                    .env("CYPRESS_baseUrl", &self.base_url),
            );
        stack
    }

    pub async fn run(&self, runner: &dyn CommandRunner) -> Result<StackResult> {
        info!("Running cypress against {}", self.base_url);
        self.stack().run(runner).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::TestLayout;
    use crate::testing::RecordingRunner;
    use tempfile::TempDir;

    const BEHAT_BASE: &[&str] = &[
        "--colors",
        "--suite=dkan",
        "--format=pretty",
        "--out=std",
        "--format=junit",
        "--out=assets/junit",
        "--config=behat.docker.yml",
    ];

    fn project(files: &[&str]) -> (TempDir, Context) {
        let tmp = TempDir::new().unwrap();
        let ctx = Context::with_defaults(tmp.path());
        std::fs::create_dir_all(ctx.test_dir().join("vendor")).unwrap();
        for file in files {
            let path = ctx.test_dir().join(file);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, "").unwrap();
        }
        (tmp, ctx)
    }

    fn invoker(ctx: &Context, runner: &Arc<RecordingRunner>) -> TestInvoker {
        let bootstrapper = Bootstrapper::new(runner.clone(), TestLayout::from_context(ctx));
        TestInvoker::new(runner.clone(), bootstrapper)
    }

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_behat_command_appends_passthrough_in_order() {
        let suite = TestSuite::behat("/p/dkan/test", "dkan");
        let passthrough = strings(&["--name=Datastore API", "features/workflow.feature", "-v"]);
        let command = suite.command(&passthrough);

        let mut expected = strings(BEHAT_BASE);
        expected.extend(passthrough);
        assert_eq!(command.program, "/p/dkan/test/bin/behat");
        assert_eq!(command.args, expected);
        assert_eq!(command.dir, Some(PathBuf::from("/p/dkan/test")));
    }

    #[test]
    fn test_phpunit_command_has_no_suite() {
        let suite = TestSuite::phpunit("/p/src/test");
        let command = suite.command(&strings(&["--testsuite=Harvest"]));
        assert_eq!(command.program, "/p/src/test/bin/phpunit");
        assert_eq!(
            command.args,
            strings(&["--verbose", "--configuration=phpunit", "--testsuite=Harvest"])
        );
    }

    #[test]
    fn test_custom_suite_binds_secondary_dir() {
        let ctx = Context::with_defaults("/p");
        let suite = TestSuite::custom_behat(&ctx);
        assert_eq!(suite.dir, PathBuf::from("/p/src/test"));
        assert_eq!(suite.suite.as_deref(), Some(CUSTOM_SUITE));
    }

    #[tokio::test]
    async fn test_missing_config_fails_before_any_process() {
        let (_tmp, ctx) = project(&["behat.yml"]);
        let runner = Arc::new(RecordingRunner::new());

        let err = invoker(&ctx, &runner)
            .run(&TestSuite::platform_behat(&ctx), &[])
            .await
            .unwrap_err();

        match err {
            Error::MissingPrecondition { path, .. } => {
                assert_eq!(path, ctx.test_dir().join("behat.docker.yml"))
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(runner.calls().is_empty());
        assert!(!ctx.test_dir().join("assets").exists());
    }

    #[tokio::test]
    async fn test_empty_passthrough_runs_base_command() {
        let (_tmp, ctx) = project(&["behat.yml", "behat.docker.yml"]);
        let runner = Arc::new(RecordingRunner::new().fail("bin/behat", 1));

        let result = invoker(&ctx, &runner)
            .run(&TestSuite::platform_behat(&ctx), &[])
            .await
            .unwrap();

        assert_eq!(result.exit_code, 1);
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args, strings(BEHAT_BASE));
        assert!(ctx.test_dir().join("assets/junit").is_dir());
    }

    #[tokio::test]
    async fn test_bootstrap_runs_before_tool() {
        let tmp = TempDir::new().unwrap();
        let ctx = Context::with_defaults(tmp.path());
        let phpunit_xml = ctx.test_dir().join("phpunit/phpunit.xml");
        std::fs::create_dir_all(phpunit_xml.parent().unwrap()).unwrap();
        std::fs::write(&phpunit_xml, "<phpunit/>").unwrap();
        let runner = Arc::new(RecordingRunner::new());

        invoker(&ctx, &runner)
            .run(&TestSuite::platform_phpunit(&ctx), &strings(&["--filter=Foo"]))
            .await
            .unwrap();

        let lines = runner.command_lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("composer install"));
        assert!(lines[1].ends_with("bin/phpunit --verbose --configuration=phpunit --filter=Foo"));
    }

    #[tokio::test]
    async fn test_cypress_installs_then_runs() {
        let runner = RecordingRunner::new();
        let cypress = Cypress::new(Path::new("/p"), "npm", "http://web");

        let result = cypress.run(&runner).await.unwrap();

        assert!(result.success());
        assert_eq!(
            runner.command_lines(),
            vec![
                "npm install cypress".to_string(),
                "CYPRESS_baseUrl=http://web /p/node_modules/cypress/bin/cypress run".to_string(),
            ]
        );
        assert!(runner.calls().iter().all(|c| c.dir == Some(PathBuf::from("/p"))));
    }

    #[tokio::test]
    async fn test_cypress_stops_when_install_fails() {
        let runner = RecordingRunner::new().fail("npm install", 1);
        let result = Cypress::new(Path::new("/p"), "npm", "http://web")
            .run(&runner)
            .await
            .unwrap();

        assert_eq!(result.exit_code(), 1);
        assert_eq!(runner.calls().len(), 1);
    }
}
