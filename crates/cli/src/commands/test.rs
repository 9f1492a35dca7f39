//! Test Commands
//!
//! Bootstrap the test environment and run behat, phpunit and cypress.

use anyhow::Result;
use clap::Args;
use sitekit_common::{BootstrapReport, Bootstrapper, Cypress, TestInvoker, TestLayout, TestSuite};

use super::Session;
use crate::output::{print_list, print_section, print_warning, TableDisplay};

#[derive(Args, Debug, Default)]
pub struct PassthroughArgs {
    /// Arguments appended verbatim to the tool's command line
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
    pub args: Vec<String>,
}

/// Which test directory a command targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Platform,
    Custom,
}

impl TableDisplay for BootstrapReport {
    fn headers() -> Vec<&'static str> {
        vec!["Directory", "Dependencies", "Output Dirs", "Links"]
    }

    fn row(&self) -> Vec<String> {
        let install = match self.install_exit_code {
            None => "present".to_string(),
            Some(0) => "installed".to_string(),
            Some(code) => format!("failed ({})", code),
        };
        vec![
            self.dir.display().to_string(),
            install,
            if self.created_dirs { "created" } else { "present" }.to_string(),
            self.links_created.to_string(),
        ]
    }
}

fn bootstrapper(session: &Session) -> Bootstrapper {
    Bootstrapper::new(session.runner.clone(), TestLayout::from_context(&session.ctx))
}

/// `test:init`: exits with the dependency install's code when it failed
pub async fn execute_init(session: &Session) -> Result<i32> {
    print_section("Initializing test environment");
    let reports = bootstrapper(session).init().await?;
    print_list(&reports, session.format);

    match reports.iter().find(|r| r.install_failed()) {
        Some(report) => {
            print_warning(&format!(
                "Dependency install failed in {}",
                report.dir.display()
            ));
            Ok(report.install_exit_code.unwrap_or(1))
        }
        None => Ok(0),
    }
}

/// `test:behat` / `test:behat-custom`
pub async fn execute_behat(session: &Session, target: Target, args: PassthroughArgs) -> Result<i32> {
    let suite = match target {
        Target::Platform => TestSuite::platform_behat(&session.ctx),
        Target::Custom => TestSuite::custom_behat(&session.ctx),
    };
    run_suite(session, suite, args).await
}

/// `test:phpunit` / `test:phpunit-custom`
pub async fn execute_phpunit(session: &Session, target: Target, args: PassthroughArgs) -> Result<i32> {
    let suite = match target {
        Target::Platform => TestSuite::platform_phpunit(&session.ctx),
        Target::Custom => TestSuite::custom_phpunit(&session.ctx),
    };
    run_suite(session, suite, args).await
}

async fn run_suite(session: &Session, suite: TestSuite, args: PassthroughArgs) -> Result<i32> {
    let invoker = TestInvoker::new(session.runner.clone(), bootstrapper(session));
    let result = invoker.run(&suite, &args.args).await?;
    Ok(result.exit_code)
}

/// `test:cypress`
pub async fn execute_cypress(session: &Session) -> Result<i32> {
    let result = Cypress::from_context(&session.ctx)
        .run(session.runner.as_ref())
        .await?;
    Ok(result.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use sitekit_common::testing::RecordingRunner;
    use sitekit_common::{Context, Error};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn session(tmp: &TempDir, runner: &Arc<RecordingRunner>) -> Session {
        Session::new(
            Context::with_defaults(tmp.path()),
            runner.clone(),
            OutputFormat::Plain,
        )
    }

    fn write(tmp: &TempDir, rel: &str) {
        let path = tmp.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    #[tokio::test]
    async fn test_init_propagates_install_failure() {
        let tmp = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::new().fail("composer", 4));

        let code = execute_init(&session(&tmp, &runner)).await.unwrap();
        assert_eq!(code, 4);
    }

    #[tokio::test]
    async fn test_custom_behat_runs_in_secondary_dir() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("dkan/test/vendor")).unwrap();
        write(&tmp, "src/test/behat.yml");
        write(&tmp, "src/test/behat.docker.yml");
        let runner = Arc::new(RecordingRunner::new().fail("bin/behat", 1));

        let args = PassthroughArgs {
            args: vec!["features/workflow.feature".to_string()],
        };
        let code = execute_behat(&session(&tmp, &runner), Target::Custom, args)
            .await
            .unwrap();

        assert_eq!(code, 1);
        let call = runner.calls().pop().unwrap();
        assert_eq!(call.dir, Some(tmp.path().join("src/test")));
        assert!(call.args.contains(&"--suite=custom".to_string()));
        assert_eq!(call.args.last().unwrap(), "features/workflow.feature");
    }

    #[tokio::test]
    async fn test_phpunit_missing_config_is_error() {
        let tmp = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::new());

        let err = execute_phpunit(&session(&tmp, &runner), Target::Platform, PassthroughArgs::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::MissingPrecondition { .. })
        ));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cypress_exit_code() {
        let tmp = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::new().fail("cypress run", 3));

        let code = execute_cypress(&session(&tmp, &runner)).await.unwrap();
        assert_eq!(code, 3);
        assert_eq!(runner.calls().len(), 2);
    }
}
