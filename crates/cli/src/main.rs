//! sitekit CLI - Main Entry Point
//!
//! Wraps the test runners, linter and fixture tooling of a DKAN site project.
//! Commands propagate the wrapped tool's exit code.

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use sitekit_cli::commands::lint::PathsArgs;
use sitekit_cli::commands::test::{PassthroughArgs, Target};
use sitekit_cli::commands::users::QaUsersArgs;
use sitekit_cli::commands::{config, lint, test, users, Session};
use sitekit_cli::output::{self, OutputFormat};
use sitekit_common::{Context, ProcessRunner};

// Options are not global; everything after the command goes to the wrapped tool.

/// sitekit - test, lint and fixture tooling for DKAN sites
#[derive(Parser, Debug)]
#[command(name = "sitekit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Project root (default: nearest ancestor with sitekit.toml or dkan/test)
    #[arg(long, env = "SITEKIT_PROJECT_DIR")]
    project_dir: Option<PathBuf>,

    /// sitekit installation root holding vendor/bin/phpcs
    #[arg(long, env = "SITEKIT_TOOLS_DIR")]
    tools_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Install test dependencies and create test output directories
    #[command(name = "test:init")]
    TestInit,

    /// Run the platform behat tests
    #[command(name = "test:behat")]
    TestBehat(PassthroughArgs),

    /// Run the project's custom behat tests
    #[command(name = "test:behat-custom")]
    TestBehatCustom(PassthroughArgs),

    /// Run the platform phpunit tests
    #[command(name = "test:phpunit")]
    TestPhpunit(PassthroughArgs),

    /// Run the project's custom phpunit tests
    #[command(name = "test:phpunit-custom")]
    TestPhpunitCustom(PassthroughArgs),

    /// Install and run cypress
    #[command(name = "test:cypress")]
    TestCypress,

    /// Create QA users for each basic role
    #[command(name = "test:qa-users")]
    TestQaUsers(QaUsersArgs),

    /// Check coding standards of paths inside the project
    Lint(PathsArgs),

    /// Fix coding standard violations of paths inside the project
    #[command(name = "lint:fix")]
    LintFix(PathsArgs),

    /// Proxy to phpcs
    Phpcs(PassthroughArgs),

    /// Proxy to phpcbf
    Phpcbf(PassthroughArgs),

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let cwd = std::env::current_dir().context("Cannot determine working directory")?;
    let ctx = Context::discover(&cwd, cli.project_dir, cli.tools_dir)
        .context("Failed to resolve project")?;
    debug!("Project root: {}", ctx.project_dir.display());
    let session = Session::new(ctx, Arc::new(ProcessRunner), cli.format);

    match cli.command {
        Commands::TestInit => test::execute_init(&session).await,
        Commands::TestBehat(args) => test::execute_behat(&session, Target::Platform, args).await,
        Commands::TestBehatCustom(args) => test::execute_behat(&session, Target::Custom, args).await,
        Commands::TestPhpunit(args) => test::execute_phpunit(&session, Target::Platform, args).await,
        Commands::TestPhpunitCustom(args) => {
            test::execute_phpunit(&session, Target::Custom, args).await
        }
        Commands::TestCypress => test::execute_cypress(&session).await,
        Commands::TestQaUsers(args) => users::execute(&session, args).await,
        Commands::Lint(args) => lint::execute_lint(&session, args).await,
        Commands::LintFix(args) => lint::execute_fix(&session, args).await,
        Commands::Phpcs(args) => lint::execute_phpcs(&session, args).await,
        Commands::Phpcbf(args) => lint::execute_phpcbf(&session, args).await,
        Commands::Config => config::execute(&session),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sitekit").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_behat_passthrough_keeps_flags() {
        let cli = parse(&["test:behat", "--name=Datastore API", "features/a.feature"]);
        match cli.command {
            Commands::TestBehat(args) => {
                assert_eq!(args.args, vec!["--name=Datastore API", "features/a.feature"])
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_passthrough_may_be_empty() {
        match parse(&["test:phpunit-custom"]).command {
            Commands::TestPhpunitCustom(args) => assert!(args.args.is_empty()),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_tool_flags_after_command_are_passed_through() {
        let cli = parse(&["--verbose", "test:behat", "--format=progress", "--verbose"]);
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Table);
        match cli.command {
            Commands::TestBehat(args) => assert_eq!(args.args, vec!["--format=progress", "--verbose"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_qa_users_short_flag() {
        match parse(&["test:qa-users", "-w"]).command {
            Commands::TestQaUsers(args) => assert!(args.workflow),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_lint_fix_paths() {
        match parse(&["--format", "json", "lint:fix", "a", "b"]).command {
            Commands::LintFix(args) => assert_eq!(args.paths, vec!["a", "b"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Cli::try_parse_from(["sitekit", "test:nope"]).is_err());
    }
}
