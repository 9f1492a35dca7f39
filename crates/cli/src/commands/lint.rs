//! Lint Commands

use anyhow::Result;
use clap::Args;
use sitekit_common::Linter;

use super::test::PassthroughArgs;
use super::Session;

#[derive(Args, Debug, Default)]
pub struct PathsArgs {
    /// Paths to lint, relative to the project root
    pub paths: Vec<String>,
}

/// `lint`
pub async fn execute_lint(session: &Session, args: PathsArgs) -> Result<i32> {
    let result = Linter::from_context(&session.ctx)
        .check(session.runner.as_ref(), &args.paths)
        .await?;
    Ok(result.exit_code())
}

/// `lint:fix`
pub async fn execute_fix(session: &Session, args: PathsArgs) -> Result<i32> {
    let result = Linter::from_context(&session.ctx)
        .fix(session.runner.as_ref(), &args.paths)
        .await?;
    Ok(result.exit_code())
}

/// `phpcs`: raw proxy with the custom sniffs registered
pub async fn execute_phpcs(session: &Session, args: PassthroughArgs) -> Result<i32> {
    let result = Linter::from_context(&session.ctx)
        .phpcs_stack(&args.args)
        .run(session.runner.as_ref())
        .await?;
    Ok(result.exit_code())
}

/// `phpcbf`: raw proxy
pub async fn execute_phpcbf(session: &Session, args: PassthroughArgs) -> Result<i32> {
    let result = Linter::from_context(&session.ctx)
        .phpcbf_stack(&args.args)
        .run(session.runner.as_ref())
        .await?;
    Ok(result.exit_code())
}
