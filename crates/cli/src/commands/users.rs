//! QA Users Command

use anyhow::Result;
use clap::Args;
use sitekit_common::users::create_qa_users;
use sitekit_common::{Drush, UserSpec};

use super::Session;
use crate::output::{print_error, print_list, print_success, TableDisplay};

#[derive(Args, Debug, Default)]
pub struct QaUsersArgs {
    /// Create workflow users as well
    #[arg(short, long)]
    pub workflow: bool,
}

impl TableDisplay for UserSpec {
    fn headers() -> Vec<&'static str> {
        vec!["User", "Mail", "Roles"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.name.clone(), self.mail(), self.roles.join(", ")]
    }
}

/// `test:qa-users`
pub async fn execute(session: &Session, args: QaUsersArgs) -> Result<i32> {
    let drush = Drush::from_context(session.runner.clone(), &session.ctx);
    let outcome = create_qa_users(&drush, session.runner.as_ref(), args.workflow).await?;

    if outcome.result.success() {
        print_list(&outcome.users, session.format);
        print_success(&format!(
            "Created {} QA users; passwords match usernames",
            outcome.users.len()
        ));
    } else {
        print_error(&format!(
            "User creation stopped after {} command(s)",
            outcome.result.executed
        ));
    }
    Ok(outcome.result.exit_code())
}
