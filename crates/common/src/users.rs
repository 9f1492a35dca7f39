//! QA fixture users
//!
//! Creates one user per basic site role and, when the workflow module is on,
//! the workflow users layered on top of those roles. User management goes
//! through a [`RoleManager`]; [`Drush`] is the implementation used against a
//! real site.

use crate::config::Context;
use crate::exec::{CommandRunner, CommandSpec};
use crate::stack::{ExecStack, StackResult};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// A user to create and the roles to give it, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSpec {
    pub name: String,
    pub roles: Vec<String>,
}

impl UserSpec {
    pub fn new(name: &str, roles: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn mail(&self) -> String {
        format!("{}@example.com", self.name)
    }
}

/// One user per basic role
pub fn base_users() -> Vec<UserSpec> {
    vec![
        UserSpec::new("sitemanager", &["site manager"]),
        UserSpec::new("editor", &["editor"]),
        UserSpec::new("creator", &["content creator"]),
    ]
}

/// Workflow users: a base role plus the matching workflow role
pub fn workflow_users() -> Vec<UserSpec> {
    vec![
        UserSpec::new("contributor", &["content creator", "Workflow Contributor"]),
        UserSpec::new("moderator", &["editor", "Workflow Moderator"]),
        UserSpec::new("supervisor", &["site manager", "Workflow Supervisor"]),
    ]
}

/// Site user and role administration
#[async_trait]
pub trait RoleManager: Send + Sync {
    /// Whether the workflow permissions module is enabled
    async fn has_workflow(&self) -> Result<bool>;

    /// Name of the module `has_workflow` looks for
    fn workflow_module(&self) -> &str;

    /// Command creating `user`, with password equal to the username
    fn create_user(&self, user: &UserSpec) -> CommandSpec;

    /// Command granting `role` to `user`
    fn assign_role(&self, user: &UserSpec, role: &str) -> CommandSpec;
}

/// drush-backed role manager, run from the docroot
pub struct Drush {
    runner: Arc<dyn CommandRunner>,
    binary: String,
    docroot: PathBuf,
    workflow_module: String,
}

impl Drush {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        binary: impl Into<String>,
        docroot: impl Into<PathBuf>,
        workflow_module: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            binary: binary.into(),
            docroot: docroot.into(),
            workflow_module: workflow_module.into(),
        }
    }

    pub fn from_context(runner: Arc<dyn CommandRunner>, ctx: &Context) -> Self {
        Self::new(
            runner,
            ctx.config.tools.drush.clone(),
            ctx.docroot(),
            ctx.config.workflow.module.clone(),
        )
    }

    fn command(&self) -> CommandSpec {
        CommandSpec::new(&self.binary).dir(&self.docroot)
    }
}

#[async_trait]
impl RoleManager for Drush {
    async fn has_workflow(&self) -> Result<bool> {
        let probe = self
            .command()
            .arg("php-eval")
            .arg(format!("echo module_exists(\"{}\");", self.workflow_module))
            .capture_output();
        let result = self.runner.run(&probe).await?;
        if !result.success() {
            let detail = match result.stderr.trim() {
                "" => format!("exit code {}", result.exit_code),
                stderr => stderr.to_string(),
            };
            return Err(Error::FeatureCheckFailed(detail));
        }
        debug!("{} enabled: {:?}", self.workflow_module, result.message());
        Ok(result.message() == "1")
    }

    fn workflow_module(&self) -> &str {
        &self.workflow_module
    }

    fn create_user(&self, user: &UserSpec) -> CommandSpec {
        self.command().args([
            "ucrt".to_string(),
            user.name.clone(),
            format!("--mail={}", user.mail()),
            format!("--password={}", user.name),
        ])
    }

    fn assign_role(&self, user: &UserSpec, role: &str) -> CommandSpec {
        self.command()
            .args(["urol".to_string(), role.to_string(), format!("--name={}", user.name)])
    }
}

/// Users created and the stack result
#[derive(Debug, Clone)]
pub struct QaUsersOutcome {
    pub users: Vec<UserSpec>,
    pub result: StackResult,
}

/// Decide the user set and queue their commands.
///
/// The workflow check runs before anything is queued, so an unmet
/// requirement leaves the site untouched.
pub async fn plan_qa_users(
    manager: &dyn RoleManager,
    workflow: bool,
) -> Result<(Vec<UserSpec>, ExecStack)> {
    let mut users = base_users();
    if workflow {
        if !manager.has_workflow().await? {
            return Err(Error::WorkflowNotEnabled {
                module: manager.workflow_module().to_string(),
            });
        }
        users.extend(workflow_users());
    }

    let mut stack = ExecStack::new().stop_on_fail();
    for user in &users {
        stack.exec(manager.create_user(user));
        for role in &user.roles {
            stack.exec(manager.assign_role(user, role));
        }
    }
    Ok((users, stack))
}

pub async fn create_qa_users(
    manager: &dyn RoleManager,
    runner: &dyn CommandRunner,
    workflow: bool,
) -> Result<QaUsersOutcome> {
    let (users, stack) = plan_qa_users(manager, workflow).await?;
    info!("Creating {} QA users", users.len());
    let result = stack.run(runner).await?;
    Ok(QaUsersOutcome { users, result })
}
