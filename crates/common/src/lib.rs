//! sitekit Common Library
//!
//! Test environment bootstrap, test tool invocation, linting and QA fixture
//! users for DKAN/Drupal site projects. Every operation is a short, ordered
//! sequence of external commands run through a [`CommandRunner`].

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod exec;
pub mod lint;
pub mod stack;
pub mod suites;
pub mod users;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export commonly used types
pub use bootstrap::{BootstrapReport, Bootstrapper, TestLayout};
pub use config::{Context, SiteConfig};
pub use error::{Error, Result};
pub use exec::{CommandRunner, CommandSpec, ExecResult, ProcessRunner};
pub use lint::Linter;
pub use stack::{ExecStack, StackResult};
pub use suites::{Cypress, TestInvoker, TestSuite, ToolFamily};
pub use users::{Drush, QaUsersOutcome, RoleManager, UserSpec};
