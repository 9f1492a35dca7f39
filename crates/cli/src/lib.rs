//! sitekit CLI
//!
//! Command-line interface for bootstrapping test environments, running
//! behat/phpunit/cypress, linting, and creating QA users.

pub mod commands;
pub mod output;
