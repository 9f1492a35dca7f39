//! CLI Commands

pub mod config;
pub mod lint;
pub mod test;
pub mod users;

use crate::output::OutputFormat;
use sitekit_common::{CommandRunner, Context};
use std::sync::Arc;

/// Everything a command needs: the resolved project, a way to run tools,
/// and how to print results
pub struct Session {
    pub ctx: Context,
    pub runner: Arc<dyn CommandRunner>,
    pub format: OutputFormat,
}

impl Session {
    pub fn new(ctx: Context, runner: Arc<dyn CommandRunner>, format: OutputFormat) -> Self {
        Self { ctx, runner, format }
    }
}
