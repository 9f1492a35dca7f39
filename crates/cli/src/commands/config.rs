//! Config Command
//!
//! Shows the effective project configuration after discovery.

use anyhow::Result;
use serde::Serialize;
use sitekit_common::config::CONFIG_FILE;
use sitekit_common::Context;

use super::Session;
use crate::output::{print_info, print_list, TableDisplay};

/// One resolved setting
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Setting {
    pub name: &'static str,
    pub value: String,
}

impl TableDisplay for Setting {
    fn headers() -> Vec<&'static str> {
        vec!["Setting", "Value"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.name.to_string(), self.value.clone()]
    }
}

pub fn settings(ctx: &Context) -> Vec<Setting> {
    let config = &ctx.config;
    let setting = |name: &'static str, value: String| Setting { name, value };
    vec![
        setting("project_dir", ctx.project_dir.display().to_string()),
        setting("tools_dir", ctx.tools_dir.display().to_string()),
        setting("paths.test_dir", ctx.test_dir().display().to_string()),
        setting("paths.custom_test_dir", ctx.custom_test_dir().display().to_string()),
        setting("paths.docroot", ctx.docroot().display().to_string()),
        setting("tools.composer", config.tools.composer.clone()),
        setting("tools.npm", config.tools.npm.clone()),
        setting("tools.drush", config.tools.drush.clone()),
        setting("lint.standards", config.lint.standards.join(",")),
        setting("lint.extensions", config.lint.extensions.join(",")),
        setting("lint.sniffer_path", ctx.sniffer_path().display().to_string()),
        setting("cypress.base_url", config.cypress.base_url.clone()),
        setting("workflow.module", config.workflow.module.clone()),
    ]
}

/// `config`
pub fn execute(session: &Session) -> Result<i32> {
    if !session.ctx.project_dir.join(CONFIG_FILE).is_file() {
        print_info(&format!("No {} found; using defaults", CONFIG_FILE));
    }
    print_list(&settings(&session.ctx), session.format);
    Ok(0)
}
