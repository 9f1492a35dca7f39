//! Project configuration and directory discovery
//!
//! Everything sitekit needs to know about a project is resolved once into a
//! [`Context`] and handed to the components that need it.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Name of the optional per-project configuration file
pub const CONFIG_FILE: &str = "sitekit.toml";

/// Project configuration, as read from `sitekit.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Root of the sitekit installation (holds `vendor/bin/phpcs` etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools_dir: Option<PathBuf>,

    /// Project-relative directories
    pub paths: PathsConfig,

    /// External binaries
    pub tools: ToolsConfig,

    /// Coding standard configuration
    pub lint: LintConfig,

    /// Browser test configuration
    pub cypress: CypressConfig,

    /// Workflow module probing
    pub workflow: WorkflowConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Platform test directory, holds the real dependency install
    pub test_dir: PathBuf,

    /// Project-specific test directory, linked to `test_dir`
    pub custom_test_dir: PathBuf,

    /// Drupal docroot, where drush runs
    pub docroot: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            test_dir: PathBuf::from("dkan/test"),
            custom_test_dir: PathBuf::from("src/test"),
            docroot: PathBuf::from("docroot"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub composer: String,
    pub npm: String,
    pub drush: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            composer: "composer".to_string(),
            npm: "npm".to_string(),
            drush: "drush".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Standards passed to `--standard=`
    pub standards: Vec<String>,

    /// Extensions passed to `--extensions=`
    pub extensions: Vec<String>,

    /// Custom sniffs, relative to the tools directory
    pub sniffer_path: PathBuf,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            standards: vec!["Drupal".to_string(), "DrupalPractice".to_string()],
            extensions: [
                "php", "module", "inc", "install", "test", "profile", "theme", "info",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            sniffer_path: PathBuf::from("vendor/drupal/coder/coder_sniffer"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CypressConfig {
    pub base_url: String,
}

impl Default for CypressConfig {
    fn default() -> Self {
        Self {
            base_url: "http://web".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Module whose presence enables the workflow QA users
    pub module: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            module: "dkan_workflow_permissions".to_string(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if self.paths.test_dir.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("paths.test_dir must not be empty".into()));
        }
        for (name, path) in [
            ("paths.test_dir", &self.paths.test_dir),
            ("paths.custom_test_dir", &self.paths.custom_test_dir),
        ] {
            if path.components().any(|c| c == Component::ParentDir) {
                return Err(Error::InvalidConfig(format!(
                    "{} must stay inside the project, got {}",
                    name,
                    path.display()
                )));
            }
        }
        if self.lint.standards.is_empty() {
            return Err(Error::InvalidConfig("lint.standards must name at least one standard".into()));
        }
        if self.lint.extensions.is_empty() {
            return Err(Error::InvalidConfig("lint.extensions must not be empty".into()));
        }
        Ok(())
    }
}

/// Resolved project context
#[derive(Debug, Clone)]
pub struct Context {
    /// Project root; all configured paths are relative to it
    pub project_dir: PathBuf,

    /// sitekit installation root
    pub tools_dir: PathBuf,

    pub config: SiteConfig,
}

impl Context {
    /// Build a context from explicit overrides, falling back to discovery
    /// upwards from `cwd`.
    pub fn discover(
        cwd: &Path,
        project_dir: Option<PathBuf>,
        tools_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let project_dir = match project_dir {
            Some(dir) => cwd.join(dir),
            None => find_project_root(cwd).unwrap_or_else(|| cwd.to_path_buf()),
        };
        if !project_dir.is_dir() {
            return Err(Error::InvalidConfig(format!(
                "project directory {} does not exist",
                project_dir.display()
            )));
        }

        let config = SiteConfig::load(&project_dir.join(CONFIG_FILE))?;

        // Command-line overrides are relative to cwd, the config file's to the project.
        let tools_dir = match (tools_dir, &config.tools_dir) {
            (Some(dir), _) => cwd.join(dir),
            (None, Some(dir)) => project_dir.join(dir),
            (None, None) => project_dir.clone(),
        };

        debug!(
            "Resolved project {:?}, tools {:?}",
            project_dir, tools_dir
        );

        Ok(Self {
            project_dir,
            tools_dir,
            config,
        })
    }

    /// Context rooted at `project_dir` with default configuration
    pub fn with_defaults(project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        Self {
            tools_dir: project_dir.clone(),
            project_dir,
            config: SiteConfig::default(),
        }
    }

    pub fn test_dir(&self) -> PathBuf {
        self.project_dir.join(&self.config.paths.test_dir)
    }

    pub fn custom_test_dir(&self) -> PathBuf {
        self.project_dir.join(&self.config.paths.custom_test_dir)
    }

    pub fn docroot(&self) -> PathBuf {
        self.project_dir.join(&self.config.paths.docroot)
    }

    /// Path of a binary installed in the tools directory's composer vendor
    pub fn vendor_bin(&self, name: &str) -> PathBuf {
        self.tools_dir.join("vendor").join("bin").join(name)
    }

    pub fn sniffer_path(&self) -> PathBuf {
        self.tools_dir.join(&self.config.lint.sniffer_path)
    }
}

/// Walk up from `start` to the first directory that looks like a project root
fn find_project_root(start: &Path) -> Option<PathBuf> {
    let default_test_dir = PathsConfig::default().test_dir;
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE).is_file() || dir.join(&default_test_dir).is_dir())
        .map(Path::to_path_buf)
}
