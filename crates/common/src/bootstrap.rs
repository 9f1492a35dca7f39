//! Test environment bootstrap
//!
//! Prepares the platform test directory (composer install, output
//! directories) and, when the project has its own test directory, links it
//! to the platform install so both share one set of binaries.

use crate::config::Context;
use crate::exec::{CommandRunner, CommandSpec, ExecResult};
use crate::{Error, Result};
use serde::Serialize;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

/// Binaries the secondary test directory borrows from the primary
const LINKED_BINARIES: &[&str] = &["behat", "phpunit"];

/// Reported install exit code when composer could not be started
const SPAWN_FAILED_EXIT_CODE: i32 = 127;

/// Paths the bootstrapper works on
#[derive(Debug, Clone)]
pub struct TestLayout {
    /// Test directory holding the real dependency install
    pub primary: PathBuf,

    /// Optional test directory linked to the primary
    pub secondary: PathBuf,

    /// Composer binary
    pub composer: String,
}

impl TestLayout {
    pub fn from_context(ctx: &Context) -> Self {
        Self {
            primary: ctx.test_dir(),
            secondary: ctx.custom_test_dir(),
            composer: ctx.config.tools.composer.clone(),
        }
    }
}

/// What bootstrapping did to one test directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    pub dir: PathBuf,

    /// Exit code of the dependency install, when one ran
    pub install_exit_code: Option<i32>,

    /// Whether the output directories had to be created
    pub created_dirs: bool,

    /// Number of symbolic links created or repaired
    pub links_created: usize,
}

impl BootstrapReport {
    fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            ..Default::default()
        }
    }

    /// Whether the dependency install ran and failed
    pub fn install_failed(&self) -> bool {
        matches!(self.install_exit_code, Some(code) if code != 0)
    }
}

pub struct Bootstrapper {
    runner: Arc<dyn CommandRunner>,
    layout: TestLayout,
}

impl Bootstrapper {
    pub fn new(runner: Arc<dyn CommandRunner>, layout: TestLayout) -> Self {
        Self { runner, layout }
    }

    /// Bootstrap the primary test directory, then the secondary if present.
    ///
    /// A failed dependency install is logged and reported, not raised.
    pub async fn init(&self) -> Result<Vec<BootstrapReport>> {
        let primary = &self.layout.primary;
        let mut reports = Vec::new();

        let mut report = BootstrapReport::new(primary);
        report.install_exit_code = self
            .install_dependencies(primary)
            .await?
            .map(|result| result.exit_code);
        report.created_dirs = self.init_test_dirs(primary).await?;
        reports.push(report);

        let secondary = &self.layout.secondary;
        if fs::metadata(secondary).await.map(|m| m.is_dir()).unwrap_or(false) {
            let mut report = BootstrapReport::new(secondary);
            report.created_dirs = self.init_test_dirs(secondary).await?;
            report.links_created = self.link(primary, secondary).await?;
            reports.push(report);
        } else {
            debug!("No secondary test directory at {:?}", secondary);
        }

        Ok(reports)
    }

    /// Run composer in `dir` unless its `vendor` marker already exists
    pub async fn install_dependencies(&self, dir: &Path) -> Result<Option<ExecResult>> {
        if path_exists(&dir.join("vendor")).await {
            debug!("Dependencies already installed in {:?}", dir);
            return Ok(None);
        }

        info!("Installing test dependencies in {}", dir.display());
        let command = CommandSpec::new(&self.layout.composer)
            .args(["install", "--prefer-source", "--no-interaction"])
            .dir(dir);
        let result = match self.runner.run(&command).await {
            Ok(result) => result,
            Err(Error::Spawn { program, source }) => {
                warn!("Could not run {}: {}", program, source);
                ExecResult::from_code(SPAWN_FAILED_EXIT_CODE)
            }
            Err(e) => return Err(e),
        };
        if !result.success() {
            warn!(
                "Dependency install in {} exited with code {}",
                dir.display(),
                result.exit_code
            );
        }
        Ok(Some(result))
    }

    /// Create `assets/junit` under `dir`; returns whether anything was created
    pub async fn init_test_dirs(&self, dir: &Path) -> Result<bool> {
        let junit = dir.join("assets").join("junit");
        if path_exists(&junit).await {
            return Ok(false);
        }

        info!("Creating test subdirectories in {}", dir.display());
        fs::create_dir_all(&junit).await?;
        Ok(true)
    }

    /// Point `dest`'s binaries and vendor directory at `src`'s
    pub async fn link(&self, src: &Path, dest: &Path) -> Result<usize> {
        info!(
            "Linking test environment {} to {}",
            dest.display(),
            src.display()
        );

        let bin_dir = dest.join("bin");
        fs::create_dir_all(&bin_dir).await?;

        let mut links = Vec::new();
        for binary in LINKED_BINARIES {
            links.push((src.join("bin").join(binary), bin_dir.join(binary)));
        }
        links.push((src.join("vendor"), dest.join("vendor")));

        let mut created = 0;
        for (target, link) in links {
            let parent = link.parent().unwrap_or(dest);
            if ensure_symlink(&relative_path(parent, &target), &link).await? {
                created += 1;
            }
        }
        Ok(created)
    }
}

async fn path_exists(path: &Path) -> bool {
    fs::metadata(path).await.is_ok()
}

/// Create `link -> target`, replacing a stale symlink. Returns whether the
/// filesystem changed. Real files or directories are never replaced.
async fn ensure_symlink(target: &Path, link: &Path) -> Result<bool> {
    match fs::symlink_metadata(link).await {
        Ok(meta) if meta.file_type().is_symlink() => {
            if fs::read_link(link).await? == target {
                return Ok(false);
            }
            debug!("Replacing stale link {:?}", link);
            fs::remove_file(link).await?;
        }
        Ok(_) => {
            warn!("{} exists and is not a link; leaving it alone", link.display());
            return Ok(false);
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    symlink(target, link).await?;
    Ok(true)
}

#[cfg(unix)]
async fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    fs::symlink(target, link).await
}

#[cfg(windows)]
async fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    let resolved = link.parent().map(|p| p.join(target)).unwrap_or_else(|| target.to_path_buf());
    if resolved.is_dir() {
        fs::symlink_dir(target, link).await
    } else {
        fs::symlink_file(target, link).await
    }
}

/// Path to `to` expressed relative to the directory `from`
fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<Component> = from.components().collect();
    let to: Vec<Component> = to.components().collect();
    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut path = PathBuf::new();
    for _ in common..from.len() {
        path.push("..");
    }
    for component in &to[common..] {
        path.push(component.as_os_str());
    }
    path
}
