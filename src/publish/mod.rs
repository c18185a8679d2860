//! Publish pipeline - render the content store and replace the publishing target
//!
//! The pipeline has four stages: the build output is cleaned, the generator
//! renders the site, the publishing target is cleared, and the rendered site is
//! published into it.
//!
//! Two modes exist. [`PublishMode::Legacy`] behaves like an `rm -rf` + `cp -r`
//! shell deploy: each stage runs no matter how the previous one ended, and the
//! run reports only the outcome of the final copy. A failed generator therefore
//! still wipes the target. [`PublishMode::Checked`] stops at the first failing
//! stage, refuses to publish an empty build, and swaps a verified staging
//! directory into place so the target is never observed half-written.

mod error;
pub mod tree;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub use error::{PublishError, PublishResult};
use tree::{Manifest, Preserve};

use crate::config::PublishMode;
use crate::generator::Generator;
use crate::Site;

const STAGING_SUFFIX: &str = "sitepub-staging";
const BACKUP_SUFFIX: &str = "sitepub-backup";

/// Pipeline stages, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Clean,
    Generated,
    TargetCleared,
    Published,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Clean => "clean",
            Stage::Generated => "generated",
            Stage::TargetCleared => "target-cleared",
            Stage::Published => "published",
        };
        f.write_str(name)
    }
}

/// Outcome of one deploy run
#[derive(Debug, Clone)]
pub struct DeployReport {
    pub mode: PublishMode,
    /// Stages reached, in order
    pub stages: Vec<Stage>,
    /// Whether the generator ran and exited successfully
    pub generator_ok: bool,
    /// Files in the target after the run, preserved entries excluded
    pub files_published: usize,
    pub elapsed: Duration,
}

/// Runs the deploy pipeline for a site
pub struct Publisher<'a> {
    site: &'a Site,
    generator: &'a dyn Generator,
    preserve: Preserve,
    mode: PublishMode,
}

impl<'a> Publisher<'a> {
    /// Create a publisher using the site's configured mode and preserve list
    pub fn new(site: &'a Site, generator: &'a dyn Generator) -> PublishResult<Self> {
        Ok(Self {
            site,
            generator,
            preserve: Preserve::new(&site.config.publish.preserve)?,
            mode: site.config.publish.mode,
        })
    }

    pub fn with_mode(mut self, mode: PublishMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> PublishMode {
        self.mode
    }

    /// Directory the site is staged in before the swap
    pub fn staging_dir(&self) -> PathBuf {
        sibling(&self.site.target_dir, STAGING_SUFFIX)
    }

    /// Directory the previous target is parked in during the swap
    pub fn backup_dir(&self) -> PathBuf {
        sibling(&self.site.target_dir, BACKUP_SUFFIX)
    }

    /// Clean the build output and render the site, without publishing.
    /// Returns the number of files the generator produced.
    pub fn generate(&self) -> PublishResult<usize> {
        self.preflight()?;
        self.clean_output()?;
        Ok(self.render()?.len())
    }

    /// Run the full pipeline in the configured mode
    pub fn deploy(&self) -> PublishResult<DeployReport> {
        tracing::info!(
            "Deploying {:?} -> {:?} ({} mode)",
            self.site.public_dir,
            self.site.target_dir,
            self.mode
        );
        match self.mode {
            PublishMode::Checked => self.deploy_checked(),
            PublishMode::Legacy => self.deploy_legacy(),
        }
    }

    fn deploy_checked(&self) -> PublishResult<DeployReport> {
        let start = Instant::now();
        let mut stages = Vec::with_capacity(4);

        self.preflight()?;

        self.clean_output()?;
        stages.push(Stage::Clean);

        let expected = self.render()?;
        stages.push(Stage::Generated);
        tracing::info!("Generated {} files", expected.len());

        let staging = self.staging_dir();
        if let Err(e) = self.stage(&staging, &expected) {
            discard(&staging);
            return Err(e);
        }

        if let Err(e) = self.swap(&staging) {
            discard(&staging);
            return Err(e);
        }
        stages.push(Stage::TargetCleared);
        stages.push(Stage::Published);

        let report = DeployReport {
            mode: self.mode,
            stages,
            generator_ok: true,
            files_published: expected.count_excluding(&self.preserve),
            elapsed: start.elapsed(),
        };
        tracing::info!(
            "Published {} files to {:?} in {:.2}s",
            report.files_published,
            self.site.target_dir,
            report.elapsed.as_secs_f64()
        );
        Ok(report)
    }

    fn deploy_legacy(&self) -> PublishResult<DeployReport> {
        let start = Instant::now();
        let site = self.site;

        if let Err(e) = tree::remove_dir_if_exists(&site.public_dir) {
            tracing::warn!("{}", e);
        }

        let generator_ok = match self.generator.run(&site.base_dir) {
            Ok(status) if status.success() => true,
            Ok(status) => {
                tracing::warn!("Generator `{}` exited with {}", self.generator.name(), status);
                false
            }
            Err(e) => {
                tracing::error!("{}", e);
                false
            }
        };

        if let Err(e) = tree::clear_dir(&site.target_dir, &self.preserve) {
            tracing::warn!("{}", e);
        }

        // The copy is the last step, so its outcome is the outcome of the run
        let copied = tree::copy_tree(&site.public_dir, &site.target_dir)?;
        tracing::info!("Copied {} files to {:?}", copied, site.target_dir);

        Ok(DeployReport {
            mode: self.mode,
            stages: vec![
                Stage::Clean,
                Stage::Generated,
                Stage::TargetCleared,
                Stage::Published,
            ],
            generator_ok,
            files_published: copied,
            elapsed: start.elapsed(),
        })
    }

    /// Refuse to run against a missing content store or an overlapping target
    fn preflight(&self) -> PublishResult<()> {
        let site = self.site;
        if !site.content_dir.is_dir() {
            return Err(PublishError::MissingContent(site.content_dir.clone()));
        }

        for other in [&site.public_dir, &site.content_dir] {
            if tree::overlaps(&site.target_dir, other) {
                return Err(PublishError::UnsafeTarget {
                    target: site.target_dir.clone(),
                    other: other.clone(),
                });
            }
        }

        // The target may sit inside the source tree (`docs/`), never around it
        if tree::normalize(&site.base_dir).starts_with(tree::normalize(&site.target_dir)) {
            return Err(PublishError::UnsafeTarget {
                target: site.target_dir.clone(),
                other: site.base_dir.clone(),
            });
        }

        Ok(())
    }

    fn clean_output(&self) -> PublishResult<()> {
        if tree::remove_dir_if_exists(&self.site.public_dir)? {
            tracing::info!("Deleted: {:?}", self.site.public_dir);
        }
        Ok(())
    }

    /// Run the generator and snapshot what it produced
    fn render(&self) -> PublishResult<Manifest> {
        tracing::info!("Running generator `{}`", self.generator.name());
        let status = self.generator.run(&self.site.base_dir)?;
        if !status.success() {
            return Err(PublishError::GeneratorFailed {
                command: self.generator.name(),
                status,
            });
        }

        let manifest = Manifest::scan(&self.site.public_dir, &Preserve::none())?;
        if manifest.is_empty() {
            return Err(PublishError::EmptyOutput(self.site.public_dir.clone()));
        }
        Ok(manifest)
    }

    /// Copy the build output into a fresh staging directory and verify it
    fn stage(&self, staging: &Path, expected: &Manifest) -> PublishResult<()> {
        tree::remove_dir_if_exists(staging)?;
        tree::copy_tree(&self.site.public_dir, staging)?;

        let staged = Manifest::scan(staging, &Preserve::none())?;
        let diff = expected.diff(&staged);
        if !diff.is_empty() {
            return Err(PublishError::ManifestMismatch(diff.to_string()));
        }
        tracing::debug!("Staged {} files in {:?}", staged.len(), staging);
        Ok(())
    }

    /// Replace the target with the staging directory, carrying preserved entries over
    fn swap(&self, staging: &Path) -> PublishResult<()> {
        let target = &self.site.target_dir;
        let backup = self.backup_dir();

        if !target.exists() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(PublishError::io(parent))?;
            }
            return fs::rename(staging, target).map_err(PublishError::io(target));
        }

        tree::remove_dir_if_exists(&backup)?;
        fs::rename(target, &backup).map_err(PublishError::io(target))?;

        let swapped = tree::move_preserved(&backup, staging, &self.preserve)
            .and_then(|_| fs::rename(staging, target).map_err(PublishError::io(target)));

        match swapped {
            Ok(()) => {
                if let Err(e) = tree::remove_dir_if_exists(&backup) {
                    tracing::warn!("Published, but the previous site was left at {:?}: {}", backup, e);
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!("Swap failed, restoring {:?}", target);
                if let Err(undo) = tree::move_preserved(staging, &backup, &self.preserve)
                    .and_then(|_| fs::rename(&backup, target).map_err(PublishError::io(target)))
                {
                    tracing::error!("Restore failed, previous site is at {:?}: {}", backup, undo);
                }
                Err(e)
            }
        }
    }

    /// Remove staging or backup directories left behind by an interrupted run
    pub fn remove_leftovers(&self) -> PublishResult<Vec<PathBuf>> {
        let mut removed = Vec::new();
        for dir in [self.staging_dir(), self.backup_dir()] {
            if tree::remove_dir_if_exists(&dir)? {
                tracing::info!("Deleted: {:?}", dir);
                removed.push(dir);
            }
        }
        Ok(removed)
    }
}

/// `<parent>/.<name>.<suffix>`, on the same filesystem as `path`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "site".to_string());
    path.with_file_name(format!(".{}.{}", name, suffix))
}

fn discard(dir: &Path) {
    if let Err(e) = tree::remove_dir_if_exists(dir) {
        tracing::warn!("Could not remove {:?}: {}", dir, e);
    }
}
