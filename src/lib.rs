//! sitepub: render a markdown blog and publish it to a sibling checkout
//!
//! The content directory is rendered by an external static-site generator
//! into the build output directory, which then replaces the contents of the
//! publishing target (typically a separately hosted pages repository).

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod publish;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Configuration file looked up in the base directory
pub const CONFIG_FILE: &str = "_config.yml";

/// A blog checkout and the directories the pipeline works on
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content directory
    pub content_dir: PathBuf,
    /// Build output directory
    pub public_dir: PathBuf,
    /// Publishing target directory
    pub target_dir: PathBuf,
}

impl Site {
    /// Create a new Site instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        // Target safety checks compare paths lexically, so they need an absolute base
        let base_dir = std::path::absolute(base_dir.as_ref())?;
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a Site from an already loaded configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let base_dir = publish::tree::normalize(&base_dir);
        let resolve = |dir: &str| publish::tree::normalize(&base_dir.join(dir));

        let content_dir = resolve(&config.content_dir);
        let public_dir = resolve(&config.public_dir);
        let target_dir = resolve(&config.target_dir);

        Self {
            config,
            base_dir,
            content_dir,
            public_dir,
            target_dir,
        }
    }

    /// Point the pipeline at a different publishing target
    pub fn set_target<P: AsRef<Path>>(&mut self, target: P) {
        self.target_dir = publish::tree::normalize(&self.base_dir.join(target));
    }

    /// Render and publish the site with the configured generator
    pub fn deploy(&self) -> Result<publish::DeployReport> {
        commands::deploy::run(self, &commands::deploy::DeployOptions::default())
    }

    /// Render the site without publishing it
    pub fn generate(&self) -> Result<usize> {
        commands::generate::run(self)
    }

    /// Clean the build output directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
