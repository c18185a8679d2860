//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Directory
    pub content_dir: String,
    pub public_dir: String,
    pub target_dir: String,

    // Pipeline
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub publish: PublishConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_dir: "content".to_string(),
            public_dir: "public".to_string(),
            target_dir: "../site".to_string(),

            generator: GeneratorConfig::default(),
            publish: PublishConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(config)
    }
}

/// External static-site generator invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Executable name or path
    pub command: String,
    /// Arguments passed on every run
    pub args: Vec<String>,
    /// Pass `verbose_flag` to the generator
    pub verbose: bool,
    pub verbose_flag: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: "hugo".to_string(),
            args: Vec::new(),
            verbose: false,
            verbose_flag: "--verbose".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Full argument list for one invocation
    pub fn command_args(&self) -> Vec<String> {
        let mut args = self.args.clone();
        if self.verbose && !self.verbose_flag.is_empty() {
            args.push(self.verbose_flag.clone());
        }
        args
    }
}

/// How the publishing directory gets replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishMode {
    /// Short-circuit on the first failing step, swap the target atomically
    #[default]
    Checked,
    /// Wipe then copy, ignoring the outcome of every step but the last
    Legacy,
}

impl std::fmt::Display for PublishMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishMode::Checked => f.write_str("checked"),
            PublishMode::Legacy => f.write_str("legacy"),
        }
    }
}

/// Publishing target configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    pub mode: PublishMode,
    /// Glob patterns for target root entries that are never cleared
    pub preserve: Vec<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            mode: PublishMode::Checked,
            preserve: vec![".git".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.content_dir, "content");
        assert_eq!(config.public_dir, "public");
        assert_eq!(config.generator.command, "hugo");
        assert_eq!(config.publish.mode, PublishMode::Checked);
        assert_eq!(config.publish.preserve, vec![".git"]);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
target_dir: ../me.github.io
generator:
  command: zola
  args: [build]
  verbose: true
  verbose_flag: --debug
publish:
  mode: legacy
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.extra["title"], serde_yaml::Value::from("My Blog"));
        assert_eq!(config.target_dir, "../me.github.io");
        assert_eq!(config.public_dir, "public");
        assert_eq!(config.generator.command, "zola");
        assert_eq!(config.generator.command_args(), vec!["build", "--debug"]);
        assert_eq!(config.publish.mode, PublishMode::Legacy);
        assert_eq!(config.publish.preserve, vec![".git"]);
    }

    #[test]
    fn test_quiet_generator_has_no_verbose_flag() {
        let config = GeneratorConfig::default();
        assert!(config.command_args().is_empty());
    }

    #[test]
    fn test_unknown_fields_are_kept() {
        let config: SiteConfig = serde_yaml::from_str("baseURL: https://example.org\n").unwrap();
        assert!(config.extra.contains_key("baseURL"));
    }
}
