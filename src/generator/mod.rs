//! Generator module - runs the external static-site generator
//!
//! The generator is an opaque collaborator: it reads the content directory
//! and the site's own configuration and writes a full static site into the
//! build output directory. Routing, templating and assets are its business.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use crate::config::GeneratorConfig;
use crate::publish::PublishError;

/// Renders the content store into the build output directory
pub trait Generator {
    /// Human-readable name used in logs and errors
    fn name(&self) -> String;

    /// Render the site rooted at `base_dir`.
    ///
    /// The returned status is the generator's own verdict; whether a failing
    /// status stops the pipeline is up to the caller.
    fn run(&self, base_dir: &Path) -> Result<ExitStatus, PublishError>;
}

/// A generator executed as a child process, e.g. `hugo`
#[derive(Debug, Clone)]
pub struct ExternalGenerator {
    command: String,
    args: Vec<String>,
}

impl ExternalGenerator {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    /// Build from configuration, including the verbose flag when enabled
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.command.clone(), config.command_args())
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Resolve the executable the way the shell would, relative paths against `base_dir`
    pub fn resolve(&self, base_dir: &Path) -> Result<PathBuf, PublishError> {
        which::which_in(&self.command, std::env::var_os("PATH"), base_dir)
            .map_err(|_| PublishError::GeneratorNotFound(self.command.clone()))
    }
}

impl Generator for ExternalGenerator {
    fn name(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }

    fn run(&self, base_dir: &Path) -> Result<ExitStatus, PublishError> {
        let executable = self.resolve(base_dir)?;
        tracing::debug!("Running {:?} {:?} in {:?}", executable, self.args, base_dir);

        // Output is inherited so the generator's own diagnostics reach the terminal
        Command::new(&executable)
            .args(&self.args)
            .current_dir(base_dir)
            .status()
            .map_err(|source| PublishError::GeneratorSpawn {
                command: self.name(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_appends_verbose_flag() {
        let config = GeneratorConfig {
            command: "hugo".to_string(),
            args: vec!["--minify".to_string()],
            verbose: true,
            verbose_flag: "--verbose".to_string(),
        };
        let generator = ExternalGenerator::from_config(&config);
        assert_eq!(generator.args(), ["--minify", "--verbose"]);
        assert_eq!(generator.name(), "hugo --minify --verbose");
    }

    #[test]
    fn test_missing_executable() {
        let dir = tempfile::TempDir::new().unwrap();
        let generator = ExternalGenerator::new("definitely-not-a-site-generator", Vec::new());
        let err = generator.run(dir.path()).unwrap_err();
        assert!(matches!(err, PublishError::GeneratorNotFound(ref c) if c == "definitely-not-a-site-generator"));
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_in_base_dir_and_reports_status() {
        let dir = tempfile::TempDir::new().unwrap();

        let ok = ExternalGenerator::new(
            "sh",
            vec!["-c".to_string(), "mkdir -p public && echo hi > public/index.html".to_string()],
        );
        assert!(ok.run(dir.path()).unwrap().success());
        assert!(dir.path().join("public/index.html").exists());

        let failing = ExternalGenerator::new("sh", vec!["-c".to_string(), "exit 3".to_string()]);
        assert_eq!(failing.run(dir.path()).unwrap().code(), Some(3));
    }
}
