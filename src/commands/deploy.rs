//! Render the site and publish it to the target directory

use anyhow::Result;

use crate::config::PublishMode;
use crate::generator::ExternalGenerator;
use crate::publish::{DeployReport, Publisher};
use crate::Site;

/// Per-invocation overrides of the configuration
#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    /// Pass the generator's verbose flag
    pub verbose: bool,
    /// Publish mode, `None` keeps the configured one
    pub mode: Option<PublishMode>,
}

/// Run the deploy pipeline with the configured external generator
pub fn run(site: &Site, options: &DeployOptions) -> Result<DeployReport> {
    let mut config = site.config.generator.clone();
    config.verbose |= options.verbose;
    let generator = ExternalGenerator::from_config(&config);

    let mut publisher = Publisher::new(site, &generator)?;
    if let Some(mode) = options.mode {
        publisher = publisher.with_mode(mode);
    }

    let report = publisher.deploy()?;
    if !report.generator_ok {
        tracing::warn!("Generator failed; the published site may be stale or incomplete");
    }

    Ok(report)
}
