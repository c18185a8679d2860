//! Render the site into the build output directory

use anyhow::Result;

use crate::generator::ExternalGenerator;
use crate::publish::Publisher;
use crate::Site;

/// Render the site with the configured generator
pub fn run(site: &Site) -> Result<usize> {
    run_with_options(site, false)
}

/// Render, optionally passing the generator's verbose flag.
/// Returns the number of files in the build output.
pub fn run_with_options(site: &Site, verbose: bool) -> Result<usize> {
    let start = std::time::Instant::now();

    let mut config = site.config.generator.clone();
    config.verbose |= verbose;
    let generator = ExternalGenerator::from_config(&config);

    let files = Publisher::new(site, &generator)?.generate()?;

    let duration = start.elapsed();
    tracing::info!("Generated {} files in {:.2}s", files, duration.as_secs_f64());

    Ok(files)
}
