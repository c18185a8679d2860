//! Clean the build output directory

use anyhow::Result;

use crate::generator::ExternalGenerator;
use crate::publish::{tree, Publisher};
use crate::Site;

/// Clean the build output and anything an interrupted deploy left next to the target
pub fn run(site: &Site) -> Result<()> {
    if tree::remove_dir_if_exists(&site.public_dir)? {
        tracing::info!("Deleted: {:?}", site.public_dir);
    }

    let generator = ExternalGenerator::from_config(&site.config.generator);
    Publisher::new(site, &generator)?.remove_leftovers()?;

    Ok(())
}
