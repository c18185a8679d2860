//! Report front-matter problems in the content directory

use anyhow::Result;

use crate::content::loader::ContentLoader;
use crate::Site;

/// Print every article with an incomplete or malformed header.
/// Fails when at least one article has a problem.
pub fn run(site: &Site) -> Result<()> {
    let articles = ContentLoader::new(site).load_articles()?;
    let mut flagged = 0;

    for article in articles.iter().filter(|a| !a.is_clean()) {
        flagged += 1;
        println!("{}:", article.source);
        for issue in &article.issues {
            println!("  - {}", issue);
        }
    }

    if flagged > 0 {
        anyhow::bail!("{} of {} articles have front-matter problems", flagged, articles.len());
    }

    println!("{} articles OK", articles.len());
    Ok(())
}
