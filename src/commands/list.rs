//! List site content

use anyhow::Result;
use indexmap::IndexMap;

use crate::content::loader::ContentLoader;
use crate::content::Article;
use crate::Site;

/// List site content by type
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    let articles = ContentLoader::new(site).load_articles()?;

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", articles.len());
            for article in &articles {
                println!(
                    "  {} - {} [{}]",
                    article.date.format("%Y-%m-%d"),
                    article.title,
                    article.source
                );
            }
        }
        "tag" | "tags" => {
            let tags = count_terms(&articles, |a| &a.tags);
            println!("Tags ({}):", tags.len());
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        "category" | "categories" => {
            let categories = count_terms(&articles, |a| &a.categories);
            println!("Categories ({}):", categories.len());
            for (cat, count) in categories {
                println!("  {} ({})", cat, count);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, category",
                content_type
            );
        }
    }

    Ok(())
}

/// Count how many articles carry each term, most used first, ties in first-seen order
pub fn count_terms<F>(articles: &[Article], terms: F) -> IndexMap<String, usize>
where
    F: Fn(&Article) -> &Vec<String>,
{
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for article in articles {
        for term in terms(article) {
            *counts.entry(term.clone()).or_insert(0) += 1;
        }
    }
    counts.sort_by(|_, a, _, b| b.cmp(a));
    counts
}
