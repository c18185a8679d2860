//! Content loader - loads articles from the content directory

use anyhow::Result;
use chrono::Local;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::{Article, ArticleIssue, FrontMatter};
use crate::Site;

/// Loads articles from the content directory
pub struct ContentLoader<'a> {
    site: &'a Site,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Site) -> Self {
        Self { site }
    }

    /// Load every article below the content directory, newest first
    pub fn load_articles(&self) -> Result<Vec<Article>> {
        let content_dir = &self.site.content_dir;
        if !content_dir.exists() {
            tracing::warn!("Content directory {:?} does not exist", content_dir);
            return Ok(Vec::new());
        }

        let mut articles = Vec::new();

        for entry in WalkDir::new(content_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && is_article_file(path) {
                match self.load_article(path) {
                    Ok(article) => articles.push(article),
                    Err(e) => {
                        tracing::warn!("Failed to load article {:?}: {}", path, e);
                    }
                }
            }
        }

        articles.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(articles)
    }

    /// Load a single article from a file
    pub fn load_article(&self, path: &Path) -> Result<Article> {
        let content = fs::read_to_string(path)?;
        let mut issues = Vec::new();

        let (fm, body) = match FrontMatter::parse(&content) {
            Ok(parsed) => parsed,
            Err(e) => {
                let reason = format!("{:#}", e);
                tracing::warn!("{:?}: {}", path, reason);
                issues.push(ArticleIssue::MalformedFrontMatter(reason));
                (FrontMatter::default(), FrontMatter::strip(&content))
            }
        };
        let header_ok = issues.is_empty();

        let file_modified = fs::metadata(path)?
            .modified()
            .ok()
            .map(chrono::DateTime::<Local>::from);

        let date = match (&fm.date, fm.parse_date()) {
            (_, Some(date)) => date,
            (Some(raw), None) => {
                issues.push(ArticleIssue::InvalidDate(raw.clone()));
                file_modified.unwrap_or_else(Local::now)
            }
            (None, None) => {
                if header_ok {
                    issues.push(ArticleIssue::MissingDate);
                }
                file_modified.unwrap_or_else(Local::now)
            }
        };

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled")
            .to_string();

        let title = match fm.title.clone() {
            Some(title) if !title.trim().is_empty() => title,
            _ => {
                if header_ok {
                    issues.push(ArticleIssue::MissingTitle);
                }
                stem.clone()
            }
        };

        let source = path
            .strip_prefix(&self.site.content_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        // Bundles (`post-name/index.md`) take their slug from the directory
        let slug_source = if stem == "index" {
            path.parent()
                .and_then(|p| p.file_name())
                .and_then(|s| s.to_str())
                .unwrap_or(stem.as_str())
                .to_string()
        } else {
            stem
        };

        let mut article = Article::new(title, date, source);
        article.subtitle = fm.subtitle.clone();
        article.author = fm.author.clone();
        article.author_link = fm.author_link.clone();
        article.cover_image = fm.cover_image().map(str::to_string);
        article.categories = fm.categories;
        article.tags = fm.tags;
        article.body = body.to_string();
        article.full_source = path.to_path_buf();
        article.slug = slug::slugify(&slug_source);
        article.extra = fm.extra;
        article.issues = issues;

        Ok(article)
    }
}

/// Markdown files that are articles; `_index.md` style section files are not
fn is_article_file(path: &Path) -> bool {
    let is_markdown = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false);

    let is_section = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('_') || n.starts_with('.'))
        .unwrap_or(true);

    is_markdown && !is_section
}
