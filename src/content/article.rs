//! Article model

use chrono::{DateTime, Local};
use indexmap::IndexMap;
use std::fmt;
use std::path::PathBuf;

/// A blog article loaded from the content directory
#[derive(Debug, Clone)]
pub struct Article {
    /// Article title
    pub title: String,

    /// Optional subtitle shown under the title
    pub subtitle: Option<String>,

    /// Publication date
    pub date: DateTime<Local>,

    pub author: Option<String>,

    /// Link attached to the author name
    pub author_link: Option<String>,

    /// Cover image path or URL
    pub cover_image: Option<String>,

    pub categories: Vec<String>,

    pub tags: Vec<String>,

    /// Markdown body, front matter removed
    pub body: String,

    /// Source file path (relative to the content directory)
    pub source: String,

    /// Full source file path
    pub full_source: PathBuf,

    /// URL-friendly name derived from the file name
    pub slug: String,

    /// Custom front-matter fields
    pub extra: IndexMap<String, serde_json::Value>,

    /// Problems found while loading the header
    pub issues: Vec<ArticleIssue>,
}

impl Article {
    /// Create a new article with minimal required fields
    pub fn new(title: String, date: DateTime<Local>, source: String) -> Self {
        let slug = slug::slugify(&title);
        Self {
            title,
            subtitle: None,
            date,
            author: None,
            author_link: None,
            cover_image: None,
            categories: Vec::new(),
            tags: Vec::new(),
            body: String::new(),
            full_source: PathBuf::from(&source),
            source,
            slug,
            extra: IndexMap::new(),
            issues: Vec::new(),
        }
    }

    /// Whether the header was complete and well-formed
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// A front-matter problem; the article still loads with a fallback value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleIssue {
    /// The header could not be parsed; all metadata fell back to defaults
    MalformedFrontMatter(String),
    /// No `title`, the file stem is used instead
    MissingTitle,
    /// No `date`, the file modification time is used instead
    MissingDate,
    /// A `date` that no known format accepts
    InvalidDate(String),
}

impl fmt::Display for ArticleIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArticleIssue::MalformedFrontMatter(reason) => {
                write!(f, "malformed front matter: {}", reason)
            }
            ArticleIssue::MissingTitle => f.write_str("missing title"),
            ArticleIssue::MissingDate => f.write_str("missing date"),
            ArticleIssue::InvalidDate(date) => write!(f, "unrecognized date {:?}", date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_article_slug() {
        let article = Article::new(
            "Hello World".to_string(),
            Local::now(),
            "posts/hello.md".to_string(),
        );
        assert_eq!(article.slug, "hello-world");
        assert!(article.is_clean());
    }

    #[test]
    fn test_issue_display() {
        assert_eq!(ArticleIssue::MissingTitle.to_string(), "missing title");
        assert_eq!(
            ArticleIssue::InvalidDate("soon".to_string()).to_string(),
            "unrecognized date \"soon\""
        );
    }
}
