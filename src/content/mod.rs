//! Content module - the articles the generator renders

mod article;
mod frontmatter;
pub mod loader;

pub use article::{Article, ArticleIssue};
pub use frontmatter::{parse_date_string, Cover, FrontMatter};
