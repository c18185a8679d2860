//! Front-matter parsing

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer};

lazy_static! {
    /// A `key:` line, the shape every YAML front-matter block has at least once
    static ref YAML_KEY: Regex = Regex::new(r"^([A-Za-z0-9_-]+):(\s|$)").unwrap();
}

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Cover image, either a bare path or a table with an `image` key
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Cover {
    Path(String),
    Detailed { image: Option<String> },
}

impl Cover {
    pub fn image(&self) -> Option<&str> {
        match self {
            Cover::Path(path) => Some(path.as_str()),
            Cover::Detailed { image } => image.as_deref(),
        }
    }
}

/// Article metadata header
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub date: Option<String>,
    pub author: Option<String>,
    #[serde(rename = "authorLink")]
    pub author_link: Option<String>,
    pub cover: Option<Cover>,
    #[serde(deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "string_or_vec")]
    pub categories: Vec<String>,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    ///
    /// Content without a recognizable header yields the default front matter
    /// and the whole input. A header that is recognized but malformed is an
    /// error.
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        let content = content.trim_start();

        if content.starts_with("---") {
            return Self::parse_yaml(content);
        }

        if content.starts_with("+++") {
            return Self::parse_toml(content);
        }

        if content.starts_with(";;;") || starts_json_object(content) {
            return Self::parse_json(content);
        }

        Ok((FrontMatter::default(), content))
    }

    /// Body text after the header, even when the header fails to parse
    pub fn strip(content: &str) -> &str {
        let trimmed = content.trim_start();
        for fence in ["---", "+++", ";;;"] {
            if let Some((_, body)) = split_fenced(trimmed, fence) {
                return body;
            }
        }
        trimmed
    }

    fn parse_yaml(content: &str) -> Result<(Self, &str)> {
        let Some((yaml_content, remaining)) = split_fenced(content, "---") else {
            return Ok((FrontMatter::default(), content));
        };

        if yaml_content.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        // A `---` fence around prose is a markdown rule, not a header
        if !looks_like_yaml(yaml_content) {
            return Ok((FrontMatter::default(), content));
        }

        let fm = serde_yaml::from_str::<FrontMatter>(yaml_content)
            .context("Failed to parse YAML front-matter")?;
        Ok((fm, remaining))
    }

    fn parse_toml(content: &str) -> Result<(Self, &str)> {
        let Some((toml_content, remaining)) = split_fenced(content, "+++") else {
            return Err(anyhow!("Unterminated TOML front-matter"));
        };

        let mut table: toml::Table =
            toml::from_str(toml_content).context("Failed to parse TOML front-matter")?;

        // Unquoted TOML dates are their own type; keep them as text like YAML does
        for (_, value) in table.iter_mut() {
            if let toml::Value::Datetime(dt) = value {
                *value = toml::Value::String(dt.to_string());
            }
        }

        let fm: FrontMatter = toml::Value::Table(table)
            .try_into()
            .context("Failed to parse TOML front-matter")?;
        Ok((fm, remaining))
    }

    fn parse_json(content: &str) -> Result<(Self, &str)> {
        if let Some((json_content, remaining)) = split_fenced(content, ";;;") {
            let fm: FrontMatter = serde_json::from_str(json_content)
                .map_err(|e| anyhow!("Failed to parse JSON front-matter: {}", e))?;
            return Ok((fm, remaining));
        }

        // A bare JSON object at the start of the file
        let mut stream = serde_json::Deserializer::from_str(content).into_iter::<FrontMatter>();
        match stream.next() {
            Some(Ok(fm)) => {
                let remaining = content[stream.byte_offset()..].trim_start_matches(['\n', '\r']);
                Ok((fm, remaining))
            }
            Some(Err(e)) => Err(anyhow!("Failed to parse JSON front-matter: {}", e)),
            None => Err(anyhow!("Invalid JSON front-matter")),
        }
    }

    /// Parse the date string into a DateTime
    pub fn parse_date(&self) -> Option<DateTime<Local>> {
        self.date.as_deref().and_then(parse_date_string)
    }

    /// Cover image path or URL
    pub fn cover_image(&self) -> Option<&str> {
        self.cover.as_ref().and_then(Cover::image)
    }
}

/// Split `<fence>\n header \n<fence>\n body`. The opening fence must start `content`.
fn split_fenced<'a>(content: &'a str, fence: &str) -> Option<(&'a str, &'a str)> {
    let rest = content.strip_prefix(fence)?;
    let rest = rest.trim_start_matches(['\n', '\r']);

    if let Some(header) = rest.strip_prefix(fence) {
        return Some(("", header.trim_start_matches(['\n', '\r'])));
    }

    let closing = format!("\n{}", fence);
    let end_pos = rest.find(&closing)?;
    let header = &rest[..end_pos];
    let body = rest[end_pos + closing.len()..].trim_start_matches(['\n', '\r']);
    Some((header, body))
}

/// `{"key"...`; a lone `{` is body text such as a `{{< shortcode >}}`
fn starts_json_object(content: &str) -> bool {
    content
        .strip_prefix('{')
        .map(|rest| rest.trim_start().starts_with('"'))
        .unwrap_or(false)
}

fn looks_like_yaml(block: &str) -> bool {
    block.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        YAML_KEY
            .captures(trimmed)
            .map(|caps| !matches!(&caps[1], "http" | "https" | "ftp"))
            .unwrap_or(false)
    })
}

/// Parse a date string in various formats
pub fn parse_date_string(s: &str) -> Option<DateTime<Local>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }

    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt.with_timezone(&Local));
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Local.from_local_datetime(&dt).earliest();
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Local.from_local_datetime(&d.and_hms_opt(0, 0, 0)?).earliest();
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: "Wrapping sqlx for Kotlin/Native"
subtitle: Part one
date: 2024-01-15 10:30:00
author: someone
authorLink: https://example.com/about
cover:
  image: /images/cover.png
tags:
  - rust
  - kotlin
categories:
  - programming
series: ffi
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Wrapping sqlx for Kotlin/Native"));
        assert_eq!(fm.subtitle.as_deref(), Some("Part one"));
        assert_eq!(fm.author_link.as_deref(), Some("https://example.com/about"));
        assert_eq!(fm.cover_image(), Some("/images/cover.png"));
        assert_eq!(fm.tags, vec!["rust", "kotlin"]);
        assert_eq!(fm.categories, vec!["programming"]);
        assert_eq!(fm.extra.get("series"), Some(&serde_json::json!("ffi")));
        assert_eq!(remaining, "This is the content.\n");
    }

    #[test]
    fn test_parse_toml_frontmatter() {
        let content = r#"+++
title = "Hello"
date = 2024-01-01
tags = "rust"
cover = "cover.jpg"
+++

Body.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hello"));
        assert_eq!(fm.date.as_deref(), Some("2024-01-01"));
        assert_eq!(fm.tags, vec!["rust"]);
        assert_eq!(fm.cover_image(), Some("cover.jpg"));
        assert_eq!(remaining, "Body.\n");
    }

    #[test]
    fn test_parse_json_frontmatter() {
        let content = r#"{"title": "Test Post", "tags": ["a", "b"]}

This is content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Test Post"));
        assert_eq!(fm.tags, vec!["a", "b"]);
        assert!(remaining.starts_with("This is content."));
    }

    #[test]
    fn test_parse_fenced_json_frontmatter() {
        let content = ";;;\n{\"title\": \"Fenced\"}\n;;;\nBody";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Fenced"));
        assert_eq!(remaining, "Body");
    }

    #[test]
    fn test_parse_single_string_tags() {
        let content = r#"---
title: Single Tag Post
date: 2024-01-15
tags: Notes
categories: Blog
---

Content here.
"#;

        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.tags, vec!["Notes"]);
        assert_eq!(fm.categories, vec!["Blog"]);
        assert_eq!(
            fm.parse_date().unwrap().format("%Y-%m-%d").to_string(),
            "2024-01-15"
        );
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let content = "---\ntitle: [unclosed\n---\nbody\n";
        assert!(FrontMatter::parse(content).is_err());
        assert_eq!(FrontMatter::strip(content), "body\n");
    }

    #[test]
    fn test_markdown_separator_not_yaml() {
        let content = r#"
---

Some random text with markdown lists:
- Item 1
- Item 2

---
More content here.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, None);
        assert!(remaining.contains("Some random text"));
    }

    #[test]
    fn test_content_with_url_not_yaml() {
        let content = r#"
---
https: //example.com/path
---
More content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, None);
        assert!(remaining.contains("example.com"));
    }

    #[test]
    fn test_shortcode_body_is_not_json() {
        let content = "{{< figure src=\"cover.png\" >}}\n\nText.\n";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert!(fm.title.is_none());
        assert_eq!(remaining, content);

        let (fm, _) = FrontMatter::parse("{ \"title\": \"Spaced\" }\nBody").unwrap();
        assert_eq!(fm.title.as_deref(), Some("Spaced"));
    }

    #[test]
    fn test_cover_table_ignores_extra_keys() {
        let content = "---\ntitle: T\ncover:\n  image: /img/c.png\n  alt: A cover\n---\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.cover_image(), Some("/img/c.png"));
    }

    #[test]
    fn test_no_frontmatter() {
        let (fm, remaining) = FrontMatter::parse("# Just a heading\n").unwrap();
        assert!(fm.title.is_none());
        assert_eq!(remaining, "# Just a heading\n");
    }

    #[test]
    fn test_parse_date_formats() {
        for input in [
            "2024-01-15",
            "2024/01/15",
            "2024-01-15 10:30",
            "2024-01-15 10:30:00",
            "2024-01-15T10:30:00",
        ] {
            let dt = parse_date_string(input).unwrap();
            assert_eq!(dt.format("%Y-%m-%d").to_string(), "2024-01-15", "{input}");
        }
        assert!(parse_date_string("2024-01-15T10:30:00+00:00").is_some());
        assert!(parse_date_string("last tuesday").is_none());
    }
}
