use std::path::PathBuf;

use chrono::NaiveDateTime;

pub mod content_file;
pub mod content_format;
pub mod content_renderer;
pub mod front_matter;
pub mod html_renderer;
pub mod markdown_renderer;
pub mod parsing_utils;

/// A rendered post or page
#[derive(Debug, Clone)]
pub struct Content {
    pub header: ContentHeader,
    /// Site relative permalink, e.g. `/posts/hello-world/`
    pub link: String,
    pub excerpt: String,
    pub rendered: String,
    /// Validation warnings found while reading the file
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentHeader {
    pub file_name: PathBuf,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDateTime,
    pub tags: Vec<String>,
    pub draft: bool,
}
