use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuireError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("IO error on {}: {source}", .path.display())]
    IoAt { path: PathBuf, source: io::Error },

    #[error("Invalid front matter in {}: {reason}", .path.display())]
    FrontMatter { path: PathBuf, reason: String },

    #[error("Invalid date '{value}' in {}: {reason}", .path.display())]
    Date { path: PathBuf, value: String, reason: String },

    #[error("Unable to derive a slug from {}", .0.display())]
    EmptySlug(PathBuf),

    #[error("Duplicate slug '{slug}': {} and {}", .first.display(), .second.display())]
    DuplicateSlug { slug: String, first: PathBuf, second: PathBuf },

    #[error("Page {} uses the reserved slug '{slug}'", .path.display())]
    ReservedSlug { slug: String, path: PathBuf },

    #[error("Unsupported content file {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Error parsing template {name}: {reason}")]
    Template { name: String, reason: String },

    #[error("Error rendering {}: {reason}", .path.display())]
    Markdown { path: PathBuf, reason: String },

    #[error("Error writing feed: {0}")]
    Feed(#[from] quick_xml::Error),

    #[error("Error reading configuration {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, QuireError>;

pub(crate) trait IoContext<T> {
    fn at_path(self, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn at_path(self, path: &Path) -> Result<T> {
        self.map_err(|source| QuireError::IoAt { path: path.to_path_buf(), source })
    }
}
