use std::fs;
use std::path::PathBuf;

use crate::content::content_format::ContentFormat;
use crate::error::{IoContext, QuireError, Result};

pub struct ContentFile {
    pub slug: String,
    pub file_path: PathBuf,
    pub format: ContentFormat,
    pub raw_content: String,
}

impl ContentFile {
    pub fn from_file(slug: String, file_path: PathBuf) -> Result<ContentFile> {
        let format = ContentFormat::guess(&file_path)
            .ok_or_else(|| QuireError::UnsupportedFormat(file_path.clone()))?;
        let raw_content = fs::read_to_string(&file_path).at_path(&file_path)?;

        Ok(ContentFile {
            slug,
            file_path,
            format,
            raw_content,
        })
    }
}
