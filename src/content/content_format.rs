use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFormat {
    Markdown,
    Html,
}

impl ContentFormat {
    pub fn guess(file_name: &Path) -> Option<ContentFormat> {
        let ext = file_name.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "md" | "markdown" => Some(ContentFormat::Markdown),
            "html" | "htm" => Some(ContentFormat::Html),
            _ => None,
        }
    }
}
