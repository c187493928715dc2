use std::path::Path;

use crate::error::{QuireError, Result};
use crate::text_utils::date_prefix;

/// Lowercase ASCII slug: transliterated, runs of anything not alphanumeric collapsed to one `-`.
pub fn slugify(text: &str) -> String {
    let ascii = unidecode::unidecode(text);

    let mut slug = String::with_capacity(ascii.len());
    let mut prev_dash = true;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            prev_dash = false;
        } else if !prev_dash {
            slug.push('-');
            prev_dash = true;
        }
    }

    if slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Name the post is known by: the file stem, or the directory name for `<dir>/index.md`.
pub fn content_name<'a>(path: &'a Path, index_base_name: &str) -> Option<&'a str> {
    let stem = path.file_stem()?.to_str()?;
    if stem == index_base_name {
        path.parent()?.file_name()?.to_str()
    } else {
        Some(stem)
    }
}

pub fn slug_from_path(path: &Path, index_base_name: &str) -> Result<String> {
    let name = content_name(path, index_base_name)
        .ok_or_else(|| QuireError::EmptySlug(path.to_path_buf()))?;
    let name = match date_prefix(name) {
        Some((_date, rest)) => rest,
        None => name,
    };

    let slug = slugify(name);
    if slug.is_empty() {
        return Err(QuireError::EmptySlug(path.to_path_buf()));
    }
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  --Hello,   World!--  "), "hello-world");
        assert_eq!(slugify("Café au lait"), "cafe-au-lait");
        assert_eq!(slugify("my_first_post"), "my-first-post");
        assert_eq!(slugify("C++ & Rust"), "c-rust");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slug_from_file() {
        let slug = slug_from_path(&PathBuf::from("posts/Hello World.md"), "index").unwrap();
        assert_eq!(slug, "hello-world");
        let slug = slug_from_path(&PathBuf::from("posts/2024-02-12-creating-a-daemon.md"), "index").unwrap();
        assert_eq!(slug, "creating-a-daemon");
    }

    #[test]
    fn test_slug_from_directory_post() {
        let slug = slug_from_path(&PathBuf::from("posts/2023-05-01_trip_to_Lisbon/index.md"), "index").unwrap();
        assert_eq!(slug, "trip-to-lisbon");
    }

    #[test]
    fn test_slug_is_deterministic() {
        let path = PathBuf::from("posts/Über Rust.md");
        assert_eq!(slug_from_path(&path, "index").unwrap(), slug_from_path(&path, "index").unwrap());
        assert_eq!(slug_from_path(&path, "index").unwrap(), "uber-rust");
    }

    #[test]
    fn test_empty_slug_is_an_error() {
        assert!(slug_from_path(&PathBuf::from("posts/###.md"), "index").is_err());
    }
}
