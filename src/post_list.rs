use std::fs;
use std::path::{Path, PathBuf};

use crate::content::content_format::ContentFormat;
use crate::error::{IoContext, Result};

/// A content file found in a content directory
#[derive(Debug, Clone, PartialEq)]
pub struct ContentEntry {
    pub file_path: PathBuf,
    /// Files living next to a directory post, copied along with it
    pub assets: Vec<PathBuf>,
}

pub struct PostList {
    pub root_dir: PathBuf,
    pub index_base_name: String,
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(true)
}

impl PostList {
    /// Single file posts first, then directory posts, each sorted by path.
    pub fn retrieve(&self) -> Result<Vec<ContentEntry>> {
        let mut entries: Vec<ContentEntry> = self.retrieve_files()?
            .into_iter()
            .map(|file_path| ContentEntry { file_path, assets: vec![] })
            .collect();
        entries.extend(self.retrieve_dirs()?);
        Ok(entries)
    }

    pub fn retrieve_files(&self) -> Result<Vec<PathBuf>> {
        let mut posts = vec![];
        for path in list_entries(&self.root_dir)? {
            if path.is_file() && ContentFormat::guess(&path).is_some() {
                posts.push(path);
            }
        }
        Ok(posts)
    }

    pub fn retrieve_dirs(&self) -> Result<Vec<ContentEntry>> {
        let mut post_dirs = vec![];
        for dir in list_entries(&self.root_dir)? {
            if !dir.is_dir() {
                continue;
            }
            if let Some(entry) = self.index_entry(&dir)? {
                post_dirs.push(entry);
            }
        }
        Ok(post_dirs)
    }

    fn index_entry(&self, dir: &Path) -> Result<Option<ContentEntry>> {
        let mut index_file = None;
        let mut assets = vec![];

        for path in list_entries(dir)? {
            let is_index = path.is_file()
                && ContentFormat::guess(&path).is_some()
                && path.file_stem().and_then(|s| s.to_str()) == Some(self.index_base_name.as_str());

            if is_index && index_file.is_none() {
                index_file = Some(path);
            } else {
                assets.push(path);
            }
        }

        Ok(index_file.map(|file_path| ContentEntry { file_path, assets }))
    }
}

/// Visible entries of a directory, sorted by path
fn list_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = vec![];
    for entry in fs::read_dir(dir).at_path(dir)? {
        let path = entry.at_path(dir)?.path();
        if !is_hidden(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_files_and_directories() -> Result<()> {
        let root = tempfile::tempdir()?;
        let root_dir = root.path().to_path_buf();
        fs::write(root_dir.join("b-post.md"), "b")?;
        fs::write(root_dir.join("a-post.html"), "a")?;
        fs::write(root_dir.join("notes.txt"), "ignored")?;
        fs::write(root_dir.join(".hidden.md"), "ignored")?;
        fs::create_dir(root_dir.join("trip"))?;
        fs::write(root_dir.join("trip").join("index.md"), "trip")?;
        fs::write(root_dir.join("trip").join("photo.jpg"), "jpg")?;
        fs::create_dir(root_dir.join("empty-dir"))?;

        let post_list = PostList { root_dir: root_dir.clone(), index_base_name: "index".to_string() };
        let entries = post_list.retrieve()?;

        assert_eq!(entries, vec![
            ContentEntry { file_path: root_dir.join("a-post.html"), assets: vec![] },
            ContentEntry { file_path: root_dir.join("b-post.md"), assets: vec![] },
            ContentEntry {
                file_path: root_dir.join("trip").join("index.md"),
                assets: vec![root_dir.join("trip").join("photo.jpg")],
            },
        ]);
        Ok(())
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let post_list = PostList { root_dir: PathBuf::from("/does/not/exist"), index_base_name: "index".to_string() };
        assert!(post_list.retrieve().is_err());
    }
}
