use std::fs;
use std::path::{Path, PathBuf};

use spdlog::debug;
use walkdir::WalkDir;

use crate::error::{IoContext, QuireError, Result};

/// A generated file, relative to the output directory
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl OutputFile {
    pub fn html(path: impl Into<PathBuf>, html: String) -> OutputFile {
        OutputFile { path: path.into(), bytes: html.into_bytes() }
    }
}

/// `posts/hello/` becomes `posts/hello/index.html`, the root becomes `index.html`.
/// The path prefix is not part of the output tree, the site is deployed under it.
pub fn index_path(prefix: &str, route: &str) -> PathBuf {
    let route = route.strip_prefix(prefix).unwrap_or(route).trim_matches('/');
    if route.is_empty() {
        PathBuf::from("index.html")
    } else {
        PathBuf::from(route).join("index.html")
    }
}

pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    /// Creates the directory, or empties it when it exists. The directory itself is kept,
    /// so a server pointing at it keeps working.
    pub fn prepare(root: &Path) -> Result<OutputDir> {
        if root.exists() {
            for entry in fs::read_dir(root).at_path(root)? {
                let path = entry.at_path(root)?.path();
                if path.is_dir() {
                    fs::remove_dir_all(&path).at_path(&path)?;
                } else {
                    fs::remove_file(&path).at_path(&path)?;
                }
            }
        } else {
            fs::create_dir_all(root).at_path(root)?;
        }

        Ok(OutputDir { root: root.to_path_buf() })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn write(&self, file: &OutputFile) -> Result<()> {
        let dest = self.root.join(&file.path);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).at_path(parent)?;
        }
        debug!("Writing {}", dest.display());
        fs::write(&dest, &file.bytes).at_path(&dest)
    }

    pub fn copy_file(&self, src: &Path, rel_dest: &Path) -> Result<()> {
        let dest = self.root.join(rel_dest);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).at_path(parent)?;
        }
        fs::copy(src, &dest).at_path(src)?;
        Ok(())
    }

    /// Copies every file under `src_dir` into `rel_dest`, keeping the layout. Returns the file count.
    pub fn copy_tree(&self, src_dir: &Path, rel_dest: &Path) -> Result<usize> {
        let mut count = 0;
        for entry in WalkDir::new(src_dir).follow_links(true) {
            let entry = entry.map_err(|e| QuireError::IoAt {
                path: src_dir.to_path_buf(),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let rel = entry.path().strip_prefix(src_dir).unwrap_or(entry.path());
            self.copy_file(entry.path(), &rel_dest.join(rel))?;
            count += 1;
        }
        Ok(count)
    }
}
