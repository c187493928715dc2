use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{QuireError, Result};

#[derive(Deserialize, Debug, Clone)]
pub struct Site {
    pub title: String,
    pub author: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Paths {
    pub posts_dir: PathBuf,
    pub pages_dir: PathBuf,
    pub template_dir: PathBuf,
    pub public_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Paths {
            posts_dir: PathBuf::from("posts"),
            pages_dir: PathBuf::from("pages"),
            template_dir: PathBuf::from("template"),
            public_dir: PathBuf::from("public"),
            output_dir: PathBuf::from("_site"),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Build {
    pub homepage_posts: usize,
    pub feed_posts: usize,
    pub page_size: u32,
    pub path_prefix: String,
    pub index_base_name: String,
    pub excerpt_separator: String,
    pub hidden_tags: Vec<String>,
}

impl Default for Build {
    fn default() -> Self {
        Build {
            homepage_posts: 3,
            feed_posts: 10,
            page_size: 10,
            path_prefix: "/".to_string(),
            index_base_name: "index".to_string(),
            excerpt_separator: "<!-- more -->".to_string(),
            hidden_tags: vec!["all".to_string(), "posts".to_string()],
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Server {
    pub address: String,
    pub port: u16,
    pub poll_interval_ms: u64,
}

impl Default for Server {
    fn default() -> Self {
        Server {
            address: "127.0.0.1".to_string(),
            port: 8080,
            poll_interval_ms: 500,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Log {
    pub level: LogLevel,
    #[serde(default = "default_true")]
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Copy, Clone, PartialEq)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub site: Site,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub build: Build,
    #[serde(default)]
    pub server: Server,
    pub log: Option<Log>,
    /// File the configuration was read from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
    /// Directory relative paths were resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Sets the URL prefix used for every generated link, always with a leading and trailing slash.
    pub fn set_path_prefix(&mut self, prefix: &str) {
        self.build.path_prefix = normalize_prefix(prefix);
    }

    /// Absolute base for links in the feed, e.g. `https://example.com/blog/`
    pub fn absolute_base(&self) -> String {
        let url = self.site.url.trim_end_matches('/');
        format!("{}{}", url, self.build.path_prefix)
    }
}

pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

fn resolve_path(base_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

/// Parses a configuration. Relative paths are resolved against `base_dir`.
pub fn parse_config(cfg_content: &str, base_dir: &Path) -> std::result::Result<Config, String> {
    let mut cfg: Config = toml::from_str::<Config>(cfg_content)
        .map_err(|e| format!("Error parsing configuration file: {}", e))?;

    cfg.paths = Paths {
        posts_dir: resolve_path(base_dir, cfg.paths.posts_dir),
        pages_dir: resolve_path(base_dir, cfg.paths.pages_dir),
        template_dir: resolve_path(base_dir, cfg.paths.template_dir),
        public_dir: resolve_path(base_dir, cfg.paths.public_dir),
        output_dir: resolve_path(base_dir, cfg.paths.output_dir),
    };
    cfg.base_dir = base_dir.to_path_buf();
    cfg.build.path_prefix = normalize_prefix(&cfg.build.path_prefix);
    if cfg.build.page_size == 0 {
        return Err("build.page_size must be greater than 0".to_string());
    }

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> Result<Config> {
    let config_error = |reason: String| QuireError::Config { path: cfg_path.to_path_buf(), reason };

    let cfg_content = fs::read_to_string(cfg_path)
        .map_err(|e| config_error(e.to_string()))?;
    let base_dir = cfg_path.parent().unwrap_or_else(|| Path::new("."));

    let mut cfg = parse_config(&cfg_content, base_dir).map_err(config_error)?;
    cfg.source = Some(cfg_path.to_path_buf());
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let toml_str = r##"
[site]
title = "My blog"
author = "Someone"
url = "https://example.com/"
"##;
        let cfg = parse_config(toml_str, Path::new("/srv/blog")).unwrap();
        assert_eq!(cfg.site.language, "en");
        assert_eq!(cfg.build.homepage_posts, 3);
        assert_eq!(cfg.build.feed_posts, 10);
        assert_eq!(cfg.paths.posts_dir, PathBuf::from("/srv/blog/posts"));
        assert_eq!(cfg.paths.output_dir, PathBuf::from("/srv/blog/_site"));
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.base_dir, PathBuf::from("/srv/blog"));
        assert!(cfg.log.is_none());
        assert_eq!(cfg.absolute_base(), "https://example.com/");
    }

    #[test]
    fn test_full_config() {
        let toml_str = r##"
[site]
title = "My blog"
author = "Someone"
url = "https://example.com"
description = "Notes"

[paths]
posts_dir = "/abs/posts"
output_dir = "dist"

[build]
homepage_posts = 5
path_prefix = "blog"

[log]
level = "Debug"
"##;
        let cfg = parse_config(toml_str, Path::new("/srv/blog")).unwrap();
        assert_eq!(cfg.paths.posts_dir, PathBuf::from("/abs/posts"));
        assert_eq!(cfg.paths.output_dir, PathBuf::from("/srv/blog/dist"));
        assert_eq!(cfg.paths.template_dir, PathBuf::from("/srv/blog/template"));
        assert_eq!(cfg.build.homepage_posts, 5);
        assert_eq!(cfg.build.path_prefix, "/blog/");
        assert_eq!(cfg.absolute_base(), "https://example.com/blog/");
        let log = cfg.log.unwrap();
        assert_eq!(log.level, LogLevel::Debug);
        assert!(log.log_to_console);
    }

    #[test]
    fn test_missing_site_is_an_error() {
        let res = parse_config("[build]\npage_size = 4\n", Path::new("."));
        assert!(res.is_err());
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix(""), "/");
        assert_eq!(normalize_prefix("/"), "/");
        assert_eq!(normalize_prefix("blog"), "/blog/");
        assert_eq!(normalize_prefix("/blog"), "/blog/");
        assert_eq!(normalize_prefix("/a/b/"), "/a/b/");
    }
}
