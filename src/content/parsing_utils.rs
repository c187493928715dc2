use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::content::content_format::ContentFormat;
use crate::content::front_matter::FrontMatter;
use crate::content::ContentHeader;
use crate::error::{QuireError, Result};
use crate::slug::content_name;
use crate::text_utils::{date_prefix, parse_date_time};

/// Header resolved from the front matter, plus what is left of the body and any validation warnings
pub struct ResolvedHeader {
    pub header: ContentHeader,
    pub body: String,
    pub warnings: Vec<String>,
}

pub fn resolve_header(file_path: &Path, slug: &str, index_base_name: &str,
                      format: ContentFormat, front_matter: FrontMatter, body: &str) -> Result<ResolvedHeader> {
    let mut warnings = vec![];
    let file_display = file_path.display();

    let (title, body) = match front_matter.title {
        Some(title) if !title.trim().is_empty() => (title.trim().to_string(), body.to_string()),
        _ => {
            let from_body = match format {
                ContentFormat::Markdown => take_title_markdown(body),
                ContentFormat::Html => take_title_html(body),
            };
            match from_body {
                Some((title, rest)) => {
                    warnings.push(format!("{}: missing 'title', using the first heading", file_display));
                    (title, rest)
                }
                None => {
                    warnings.push(format!("{}: missing 'title', using the slug", file_display));
                    (slug.to_string(), body.to_string())
                }
            }
        }
    };

    let date = match front_matter.date {
        Some(value) => parse_date_time(&value).map_err(|reason| QuireError::Date {
            path: file_path.to_path_buf(),
            value,
            reason,
        })?,
        None => {
            let (date, source) = fallback_date(file_path, index_base_name);
            warnings.push(format!("{}: missing 'date', using the {}", file_display, source));
            date
        }
    };

    let tags = front_matter.tags.map(|t| t.into_vec()).unwrap_or_default();
    let description = front_matter.description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    let header = ContentHeader {
        file_name: file_path.to_path_buf(),
        slug: slug.to_string(),
        title,
        description,
        date,
        tags,
        draft: front_matter.draft,
    };

    Ok(ResolvedHeader {
        header,
        body,
        warnings,
    })
}

fn fallback_date(file_path: &Path, index_base_name: &str) -> (NaiveDateTime, &'static str) {
    if let Some((date, _)) = content_name(file_path, index_base_name).and_then(date_prefix) {
        return (NaiveDateTime::new(date, NaiveTime::MIN), "date in the file name");
    }

    match fs::metadata(file_path).and_then(|m| m.modified()) {
        Ok(modified) => (DateTime::<Utc>::from(modified).naive_utc(), "file modification time"),
        Err(_) => (Utc::now().naive_utc(), "current time"),
    }
}

/// Takes a leading `# Title` line off a markdown body
pub fn take_title_markdown(body: &str) -> Option<(String, String)> {
    let mut lines = body.lines().skip_while(|line| line.trim().is_empty());
    let first = lines.next()?;
    let title = first.strip_prefix("# ")?.trim();
    if title.is_empty() {
        return None;
    }

    let rest: Vec<&str> = lines.collect();
    Some((title.to_string(), join_lines(&rest)))
}

/// Takes a leading `<h1>`/`<h2>` line off an html body
pub fn take_title_html(body: &str) -> Option<(String, String)> {
    lazy_static! {
        static ref TITLE_REGEX: Regex = Regex::new(r"^\s*<h[12][^>]*>(?P<title>.+)</h[12]>\s*$").unwrap();
    }

    let mut lines = body.lines().skip_while(|line| line.trim().is_empty());
    let first = lines.next()?;
    let title = TITLE_REGEX.captures(first)?.name("title")?.as_str().trim().to_string();

    let rest: Vec<&str> = lines.collect();
    Some((title, join_lines(&rest)))
}

fn join_lines(lines: &[&str]) -> String {
    let mut content = String::new();
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    content
}

/// Text before the excerpt separator. Without a separator, the first paragraph.
pub fn extract_excerpt<'a>(body: &'a str, separator: &str) -> &'a str {
    if !separator.is_empty() {
        if let Some(idx) = body.find(separator) {
            return &body[..idx];
        }
    }

    let body = body.trim_start();
    let mut end = 0;
    for line in body.split_inclusive('\n') {
        if line.trim().is_empty() {
            break;
        }
        end += line.len();
    }
    &body[..end]
}

pub fn remove_comments(post: &str) -> std::result::Result<String, String> {
    let mut res: String = String::new();
    let mut slice = Some(post);

    let start_comment = "<!--";
    let end_comment = "-->";

    while let Some(block) = slice {
        let to_render = match block.find(start_comment) {
            Some(start) => {
                let next: &str = &block[(start + start_comment.len())..];
                match next.find(end_comment) {
                    Some(end) => slice = Some(&next[(end + end_comment.len())..]),
                    None => return Err("Error finding end of comment".to_string()),
                };
                &block[0..start]
            }
            None => {
                slice = None;
                block
            }
        };
        res.push_str(to_render);
    }

    Ok(res)
}
