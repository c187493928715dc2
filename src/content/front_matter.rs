use serde::Deserialize;

const DELIMITER: &str = "---";

/// Metadata block at the top of a content file
///
/// ```text
/// ---
/// title: Creating a daemon in systemd
/// description: From a binary to a service
/// date: 2024-02-16
/// tags: [linux, systemd]
/// draft: false
/// ---
/// ```
#[derive(Deserialize, Default, Debug, PartialEq)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub tags: Option<TagList>,
    pub draft: bool,
}

/// `tags` can be a YAML list or a single whitespace separated string
#[derive(Deserialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum TagList {
    List(Vec<TagName>),
    Single(TagName),
}

/// A tag as YAML typed it. `2024` and `true` are tags too.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum TagName {
    Text(String),
    Number(serde_yaml::Number),
    Flag(bool),
}

impl TagName {
    fn into_string(self) -> String {
        match self {
            TagName::Text(text) => text,
            TagName::Number(number) => number.to_string(),
            TagName::Flag(flag) => flag.to_string(),
        }
    }
}

impl TagList {
    pub fn into_vec(self) -> Vec<String> {
        let tags: Vec<String> = match self {
            TagList::List(tags) => tags.into_iter().map(TagName::into_string).collect(),
            TagList::Single(TagName::Text(tags)) => tags.split_whitespace().map(|s| s.to_string()).collect(),
            TagList::Single(tag) => vec![tag.into_string()],
        };

        let mut unique: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            let tag = tag.trim().to_string();
            if !tag.is_empty() && !unique.contains(&tag) {
                unique.push(tag);
            }
        }
        unique
    }
}

fn after_delimiter(text: &str) -> Option<&str> {
    let (first_line, rest) = match text.find('\n') {
        Some(idx) => (&text[..idx], &text[idx + 1..]),
        None => (text, ""),
    };

    if first_line.trim_end() == DELIMITER {
        Some(rest)
    } else {
        None
    }
}

/// Splits raw content into the YAML block, if any, and the body.
pub fn split_front_matter(raw: &str) -> Result<(Option<&str>, &str), String> {
    let leading = raw.len() - raw.trim_start().len();
    let Some(after_open) = after_delimiter(&raw[leading..]) else {
        return Ok((None, raw));
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let yaml = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            return Ok((Some(yaml), body));
        }
        offset += line.len();
    }

    Err(format!("front matter opened with '{}' is never closed", DELIMITER))
}

pub fn parse_front_matter(yaml: &str) -> Result<FrontMatter, String> {
    if yaml.trim().is_empty() {
        return Ok(FrontMatter::default());
    }
    serde_yaml::from_str::<FrontMatter>(yaml).map_err(|e| e.to_string())
}

/// Returns the parsed front matter (default when the file has none) and the body.
pub fn extract_front_matter(raw: &str) -> Result<(FrontMatter, &str), String> {
    let (yaml, body) = split_front_matter(raw)?;
    let front_matter = match yaml {
        Some(yaml) => parse_front_matter(yaml)?,
        None => FrontMatter::default(),
    };
    Ok((front_matter, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_front_matter() {
        let raw = "\n---\ntitle: Hi\n---\n\n# Body\n";
        let (yaml, body) = split_front_matter(raw).unwrap();
        assert_eq!(yaml, Some("title: Hi\n"));
        assert_eq!(body, "\n# Body\n");
    }

    #[test]
    fn test_split_without_front_matter() {
        let raw = "# Just markdown\n\n---\n\nmore";
        let (yaml, body) = split_front_matter(raw).unwrap();
        assert!(yaml.is_none());
        assert_eq!(body, raw);
    }

    #[test]
    fn test_unclosed_front_matter() {
        let raw = "---\ntitle: Hi\n\n# Body\n";
        assert!(split_front_matter(raw).is_err());
    }

    #[test]
    fn test_parse_all_keys() {
        let raw = r##"---
title: "Creating a daemon: systemd"
description: From a binary to a service
date: 2024-02-16
tags:
  - linux
  - systemd
  - linux
draft: true
layout: ignored
---
Body"##;
        let (fm, body) = extract_front_matter(raw).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Creating a daemon: systemd"));
        assert_eq!(fm.description.as_deref(), Some("From a binary to a service"));
        assert_eq!(fm.date.as_deref(), Some("2024-02-16"));
        assert_eq!(fm.tags.unwrap().into_vec(), vec!["linux", "systemd"]);
        assert!(fm.draft);
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_tags_as_string() {
        let (fm, _) = extract_front_matter("---\ntags: rust  programming\n---\n").unwrap();
        assert_eq!(fm.tags.unwrap().into_vec(), vec!["rust", "programming"]);
    }

    #[test]
    fn test_tags_with_numbers() {
        let (fm, _) = extract_front_matter("---\ntags: [rust, 2024, 1.5, true]\n---\n").unwrap();
        assert_eq!(fm.tags.unwrap().into_vec(), vec!["rust", "2024", "1.5", "true"]);

        let (fm, _) = extract_front_matter("---\ntags: 2024\n---\n").unwrap();
        assert_eq!(fm.tags.unwrap().into_vec(), vec!["2024"]);
    }

    #[test]
    fn test_empty_block() {
        let (fm, body) = extract_front_matter("---\n---\ntext").unwrap();
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, "text");
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(extract_front_matter("---\ntitle: [unclosed\n---\n").is_err());
        assert!(extract_front_matter("---\ndraft: maybe\n---\n").is_err());
        assert!(extract_front_matter("---\ntags: {a: b}\n---\n").is_err());
        assert!(extract_front_matter("---\ntags: [[nested]]\n---\n").is_err());
    }
}
