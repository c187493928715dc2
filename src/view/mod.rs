use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{Datelike, Utc};
use ramhorns::Template;
use spdlog::debug;

use crate::config::Config;
use crate::error::{QuireError, Result};
use crate::slug::slugify;

pub mod list_renderer;
pub mod post_renderer;
pub mod rss_renderer;

const BASE_TPL: &str = include_str!("../../res/template/base.tpl");
const INDEX_TPL: &str = include_str!("../../res/template/index.tpl");
const POST_TPL: &str = include_str!("../../res/template/post.tpl");
const PAGE_TPL: &str = include_str!("../../res/template/page.tpl");
const LIST_TPL: &str = include_str!("../../res/template/list.tpl");
const TAG_TPL: &str = include_str!("../../res/template/tag.tpl");
const TAGS_TPL: &str = include_str!("../../res/template/tags.tpl");

/// Every template a build needs. Page templates render the body and `base.tpl` wraps it.
pub struct TemplateSet {
    pub base: Template<'static>,
    pub index: Template<'static>,
    pub post: Template<'static>,
    pub page: Template<'static>,
    pub list: Template<'static>,
    pub tag: Template<'static>,
    pub tags: Template<'static>,
}

fn parse_template(name: &str, source: String) -> Result<Template<'static>> {
    Template::new(source).map_err(|e| QuireError::Template { name: name.to_string(), reason: e.to_string() })
}

fn load_template(template_dir: &Path, name: &str, default: &'static str) -> Result<Template<'static>> {
    let path = template_dir.join(name);
    let source = match fs::read_to_string(&path) {
        Ok(source) => source,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Template {} not found, using the built-in one", path.display());
            default.to_string()
        }
        Err(source) => return Err(QuireError::IoAt { path, source }),
    };
    parse_template(name, source)
}

impl TemplateSet {
    pub fn load(template_dir: &Path) -> Result<TemplateSet> {
        Ok(TemplateSet {
            base: load_template(template_dir, "base.tpl", BASE_TPL)?,
            index: load_template(template_dir, "index.tpl", INDEX_TPL)?,
            post: load_template(template_dir, "post.tpl", POST_TPL)?,
            page: load_template(template_dir, "page.tpl", PAGE_TPL)?,
            list: load_template(template_dir, "list.tpl", LIST_TPL)?,
            tag: load_template(template_dir, "tag.tpl", TAG_TPL)?,
            tags: load_template(template_dir, "tags.tpl", TAGS_TPL)?,
        })
    }

    pub fn built_in() -> Result<TemplateSet> {
        Ok(TemplateSet {
            base: parse_template("base.tpl", BASE_TPL.to_string())?,
            index: parse_template("index.tpl", INDEX_TPL.to_string())?,
            post: parse_template("post.tpl", POST_TPL.to_string())?,
            page: parse_template("page.tpl", PAGE_TPL.to_string())?,
            list: parse_template("list.tpl", LIST_TPL.to_string())?,
            tag: parse_template("tag.tpl", TAG_TPL.to_string())?,
            tags: parse_template("tags.tpl", TAGS_TPL.to_string())?,
        })
    }
}

#[derive(ramhorns::Content)]
struct Layout<'a> {
    site_title: &'a str,
    site_description: &'a str,
    author: &'a str,
    language: &'a str,
    prefix: &'a str,
    feed_url: &'a str,
    page_title: &'a str,
    year: i32,
    body: &'a str,
}

/// Site wide values every page shares
pub struct SiteView {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub prefix: String,
    pub feed_url: String,
}

impl SiteView {
    pub fn from_config(config: &Config) -> SiteView {
        SiteView {
            title: config.site.title.clone(),
            description: config.site.description.clone(),
            author: config.site.author.clone(),
            language: config.site.language.clone(),
            prefix: config.build.path_prefix.clone(),
            feed_url: format!("{}feed.xml", config.build.path_prefix),
        }
    }

    /// Wraps a rendered body in the base layout
    pub fn wrap(&self, base: &Template, page_title: &str, body: &str) -> String {
        base.render(&Layout {
            site_title: &self.title,
            site_description: &self.description,
            author: &self.author,
            language: &self.language,
            prefix: &self.prefix,
            feed_url: &self.feed_url,
            page_title,
            year: Utc::now().year(),
            body,
        })
    }
}

#[derive(ramhorns::Content)]
pub(crate) struct ViewTag {
    pub name: String,
    pub link: String,
}

/// Links to the tag pages of one post. Only tags that own a page get a link, once per slug.
pub(crate) fn view_tags(prefix: &str, tags: &[String], hidden_tags: &[String]) -> Vec<ViewTag> {
    let hidden: Vec<String> = hidden_tags.iter().map(|t| slugify(t)).collect();
    let mut seen: Vec<String> = vec![];
    let mut view = vec![];

    for tag in tags {
        let slug = slugify(tag);
        if slug.is_empty() || hidden.contains(&slug) || seen.contains(&slug) {
            continue;
        }
        view.push(ViewTag { name: tag.clone(), link: format!("{}tags/{}/", prefix, slug) });
        seen.push(slug);
    }
    view
}
