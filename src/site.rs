use std::collections::HashMap;
use std::env;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use spdlog::{info, warn};

use crate::collection::{BuildMode, Collection, TagGroup};
use crate::config::Config;
use crate::content::content_file::ContentFile;
use crate::content::content_format::ContentFormat;
use crate::content::content_renderer::{ContentRenderer, RenderOptions};
use crate::content::html_renderer::HtmlRenderer;
use crate::content::markdown_renderer::MarkdownRenderer;
use crate::content::Content;
use crate::error::{QuireError, Result};
use crate::output::{index_path, OutputDir, OutputFile};
use crate::paginator::Paginator;
use crate::post_list::{ContentEntry, PostList};
use crate::slug::slug_from_path;
use crate::view::list_renderer::{archive_link, ListRenderer};
use crate::view::post_renderer::PostRenderer;
use crate::view::rss_renderer::RssChannel;
use crate::view::{SiteView, TemplateSet};

/// Top level routes pages cannot take
const RESERVED_SLUGS: [&str; 3] = ["posts", "tags", "feed-xml"];

#[derive(Debug, Default, Clone, PartialEq)]
pub struct BuildReport {
    pub posts: usize,
    pub drafts_skipped: usize,
    pub pages: usize,
    pub tags: usize,
    pub files_written: usize,
    pub assets_copied: usize,
    pub warnings: Vec<String>,
}

/// Every content file loaded, parsed and rendered to HTML, ready for the templates
pub struct Site {
    pub collection: Collection,
    pub pages: Vec<Arc<Content>>,
    /// Files next to directory posts, by post slug
    assets: HashMap<String, Vec<PathBuf>>,
    pub warnings: Vec<String>,
}

fn render_content(entry: &ContentEntry, slug: String, options: &RenderOptions) -> Result<Content> {
    let content_file = ContentFile::from_file(slug, entry.file_path.clone())?;
    match content_file.format {
        ContentFormat::Markdown => MarkdownRenderer::render(&content_file, options),
        ContentFormat::Html => HtmlRenderer::render(&content_file, options),
    }
}

fn check_duplicate(seen: &mut HashMap<String, PathBuf>, slug: &str, path: &Path) -> Result<()> {
    if let Some(first) = seen.insert(slug.to_string(), path.to_path_buf()) {
        return Err(QuireError::DuplicateSlug {
            slug: slug.to_string(),
            first,
            second: path.to_path_buf(),
        });
    }
    Ok(())
}

impl Site {
    pub fn load(config: &Config, mode: BuildMode) -> Result<Site> {
        let prefix = &config.build.path_prefix;
        let index_base_name = &config.build.index_base_name;
        let mut warnings = vec![];

        let post_list = PostList {
            root_dir: config.paths.posts_dir.clone(),
            index_base_name: index_base_name.clone(),
        };

        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        let mut posts = vec![];
        let mut assets = HashMap::new();
        for entry in post_list.retrieve()? {
            let slug = slug_from_path(&entry.file_path, index_base_name)?;
            check_duplicate(&mut seen, &slug, &entry.file_path)?;

            let link = format!("{}posts/{}/", prefix, slug);
            let options = RenderOptions {
                link: link.clone(),
                image_prefix: link,
                excerpt_separator: config.build.excerpt_separator.clone(),
                index_base_name: index_base_name.clone(),
            };
            let content = render_content(&entry, slug.clone(), &options)?;
            warnings.extend(content.warnings.iter().cloned());

            if !entry.assets.is_empty() {
                assets.insert(slug, entry.assets);
            }
            posts.push(content);
        }

        let collection = Collection::new(posts, mode);
        let pages = Self::load_pages(config, mode, &mut warnings)?;

        for warning in warnings.iter() {
            warn!("{}", warning);
        }

        Ok(Site {
            collection,
            pages,
            assets,
            warnings,
        })
    }

    fn load_pages(config: &Config, mode: BuildMode, warnings: &mut Vec<String>) -> Result<Vec<Arc<Content>>> {
        let pages_dir = &config.paths.pages_dir;
        if !pages_dir.is_dir() {
            return Ok(vec![]);
        }

        let index_base_name = &config.build.index_base_name;
        let page_list = PostList {
            root_dir: pages_dir.clone(),
            index_base_name: index_base_name.clone(),
        };

        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        let mut pages = vec![];
        for entry in page_list.retrieve()? {
            let slug = slug_from_path(&entry.file_path, index_base_name)?;
            if RESERVED_SLUGS.contains(&slug.as_str()) {
                return Err(QuireError::ReservedSlug { slug, path: entry.file_path.clone() });
            }
            check_duplicate(&mut seen, &slug, &entry.file_path)?;

            let link = format!("{}{}/", config.build.path_prefix, slug);
            let options = RenderOptions {
                link: link.clone(),
                image_prefix: link,
                excerpt_separator: config.build.excerpt_separator.clone(),
                index_base_name: index_base_name.clone(),
            };
            let page = render_content(&entry, slug, &options)?;
            if page.header.draft && !mode.includes_drafts() {
                continue;
            }
            // Pages are not dated, a missing date is not worth a warning
            warnings.extend(page.warnings.iter().filter(|w| !w.contains("'date'")).cloned());
            pages.push(Arc::new(page));
        }

        Ok(pages)
    }

    pub fn tags(&self, config: &Config) -> Vec<TagGroup> {
        self.collection.tags(&config.build.hidden_tags)
    }

    /// Renders every output file, without touching the disk
    pub fn render(&self, config: &Config, templates: &TemplateSet) -> Result<Vec<OutputFile>> {
        let site = SiteView::from_config(config);
        let hidden_tags = &config.build.hidden_tags;
        let published = self.collection.published();
        let mut files = vec![];

        let list_renderer = ListRenderer { base: &templates.base, hidden_tags };
        let post_renderer = PostRenderer { template: &templates.post, base: &templates.base, hidden_tags };
        let page_renderer = PostRenderer { template: &templates.page, base: &templates.base, hidden_tags };

        let latest = self.collection.latest(config.build.homepage_posts);
        files.push(OutputFile::html("index.html", list_renderer.render_index(&templates.index, &site, latest)));

        for post in published {
            files.push(OutputFile::html(index_path(&site.prefix, &post.link), post_renderer.render(&site, post)));
        }

        let paginator = Paginator::from(published, config.build.page_size as usize);
        if paginator.page_count() == 0 {
            let html = list_renderer.render_archive(&templates.list, &site, &[], 1, 1);
            files.push(OutputFile::html(index_path(&site.prefix, &archive_link(&site.prefix, 1)), html));
        }
        for (page, contents) in paginator.pages() {
            let html = list_renderer.render_archive(&templates.list, &site, contents, page, paginator.page_count());
            files.push(OutputFile::html(index_path(&site.prefix, &archive_link(&site.prefix, page)), html));
        }

        let tag_counts = self.collection.tag_counts(hidden_tags);
        files.push(OutputFile::html(
            index_path(&site.prefix, &format!("{}tags/", site.prefix)),
            list_renderer.render_tags(&templates.tags, &site, &tag_counts),
        ));
        for group in self.tags(config) {
            let html = list_renderer.render_tag(&templates.tag, &site, &group);
            files.push(OutputFile::html(index_path(&site.prefix, &format!("{}tags/{}/", site.prefix, group.slug)), html));
        }

        for page in self.pages.iter() {
            files.push(OutputFile::html(index_path(&site.prefix, &page.link), page_renderer.render(&site, page)));
        }

        let absolute_base = config.absolute_base();
        let rss = RssChannel {
            ch_title: &config.site.title,
            ch_link: &absolute_base,
            ch_prefix: &config.build.path_prefix,
            ch_desc: &config.site.description,
            ch_language: &config.site.language,
        };
        let feed = rss.render(self.collection.latest(config.build.feed_posts))?;
        files.push(OutputFile { path: PathBuf::from("feed.xml"), bytes: feed });

        Ok(files)
    }

    /// Assets of the published directory posts, as (source, destination relative to the output)
    pub fn assets(&self) -> Vec<(PathBuf, PathBuf)> {
        let mut assets = vec![];
        for post in self.collection.published() {
            let Some(files) = self.assets.get(&post.header.slug) else {
                continue;
            };
            for file in files {
                if let Some(name) = file.file_name() {
                    let dest = Path::new("posts").join(&post.header.slug).join(name);
                    assets.push((file.clone(), dest));
                }
            }
        }
        assets
    }
}

/// Loads, renders and writes the whole site into `paths.output_dir`
pub fn build_site(config: &Config, mode: BuildMode) -> Result<BuildReport> {
    check_output_dir(config)?;

    let site = Site::load(config, mode)?;
    let templates = TemplateSet::load(&config.paths.template_dir)?;
    let files = site.render(config, &templates)?;

    let output = OutputDir::prepare(&config.paths.output_dir)?;

    let mut assets_copied = 0;
    if config.paths.public_dir.is_dir() {
        assets_copied += output.copy_tree(&config.paths.public_dir, Path::new(""))?;
    }
    for (src, dest) in site.assets() {
        if src.is_dir() {
            assets_copied += output.copy_tree(&src, &dest)?;
        } else {
            output.copy_file(&src, &dest)?;
            assets_copied += 1;
        }
    }

    for file in files.iter() {
        output.write(file)?;
    }

    let report = BuildReport {
        posts: site.collection.published().len(),
        drafts_skipped: site.collection.draft_count(),
        pages: site.pages.len(),
        tags: site.tags(config).len(),
        files_written: files.len(),
        assets_copied,
        warnings: site.warnings,
    };

    info!("Built {} posts ({} drafts skipped), {} pages, {} tags: {} files written, {} assets copied into {}",
        report.posts, report.drafts_skipped, report.pages, report.tags,
        report.files_written, report.assets_copied, config.paths.output_dir.display());

    Ok(report)
}

/// Absolute form of `path`: `.` and `..` collapsed, and the part that exists resolved through symlinks
pub fn normalize_path(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()?.join(path)
    };

    let mut lexical = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                lexical.pop();
            }
            other => lexical.push(other.as_os_str()),
        }
    }

    let mut existing = lexical.as_path();
    let mut missing = vec![];
    loop {
        if let Ok(mut resolved) = existing.canonicalize() {
            for name in missing.iter().rev() {
                resolved.push(name);
            }
            return Ok(resolved);
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return Ok(lexical),
        }
    }
}

/// Emptying the output directory must never reach the sources or the config directory
fn check_output_dir(config: &Config) -> Result<()> {
    let output_dir = normalize_path(&config.paths.output_dir)?;
    let overlap_error = |other: &Path| QuireError::Config {
        path: config.source.clone().unwrap_or_default(),
        reason: format!("output_dir {} overlaps with {}", output_dir.display(), other.display()),
    };

    let sources = [
        &config.paths.posts_dir,
        &config.paths.pages_dir,
        &config.paths.template_dir,
        &config.paths.public_dir,
    ];
    for source in sources {
        let source = normalize_path(source)?;
        if source.starts_with(&output_dir) || output_dir.starts_with(&source) {
            return Err(overlap_error(&source));
        }
    }

    let base_dir = match config.source.as_deref().and_then(Path::parent) {
        Some(parent) if config.base_dir.as_os_str().is_empty() => parent.to_path_buf(),
        _ => config.base_dir.clone(),
    };
    if !base_dir.as_os_str().is_empty() {
        let base_dir = normalize_path(&base_dir)?;
        if base_dir.starts_with(&output_dir) {
            return Err(overlap_error(&base_dir));
        }
    }
    Ok(())
}
