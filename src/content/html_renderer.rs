use lazy_static::lazy_static;
use regex::Regex;

use crate::content::content_file::ContentFile;
use crate::content::content_format::ContentFormat;
use crate::content::content_renderer::{ContentRenderer, RenderOptions};
use crate::content::front_matter::extract_front_matter;
use crate::content::markdown_renderer::is_absolute_url;
use crate::content::parsing_utils::{extract_excerpt, remove_comments, resolve_header};
use crate::content::Content;
use crate::error::{QuireError, Result};

/// Content written directly in HTML. The front matter is the same as for markdown.
pub struct HtmlRenderer {}

impl ContentRenderer for HtmlRenderer {
    fn render(content_file: &ContentFile, render_options: &RenderOptions) -> Result<Content> {
        if content_file.format != ContentFormat::Html {
            return Err(QuireError::UnsupportedFormat(content_file.file_path.clone()));
        }

        let file_path = &content_file.file_path;
        let (front_matter, body) = extract_front_matter(&content_file.raw_content)
            .map_err(|reason| QuireError::FrontMatter { path: file_path.clone(), reason })?;
        let resolved = resolve_header(file_path, &content_file.slug, &render_options.index_base_name,
                                      ContentFormat::Html, front_matter, body)?;

        let excerpt = extract_excerpt(&resolved.body, &render_options.excerpt_separator);
        let excerpt = Self::change_images(&render_options.image_prefix, excerpt.trim());

        let markup_error = |reason: String| QuireError::Markdown { path: file_path.clone(), reason };
        let excerpt = remove_comments(&excerpt).map_err(markup_error)?;
        let rendered = remove_comments(&resolved.body).map_err(markup_error)?;

        Ok(Content {
            header: resolved.header,
            link: render_options.link.clone(),
            excerpt,
            rendered,
            warnings: resolved.warnings,
        })
    }
}

impl HtmlRenderer {
    fn change_images(prefix: &str, html: &str) -> String {
        lazy_static! {
            static ref IMG_REGEX: Regex = Regex::new(r#"<img[^>]*src="([^"]*)"[^>]*>"#).unwrap();
        }

        let prefix = if prefix.ends_with('/') {
            prefix.to_string()
        } else {
            format!("{}/", prefix)
        };

        let result = IMG_REGEX.replace_all(html, |captures: &regex::Captures| {
            let tag = &captures[0];
            let src = &captures[1];
            if is_absolute_url(src) {
                tag.to_string()
            } else {
                tag.replace(&format!(r#"src="{}""#, src), &format!(r#"src="{}{}""#, prefix, src))
            }
        });

        result.to_string()
    }
}
