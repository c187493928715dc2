use std::path::Path;

use markdown::Options;

use crate::content::content_file::ContentFile;
use crate::content::content_format::ContentFormat;
use crate::content::content_renderer::{ContentRenderer, RenderOptions};
use crate::content::front_matter::extract_front_matter;
use crate::content::parsing_utils::{extract_excerpt, remove_comments, resolve_header};
use crate::content::Content;
use crate::error::{QuireError, Result};

pub struct MarkdownRenderer {}

impl ContentRenderer for MarkdownRenderer {
    fn render(content_file: &ContentFile, render_options: &RenderOptions) -> Result<Content> {
        if content_file.format != ContentFormat::Markdown {
            return Err(QuireError::UnsupportedFormat(content_file.file_path.clone()));
        }

        let file_path = &content_file.file_path;
        let (front_matter, body) = extract_front_matter(&content_file.raw_content)
            .map_err(|reason| QuireError::FrontMatter { path: file_path.clone(), reason })?;
        let resolved = resolve_header(file_path, &content_file.slug, &render_options.index_base_name,
                                      ContentFormat::Markdown, front_matter, body)?;

        let excerpt = extract_excerpt(&resolved.body, &render_options.excerpt_separator);
        let excerpt = Self::render_markdown(file_path, excerpt, Some(&render_options.image_prefix))?;
        let rendered = Self::render_markdown(file_path, &resolved.body, None)?;

        Ok(Content {
            header: resolved.header,
            link: render_options.link.clone(),
            excerpt,
            rendered,
            warnings: resolved.warnings,
        })
    }
}

impl MarkdownRenderer {
    pub fn render_markdown(file_path: &Path, md_text: &str, img_prefix: Option<&str>) -> Result<String> {
        let markdown_error = |reason: String| QuireError::Markdown { path: file_path.to_path_buf(), reason };

        let buf = remove_comments(md_text).map_err(markdown_error)?;
        let buf = if let Some(img_prefix) = img_prefix {
            Self::change_images(img_prefix, buf.as_str())
        } else {
            buf
        };
        markdown::to_html_with_options(buf.as_str(), &Options::gfm())
            .map_err(|e| markdown_error(e.reason))
    }

    /// Prefixes relative image urls, `![alt](img.png)` becomes `![alt](<prefix>/img.png)`
    fn change_images(prefix: &str, md_post: &str) -> String {
        let mut parsed_string = String::new();
        let mut remaining_input = md_post;

        while let Some(text_start) = remaining_input.find("![") {
            let text_end = text_start + 2;

            parsed_string.push_str(&remaining_input[0..text_end]);
            remaining_input = &remaining_input[text_end..];

            // Look for the closing bracket of the link text
            if let Some(link_end) = remaining_input.find("](") {
                let link_text = &remaining_input[..link_end];
                let url_start = link_end + 2;

                let url_start_slice = &remaining_input[url_start..];
                if let Some(url_end) = url_start_slice.find(')') {
                    let url = &url_start_slice[..url_end];
                    let prefixed_url = if is_absolute_url(url) {
                        url.to_string()
                    } else if prefix.ends_with('/') {
                        format!("{}{}", prefix, url)
                    } else {
                        format!("{}/{}", prefix, url)
                    };

                    parsed_string.push_str(link_text);
                    parsed_string.push_str("](");
                    parsed_string.push_str(&prefixed_url);
                    parsed_string.push(')');

                    remaining_input = &url_start_slice[url_end + 1..];
                }
            }
        }

        parsed_string.push_str(remaining_input);

        parsed_string
    }
}

pub(crate) fn is_absolute_url(url: &str) -> bool {
    url.contains("://") || url.starts_with('/') || url.starts_with("data:") || url.starts_with('#')
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::test_data::POST_DATA_MD;

    use super::*;

    fn render_options() -> RenderOptions {
        RenderOptions {
            link: "/posts/what-i-learned/".to_string(),
            image_prefix: "/posts/what-i-learned/".to_string(),
            excerpt_separator: "<!-- more -->".to_string(),
            index_base_name: "index".to_string(),
        }
    }

    fn content_file(raw: &str) -> ContentFile {
        ContentFile {
            slug: "what-i-learned".to_string(),
            file_path: PathBuf::from("posts/what-i-learned.md"),
            format: ContentFormat::Markdown,
            raw_content: raw.to_string(),
        }
    }

    #[test]
    fn test_excerpt() {
        let content = MarkdownRenderer::render(&content_file(POST_DATA_MD), &render_options()).unwrap();
        assert!(content.excerpt.starts_with("<p>How to be a great software engineer?</p>"));
        assert!(content.excerpt.contains(r#"<img src="/posts/what-i-learned/me.png" alt="me" />"#));
        assert!(!content.excerpt.contains("Non technical"));
        assert!(!content.excerpt.contains("<!--"));
    }

    #[test]
    fn test_full_content() {
        let content = MarkdownRenderer::render(&content_file(POST_DATA_MD), &render_options()).unwrap();
        assert_eq!(content.link, "/posts/what-i-learned/");
        assert_eq!(content.header.slug, "what-i-learned");
        assert!(content.rendered.starts_with("<p>How to be a great software engineer?</p>"));
        assert!(content.rendered.contains(r#"<img src="me.png" alt="me" />"#));
        assert!(content.rendered.contains("<h2>Non technical</h2>"));
        assert!(content.rendered.contains("<strong>The earlier you find that, the better.</strong>"));
        assert!(!content.rendered.contains("more -->"));
    }

    #[test]
    fn test_malformed_front_matter() {
        let res = MarkdownRenderer::render(&content_file("---\ntitle: [x\n---\nbody"), &render_options());
        match res {
            Err(QuireError::FrontMatter { path, .. }) => assert_eq!(path, PathBuf::from("posts/what-i-learned.md")),
            _ => panic!("expected a front matter error"),
        }
    }

    #[test]
    fn test_add_prefix() {
        let content = "something![imagelabel](url.png)osadiosa";
        assert_eq!(MarkdownRenderer::change_images("post_name/", content), "something![imagelabel](post_name/url.png)osadiosa");
        assert_eq!(MarkdownRenderer::change_images("post_name", content), "something![imagelabel](post_name/url.png)osadiosa");
        let content = "something![](url.png)";
        assert_eq!(MarkdownRenderer::change_images("post_name", content), "something![](post_name/url.png)");
    }

    #[test]
    fn test_absolute_images_are_kept() {
        let content = "![a](https://cdn.example.com/a.png) ![b](/static/b.png)";
        assert_eq!(MarkdownRenderer::change_images("post", content), content);
    }
}
