use ramhorns::Template;

use crate::content::Content;
use crate::text_utils::{display_date, format_date_time};
use crate::view::{view_tags, SiteView, ViewTag};

#[derive(ramhorns::Content)]
struct ViewItem<'a> {
    title: &'a str,
    description: &'a str,
    has_description: bool,
    author: &'a str,
    tags: Vec<ViewTag>,
    has_tags: bool,
    date: &'a str,
    time: &'a str,
    display_date: &'a str,
    draft: bool,
    link: &'a str,
    content: &'a str,
}

pub struct PostRenderer<'t> {
    pub template: &'t Template<'static>,
    pub base: &'t Template<'static>,
    pub hidden_tags: &'t [String],
}

impl PostRenderer<'_> {
    /// Full post page. Used for pages too, which simply have no tags.
    pub fn render(&self, site: &SiteView, content: &Content) -> String {
        let tags = view_tags(&site.prefix, &content.header.tags, self.hidden_tags);
        let (date, time) = format_date_time(&content.header.date);
        let description = content.header.description.as_deref().unwrap_or("");

        let body = self.template.render(&ViewItem {
            title: &content.header.title,
            description,
            has_description: !description.is_empty(),
            author: &site.author,
            has_tags: !tags.is_empty(),
            tags,
            date: &date,
            time: &time,
            display_date: &display_date(&content.header.date),
            draft: content.header.draft,
            link: &content.link,
            content: &content.rendered,
        });

        site.wrap(self.base, &content.header.title, &body)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    use crate::content::{Content, ContentHeader};

    use super::*;

    #[test]
    fn render_view() {
        let template_src = r##"
TITLE=[{{title}}]
AUTHOR=[{{author}}]
DATE=[{{date}}]
TIME=[{{time}}]
TAGS=[{{#tags}}({{name}}:{{link}}){{/tags}}]
POST_CONTENT=[{{{content}}}]
"##;
        let template = Template::new(template_src.to_string()).unwrap();
        let base = Template::new("{{{body}}}".to_string()).unwrap();
        let hidden_tags: Vec<String> = vec![];
        let post_renderer = PostRenderer { template: &template, base: &base, hidden_tags: &hidden_tags };
        let site = SiteView {
            title: "Blog".to_string(),
            description: "".to_string(),
            author: "<Thiago>".to_string(),
            language: "en".to_string(),
            prefix: "/".to_string(),
            feed_url: "/feed.xml".to_string(),
        };
        let content = Content {
            header: ContentHeader {
                file_name: PathBuf::from("file_name.md"),
                slug: "post-title".to_string(),
                title: "<post-title>".to_string(),
                description: None,
                date: NaiveDateTime::new(
                    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                    NaiveTime::from_hms_opt(3, 4, 5).unwrap(),
                ),
                tags: vec!["<rust>".to_string(), "programming".to_string()],
                draft: false,
            },
            link: "/posts/post-title/".to_string(),
            excerpt: "".to_string(),
            rendered: "<post-content>".to_string(),
            warnings: vec![],
        };
        let res = post_renderer.render(&site, &content);
        assert_eq!(res.trim_end(), r##"
TITLE=[&lt;post-title&gt;]
AUTHOR=[&lt;Thiago&gt;]
DATE=[2024-01-02]
TIME=[03:04:05]
TAGS=[(&lt;rust&gt;:/tags/rust/)(programming:/tags/programming/)]
POST_CONTENT=[<post-content>]"##);
    }
}
