use std::sync::Arc;

use ramhorns::Template;

use crate::collection::TagGroup;
use crate::content::Content;
use crate::text_utils::{display_date, format_date_time};
use crate::view::{view_tags, SiteView, ViewTag};

#[derive(ramhorns::Content)]
struct PostItem {
    date: String,
    time: String,
    display_date: String,
    link: String,
    title: String,
    description: String,
    summary: String,
    tags: Vec<ViewTag>,
    draft: bool,
}

#[derive(ramhorns::Content)]
struct IndexPage<'a> {
    post_list: Vec<PostItem>,
    has_posts: bool,
    archive_link: &'a str,
}

#[derive(ramhorns::Content)]
struct ListPage {
    post_list: Vec<PostItem>,
    page_list: Vec<ViewPagination>,
    show_pagination: bool,
    page_number: usize,
    page_count: usize,
    has_prev: bool,
    prev_link: String,
    has_next: bool,
    next_link: String,
}

#[derive(ramhorns::Content)]
struct ViewPagination {
    current: bool,
    number: usize,
    link: String,
}

#[derive(ramhorns::Content)]
struct TagPage<'a> {
    tag: &'a str,
    post_count: usize,
    post_list: Vec<PostItem>,
    tags_link: &'a str,
}

#[derive(ramhorns::Content)]
struct TagItem {
    name: String,
    link: String,
    count: usize,
}

#[derive(ramhorns::Content)]
struct TagsPage {
    tags: Vec<TagItem>,
    has_tags: bool,
}

/// Link of an archive page: page 1 is the archive root, the others live under `page/<n>/`
pub fn archive_link(prefix: &str, page: usize) -> String {
    if page <= 1 {
        format!("{}posts/", prefix)
    } else {
        format!("{}posts/page/{}/", prefix, page)
    }
}

pub struct ListRenderer<'t> {
    pub base: &'t Template<'static>,
    pub hidden_tags: &'t [String],
}

impl ListRenderer<'_> {
    fn post_items(&self, site: &SiteView, contents: &[Arc<Content>]) -> Vec<PostItem> {
        let mut post_list = vec![];
        for content in contents {
            let (date, time) = format_date_time(&content.header.date);
            post_list.push(PostItem {
                date,
                time,
                display_date: display_date(&content.header.date),
                link: content.link.clone(),
                title: content.header.title.clone(),
                description: content.header.description.clone().unwrap_or_default(),
                summary: content.excerpt.clone(),
                tags: view_tags(&site.prefix, &content.header.tags, self.hidden_tags),
                draft: content.header.draft,
            });
        }
        post_list
    }

    pub fn render_index(&self, template: &Template, site: &SiteView, latest: &[Arc<Content>]) -> String {
        let archive_link = archive_link(&site.prefix, 1);
        let body = template.render(&IndexPage {
            post_list: self.post_items(site, latest),
            has_posts: !latest.is_empty(),
            archive_link: &archive_link,
        });
        site.wrap(self.base, &site.title, &body)
    }

    pub fn render_archive(&self, template: &Template, site: &SiteView,
                          contents: &[Arc<Content>], cur_page: usize, page_count: usize) -> String {
        let page_count = page_count.max(1);
        let mut page_list: Vec<ViewPagination> = Vec::with_capacity(page_count);
        for number in 1..=page_count {
            page_list.push(ViewPagination {
                current: number == cur_page,
                number,
                link: archive_link(&site.prefix, number),
            })
        }

        let body = template.render(&ListPage {
            post_list: self.post_items(site, contents),
            page_list,
            show_pagination: page_count > 1,
            page_number: cur_page,
            page_count,
            has_prev: cur_page > 1,
            prev_link: archive_link(&site.prefix, cur_page.saturating_sub(1)),
            has_next: cur_page < page_count,
            next_link: archive_link(&site.prefix, cur_page + 1),
        });

        let title = if cur_page > 1 {
            format!("Archive - page {}", cur_page)
        } else {
            "Archive".to_string()
        };
        site.wrap(self.base, &title, &body)
    }

    pub fn render_tag(&self, template: &Template, site: &SiteView, group: &TagGroup) -> String {
        let tags_link = format!("{}tags/", site.prefix);
        let body = template.render(&TagPage {
            tag: &group.name,
            post_count: group.posts.len(),
            post_list: self.post_items(site, &group.posts),
            tags_link: &tags_link,
        });
        site.wrap(self.base, &format!("Tagged \"{}\"", group.name), &body)
    }

    pub fn render_tags(&self, template: &Template, site: &SiteView, groups: &[TagGroup]) -> String {
        let tags: Vec<TagItem> = groups.iter()
            .map(|g| TagItem {
                name: g.name.clone(),
                link: format!("{}tags/{}/", site.prefix, g.slug),
                count: g.posts.len(),
            })
            .collect();

        let body = template.render(&TagsPage {
            has_tags: !tags.is_empty(),
            tags,
        });
        site.wrap(self.base, "Tags", &body)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::NaiveDate;

    use crate::content::ContentHeader;

    use super::*;

    fn site() -> SiteView {
        SiteView {
            title: "Blog".to_string(),
            description: "".to_string(),
            author: "Me".to_string(),
            language: "en".to_string(),
            prefix: "/blog/".to_string(),
            feed_url: "/blog/feed.xml".to_string(),
        }
    }

    fn content(slug: &str) -> Arc<Content> {
        Arc::new(Content {
            header: ContentHeader {
                file_name: PathBuf::from(format!("posts/{}.md", slug)),
                slug: slug.to_string(),
                title: format!("Title {}", slug),
                description: None,
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(5, 6, 7).unwrap(),
                tags: vec!["rust".to_string()],
                draft: false,
            },
            link: format!("/blog/posts/{}/", slug),
            excerpt: format!("<p>summary {}</p>", slug),
            rendered: String::new(),
            warnings: vec![],
        })
    }

    #[test]
    fn test_archive_link() {
        assert_eq!(archive_link("/", 1), "/posts/");
        assert_eq!(archive_link("/", 0), "/posts/");
        assert_eq!(archive_link("/blog/", 3), "/blog/posts/page/3/");
    }

    #[test]
    fn test_render_index() {
        let base = Template::new("{{{body}}}".to_string()).unwrap();
        let template = Template::new(
            "{{#post_list}}[{{title}}|{{link}}|{{date}}|{{{summary}}}|{{#tags}}{{link}}{{/tags}}]{{/post_list}}{{archive_link}}".to_string()
        ).unwrap();
        let hidden: Vec<String> = vec![];
        let renderer = ListRenderer { base: &base, hidden_tags: &hidden };
        let html = renderer.render_index(&template, &site(), &[content("a"), content("b")]);
        assert_eq!(html, "[Title a|/blog/posts/a/|2024-01-02|<p>summary a</p>|/blog/tags/rust/]\
[Title b|/blog/posts/b/|2024-01-02|<p>summary b</p>|/blog/tags/rust/]/blog/posts/");
    }

    #[test]
    fn test_render_archive_pagination() {
        let base = Template::new("{{{body}}}".to_string()).unwrap();
        let template = Template::new(
            "{{#page_list}}{{#current}}*{{/current}}{{number}}={{link}};{{/page_list}}{{#has_prev}}prev={{prev_link}}{{/has_prev}}".to_string()
        ).unwrap();
        let hidden: Vec<String> = vec![];
        let renderer = ListRenderer { base: &base, hidden_tags: &hidden };
        let html = renderer.render_archive(&template, &site(), &[content("c")], 2, 2);
        assert_eq!(html, "1=/blog/posts/;*2=/blog/posts/page/2/;prev=/blog/posts/");
    }

    #[test]
    fn test_render_tags() {
        let base = Template::new("{{{body}}}".to_string()).unwrap();
        let template = Template::new("{{#tags}}[{{name}}({{count}}):{{link}}]{{/tags}}".to_string()).unwrap();
        let hidden: Vec<String> = vec![];
        let renderer = ListRenderer { base: &base, hidden_tags: &hidden };
        let groups = vec![TagGroup { name: "Rust".to_string(), slug: "rust".to_string(), posts: vec![content("a"), content("b")] }];
        let html = renderer.render_tags(&template, &site(), &groups);
        assert_eq!(html, "[Rust(2):/blog/tags/rust/]");
    }
}
