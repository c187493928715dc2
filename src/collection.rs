use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::content::Content;
use crate::slug::slugify;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Drafts are left out
    Production,
    /// Every post is published, drafts included
    Development,
}

impl BuildMode {
    pub fn includes_drafts(&self) -> bool {
        matches!(self, BuildMode::Development)
    }
}

/// Posts sharing a tag. `slug` is unique across groups.
#[derive(Debug, Clone)]
pub struct TagGroup {
    pub name: String,
    pub slug: String,
    pub posts: Vec<Arc<Content>>,
}

/// Newest first. Equal dates fall back to the slug so the order never depends on discovery.
pub fn by_date_desc(a: &Content, b: &Content) -> Ordering {
    b.header.date.cmp(&a.header.date)
        .then_with(|| a.header.slug.cmp(&b.header.slug))
}

pub struct Collection {
    posts: Vec<Arc<Content>>,
    draft_count: usize,
}

impl Collection {
    pub fn new(all_posts: Vec<Content>, mode: BuildMode) -> Self {
        let total = all_posts.len();
        let mut posts: Vec<Content> = all_posts.into_iter()
            .filter(|p| mode.includes_drafts() || !p.header.draft)
            .collect();
        let draft_count = total - posts.len();

        posts.sort_by(by_date_desc);

        Collection {
            posts: posts.into_iter().map(Arc::new).collect(),
            draft_count,
        }
    }

    /// Posts visible in the build mode, newest first
    pub fn published(&self) -> &[Arc<Content>] {
        &self.posts
    }

    /// Drafts left out by the build mode
    pub fn draft_count(&self) -> usize {
        self.draft_count
    }

    pub fn latest(&self, n: usize) -> &[Arc<Content>] {
        &self.posts[..n.min(self.posts.len())]
    }

    /// One group per distinct tag slug, ordered by slug.
    /// The display name is the first spelling in sorted order.
    pub fn tags(&self, hidden_tags: &[String]) -> Vec<TagGroup> {
        let hidden: Vec<String> = hidden_tags.iter().map(|t| slugify(t)).collect();
        let mut groups: BTreeMap<String, TagGroup> = BTreeMap::new();

        for post in self.posts.iter() {
            for tag in post.header.tags.iter() {
                let slug = slugify(tag);
                if slug.is_empty() || hidden.contains(&slug) {
                    continue;
                }

                let group = groups.entry(slug.clone()).or_insert_with(|| TagGroup {
                    name: tag.clone(),
                    slug,
                    posts: vec![],
                });
                if tag < &group.name {
                    group.name = tag.clone();
                }
                // Two spellings of the same tag on one post count once
                if !group.posts.iter().any(|p| Arc::ptr_eq(p, post)) {
                    group.posts.push(post.clone());
                }
            }
        }

        groups.into_values().collect()
    }

    /// Tag groups by post count, most used first, then by name
    pub fn tag_counts(&self, hidden_tags: &[String]) -> Vec<TagGroup> {
        let mut tags = self.tags(hidden_tags);
        tags.sort_by(|a, b| {
            b.posts.len().cmp(&a.posts.len())
                .then_with(|| a.name.cmp(&b.name))
        });
        tags
    }
}
