use crate::content::Content;
use crate::content::content_file::ContentFile;
use crate::error::Result;

#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// Site relative permalink of the content
    pub link: String,
    /// Prepended to relative image paths in the excerpt, which is shown away from the post
    pub image_prefix: String,
    /// Marker that ends the excerpt
    pub excerpt_separator: String,
    /// File stem that marks a directory post, e.g. `index` for `posts/trip/index.md`
    pub index_base_name: String,
}

pub trait ContentRenderer {
    fn render(content_file: &ContentFile, render_options: &RenderOptions) -> Result<Content>;
}
