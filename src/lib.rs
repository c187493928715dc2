pub mod collection;
pub mod config;
pub mod content;
pub mod error;
pub mod logger;
pub mod output;
pub mod paginator;
pub mod post_list;
pub mod server;
pub mod site;
pub mod slug;
pub mod text_utils;
pub mod util;
pub mod view;
pub mod watcher;
#[cfg(test)]
mod test_data;

pub use collection::BuildMode;
pub use error::{QuireError, Result};
pub use site::{build_site, BuildReport, Site};
