use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDateTime};

use quire::config::Config;
use quire::slug::slugify;

use crate::NewArgs;

fn render_header(title: &str, date: &NaiveDateTime, draft: bool) -> String {
    let mut buf = String::new();
    let title = serde_json::to_string(title).unwrap_or_else(|_| "\"\"".to_string());

    let _ = writeln!(&mut buf, "---");
    let _ = writeln!(&mut buf, "title: {}", title);
    let _ = writeln!(&mut buf, "description: \"\"");
    let _ = writeln!(&mut buf, "date: {}", date.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(&mut buf, "tags: []");
    let _ = writeln!(&mut buf, "draft: {}", draft);
    let _ = writeln!(&mut buf, "---");
    let _ = writeln!(&mut buf);
    buf
}

fn render_body() -> String {
    let mut buf = String::new();

    let _ = writeln!(&mut buf, "This is a body example");
    let _ = writeln!(&mut buf, "Please remove it and replace with your content");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "<!-- more -->");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "And this is the rest of your post");

    buf
}

/// `posts/2024-05-01-my-title.md`, or `posts/2024-05-01-my-title/index.md` for directory posts
fn post_path(posts_dir: &Path, title: &str, date: &NaiveDateTime, as_dir: bool, index_base_name: &str) -> Result<PathBuf> {
    let slug = slugify(title);
    if slug.is_empty() {
        bail!("The title '{}' has no letters or digits to build a file name from", title);
    }

    let name = format!("{}-{}", date.format("%Y-%m-%d"), slug);
    if as_dir {
        Ok(posts_dir.join(name).join(format!("{}.md", index_base_name)))
    } else {
        Ok(posts_dir.join(format!("{}.md", name)))
    }
}

pub fn new_post_cmd(config: Config, args: NewArgs) -> Result<()> {
    let date = Local::now().naive_local();
    let path = post_path(&config.paths.posts_dir, &args.title, &date, args.dir, &config.build.index_base_name)?;
    if path.exists() {
        bail!("{} already exists", path.display());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Unable to create {}", parent.display()))?;
    }

    let content = render_header(&args.title, &date, args.draft) + &render_body();
    fs::write(&path, content).with_context(|| format!("Unable to write {}", path.display()))?;

    println!("Created {}", path.display());
    Ok(())
}
