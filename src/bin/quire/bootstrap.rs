use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use tar::Archive;

use quire::util::os_helper::get_name;

use crate::{InitArgs, CFG_FILE_NAME};

const SCAFFOLD: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/res.tar.gz"));

fn decompress_files(output: &Path) -> std::io::Result<()> {
    let tar = GzDecoder::new(SCAFFOLD);
    let mut archive = Archive::new(tar);
    archive.unpack(output)
}

/// Fills the sample configuration with the blog author
fn fill_config(config_data: &str, author: &str) -> String {
    let author = serde_json::to_string(author).unwrap_or_else(|_| "\"\"".to_string());
    config_data.replace("\"AUTHOR\"", &author)
}

fn write_quire_cfg(out_dir: &Path, author: &str) -> Result<()> {
    let cfg_path = out_dir.join(CFG_FILE_NAME);
    let sample_cfg = fs::read_to_string(&cfg_path)
        .with_context(|| format!("Unable to read {}", cfg_path.display()))?;
    fs::write(&cfg_path, fill_config(&sample_cfg, author))
        .with_context(|| format!("Unable to write {}", cfg_path.display()))
}

pub(crate) fn bootstrap(out_dir: &Path, author: &str) -> Result<()> {
    if out_dir.join(CFG_FILE_NAME).exists() {
        bail!("{} already has a {}", out_dir.display(), CFG_FILE_NAME);
    }

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Unable to create {}", out_dir.display()))?;
    decompress_files(out_dir)
        .with_context(|| format!("Error bootstrapping {}", out_dir.display()))?;
    write_quire_cfg(out_dir, author)
}

pub fn bootstrap_cmd(args: InitArgs) -> Result<()> {
    let author = args.author.unwrap_or_else(get_name);
    bootstrap(&args.dir, &author)?;

    println!("New blog created in {}", args.dir.display());
    println!("Run `quire serve` inside it to preview, `quire build` to publish");
    Ok(())
}
