use std::fs::File;
use std::path::{Path, PathBuf};
use std::{env, io};

use flate2::write::GzEncoder;
use flate2::Compression;

/// Packs the blog scaffold under `res/` into `$OUT_DIR/res.tar.gz`, embedded by `quire init`
fn compress_dir(src: &Path, archive_path: &Path) -> io::Result<()> {
    let tar_gz = File::create(archive_path)?;
    let enc = GzEncoder::new(tar_gz, Compression::default());
    let mut tar = tar::Builder::new(enc);
    tar.follow_symlinks(false);
    tar.append_dir_all(".", src)?;
    tar.into_inner()?.finish()?;
    Ok(())
}

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo");
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");

    let res_dir = PathBuf::from(manifest_dir).join("res");
    let archive_path = PathBuf::from(out_dir).join("res.tar.gz");

    println!("cargo:rerun-if-changed=res");
    compress_dir(&res_dir, &archive_path).expect("Unable to pack the res directory");
}
