use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};

use quire::config::{read_config, Config};

use crate::CFG_FILE_NAME;

fn get_config_path() -> Option<PathBuf> {
    if let Ok(cur_dir) = env::current_dir() {
        if cur_dir.join(CFG_FILE_NAME).exists() {
            return Some(cur_dir.join(CFG_FILE_NAME));
        }
    }

    let cfg_path = dirs::config_dir()?.join("quire").join(CFG_FILE_NAME);
    if cfg_path.exists() {
        return Some(cfg_path);
    }

    None
}

pub(crate) fn open_config(cfg_path: Option<PathBuf>) -> Result<Config> {
    let config_path = match cfg_path.or_else(get_config_path) {
        Some(path) => path,
        None => return Err(anyhow!("Could not find {}. Run quire init <dir> to create a blog, or pass --config", CFG_FILE_NAME)),
    };

    println!("Reading config from {}", config_path.display());
    let config = read_config(&config_path)?;

    match config.log {
        Some(ref log) => match log.location {
            Some(ref location) => println!("Log enabled. Files will be written in {}", location.display()),
            None => println!("Log enabled. Using the console"),
        },
        None => println!("Log not configured. Using the console"),
    }

    Ok(config)
}
