use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use spdlog::{info, warn};

use quire::config::Config;
use quire::logger::configure_logger;
use quire::server::server_run;
use quire::{build_site, BuildMode};

use crate::bootstrap::bootstrap_cmd;
use crate::config::open_config;
use crate::new_post::new_post_cmd;

mod bootstrap;
mod config;
mod new_post;

const CFG_FILE_NAME: &str = "quire.toml";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config path. Defaults to ./quire.toml, then the user config directory
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bootstrap a new blog
    Init(InitArgs),
    /// Create a new post
    New(NewArgs),
    /// Build the static site
    Build(BuildArgs),
    /// Build with drafts, serve the output and rebuild on changes
    Serve(ServeArgs),
}

#[derive(Parser, Debug)]
struct InitArgs {
    /// Directory where the new blog will be generated
    dir: PathBuf,

    /// Name of the author. If empty, OS user real name is being used
    #[arg(short, long)]
    author: Option<String>,
}

#[derive(Parser, Debug)]
struct NewArgs {
    /// Title of the post
    #[arg(short, long)]
    title: String,

    /// Mark the post as a draft
    #[arg(long)]
    draft: bool,

    /// Create a directory post, for posts with images
    #[arg(long)]
    dir: bool,
}

#[derive(Parser, Debug)]
struct BuildArgs {
    /// Include drafts
    #[arg(long)]
    drafts: bool,

    /// Url prefix for every link, when the site is hosted under a subdirectory
    #[arg(long)]
    path_prefix: Option<String>,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ServeArgs {
    #[arg(short, long)]
    address: Option<String>,

    #[arg(short, long)]
    port: Option<u16>,
}

fn load_config(cfg_path: Option<PathBuf>) -> Result<Config> {
    let config = open_config(cfg_path)?;
    if let Err(err) = configure_logger(&config) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }
    Ok(config)
}

/// `--output` is relative to where quire runs, not to the config file
fn absolute_output(output: PathBuf) -> Result<PathBuf> {
    if output.is_absolute() {
        return Ok(output);
    }
    let cwd = env::current_dir().context("Unable to read the current directory")?;
    Ok(cwd.join(output))
}

fn build_cmd(mut config: Config, args: BuildArgs) -> Result<()> {
    if let Some(ref prefix) = args.path_prefix {
        config.set_path_prefix(prefix);
    }
    if let Some(output) = args.output {
        config.paths.output_dir = absolute_output(output)?;
    }

    let mode = if args.drafts { BuildMode::Development } else { BuildMode::Production };
    let report = build_site(&config, mode)
        .with_context(|| format!("Unable to build {}", config.paths.output_dir.display()))?;

    if !report.warnings.is_empty() {
        warn!("{} warning(s), see above", report.warnings.len());
    }
    Ok(())
}

async fn serve_cmd(mut config: Config, args: ServeArgs) -> Result<()> {
    if let Some(address) = args.address {
        config.server.address = address;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    info!("Starting Quire dev server =-=-=-=-=-=-=-=-=-=-=-=-=-");
    server_run(config).await.context("Dev server stopped")
}

#[ntex::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Init(args) => bootstrap_cmd(args),
        Command::New(args) => new_post_cmd(load_config(cli.config)?, args),
        Command::Build(args) => build_cmd(load_config(cli.config)?, args),
        Command::Serve(args) => serve_cmd(load_config(cli.config)?, args).await,
    }
}
