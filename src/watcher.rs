use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, SystemTime};

use spdlog::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::collection::BuildMode;
use crate::config::{read_config, Config};
use crate::error::Result;
use crate::site::build_site;

/// Build status shared between the watcher and the dev server
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DevState {
    /// Bumped after every successful build
    pub generation: u64,
    pub last_error: Option<String>,
}

pub type SharedState = Arc<Mutex<DevState>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

/// Modification times and sizes of every file under a set of roots
#[derive(Debug, Default, PartialEq)]
pub struct Snapshot {
    files: BTreeMap<PathBuf, FileStamp>,
}

impl Snapshot {
    /// Missing roots are skipped, a root may also be a single file
    pub fn take(roots: &[PathBuf]) -> Snapshot {
        let mut files = BTreeMap::new();
        for root in roots {
            for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
                if !entry.file_type().is_file() {
                    continue;
                }
                if let Ok(metadata) = entry.metadata() {
                    let stamp = FileStamp { modified: metadata.modified().ok(), len: metadata.len() };
                    files.insert(entry.into_path(), stamp);
                }
            }
        }
        Snapshot { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files added, removed or modified between `self` and `newer`
    pub fn changes(&self, newer: &Snapshot) -> Vec<PathBuf> {
        let mut changed = vec![];
        for (path, stamp) in newer.files.iter() {
            if self.files.get(path) != Some(stamp) {
                changed.push(path.clone());
            }
        }
        for path in self.files.keys() {
            if !newer.files.contains_key(path) {
                changed.push(path.clone());
            }
        }
        changed
    }
}

/// Everything a rebuild depends on
pub fn watched_paths(config: &Config) -> Vec<PathBuf> {
    let mut roots = vec![
        config.paths.posts_dir.clone(),
        config.paths.pages_dir.clone(),
        config.paths.template_dir.clone(),
        config.paths.public_dir.clone(),
    ];
    if let Some(ref source) = config.source {
        roots.push(source.clone());
    }
    roots
}

/// Builds the site in development mode and records the outcome in `state`
pub fn rebuild(config: &Config, state: &SharedState) {
    let result = build_site(config, BuildMode::Development);
    let Ok(mut state) = state.lock() else {
        error!("Dev server state is poisoned, skipping the build result");
        return;
    };

    match result {
        Ok(report) => {
            state.generation += 1;
            state.last_error = None;
            info!("Rebuilt site, generation {}: {} posts, {} pages",
                state.generation, report.posts, report.pages);
        }
        Err(e) => {
            error!("Rebuild failed, keeping the previous output: {}", e);
            state.last_error = Some(e.to_string());
        }
    }
}

fn short_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Re-reads the config file for a running server. `output_dir`, `path_prefix` and `[server]`
/// keep the values the server started with.
fn reload_config(current: &Config, source: &Path) -> Result<Config> {
    let mut config = read_config(source)?;

    if config.paths.output_dir != current.paths.output_dir
        || config.build.path_prefix != current.build.path_prefix
        || config.server.address != current.server.address
        || config.server.port != current.server.port
    {
        warn!("Changes to output_dir, path_prefix or [server] in {} apply after a restart", source.display());
    }
    config.paths.output_dir = current.paths.output_dir.clone();
    config.build.path_prefix = current.build.path_prefix.clone();
    config.server = current.server.clone();

    Ok(config)
}

/// Source snapshot and the config the next rebuild uses
pub struct SiteWatcher {
    config: Config,
    state: SharedState,
    roots: Vec<PathBuf>,
    snapshot: Snapshot,
}

impl SiteWatcher {
    pub fn new(config: Config, state: SharedState) -> SiteWatcher {
        let roots = watched_paths(&config);
        let snapshot = Snapshot::take(&roots);
        SiteWatcher { config, state, roots, snapshot }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Rebuilds if anything changed since the last poll, reloading the config file first when it
    /// is among the changes. Returns whether there were changes.
    pub fn poll(&mut self) -> bool {
        let current = Snapshot::take(&self.roots);
        let changes = self.snapshot.changes(&current);
        if changes.is_empty() {
            return false;
        }

        let names: Vec<String> = changes.iter().map(|p| short_name(p)).collect();
        info!("Detected changes in {}", names.join(", "));
        self.snapshot = current;

        if let Some(source) = self.config.source.clone() {
            if changes.contains(&source) {
                match reload_config(&self.config, &source) {
                    Ok(config) => {
                        info!("Reloaded configuration from {}", source.display());
                        self.config = config;
                        self.roots = watched_paths(&self.config);
                        self.snapshot = Snapshot::take(&self.roots);
                    }
                    Err(e) => {
                        error!("Keeping the previous configuration: {}", e);
                        record_error(&self.state, e.to_string());
                        return true;
                    }
                }
            }
        }

        rebuild(&self.config, &self.state);
        true
    }
}

fn record_error(state: &SharedState, message: String) {
    match state.lock() {
        Ok(mut state) => state.last_error = Some(message),
        Err(_) => error!("Dev server state is poisoned, dropping error: {}", message),
    }
}

/// Polls the sources and rebuilds on every change. Runs until the process exits.
pub fn spawn_watcher(config: Config, state: SharedState) -> thread::JoinHandle<()> {
    let interval = Duration::from_millis(config.server.poll_interval_ms.max(50));

    thread::spawn(move || {
        let mut watcher = SiteWatcher::new(config, state);
        debug!("Watching {} files", watcher.snapshot.len());

        loop {
            thread::sleep(interval);
            watcher.poll();
        }
    })
}
