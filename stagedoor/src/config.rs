use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use stagedoor_common::helpers::fs::secure_file;
use stagedoor_common::{StagedoorConfig, StagedoorConfigStore};
use tokio::sync::{mpsc, Mutex};
use tracing::*;

pub fn load_config(path: &Path, secure: bool) -> Result<StagedoorConfig> {
    if secure {
        secure_file(path).context("Could not secure config")?;
    }

    let store: StagedoorConfigStore = Config::builder()
        .add_source(File::from(path))
        .add_source(Environment::with_prefix("STAGEDOOR"))
        .build()
        .context("Could not load config")?
        .try_deserialize()
        .context("Could not parse config")?;

    let config = StagedoorConfig {
        store,
        paths_relative_to: path
            .parent()
            .context("Config path has no parent directory")?
            .to_path_buf(),
    };

    info!(
        "Using config: {path:?} (geo mappings: {})",
        config.store.geo.entries.len(),
    );
    Ok(config)
}

pub async fn watch_config<P: AsRef<Path>>(
    path: P,
    config: Arc<Mutex<StagedoorConfig>>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::channel(1);
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = tx.blocking_send(res);
        },
        notify::Config::default(),
    )?;
    watcher.watch(path.as_ref(), RecursiveMode::NonRecursive)?;

    loop {
        match rx.recv().await {
            Some(Ok(event)) => {
                if event.kind.is_modify() {
                    match load_config(path.as_ref(), false) {
                        Ok(new_config) => {
                            *(config.lock().await) = new_config;
                            info!("Reloaded config");
                        }
                        Err(error) => error!(?error, "Failed to reload config"),
                    }
                }
            }
            Some(Err(error)) => error!(?error, "Failed to watch config"),
            None => {
                error!("Config watch failed");
                break;
            }
        }
    }

    Ok(())
}
