//! Configuration file watcher for hot reload of the `[tuning]` table.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::loader::load_config;
use crate::config::store::ConfigStore;
use crate::config::validation::describe;

/// A watcher that re-applies the config file's tuning on change.
pub struct ConfigWatcher {
    path: PathBuf,
    store: Arc<ConfigStore>,
}

impl ConfigWatcher {
    pub fn new(path: &Path, store: Arc<ConfigStore>) -> Self {
        Self {
            path: path.to_path_buf(),
            store,
        }
    }

    /// Reload the file once and apply its tuning, if any.
    pub fn reload(path: &Path, store: &ConfigStore) {
        let config = match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Failed to reload config: {}. Keeping current settings.", e);
                return;
            }
        };

        let Some(tuning) = config.tuning else {
            tracing::debug!(path = ?path, "Config reloaded without [tuning] table");
            return;
        };

        if let Err(errors) = store.apply_tuning(&tuning) {
            tracing::error!(reason = %describe(&errors), "Rejected tuning from config file");
        }
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for as long as reloads are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path.clone();
        let store = self.store.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Config file change detected, reloading tuning...");
                        Self::reload(&path, &store);
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}
