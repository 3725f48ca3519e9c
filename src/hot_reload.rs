//! # Hot Reload Module
//!
//! Refreshes the endpoint catalog when the configuration file changes on disk.
//!
//! Each modify or create event triggers [`EndpointCatalog::refresh`] against the
//! given [`ConfigSource`]. A refresh that fails to load or validate is logged and
//! the previous catalog keeps serving, so saving a half-edited file never takes
//! endpoints down.
//!
//! ```rust,ignore
//! let watcher = watch_config("flapi.yaml", Arc::clone(&catalog), source)?;
//! // Keep `watcher` alive for as long as reloads should happen
//! ```

use crate::catalog::EndpointCatalog;
use crate::config::ConfigSource;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// Start watching `config_path`; dropping the returned watcher stops it.
///
/// # Errors
///
/// Returns an error if the watcher cannot be created or the path cannot be watched.
pub fn watch_config<P>(
    config_path: P,
    catalog: Arc<EndpointCatalog>,
    source: Arc<dyn ConfigSource>,
) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
{
    let path: PathBuf = config_path.as_ref().to_path_buf();
    let watched = path.display().to_string();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    // Failures are logged by the catalog
                    if let Ok(count) = catalog.refresh(source.as_ref()) {
                        info!(path = %watched, endpoints_count = count, "hot-reload: catalog refreshed");
                    }
                }
            }
            Err(e) => error!(path = %watched, error = %e, "hot-reload: watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;
    info!(path = %path.display(), "hot-reload: watching configuration");
    Ok(watcher)
}
