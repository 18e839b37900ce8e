//! Polling watcher for external edits to the catalog files
//!
//! The catalog is authored by hand: operators edit the YAML files directly
//! and expect the running server to pick the changes up. The watcher
//! fingerprints the watched paths (file size and mtime) on a fixed interval
//! and reloads the catalog once a changed fingerprint has held steady for a
//! full tick, so a half-written file is not parsed mid-save.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::fs;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::catalog::CatalogStore;

/// Default interval between fingerprint polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

type Fingerprints = BTreeMap<PathBuf, (u64, SystemTime)>;

/// Spawn the background watch loop. The returned handle is held by the
/// caller for the life of the server; dropping it does not stop the task.
pub fn spawn_catalog_watcher(store: CatalogStore, poll: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Watching catalog files under {} every {:?}",
            store.folders().root().display(),
            poll
        );

        let mut interval = tokio::time::interval(poll);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut last = fingerprint_all(&store.watched_paths()).await;
        let mut pending: Option<Fingerprints> = None;

        loop {
            interval.tick().await;
            let current = fingerprint_all(&store.watched_paths()).await;

            match pending.take() {
                // A change was seen last tick and nothing moved since: the
                // files have settled, reload now.
                Some(p) if p == current => {
                    debug!("Catalog files settled, reloading");
                    if let Err(err) = store.reload().await {
                        error!("Catalog reload failed: {err}");
                    }
                    last = current;
                }
                // Still changing (or first observation of a change): keep
                // waiting for a quiet tick.
                _ => {
                    if current != last {
                        pending = Some(current);
                    }
                }
            }
        }
    })
}

/// Fingerprint every watched path. Directories contribute one entry per
/// contained `.yaml` file, so adding or removing a concept file changes the
/// map shape even when no surviving file was touched.
async fn fingerprint_all(paths: &[PathBuf]) -> Fingerprints {
    let mut prints = Fingerprints::new();
    for path in paths {
        match fs::metadata(path).await {
            Ok(meta) if meta.is_dir() => {
                if let Ok(mut entries) = fs::read_dir(path).await {
                    while let Ok(Some(entry)) = entries.next_entry().await {
                        let child = entry.path();
                        if child.extension().and_then(|e| e.to_str()) == Some("yaml") {
                            fingerprint_file(&child, &mut prints).await;
                        }
                    }
                }
            }
            Ok(_) => fingerprint_file(path, &mut prints).await,
            // A missing path is itself part of the fingerprint: it simply
            // contributes no entry, so appearing later registers as a change.
            Err(_) => {}
        }
    }
    prints
}

async fn fingerprint_file(path: &Path, prints: &mut Fingerprints) {
    if let Ok(meta) = fs::metadata(path).await {
        let mtime = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        prints.insert(path.to_path_buf(), (meta.len(), mtime));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciit_common::config::DataFolders;

    #[tokio::test]
    async fn new_concept_file_triggers_reload() {
        let dir = tempfile::tempdir().unwrap();
        let folders = DataFolders::new(dir.path());
        folders.ensure_directories().unwrap();

        let store = CatalogStore::new(folders.clone());
        store.reload().await.unwrap();
        assert!(store.concepts().await.is_empty());

        let handle = spawn_catalog_watcher(store.clone(), Duration::from_millis(25));
        // Let the watcher capture its empty baseline fingerprint before the
        // write below, so the new file registers as a change rather than being
        // part of the startup baseline.
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Adding a file changes the fingerprint map shape, which is robust
        // against coarse mtime granularity on some filesystems.
        std::fs::write(
            folders.concepts_dir().join("acme-fund.yaml"),
            "id: acme-fund\nname: Acme Fund\n",
        )
        .unwrap();

        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            if !store.concepts().await.is_empty() {
                break;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "watcher never reloaded the catalog"
            );
            tokio::time::sleep(Duration::from_millis(25)).await;
        }

        let concepts = store.concepts().await;
        assert_eq!(concepts.len(), 1);
        assert_eq!(concepts[0].id, "acme-fund");
        handle.abort();
    }
}
