use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use base64::Engine as _;
use tabshot_logging::{shot_debug, shot_warn};
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::hosts::{DownloadHost, DownloadSpec, DownloadWatch, HostError};
use crate::{DownloadDelta, DownloadId, DownloadState, DownloadStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("save directory missing or not writable: {0}")]
    SaveDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the save directory exists; create if missing.
pub fn ensure_save_dir(dir: &Path) -> Result<(), StoreError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| StoreError::SaveDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(StoreError::SaveDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| StoreError::SaveDir(e.to_string()))?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| StoreError::SaveDir(e.to_string()))?;
    Ok(())
}

/// Atomically write image bytes to `{dir}/{filename}` by writing a temp
/// file then renaming.
#[derive(Debug, Clone)]
pub struct AtomicImageWriter {
    dir: PathBuf,
}

impl AtomicImageWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        ensure_save_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // Replace existing file if present to keep determinism.
        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|e| StoreError::Io(e.error))?;
        Ok(target)
    }
}

#[derive(Default)]
struct Registry {
    next_download: DownloadId,
    next_watch: u64,
    records: HashMap<DownloadId, DownloadStatus>,
    watchers: HashMap<DownloadId, HashMap<u64, mpsc::UnboundedSender<DownloadDelta>>>,
}

/// Download host that stores captured images on the local filesystem. The
/// write runs off the request path, so completion arrives as a
/// state-change notification like it would from a real download manager.
pub struct LocalDownloadHost {
    writer: AtomicImageWriter,
    registry: Arc<Mutex<Registry>>,
}

impl LocalDownloadHost {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            writer: AtomicImageWriter::new(dir),
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }

    fn transition(
        registry: &Arc<Mutex<Registry>>,
        id: DownloadId,
        state: DownloadState,
        error: Option<String>,
    ) {
        let delta = DownloadDelta {
            id,
            state,
            error: error.clone(),
        };
        let watchers: Vec<mpsc::UnboundedSender<DownloadDelta>> = {
            let mut guard = registry.lock().expect("download registry");
            guard.records.insert(id, DownloadStatus { state, error });
            guard
                .watchers
                .get(&id)
                .map(|senders| senders.values().cloned().collect())
                .unwrap_or_default()
        };
        for tx in watchers {
            let _ = tx.send(delta.clone());
        }
    }
}

#[async_trait::async_trait]
impl DownloadHost for LocalDownloadHost {
    async fn begin(&self, spec: DownloadSpec) -> Result<Option<DownloadId>, HostError> {
        // Initiation failures (a bad payload) are reported synchronously,
        // mirroring a host that rejects the download outright.
        let bytes = decode_data_uri(spec.uri.as_str()).map_err(HostError::new)?;

        let id = {
            let mut guard = self.registry.lock().expect("download registry");
            guard.next_download += 1;
            let id = guard.next_download;
            guard.records.insert(
                id,
                DownloadStatus {
                    state: DownloadState::InProgress,
                    error: None,
                },
            );
            id
        };

        let writer = self.writer.clone();
        let registry = self.registry.clone();
        let filename = spec.filename.clone();
        tokio::spawn(async move {
            let written =
                tokio::task::spawn_blocking(move || writer.write(&filename, &bytes)).await;
            match written {
                Ok(Ok(path)) => {
                    shot_debug!("download {} complete: {}", id, path.display());
                    Self::transition(&registry, id, DownloadState::Complete, None);
                }
                Ok(Err(err)) => {
                    shot_warn!("download {} interrupted: {}", id, err);
                    Self::transition(&registry, id, DownloadState::Interrupted, Some(err.to_string()));
                }
                Err(join_err) => {
                    Self::transition(
                        &registry,
                        id,
                        DownloadState::Interrupted,
                        Some(join_err.to_string()),
                    );
                }
            }
        });

        Ok(Some(id))
    }

    async fn watch(&self, id: DownloadId) -> DownloadWatch {
        let (tx, rx) = mpsc::unbounded_channel();
        let watch_id = {
            let mut guard = self.registry.lock().expect("download registry");
            guard.next_watch += 1;
            let watch_id = guard.next_watch;
            guard.watchers.entry(id).or_default().insert(watch_id, tx);
            watch_id
        };

        let registry = self.registry.clone();
        DownloadWatch::with_unregister(rx, move || {
            if let Ok(mut guard) = registry.lock() {
                if let Some(senders) = guard.watchers.get_mut(&id) {
                    senders.remove(&watch_id);
                }
            }
        })
    }

    async fn status(&self, id: DownloadId) -> Option<DownloadStatus> {
        self.registry
            .lock()
            .expect("download registry")
            .records
            .get(&id)
            .cloned()
    }
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>, String> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| "not a data URI".to_string())?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| "malformed data URI".to_string())?;
    if !meta.ends_with(";base64") {
        return Err("unsupported data URI encoding".to_string());
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| format!("invalid base64 payload: {e}"))
}
