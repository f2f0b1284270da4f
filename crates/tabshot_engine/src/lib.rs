//! Tabshot engine: screenshot capture coordination and download effects.
mod coordinator;
mod filename;
mod hosts;
mod local_download;
mod menu;
mod service;
mod types;
mod wire;

pub use coordinator::{Coordinator, CoordinatorSettings};
pub use filename::normalize_filename;
pub use hosts::{
    CaptureHost, DownloadHost, DownloadSpec, DownloadWatch, FixedImageCapture, HostError,
};
pub use local_download::{ensure_save_dir, AtomicImageWriter, LocalDownloadHost, StoreError};
pub use menu::{MenuItem, DISCUSSIONS_URL, PROJECT_HOME_URL};
pub use service::{CoordinatorHandle, TransportError, CAPTURE_TIMEOUT_MESSAGE};
pub use types::{
    CaptureResult, DownloadDelta, DownloadId, DownloadState, DownloadStatus, ImageFormat,
    ImageUri, TabId, WindowId, ERROR_DETAIL_LIMIT,
};
pub use wire::WireRequest;
