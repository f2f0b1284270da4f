use thiserror::Error;
use tokio::sync::mpsc;

use crate::{DownloadDelta, DownloadId, DownloadStatus, ImageFormat, ImageUri, TabId, WindowId};

/// Raw failure surfaced by a platform host. The coordinator turns these
/// into user-facing results; the message text is what gets pattern-matched
/// for permission guidance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HostError {
    pub message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Platform capture collaborator. Windows, not tabs, are the addressable
/// capture unit; the tab only serves to locate its window.
#[async_trait::async_trait]
pub trait CaptureHost: Send + Sync {
    async fn window_of_tab(&self, tab: TabId) -> Result<WindowId, HostError>;

    async fn capture_visible(
        &self,
        window: WindowId,
        format: ImageFormat,
    ) -> Result<ImageUri, HostError>;
}

/// One download to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSpec {
    pub uri: ImageUri,
    pub filename: String,
    /// When false the host must not raise a "save as" prompt.
    pub save_as: bool,
}

/// Platform download collaborator.
#[async_trait::async_trait]
pub trait DownloadHost: Send + Sync {
    /// Start a download. `Ok(None)` mirrors hosts that report neither an
    /// identifier nor an error.
    async fn begin(&self, spec: DownloadSpec) -> Result<Option<DownloadId>, HostError>;

    /// Subscribe to state changes for one download. Dropping the watch
    /// deregisters the listener.
    async fn watch(&self, id: DownloadId) -> DownloadWatch;

    /// Point-in-time status lookup by identifier.
    async fn status(&self, id: DownloadId) -> Option<DownloadStatus>;
}

/// Subscription to the state changes of a single download. Deregistration
/// happens exactly once, on drop, regardless of which path resolved the
/// request.
pub struct DownloadWatch {
    rx: mpsc::UnboundedReceiver<DownloadDelta>,
    unregister: Option<Box<dyn FnOnce() + Send>>,
}

impl DownloadWatch {
    pub fn new(rx: mpsc::UnboundedReceiver<DownloadDelta>) -> Self {
        Self {
            rx,
            unregister: None,
        }
    }

    pub fn with_unregister(
        rx: mpsc::UnboundedReceiver<DownloadDelta>,
        unregister: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            rx,
            unregister: Some(Box::new(unregister)),
        }
    }

    /// Next state change, or `None` when the host side is gone.
    pub async fn next(&mut self) -> Option<DownloadDelta> {
        self.rx.recv().await
    }
}

impl Drop for DownloadWatch {
    fn drop(&mut self) {
        if let Some(unregister) = self.unregister.take() {
            unregister();
        }
    }
}

/// Capture host that serves one fixed image for every window, for demos
/// and tests.
#[derive(Debug, Clone)]
pub struct FixedImageCapture {
    window: WindowId,
    image: ImageUri,
}

/// 1x1 transparent PNG.
const SAMPLE_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

impl FixedImageCapture {
    pub fn new(image: ImageUri) -> Self {
        Self { window: 1, image }
    }

    /// A host serving an embedded sample PNG.
    pub fn png_sample() -> Self {
        Self::new(ImageUri::new(format!(
            "data:image/png;base64,{SAMPLE_PNG_BASE64}"
        )))
    }
}

#[async_trait::async_trait]
impl CaptureHost for FixedImageCapture {
    async fn window_of_tab(&self, _tab: TabId) -> Result<WindowId, HostError> {
        Ok(self.window)
    }

    async fn capture_visible(
        &self,
        _window: WindowId,
        format: ImageFormat,
    ) -> Result<ImageUri, HostError> {
        match format {
            ImageFormat::Png => Ok(self.image.clone()),
        }
    }
}
