use std::sync::Arc;
use std::time::Duration;

use tabshot_logging::{shot_debug, shot_warn};

use crate::filename::normalize_filename;
use crate::hosts::{CaptureHost, DownloadHost, DownloadSpec};
use crate::{CaptureResult, DownloadId, DownloadState, ImageFormat, ImageUri, TabId};

pub(crate) const NO_DATA_MESSAGE: &str = "Failed to capture screenshot - no data returned";
pub(crate) const NO_DOWNLOAD_ID_MESSAGE: &str = "Download failed - no download ID returned";
pub(crate) const INTERRUPTED_MESSAGE: &str = "Download was interrupted";
const CAPTURE_PERMISSION_GUIDANCE: &str =
    "Permission denied. Please ensure the extension has activeTab permission and reload the page.";
const DOWNLOAD_PERMISSION_GUIDANCE: &str =
    "Download permission denied. Please check extension permissions.";

#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    /// Safety net: a response is produced within this bound even if a
    /// platform call never returns.
    pub reply_timeout: Duration,
    /// How long to wait for a state-change notification before actively
    /// querying the download's status.
    pub download_fallback: Duration,
    pub format: ImageFormat,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            reply_timeout: Duration::from_secs(30),
            download_fallback: Duration::from_millis(500),
            format: ImageFormat::Png,
        }
    }
}

/// Converts one capture request into exactly one result, hiding platform
/// capture/download quirks. Stateless across requests.
pub struct Coordinator {
    capture: Arc<dyn CaptureHost>,
    downloads: Arc<dyn DownloadHost>,
    settings: CoordinatorSettings,
}

impl Coordinator {
    pub fn new(
        capture: Arc<dyn CaptureHost>,
        downloads: Arc<dyn DownloadHost>,
        settings: CoordinatorSettings,
    ) -> Self {
        Self {
            capture,
            downloads,
            settings,
        }
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    /// Runs the full capture-then-download pipeline for `tab`. Every
    /// failure mode comes back as a `CaptureResult`; nothing is thrown
    /// past this boundary.
    pub async fn capture_to_file(&self, filename: &str, tab: TabId) -> CaptureResult {
        // The tab id comes from the transport envelope, never from the
        // request body.
        let window = match self.capture.window_of_tab(tab).await {
            Ok(window) => window,
            Err(err) => {
                return CaptureResult::fail(format!("Cannot access tab: {err}"));
            }
        };

        let image = match self.capture.capture_visible(window, self.settings.format).await {
            Ok(image) => image,
            Err(err) => {
                return CaptureResult::fail_with_details(
                    capture_guidance(&err.message),
                    &err.message,
                );
            }
        };
        if image.is_empty() {
            return CaptureResult::fail(NO_DATA_MESSAGE);
        }
        shot_debug!(
            "captured window {} for tab {}, data length {}",
            window,
            tab,
            image.as_str().len()
        );

        let target = normalize_filename(filename, self.settings.format);
        self.download(image, target).await
    }

    async fn download(&self, uri: ImageUri, filename: String) -> CaptureResult {
        let spec = DownloadSpec {
            uri,
            filename,
            save_as: false,
        };
        let id = match self.downloads.begin(spec).await {
            Ok(Some(id)) => id,
            Ok(None) => return CaptureResult::fail(NO_DOWNLOAD_ID_MESSAGE),
            Err(err) => return CaptureResult::fail(download_guidance(&err.message)),
        };

        let mut watch = self.downloads.watch(id).await;
        let fallback = tokio::time::sleep(self.settings.download_fallback);
        tokio::pin!(fallback);

        // Notifications can race a very fast download: if none resolves the
        // request before the fallback fires, query the last known status.
        loop {
            tokio::select! {
                delta = watch.next() => match delta {
                    Some(delta) if delta.state == DownloadState::Complete => {
                        return CaptureResult::ok();
                    }
                    Some(delta) if delta.state == DownloadState::Interrupted => {
                        return CaptureResult::fail(interruption_message(delta.error));
                    }
                    Some(_) => continue,
                    None => break,
                },
                _ = &mut fallback => break,
            }
        }
        drop(watch);

        self.query_download(id).await
    }

    async fn query_download(&self, id: DownloadId) -> CaptureResult {
        match self.downloads.status(id).await {
            Some(status) if status.state == DownloadState::Complete => CaptureResult::ok(),
            Some(status) if status.state == DownloadState::Interrupted => CaptureResult::fail(
                status
                    .error
                    .unwrap_or_else(|| INTERRUPTED_MESSAGE.to_string()),
            ),
            // Best-effort: an indeterminate status counts as success. Known
            // risk, see DESIGN.md.
            _ => {
                shot_warn!("download {} status indeterminate, assuming success", id);
                CaptureResult::ok()
            }
        }
    }
}

fn interruption_message(reason: Option<String>) -> String {
    match reason {
        Some(reason) => format!("Download interrupted: {reason}"),
        None => INTERRUPTED_MESSAGE.to_string(),
    }
}

fn capture_guidance(raw: &str) -> String {
    if raw.contains("permission") || raw.contains("activeTab") || raw.contains("Cannot access") {
        CAPTURE_PERMISSION_GUIDANCE.to_string()
    } else {
        raw.to_string()
    }
}

fn download_guidance(raw: &str) -> String {
    if raw.contains("permission") || raw.contains("Cannot access") {
        DOWNLOAD_PERMISSION_GUIDANCE.to_string()
    } else {
        format!("Download failed: {raw}")
    }
}
