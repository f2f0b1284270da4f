use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tabshot_engine::{
    CaptureHost, CaptureResult, Coordinator, CoordinatorSettings, DownloadDelta, DownloadHost,
    DownloadId, DownloadSpec, DownloadState, DownloadStatus, DownloadWatch, HostError,
    ImageFormat, ImageUri, TabId, WindowId,
};
use tokio::sync::mpsc::UnboundedSender;

struct FakeCapture {
    window: Result<WindowId, HostError>,
    image: Result<ImageUri, HostError>,
}

impl FakeCapture {
    fn ok() -> Self {
        Self {
            window: Ok(7),
            image: Ok(ImageUri::new("data:image/png;base64,AAAA")),
        }
    }
}

#[async_trait::async_trait]
impl CaptureHost for FakeCapture {
    async fn window_of_tab(&self, _tab: TabId) -> Result<WindowId, HostError> {
        self.window.clone()
    }

    async fn capture_visible(
        &self,
        _window: WindowId,
        _format: ImageFormat,
    ) -> Result<ImageUri, HostError> {
        self.image.clone()
    }
}

struct FakeDownloads {
    begin_response: Result<Option<DownloadId>, HostError>,
    /// Buffered into every watch on subscription.
    deltas: Vec<DownloadDelta>,
    /// Keep the delta channel open so the coordinator must wait for the
    /// fallback timer instead of seeing it close.
    hold_open: bool,
    open_senders: Mutex<Vec<UnboundedSender<DownloadDelta>>>,
    status_response: Option<DownloadStatus>,
    begun: Mutex<Vec<DownloadSpec>>,
}

impl FakeDownloads {
    fn completing() -> Self {
        Self::with_deltas(vec![DownloadDelta {
            id: 1,
            state: DownloadState::Complete,
            error: None,
        }])
    }

    fn with_deltas(deltas: Vec<DownloadDelta>) -> Self {
        Self {
            begin_response: Ok(Some(1)),
            deltas,
            hold_open: false,
            open_senders: Mutex::new(Vec::new()),
            status_response: None,
            begun: Mutex::new(Vec::new()),
        }
    }

    fn begun(&self) -> Vec<DownloadSpec> {
        self.begun.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DownloadHost for FakeDownloads {
    async fn begin(&self, spec: DownloadSpec) -> Result<Option<DownloadId>, HostError> {
        self.begun.lock().unwrap().push(spec);
        self.begin_response.clone()
    }

    async fn watch(&self, _id: DownloadId) -> DownloadWatch {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        for delta in &self.deltas {
            let _ = tx.send(delta.clone());
        }
        if self.hold_open {
            self.open_senders.lock().unwrap().push(tx);
        }
        DownloadWatch::new(rx)
    }

    async fn status(&self, _id: DownloadId) -> Option<DownloadStatus> {
        self.status_response.clone()
    }
}

fn coordinator(capture: FakeCapture, downloads: Arc<FakeDownloads>) -> Coordinator {
    let settings = CoordinatorSettings {
        download_fallback: Duration::from_millis(25),
        ..CoordinatorSettings::default()
    };
    Coordinator::new(Arc::new(capture), downloads, settings)
}

#[tokio::test]
async fn tab_lookup_failure_skips_capture_and_download() {
    let capture = FakeCapture {
        window: Err(HostError::new("No tab with id: 42.")),
        ..FakeCapture::ok()
    };
    let downloads = Arc::new(FakeDownloads::completing());

    let result = coordinator(capture, downloads.clone())
        .capture_to_file("shot", 42)
        .await;

    assert_eq!(
        result,
        CaptureResult::fail("Cannot access tab: No tab with id: 42.")
    );
    assert!(downloads.begun().is_empty());
}

#[tokio::test]
async fn empty_capture_data_fails_without_download() {
    let capture = FakeCapture {
        image: Ok(ImageUri::new("")),
        ..FakeCapture::ok()
    };
    let downloads = Arc::new(FakeDownloads::completing());

    let result = coordinator(capture, downloads.clone())
        .capture_to_file("shot", 1)
        .await;

    assert_eq!(
        result,
        CaptureResult::fail("Failed to capture screenshot - no data returned")
    );
    assert!(downloads.begun().is_empty());
}

#[tokio::test]
async fn capture_permission_error_is_rewritten_with_details() {
    let capture = FakeCapture {
        image: Err(HostError::new("The 'activeTab' permission is not in effect")),
        ..FakeCapture::ok()
    };
    let downloads = Arc::new(FakeDownloads::completing());

    let result = coordinator(capture, downloads)
        .capture_to_file("shot", 1)
        .await;

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("Permission denied. Please ensure the extension has activeTab permission and reload the page.")
    );
    assert!(result.error_details.unwrap().contains("activeTab"));
}

#[tokio::test]
async fn filename_gets_png_extension_appended_once() {
    let downloads = Arc::new(FakeDownloads::completing());
    let result = coordinator(FakeCapture::ok(), downloads.clone())
        .capture_to_file("login-page", 1)
        .await;
    assert!(result.success);

    let result = coordinator(FakeCapture::ok(), downloads.clone())
        .capture_to_file("report.png", 1)
        .await;
    assert!(result.success);

    let begun = downloads.begun();
    assert_eq!(begun[0].filename, "login-page.png");
    assert_eq!(begun[1].filename, "report.png");
    assert!(begun.iter().all(|spec| !spec.save_as));
}

#[tokio::test]
async fn download_initiation_permission_error_is_rewritten() {
    let downloads = Arc::new(FakeDownloads {
        begin_response: Err(HostError::new("download permission missing")),
        ..FakeDownloads::completing()
    });

    let result = coordinator(FakeCapture::ok(), downloads)
        .capture_to_file("shot", 1)
        .await;

    assert_eq!(
        result,
        CaptureResult::fail("Download permission denied. Please check extension permissions.")
    );
}

#[tokio::test]
async fn download_initiation_other_errors_kept_verbatim() {
    let downloads = Arc::new(FakeDownloads {
        begin_response: Err(HostError::new("disk full")),
        ..FakeDownloads::completing()
    });

    let result = coordinator(FakeCapture::ok(), downloads)
        .capture_to_file("shot", 1)
        .await;

    assert_eq!(result, CaptureResult::fail("Download failed: disk full"));
}

#[tokio::test]
async fn missing_download_id_is_an_explicit_failure() {
    let downloads = Arc::new(FakeDownloads {
        begin_response: Ok(None),
        ..FakeDownloads::completing()
    });

    let result = coordinator(FakeCapture::ok(), downloads)
        .capture_to_file("shot", 1)
        .await;

    assert_eq!(
        result,
        CaptureResult::fail("Download failed - no download ID returned")
    );
}

#[tokio::test]
async fn complete_notification_resolves_success() {
    let downloads = Arc::new(FakeDownloads::completing());

    let result = coordinator(FakeCapture::ok(), downloads)
        .capture_to_file("shot", 1)
        .await;

    assert_eq!(result, CaptureResult::ok());
}

#[tokio::test]
async fn interruption_reason_is_surfaced() {
    let downloads = Arc::new(FakeDownloads::with_deltas(vec![
        DownloadDelta {
            id: 1,
            state: DownloadState::InProgress,
            error: None,
        },
        DownloadDelta {
            id: 1,
            state: DownloadState::Interrupted,
            error: Some("NETWORK_FAILED".to_string()),
        },
    ]));

    let result = coordinator(FakeCapture::ok(), downloads)
        .capture_to_file("shot", 1)
        .await;

    assert_eq!(
        result,
        CaptureResult::fail("Download interrupted: NETWORK_FAILED")
    );
}

#[tokio::test]
async fn fallback_query_resolves_fast_download() {
    // No notification ever arrives; the status lookup decides.
    let downloads = Arc::new(FakeDownloads {
        hold_open: true,
        status_response: Some(DownloadStatus {
            state: DownloadState::Complete,
            error: None,
        }),
        ..FakeDownloads::with_deltas(Vec::new())
    });

    let result = coordinator(FakeCapture::ok(), downloads)
        .capture_to_file("shot", 1)
        .await;

    assert_eq!(result, CaptureResult::ok());
}

#[tokio::test]
async fn fallback_query_surfaces_interruption() {
    let downloads = Arc::new(FakeDownloads {
        hold_open: true,
        status_response: Some(DownloadStatus {
            state: DownloadState::Interrupted,
            error: Some("FILE_FAILED".to_string()),
        }),
        ..FakeDownloads::with_deltas(Vec::new())
    });

    let result = coordinator(FakeCapture::ok(), downloads)
        .capture_to_file("shot", 1)
        .await;

    assert_eq!(result, CaptureResult::fail("FILE_FAILED"));
}

#[tokio::test]
async fn indeterminate_fallback_status_defaults_to_success() {
    let downloads = Arc::new(FakeDownloads {
        hold_open: true,
        status_response: None,
        ..FakeDownloads::with_deltas(Vec::new())
    });

    let result = coordinator(FakeCapture::ok(), downloads)
        .capture_to_file("shot", 1)
        .await;

    assert_eq!(result, CaptureResult::ok());
}
