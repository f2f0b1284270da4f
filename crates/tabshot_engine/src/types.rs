use serde::{Deserialize, Serialize};

pub type TabId = u64;
pub type WindowId = u64;
pub type DownloadId = u64;

/// Longest diagnostic detail carried in a response.
pub const ERROR_DETAIL_LIMIT: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    /// Lossless; the only format the capture path requests.
    #[default]
    Png,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => ".png",
        }
    }
}

/// Captured image addressable as a URI (typically a `data:` URI).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUri(String);

impl ImageUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The uniform terminal outcome of one capture request. Serializes to the
/// message-channel response shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl CaptureResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            error_details: None,
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            error_details: None,
        }
    }

    pub fn fail_with_details(error: impl Into<String>, details: &str) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            error_details: Some(truncate_details(details)),
        }
    }
}

fn truncate_details(details: &str) -> String {
    details.chars().take(ERROR_DETAIL_LIMIT).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadState {
    InProgress,
    Complete,
    Interrupted,
}

/// One state-change notification for a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadDelta {
    pub id: DownloadId,
    pub state: DownloadState,
    /// Interruption reason, when the host reports one.
    pub error: Option<String>,
}

/// Point-in-time status of a download, from a lookup by identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadStatus {
    pub state: DownloadState,
    pub error: Option<String>,
}
