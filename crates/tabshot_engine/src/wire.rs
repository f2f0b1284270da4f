use serde::{Deserialize, Serialize};

/// Message-channel request. Tagged by `action`; anything other than a
/// capture request fails to deserialize and is never dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum WireRequest {
    #[serde(rename = "captureScreenshot")]
    CaptureScreenshot { filename: String },
}
