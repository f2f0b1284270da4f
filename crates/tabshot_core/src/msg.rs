/// Coordinator reply as seen by the controller. The runtime maps the
/// engine's wire response into this shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureResponse {
    pub success: bool,
    pub error: Option<String>,
    pub error_details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User clicked the floating trigger.
    TriggerClicked,
    /// User edited the overlay filename input.
    FilenameEdited(String),
    /// User confirmed the overlay (button or Enter).
    ConfirmClicked,
    /// Coordinator replied for the given request.
    ResponseArrived {
        seq: crate::RequestSeq,
        response: CaptureResponse,
    },
    /// Client-side response timeout fired for the given request.
    ResponseTimedOut { seq: crate::RequestSeq },
    /// The message channel failed before or during send.
    SendFailed {
        seq: crate::RequestSeq,
        error: String,
    },
    /// Fallback for placeholder wiring.
    NoOp,
}
