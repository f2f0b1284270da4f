/// Placeholder shown in the empty naming input.
pub const FILENAME_PLACEHOLDER: &str = "Enter filename (or leave empty for \"untitled\")";

pub(crate) const LABEL_IDLE: &str = "Tabshot";
pub(crate) const LABEL_PROCESSING: &str = "Tabshot";
pub(crate) const LABEL_SUCCESS: &str = "Tabshot saved";
pub(crate) const LABEL_FAIL: &str = "Tabshot failed";
pub(crate) const TOOLTIP_PROCESSING: &str = "Processing screenshot...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerStatus {
    #[default]
    Idle,
    Processing,
    Success,
    Fail,
}

/// Render description of the floating trigger control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerView {
    pub status: TriggerStatus,
    pub label: String,
    /// Hoverable detail; carries the error message in the fail state.
    pub tooltip: Option<String>,
    pub visible: bool,
}

/// Render description of the naming overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayView {
    pub visible: bool,
    pub input: String,
    pub placeholder: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerView {
    pub trigger: TriggerView,
    pub overlay: OverlayView,
}
