//! Tabshot core: pure controller state machine and view-model helpers.
mod effect;
mod feedback;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use feedback::{rewrite_transport_error, RELOAD_GUIDANCE, TIMEOUT_MESSAGE, UNKNOWN_ERROR};
pub use msg::{CaptureResponse, Msg};
pub use state::{ControllerState, Outcome, Phase, RequestSeq};
pub use update::{update, DEFAULT_FILENAME};
pub use view_model::{
    ControllerView, OverlayView, TriggerStatus, TriggerView, FILENAME_PLACEHOLDER,
};
