use crate::feedback::{rewrite_transport_error, TIMEOUT_MESSAGE, UNKNOWN_ERROR};
use crate::{CaptureResponse, ControllerState, Effect, Msg, Outcome};

/// Substituted when the naming input is left empty.
pub const DEFAULT_FILENAME: &str = "untitled";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ControllerState, msg: Msg) -> (ControllerState, Vec<Effect>) {
    let effects = match msg {
        Msg::TriggerClicked => {
            // Debounce: a request is in flight, ignore the activation.
            if state.is_processing() {
                return (state, Vec::new());
            }
            state.begin_naming();
            vec![Effect::ShowOverlay {
                prefill: state.last_filename().to_string(),
            }]
        }
        Msg::FilenameEdited(text) => {
            if state.is_naming() {
                state.set_draft(text);
            }
            Vec::new()
        }
        Msg::ConfirmClicked => {
            // Only reachable while the overlay is open; a confirm while
            // processing is a no-op.
            if !state.is_naming() {
                return (state, Vec::new());
            }
            let filename = resolved_filename(state.draft());
            let seq = state.begin_request(filename.clone());
            vec![Effect::HideOverlay, Effect::SendRequest { seq, filename }]
        }
        Msg::ResponseArrived { seq, response } => {
            if state.in_flight_seq() != Some(seq) {
                // Late or duplicate resolution after the first settle.
                return (state, Vec::new());
            }
            state.settle(outcome_of(response));
            Vec::new()
        }
        Msg::ResponseTimedOut { seq } => {
            if state.in_flight_seq() != Some(seq) {
                return (state, Vec::new());
            }
            state.settle(Outcome::Fail {
                message: TIMEOUT_MESSAGE.to_string(),
            });
            Vec::new()
        }
        Msg::SendFailed { seq, error } => {
            if state.in_flight_seq() != Some(seq) {
                return (state, Vec::new());
            }
            state.settle(Outcome::Fail {
                message: rewrite_transport_error(&error),
            });
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn outcome_of(response: CaptureResponse) -> Outcome {
    if response.success {
        Outcome::Success
    } else {
        Outcome::Fail {
            message: response
                .error
                .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
        }
    }
}

fn resolved_filename(draft: &str) -> String {
    let trimmed = draft.trim();
    if trimmed.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}
