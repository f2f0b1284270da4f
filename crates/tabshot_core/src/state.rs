use crate::view_model::{
    ControllerView, OverlayView, TriggerStatus, TriggerView, FILENAME_PLACEHOLDER, LABEL_FAIL,
    LABEL_IDLE, LABEL_PROCESSING, LABEL_SUCCESS, TOOLTIP_PROCESSING,
};

/// Monotonic identifier stamped on each outgoing capture request so that
/// late or duplicate completions can be recognized and dropped.
pub type RequestSeq = u64;

/// Where the controller is in the trigger → overlay → request cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Naming overlay is open, trigger hidden.
    Naming,
    /// Exactly one request is in flight.
    Processing,
    /// Terminal badge from the last request.
    Done(Outcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Fail { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControllerState {
    phase: Phase,
    /// Remembered for the page session only; pre-fills the next overlay.
    last_filename: String,
    /// Current text of the naming input.
    draft: String,
    next_seq: RequestSeq,
    in_flight: Option<RequestSeq>,
    dirty: bool,
}

impl ControllerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> ControllerView {
        let (trigger, overlay_visible) = match &self.phase {
            Phase::Idle => (idle_trigger(), false),
            Phase::Naming => {
                let mut trigger = idle_trigger();
                trigger.visible = false;
                (trigger, true)
            }
            Phase::Processing => (
                TriggerView {
                    status: TriggerStatus::Processing,
                    label: LABEL_PROCESSING.to_string(),
                    tooltip: Some(TOOLTIP_PROCESSING.to_string()),
                    visible: true,
                },
                false,
            ),
            Phase::Done(Outcome::Success) => (
                TriggerView {
                    status: TriggerStatus::Success,
                    label: LABEL_SUCCESS.to_string(),
                    tooltip: None,
                    visible: true,
                },
                false,
            ),
            Phase::Done(Outcome::Fail { message }) => (
                TriggerView {
                    status: TriggerStatus::Fail,
                    label: LABEL_FAIL.to_string(),
                    tooltip: Some(message.clone()),
                    visible: true,
                },
                false,
            ),
        };

        ControllerView {
            trigger,
            overlay: OverlayView {
                visible: overlay_visible,
                input: self.draft.clone(),
                placeholder: FILENAME_PLACEHOLDER,
            },
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.phase, Phase::Processing)
    }

    pub fn last_filename(&self) -> &str {
        &self.last_filename
    }

    pub fn consume_dirty(&mut self) -> bool {
        let was_dirty = self.dirty;
        self.dirty = false;
        was_dirty
    }

    pub(crate) fn is_naming(&self) -> bool {
        matches!(self.phase, Phase::Naming)
    }

    pub(crate) fn draft(&self) -> &str {
        &self.draft
    }

    pub(crate) fn set_draft(&mut self, text: String) {
        self.draft = text;
        self.dirty = true;
    }

    /// Clears any previous badge and opens the overlay pre-filled with the
    /// last-used filename.
    pub(crate) fn begin_naming(&mut self) {
        self.phase = Phase::Naming;
        self.draft = self.last_filename.clone();
        self.dirty = true;
    }

    pub(crate) fn begin_request(&mut self, filename: String) -> RequestSeq {
        self.last_filename = filename;
        self.next_seq += 1;
        self.in_flight = Some(self.next_seq);
        self.phase = Phase::Processing;
        self.dirty = true;
        self.next_seq
    }

    pub(crate) fn in_flight_seq(&self) -> Option<RequestSeq> {
        self.in_flight
    }

    /// First settle wins: callers must have checked the seq before this.
    pub(crate) fn settle(&mut self, outcome: Outcome) {
        self.in_flight = None;
        self.phase = Phase::Done(outcome);
        self.dirty = true;
    }
}

fn idle_trigger() -> TriggerView {
    TriggerView {
        status: TriggerStatus::Idle,
        label: LABEL_IDLE.to_string(),
        tooltip: None,
        visible: true,
    }
}
