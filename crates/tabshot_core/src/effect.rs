#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Reveal the naming overlay, pre-filled, and focus its input.
    ShowOverlay { prefill: String },
    HideOverlay,
    /// Send exactly one capture request. The runtime arms the response
    /// timeout when it executes this effect.
    SendRequest {
        seq: crate::RequestSeq,
        filename: String,
    },
}
