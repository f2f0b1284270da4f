//! User-facing wording for failure states.

pub const TIMEOUT_MESSAGE: &str = "Request timed out - no response from extension";
pub const RELOAD_GUIDANCE: &str = "Extension was reloaded. Please refresh the page.";
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Rewrites known transport failures into actionable guidance; anything
/// else is shown verbatim.
pub fn rewrite_transport_error(raw: &str) -> String {
    if raw.contains("context invalidated") || raw.contains("message port closed") {
        RELOAD_GUIDANCE.to_string()
    } else {
        raw.to_string()
    }
}
