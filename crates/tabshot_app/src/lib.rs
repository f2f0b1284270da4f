//! Headless runtime bridging the controller core to the capture engine.
pub mod runtime;

pub use runtime::{settle, ControllerRuntime, PageChannel, RuntimeSettings, Transport};
