use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tabshot_core::{
    update, CaptureResponse, ControllerState, ControllerView, Effect, Msg, RequestSeq,
};
use tabshot_engine::{CaptureResult, CoordinatorHandle, TabId, TransportError, WireRequest};
use tabshot_logging::{shot_debug, shot_info};

#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    /// Client-side bound on the request/response round trip.
    pub response_timeout: Duration,
    /// Single settle delay standing in for the host's cascaded render
    /// waits around overlay and trigger updates.
    pub settle_delay: Duration,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            response_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_millis(100),
        }
    }
}

/// Lets the page surfaces calm down before the next visual change.
pub fn settle(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}

/// The page-scoped message channel to the privileged side.
pub trait Transport: Send {
    /// Whether the channel is still usable (the hosting extension's
    /// runtime identity is still valid).
    fn is_alive(&self) -> bool;

    /// Sends one capture request; the receiver yields at most one result.
    fn send(&self, filename: &str) -> Result<mpsc::Receiver<CaptureResult>, TransportError>;
}

/// Transport bound to one tab's coordinator handle.
pub struct PageChannel {
    handle: CoordinatorHandle,
    tab: TabId,
}

impl PageChannel {
    pub fn new(handle: CoordinatorHandle, tab: TabId) -> Self {
        Self { handle, tab }
    }
}

impl Transport for PageChannel {
    fn is_alive(&self) -> bool {
        self.handle.is_alive()
    }

    fn send(&self, filename: &str) -> Result<mpsc::Receiver<CaptureResult>, TransportError> {
        let request = WireRequest::CaptureScreenshot {
            filename: filename.to_string(),
        };
        self.handle.submit(request, self.tab)
    }
}

/// Owns the controller state for one page and executes its effects:
/// sending requests, arming the response timeout, and pacing UI changes.
pub struct ControllerRuntime<T: Transport> {
    state: ControllerState,
    transport: T,
    settings: RuntimeSettings,
    msg_tx: mpsc::Sender<Msg>,
    msg_rx: mpsc::Receiver<Msg>,
}

impl<T: Transport> ControllerRuntime<T> {
    pub fn new(transport: T, settings: RuntimeSettings) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel();
        Self {
            state: ControllerState::new(),
            transport,
            settings,
            msg_tx,
            msg_rx,
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn view(&self) -> ControllerView {
        self.state.view()
    }

    /// Feed one message through the state machine and run its effects.
    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.run_effects(effects);
    }

    /// Drain any queued coordinator replies into the state machine.
    pub fn pump(&mut self) {
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.dispatch(msg);
        }
    }

    /// Block until the in-flight request settles or `limit` elapses.
    pub fn wait_for_settle(&mut self, limit: Duration) -> bool {
        let deadline = Instant::now() + limit;
        loop {
            if !self.state.is_processing() {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match self.msg_rx.recv_timeout(remaining) {
                Ok(msg) => self.dispatch(msg),
                Err(_) => return false,
            }
        }
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ShowOverlay { prefill } => {
                    shot_debug!("overlay shown, prefill={prefill:?}");
                    settle(self.settings.settle_delay);
                }
                Effect::HideOverlay => {
                    settle(self.settings.settle_delay);
                }
                Effect::SendRequest { seq, filename } => {
                    self.send_request(seq, filename);
                }
            }
        }
    }

    fn send_request(&mut self, seq: RequestSeq, filename: String) {
        // Guard first: a reloaded extension means the channel is gone, and
        // the coordinator must not be contacted.
        if !self.transport.is_alive() {
            self.dispatch(Msg::SendFailed {
                seq,
                error: TransportError::ContextInvalidated.to_string(),
            });
            return;
        }

        // Let the trigger repaint as "processing" before the round trip.
        settle(self.settings.settle_delay);
        shot_info!("sending capture request seq={seq} filename={filename:?}");

        let reply = match self.transport.send(&filename) {
            Ok(reply) => reply,
            Err(err) => {
                self.dispatch(Msg::SendFailed {
                    seq,
                    error: err.to_string(),
                });
                return;
            }
        };

        // One waiter per request; whichever of reply and timeout comes
        // first produces the single terminal message for this seq.
        let msg_tx = self.msg_tx.clone();
        let timeout = self.settings.response_timeout;
        thread::spawn(move || {
            let msg = match reply.recv_timeout(timeout) {
                Ok(result) => Msg::ResponseArrived {
                    seq,
                    response: map_result(result),
                },
                Err(RecvTimeoutError::Timeout) => Msg::ResponseTimedOut { seq },
                Err(RecvTimeoutError::Disconnected) => Msg::SendFailed {
                    seq,
                    error: TransportError::PortClosed.to_string(),
                },
            };
            let _ = msg_tx.send(msg);
        });
    }
}

fn map_result(result: CaptureResult) -> CaptureResponse {
    CaptureResponse {
        success: result.success,
        error: result.error,
        error_details: result.error_details,
    }
}
