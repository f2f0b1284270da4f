use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use tabshot_logging::{shot_error, shot_info};
use thiserror::Error;

use crate::{CaptureResult, Coordinator, TabId, WireRequest};

pub const CAPTURE_TIMEOUT_MESSAGE: &str = "Screenshot capture timed out";

/// Failure of the message channel itself, before any result was produced.
/// The display strings are what the controller's rewrite policy matches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Extension context invalidated")]
    ContextInvalidated,
    #[error("The message port closed before a response was received")]
    PortClosed,
}

enum ServiceCommand {
    Capture {
        filename: String,
        tab: TabId,
        reply: mpsc::Sender<CaptureResult>,
    },
}

/// Handle to the coordinator's service loop. The loop runs on its own
/// thread with its own runtime; requests from different tabs interleave
/// freely, ordering per tab is the caller's concern.
#[derive(Clone)]
pub struct CoordinatorHandle {
    cmd_tx: mpsc::Sender<ServiceCommand>,
    alive: Arc<AtomicBool>,
}

impl CoordinatorHandle {
    pub fn new(coordinator: Coordinator) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<ServiceCommand>();
        let alive = Arc::new(AtomicBool::new(true));
        let thread_alive = alive.clone();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let coordinator = Arc::new(coordinator);
            while let Ok(command) = cmd_rx.recv() {
                let coordinator = coordinator.clone();
                runtime.spawn(async move {
                    serve(coordinator, command).await;
                });
            }
            thread_alive.store(false, Ordering::Release);
        });

        Self { cmd_tx, alive }
    }

    /// Whether the service loop can still be reached.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Submits one capture request on behalf of `tab` (taken from the
    /// transport context, not the request body). The returned receiver
    /// yields exactly one result.
    pub fn submit(
        &self,
        request: WireRequest,
        tab: TabId,
    ) -> Result<mpsc::Receiver<CaptureResult>, TransportError> {
        let WireRequest::CaptureScreenshot { filename } = request;
        let (reply_tx, reply_rx) = mpsc::channel();
        self.cmd_tx
            .send(ServiceCommand::Capture {
                filename,
                tab,
                reply: reply_tx,
            })
            .map_err(|_| TransportError::ContextInvalidated)?;
        Ok(reply_rx)
    }
}

async fn serve(coordinator: Arc<Coordinator>, command: ServiceCommand) {
    let ServiceCommand::Capture {
        filename,
        tab,
        reply,
    } = command;
    shot_info!("capture request: filename={filename:?} tab={tab}");

    // Single settle: the timeout and the pipeline race, exactly one arm
    // produces the result, and the reply sender is used once.
    let timeout = coordinator.settings().reply_timeout;
    let result = match tokio::time::timeout(timeout, coordinator.capture_to_file(&filename, tab))
        .await
    {
        Ok(result) => result,
        Err(_) => {
            shot_error!("capture for tab {tab} hit the {timeout:?} safety timeout");
            CaptureResult::fail(CAPTURE_TIMEOUT_MESSAGE)
        }
    };

    if let Some(error) = &result.error {
        shot_info!("capture request settled: tab={tab} error={error}");
    } else {
        shot_info!("capture request settled: tab={tab} success");
    }
    let _ = reply.send(result);
}
