use std::time::Duration;

use std::sync::Arc;

use tabshot_app::runtime::{ControllerRuntime, PageChannel, RuntimeSettings};
use tabshot_core::{Msg, TriggerStatus};
use tabshot_engine::{
    Coordinator, CoordinatorHandle, CoordinatorSettings, FixedImageCapture, LocalDownloadHost,
};
use tabshot_logging::LogDestination;

/// Drives one scripted capture end to end against a stub capture host,
/// saving the result under ./screenshots.
fn main() {
    tabshot_logging::initialize(LogDestination::Terminal);

    let save_dir = std::env::current_dir()
        .unwrap_or_else(|_| std::path::PathBuf::from("."))
        .join("screenshots");

    let coordinator = Coordinator::new(
        Arc::new(FixedImageCapture::png_sample()),
        Arc::new(LocalDownloadHost::new(save_dir.clone())),
        CoordinatorSettings::default(),
    );
    let handle = CoordinatorHandle::new(coordinator);
    let transport = PageChannel::new(handle, 1);
    let mut runtime = ControllerRuntime::new(transport, RuntimeSettings::default());

    let filename = std::env::args().nth(1).unwrap_or_default();
    runtime.dispatch(Msg::TriggerClicked);
    runtime.dispatch(Msg::FilenameEdited(filename));
    runtime.dispatch(Msg::ConfirmClicked);
    runtime.wait_for_settle(Duration::from_secs(35));

    let view = runtime.view();
    match view.trigger.status {
        TriggerStatus::Success => {
            println!("saved under {}", save_dir.display());
        }
        _ => {
            eprintln!(
                "capture failed: {}",
                view.trigger.tooltip.unwrap_or_default()
            );
            std::process::exit(1);
        }
    }
}
