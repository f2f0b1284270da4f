use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tabshot_engine::{
    ensure_save_dir, AtomicImageWriter, DownloadHost, DownloadId, DownloadSpec, DownloadState,
    DownloadWatch, ImageUri, LocalDownloadHost,
};
use tempfile::TempDir;

fn spec(uri: &str, filename: &str) -> DownloadSpec {
    DownloadSpec {
        uri: ImageUri::new(uri),
        filename: filename.to_string(),
        save_as: false,
    }
}

async fn wait_for_state(
    host: &LocalDownloadHost,
    id: DownloadId,
    state: DownloadState,
) -> Option<String> {
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(status) = host.status(id).await {
            if status.state == state {
                return status.error;
            }
        }
        assert!(
            std::time::Instant::now() < deadline,
            "download {id} never reached {state:?}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn stores_decoded_payload_under_requested_name() {
    let temp = TempDir::new().unwrap();
    let host = LocalDownloadHost::new(temp.path().to_path_buf());

    // base64 of b"tabshot"
    let id = host
        .begin(spec("data:image/png;base64,dGFic2hvdA==", "shot.png"))
        .await
        .unwrap()
        .unwrap();

    wait_for_state(&host, id, DownloadState::Complete).await;
    assert_eq!(fs::read(temp.path().join("shot.png")).unwrap(), b"tabshot");
}

#[tokio::test]
async fn rejects_non_data_uri_at_initiation() {
    let temp = TempDir::new().unwrap();
    let host = LocalDownloadHost::new(temp.path().to_path_buf());

    let err = host
        .begin(spec("https://example.com/shot.png", "shot.png"))
        .await
        .unwrap_err();
    assert_eq!(err.message, "not a data URI");
}

#[tokio::test]
async fn rejects_invalid_base64_payload() {
    let temp = TempDir::new().unwrap();
    let host = LocalDownloadHost::new(temp.path().to_path_buf());

    let err = host
        .begin(spec("data:image/png;base64,!!!", "shot.png"))
        .await
        .unwrap_err();
    assert!(err.message.contains("invalid base64"));
}

#[tokio::test]
async fn write_failure_surfaces_as_interruption() {
    let temp = TempDir::new().unwrap();
    // Point the host at a path occupied by a plain file.
    let blocked = temp.path().join("not_a_dir");
    fs::write(&blocked, "x").unwrap();
    let host = LocalDownloadHost::new(blocked);

    let id = host
        .begin(spec("data:image/png;base64,dGFic2hvdA==", "shot.png"))
        .await
        .unwrap()
        .unwrap();

    let error = wait_for_state(&host, id, DownloadState::Interrupted).await;
    assert!(error.is_some());
}

#[test]
fn watch_unregisters_exactly_once_on_drop() {
    let unregistered = Arc::new(AtomicUsize::new(0));
    let counter = unregistered.clone();
    let (_tx, rx) = tokio::sync::mpsc::unbounded_channel();

    let watch = DownloadWatch::with_unregister(rx, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    drop(watch);

    assert_eq!(unregistered.load(Ordering::SeqCst), 1);
}

#[test]
fn creates_missing_save_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_save_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicImageWriter::new(temp.path().to_path_buf());

    let first = writer.write("shot.png", b"hello").unwrap();
    assert_eq!(fs::read(&first).unwrap(), b"hello");

    let second = writer.write("shot.png", b"world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"world");
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicImageWriter::new(file_path.clone());
    assert!(writer.write("shot.png", b"data").is_err());
    assert!(!file_path.with_file_name("shot.png").exists());
}
