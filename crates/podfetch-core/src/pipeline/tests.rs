use super::*;
use crate::item::DownloadOutcome;
use crate::transport::FetchError;
use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Serves canned bodies per URL; unknown URLs get 404. Tracks calls and
/// the highest number of concurrent `fetch` calls.
#[derive(Default)]
struct FakeTransport {
    bodies: HashMap<String, Vec<u8>>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeTransport {
    fn serving(urls: &[&str]) -> Self {
        Self {
            bodies: urls
                .iter()
                .map(|u| (u.to_string(), format!("audio:{u}").into_bytes()))
                .collect(),
            ..Self::default()
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for FakeTransport {
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> Result<u64, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let res = match self.bodies.get(url) {
            Some(body) => sink
                .write_all(body)
                .map(|()| body.len() as u64)
                .map_err(FetchError::Write),
            None => Err(FetchError::Http(404)),
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        res
    }
}

struct PanickingTransport;

impl Transport for PanickingTransport {
    fn fetch(&self, _url: &str, _sink: &mut dyn Write) -> Result<u64, FetchError> {
        panic!("transport exploded");
    }
}

fn pipeline_with(dir: &Path, transport: Arc<dyn Transport>) -> FetchPipeline {
    let store = Arc::new(StatusStore::open_in(dir));
    FetchPipeline::new(store, transport, dir)
}

fn audio_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".mp3"))
        .collect();
    names.sort();
    names
}

fn has_temp_files(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .unwrap()
        .any(|e| e.unwrap().file_name().to_string_lossy().ends_with(".part"))
}

#[test]
fn two_items_both_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(FakeTransport::serving(&["http://x/a.mp3", "http://x/b.mp3"]));
    let pipeline = pipeline_with(dir.path(), transport.clone());

    let results = pipeline.download_batch(
        vec![
            DownloadItem::new("Ep1", "http://x/a.mp3"),
            DownloadItem::new("Ep2", "http://x/b.mp3"),
        ],
        2,
        false,
    );

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(DownloadResult::is_success));
    assert_eq!(audio_files(dir.path()), vec!["Ep1.mp3", "Ep2.mp3"]);
    assert_eq!(
        std::fs::read(dir.path().join("Ep1.mp3")).unwrap(),
        b"audio:http://x/a.mp3"
    );

    let ledger = pipeline.store().snapshot();
    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger.get("http://x/a.mp3"), Some(&true));
    assert_eq!(ledger.get("http://x/b.mp3"), Some(&true));
}

#[test]
fn http_404_fails_only_that_item() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(FakeTransport::serving(&["http://x/a.mp3"]));
    let pipeline = pipeline_with(dir.path(), transport);

    let results = pipeline.download_batch(
        vec![
            DownloadItem::new("Ep1", "http://x/a.mp3"),
            DownloadItem::new("Ep2", "http://x/b.mp3"),
        ],
        2,
        false,
    );

    let ep1 = results.iter().find(|r| r.title == "Ep1").unwrap();
    let ep2 = results.iter().find(|r| r.title == "Ep2").unwrap();
    assert!(ep1.is_success());
    match &ep2.outcome {
        DownloadOutcome::Failed(reason) => assert!(reason.contains("404"), "{reason}"),
        other => panic!("expected failure, got {other:?}"),
    }

    let ledger = pipeline.store().snapshot();
    assert_eq!(ledger.len(), 1);
    assert!(ledger.contains_key("http://x/a.mp3"));
    assert_eq!(audio_files(dir.path()), vec!["Ep1.mp3"]);
    assert!(!has_temp_files(dir.path()));
}

#[test]
fn marked_url_is_skipped_without_network_call() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(FakeTransport::serving(&["http://x/a.mp3"]));
    let pipeline = pipeline_with(dir.path(), transport.clone());
    pipeline.store().mark_downloaded("http://x/a.mp3");

    let item = DownloadItem::new("Ep1", "http://x/a.mp3");
    assert!(pipeline.download_one(&item, false).is_skipped());
    let batch = pipeline.download_batch(vec![item], 3, false);
    assert!(batch[0].is_skipped());
    assert_eq!(transport.calls(), 0);
    assert!(audio_files(dir.path()).is_empty());
}

#[test]
fn success_survives_store_reload() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(FakeTransport::serving(&["http://x/a.mp3"]));
    let pipeline = pipeline_with(dir.path(), transport);

    let res = pipeline.download_one(&DownloadItem::new("Ep1", "http://x/a.mp3"), false);
    assert!(res.is_success());
    assert_eq!(res.path.as_deref(), Some(dir.path().join("Ep1.mp3").as_path()));

    let fresh = StatusStore::open_in(dir.path());
    assert!(fresh.is_downloaded("http://x/a.mp3"));
}

#[test]
fn second_batch_is_all_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let urls: Vec<String> = (0..5).map(|i| format!("http://x/{i}.mp3")).collect();
    let url_refs: Vec<&str> = urls.iter().map(String::as_str).collect();
    let transport = Arc::new(FakeTransport::serving(&url_refs));
    let pipeline = pipeline_with(dir.path(), transport.clone());
    let items: Vec<DownloadItem> = urls
        .iter()
        .enumerate()
        .map(|(i, u)| DownloadItem::new(format!("Episode {i}"), u.clone()))
        .collect();

    let first = pipeline.download_batch(items.clone(), 3, false);
    assert!(first.iter().all(DownloadResult::is_success));
    assert_eq!(transport.calls(), 5);

    let second = pipeline.download_batch(items, 3, false);
    assert_eq!(second.len(), 5);
    assert!(second.iter().all(DownloadResult::is_skipped));
    assert_eq!(transport.calls(), 5);
}

#[test]
fn forced_redownload_never_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(FakeTransport::serving(&["http://x/a.mp3", "http://x/b.mp3"]));
    let pipeline = pipeline_with(dir.path(), transport.clone());
    let a = DownloadItem::new("Title", "http://x/a.mp3");
    let b = DownloadItem::new("Title", "http://x/b.mp3");

    assert!(pipeline.download_one(&a, true).is_success());
    assert!(pipeline.download_one(&b, true).is_success());
    assert_eq!(audio_files(dir.path()), vec!["Title.mp3", "Title_1.mp3"]);

    assert!(pipeline.download_one(&a, true).is_success());
    assert!(pipeline.download_one(&b, true).is_success());
    assert_eq!(
        audio_files(dir.path()),
        vec!["Title.mp3", "Title_1.mp3", "Title_2.mp3", "Title_3.mp3"]
    );
    assert_eq!(
        std::fs::read(dir.path().join("Title.mp3")).unwrap(),
        b"audio:http://x/a.mp3"
    );
    assert_eq!(transport.calls(), 4);
}

#[test]
fn unforced_download_overwrites_same_named_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Ep1.mp3"), b"stale").unwrap();
    let transport = Arc::new(FakeTransport::serving(&["http://x/a.mp3"]));
    let pipeline = pipeline_with(dir.path(), transport);

    let res = pipeline.download_one(&DownloadItem::new("Ep1", "http://x/a.mp3"), false);
    assert!(res.is_success());
    assert_eq!(audio_files(dir.path()), vec!["Ep1.mp3"]);
    assert_eq!(
        std::fs::read(dir.path().join("Ep1.mp3")).unwrap(),
        b"audio:http://x/a.mp3"
    );
}

#[test]
fn in_flight_transfers_never_exceed_worker_count() {
    let dir = tempfile::tempdir().unwrap();
    let urls: Vec<String> = (0..20).map(|i| format!("http://x/{i}.mp3")).collect();
    let url_refs: Vec<&str> = urls.iter().map(String::as_str).collect();
    let transport =
        Arc::new(FakeTransport::serving(&url_refs).with_delay(Duration::from_millis(15)));
    let pipeline = pipeline_with(dir.path(), transport.clone());
    let items = urls
        .iter()
        .enumerate()
        .map(|(i, u)| DownloadItem::new(format!("Ep{i}"), u.clone()))
        .collect();

    let results = pipeline.download_batch(items, 3, false);

    assert_eq!(results.len(), 20);
    assert!(results.iter().all(DownloadResult::is_success));
    assert_eq!(transport.calls(), 20);
    let peak = transport.max_in_flight.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak concurrency {peak} exceeded 3");
    assert!(peak >= 1);
}

#[test]
fn zero_workers_still_processes_every_item() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(FakeTransport::serving(&["http://x/a.mp3", "http://x/b.mp3"]));
    let pipeline = pipeline_with(dir.path(), transport.clone());

    let results = pipeline.download_batch(
        vec![
            DownloadItem::new("A", "http://x/a.mp3"),
            DownloadItem::new("B", "http://x/b.mp3"),
        ],
        0,
        false,
    );
    assert_eq!(results.len(), 2);
    assert_eq!(transport.max_in_flight.load(Ordering::SeqCst), 1);
}

#[test]
fn empty_batch_returns_no_results() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline_with(dir.path(), Arc::new(FakeTransport::default()));
    assert!(pipeline.download_batch(Vec::new(), 3, false).is_empty());
}

#[test]
fn panicking_transport_becomes_failed_result() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline_with(dir.path(), Arc::new(PanickingTransport));

    let results = pipeline.download_batch(
        vec![
            DownloadItem::new("A", "http://x/a.mp3"),
            DownloadItem::new("B", "http://x/b.mp3"),
            DownloadItem::new("C", "http://x/c.mp3"),
        ],
        2,
        false,
    );
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(DownloadResult::is_failed));
    assert!(pipeline.store().is_empty());
}

#[test]
fn unwritable_download_dir_fails_item() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"x").unwrap();
    let store = Arc::new(StatusStore::open_in(dir.path()));
    let transport = Arc::new(FakeTransport::serving(&["http://x/a.mp3"]));
    let pipeline = FetchPipeline::new(store, transport.clone(), &blocker);

    let res = pipeline.download_one(&DownloadItem::new("Ep1", "http://x/a.mp3"), false);
    match &res.outcome {
        DownloadOutcome::Failed(reason) => assert!(reason.contains("filesystem error"), "{reason}"),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(transport.calls(), 0);
    assert!(!pipeline.store().is_downloaded("http://x/a.mp3"));
}
