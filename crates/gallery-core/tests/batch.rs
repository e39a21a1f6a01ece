use async_trait::async_trait;
use gallery_core::batch::{
    BatchFile, BatchObserver, BatchSummary, Destination, FileReport, FileStore, GALLERY_PREFIX,
    Outcome, ProgressFn, UploadBatch, Uploader, VideoHost,
};
use gallery_core::error::{Error, Result};
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingHost {
    calls: Mutex<Vec<(String, String)>>,
    fail: bool,
}

#[async_trait]
impl VideoHost for RecordingHost {
    async fn upload(
        &self,
        path: &Path,
        title: &str,
        playlist_name: &str,
        progress: ProgressFn<'_>,
    ) -> Result<String> {
        assert!(path.exists(), "staged file must exist during upload");
        self.calls
            .lock()
            .unwrap()
            .push((title.to_string(), playlist_name.to_string()));
        if self.fail {
            return Err(Error::InvalidConfig("simulated video failure".into()));
        }
        progress(50);
        progress(100);
        Ok(format!("vid-{}", self.calls.lock().unwrap().len()))
    }
}

#[derive(Default)]
struct RecordingStore {
    calls: Mutex<Vec<(String, String)>>,
    fail: bool,
}

#[async_trait]
impl FileStore for RecordingStore {
    async fn upload(
        &self,
        path: &Path,
        folder_name: &str,
        progress: ProgressFn<'_>,
    ) -> Result<String> {
        assert!(path.exists(), "staged file must exist during upload");
        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        self.calls
            .lock()
            .unwrap()
            .push((name, folder_name.to_string()));
        if self.fail {
            return Err(Error::InvalidConfig("simulated drive failure".into()));
        }
        progress(100);
        Ok(format!("file-{}", self.calls.lock().unwrap().len()))
    }
}

#[derive(Default)]
struct CollectingObserver {
    progress: Mutex<Vec<(String, Destination, u8)>>,
    outcomes: Mutex<Vec<FileReport>>,
    summaries: Mutex<Vec<BatchSummary>>,
}

impl BatchObserver for CollectingObserver {
    fn on_progress(&self, file: &str, destination: Destination, percent: u8) {
        self.progress
            .lock()
            .unwrap()
            .push((file.to_string(), destination, percent));
    }

    fn on_outcome(&self, report: &FileReport) {
        self.outcomes.lock().unwrap().push(report.clone());
    }

    fn on_finished(&self, summary: &BatchSummary) {
        self.summaries.lock().unwrap().push(*summary);
    }
}

fn batch(gallery_name: &str, names: &[&str]) -> UploadBatch {
    UploadBatch {
        gallery_name: gallery_name.to_string(),
        files: names
            .iter()
            .map(|name| BatchFile {
                name: name.to_string(),
                bytes: b"content".to_vec(),
            })
            .collect(),
    }
}

#[test]
fn container_name_applies_fixed_prefix() {
    assert_eq!(GALLERY_PREFIX, "GALLERY-");
    assert_eq!(batch("Trip", &[]).container_name(), "GALLERY-Trip");
}

#[tokio::test]
async fn routes_files_by_extension() {
    let scratch = tempfile::tempdir().unwrap();
    let host = Arc::new(RecordingHost::default());
    let store = Arc::new(RecordingStore::default());
    let uploader = Uploader::new(host.clone(), store.clone(), scratch.path().to_path_buf());
    let observer = CollectingObserver::default();

    let reports = uploader
        .process_batch(&batch("Beach", &["a.mp4", "b.png", "c.txt"]), &observer)
        .await
        .unwrap();

    assert_eq!(
        *host.calls.lock().unwrap(),
        vec![("a.mp4".to_string(), "GALLERY-Beach".to_string())]
    );
    assert_eq!(
        *store.calls.lock().unwrap(),
        vec![("b.png".to_string(), "GALLERY-Beach".to_string())]
    );

    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0].outcome, Outcome::Video { id: "vid-1".into() });
    assert_eq!(reports[1].outcome, Outcome::Image { id: "file-1".into() });
    assert_eq!(reports[2].outcome, Outcome::Skipped);

    let summary = observer.summaries.lock().unwrap()[0];
    assert_eq!(summary.uploaded, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);
}

#[tokio::test]
async fn unsupported_batch_never_reaches_adapters() {
    let scratch = tempfile::tempdir().unwrap();
    let host = Arc::new(RecordingHost::default());
    let store = Arc::new(RecordingStore::default());
    let uploader = Uploader::new(host.clone(), store.clone(), scratch.path().to_path_buf());
    let observer = CollectingObserver::default();

    let reports = uploader
        .process_batch(&batch("Docs", &["a.txt", "b.pdf", "c.doc"]), &observer)
        .await
        .unwrap();

    assert!(host.calls.lock().unwrap().is_empty());
    assert!(store.calls.lock().unwrap().is_empty());
    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|r| r.outcome == Outcome::Skipped));
    assert!(observer.progress.lock().unwrap().is_empty());
}

#[tokio::test]
async fn scratch_files_are_gone_after_each_iteration() {
    let scratch = tempfile::tempdir().unwrap();
    let host = Arc::new(RecordingHost {
        fail: true,
        ..Default::default()
    });
    let store = Arc::new(RecordingStore::default());
    let uploader = Uploader::new(host, store, scratch.path().to_path_buf());
    let observer = CollectingObserver::default();

    uploader
        .process_batch(&batch("Mixed", &["a.mp4", "b.png", "c.txt"]), &observer)
        .await
        .unwrap();

    let leftovers: Vec<_> = std::fs::read_dir(scratch.path()).unwrap().collect();
    assert!(leftovers.is_empty(), "scratch dir not empty: {leftovers:?}");
}

#[tokio::test]
async fn one_failure_does_not_abort_the_batch() {
    let scratch = tempfile::tempdir().unwrap();
    let host = Arc::new(RecordingHost {
        fail: true,
        ..Default::default()
    });
    let store = Arc::new(RecordingStore::default());
    let uploader = Uploader::new(host, store.clone(), scratch.path().to_path_buf());
    let observer = CollectingObserver::default();

    let reports = uploader
        .process_batch(&batch("Beach", &["a.mp4", "b.png"]), &observer)
        .await
        .unwrap();

    assert!(matches!(reports[0].outcome, Outcome::Failed { .. }));
    assert_eq!(reports[1].outcome, Outcome::Image { id: "file-1".into() });
    assert_eq!(store.calls.lock().unwrap().len(), 1);

    let summary = observer.summaries.lock().unwrap()[0];
    assert_eq!(summary.uploaded, 1);
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn progress_is_labelled_with_the_destination() {
    let scratch = tempfile::tempdir().unwrap();
    let host = Arc::new(RecordingHost::default());
    let store = Arc::new(RecordingStore::default());
    let uploader = Uploader::new(host, store, scratch.path().to_path_buf());
    let observer = CollectingObserver::default();

    uploader
        .process_batch(&batch("Beach", &["a.mp4", "b.png"]), &observer)
        .await
        .unwrap();

    let progress = observer.progress.lock().unwrap();
    assert_eq!(
        *progress,
        vec![
            ("a.mp4".to_string(), Destination::YouTube, 50),
            ("a.mp4".to_string(), Destination::YouTube, 100),
            ("b.png".to_string(), Destination::Drive, 100),
        ]
    );
}

#[tokio::test]
async fn outcomes_precede_the_aggregate_summary() {
    let scratch = tempfile::tempdir().unwrap();
    let host = Arc::new(RecordingHost::default());
    let store = Arc::new(RecordingStore::default());
    let uploader = Uploader::new(host, store, scratch.path().to_path_buf());
    let observer = CollectingObserver::default();

    uploader
        .process_batch(&batch("Beach", &["a.mp4"]), &observer)
        .await
        .unwrap();

    assert_eq!(observer.outcomes.lock().unwrap().len(), 1);
    assert_eq!(observer.summaries.lock().unwrap().len(), 1);
}
