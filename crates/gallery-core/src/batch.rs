use crate::classify::{MediaKind, classify};
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Prefix applied to the user-supplied name to derive the remote
/// playlist/folder name.
pub const GALLERY_PREFIX: &str = "GALLERY-";

pub type ProgressFn<'a> = &'a (dyn Fn(u8) + Send + Sync);

/// Destination for video files: upload, then attach to the named playlist.
#[async_trait]
pub trait VideoHost: Send + Sync {
    async fn upload(
        &self,
        path: &Path,
        title: &str,
        playlist_name: &str,
        progress: ProgressFn<'_>,
    ) -> Result<String>;
}

/// Destination for image files: upload into the named folder, publicly
/// readable.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn upload(
        &self,
        path: &Path,
        folder_name: &str,
        progress: ProgressFn<'_>,
    ) -> Result<String>;
}

/// One file as received from the form: name plus full content.
#[derive(Debug, Clone)]
pub struct BatchFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// One form submission: the gallery name and the selected files, processed
/// in submission order.
#[derive(Debug, Clone)]
pub struct UploadBatch {
    pub gallery_name: String,
    pub files: Vec<BatchFile>,
}

impl UploadBatch {
    pub fn container_name(&self) -> String {
        format!("{GALLERY_PREFIX}{}", self.gallery_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    YouTube,
    Drive,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::YouTube => write!(f, "YouTube"),
            Destination::Drive => write!(f, "Drive"),
        }
    }
}

/// Per-file result of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Video { id: String },
    Image { id: String },
    Skipped,
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub file: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub uploaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let mut summary = Self::default();
        for report in reports {
            match report.outcome {
                Outcome::Video { .. } | Outcome::Image { .. } => summary.uploaded += 1,
                Outcome::Skipped => summary.skipped += 1,
                Outcome::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }
}

/// How batch progress reaches the presentation layer. Implementations must
/// be cheap; these are called from inside the upload loop.
pub trait BatchObserver: Send + Sync {
    fn on_progress(&self, file: &str, destination: Destination, percent: u8);
    fn on_outcome(&self, report: &FileReport);
    fn on_finished(&self, summary: &BatchSummary);
}

/// A file temporarily materialized on disk so the chunked-upload primitive
/// can stream from a path. Removed when the owning iteration ends, whether
/// the upload succeeded or not.
struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    async fn write(dir: &Path, name: &str, bytes: &[u8]) -> Result<Self> {
        let path = dir.join(scratch_name(name));
        tokio::fs::write(&path, bytes).await?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), %err, "failed to remove scratch file");
        }
    }
}

/// The scratch copy keeps only the final path component of the submitted
/// name, so a hostile filename cannot escape the scratch directory.
fn scratch_name(name: &str) -> &str {
    Path::new(name)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("upload.bin")
}

/// Drives a submitted batch end to end: stage, classify, dispatch, clean
/// up, report. Uploads run strictly one after another.
pub struct Uploader {
    videos: Arc<dyn VideoHost>,
    files: Arc<dyn FileStore>,
    scratch_dir: PathBuf,
}

impl Uploader {
    pub fn new(videos: Arc<dyn VideoHost>, files: Arc<dyn FileStore>, scratch_dir: PathBuf) -> Self {
        Self {
            videos,
            files,
            scratch_dir,
        }
    }

    /// Process every file in submission order. A failure on one file is
    /// recorded as its outcome and the loop continues; only failure to
    /// prepare the scratch directory aborts the batch.
    pub async fn process_batch(
        &self,
        batch: &UploadBatch,
        observer: &dyn BatchObserver,
    ) -> Result<Vec<FileReport>> {
        tokio::fs::create_dir_all(&self.scratch_dir).await?;
        let container = batch.container_name();

        let mut reports = Vec::with_capacity(batch.files.len());
        for file in &batch.files {
            let outcome = self.process_file(file, &container, observer).await;
            let report = FileReport {
                file: file.name.clone(),
                outcome,
            };
            observer.on_outcome(&report);
            reports.push(report);
        }

        let summary = BatchSummary::from_reports(&reports);
        observer.on_finished(&summary);
        Ok(reports)
    }

    async fn process_file(
        &self,
        file: &BatchFile,
        container: &str,
        observer: &dyn BatchObserver,
    ) -> Outcome {
        let staged = match StagedFile::write(&self.scratch_dir, &file.name, &file.bytes).await {
            Ok(staged) => staged,
            Err(err) => {
                return Outcome::Failed {
                    message: format!("staging failed: {err}"),
                };
            }
        };

        let name = file.name.as_str();
        let outcome = match classify(name) {
            MediaKind::Video => {
                let progress =
                    |percent: u8| observer.on_progress(name, Destination::YouTube, percent);
                match self
                    .videos
                    .upload(staged.path(), name, container, &progress)
                    .await
                {
                    Ok(id) => Outcome::Video { id },
                    Err(err) => Outcome::Failed {
                        message: err.to_string(),
                    },
                }
            }
            MediaKind::Image => {
                let progress = |percent: u8| observer.on_progress(name, Destination::Drive, percent);
                match self
                    .files
                    .upload(staged.path(), container, &progress)
                    .await
                {
                    Ok(id) => Outcome::Image { id },
                    Err(err) => Outcome::Failed {
                        message: err.to_string(),
                    },
                }
            }
            MediaKind::Unsupported => {
                tracing::warn!(file = %name, "skipped unsupported file type");
                Outcome::Skipped
            }
        };

        // Scratch lifetime is scoped to this iteration, success or failure.
        drop(staged);
        outcome
    }
}
