use crate::page;
use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use gallery_core::batch::{
    BatchFile, BatchObserver, BatchSummary, Destination, FileReport, UploadBatch, Uploader,
};
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;

pub struct AppState {
    pub uploader: Arc<Uploader>,
}

/// One NDJSON line in the upload response stream.
#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Event {
    Progress {
        file: String,
        destination: String,
        percent: u8,
    },
    Outcome(FileReport),
    Warning {
        message: String,
    },
    Done(BatchSummary),
    Error {
        message: String,
    },
}

impl Event {
    fn to_line(&self) -> String {
        let mut line = serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"event":"error","message":"unserializable event"}"#.to_string());
        line.push('\n');
        line
    }
}

/// Forwards batch notifications into the response stream. The channel is
/// unbounded so the sequential upload loop never blocks on a slow reader.
struct ChannelObserver {
    tx: UnboundedSender<Event>,
}

impl BatchObserver for ChannelObserver {
    fn on_progress(&self, file: &str, destination: Destination, percent: u8) {
        let _ = self.tx.send(Event::Progress {
            file: file.to_string(),
            destination: destination.to_string(),
            percent,
        });
    }

    fn on_outcome(&self, report: &FileReport) {
        let _ = self.tx.send(Event::Outcome(report.clone()));
    }

    fn on_finished(&self, summary: &BatchSummary) {
        let _ = self.tx.send(Event::Done(*summary));
    }
}

pub async fn index() -> Html<&'static str> {
    Html(page::INDEX)
}

/// Accepts the form submission and streams per-file progress back as the
/// batch runs. The connection stays open until every file in the batch has
/// been uploaded or skipped.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, (StatusCode, String)> {
    let mut gallery_name = String::new();
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("gallery") => gallery_name = field.text().await.map_err(bad_request)?,
            Some("files") => {
                let name = field.file_name().map(str::to_string).unwrap_or_default();
                let bytes = field.bytes().await.map_err(bad_request)?;
                if !name.is_empty() {
                    files.push(BatchFile {
                        name,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    let gallery_name = gallery_name.trim().to_string();
    if gallery_name.is_empty() || files.is_empty() {
        let warning = Event::Warning {
            message: "Please provide a gallery name and select at least one file.".to_string(),
        };
        return Ok(ndjson(Body::from(warning.to_line())));
    }

    tracing::info!(gallery = %gallery_name, files = files.len(), "batch submitted");
    let batch = UploadBatch {
        gallery_name,
        files,
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let uploader = state.uploader.clone();
    tokio::spawn(async move {
        let observer = ChannelObserver { tx: tx.clone() };
        if let Err(err) = uploader.process_batch(&batch, &observer).await {
            tracing::error!(%err, "batch aborted");
            let _ = tx.send(Event::Error {
                message: err.to_string(),
            });
        }
    });

    let stream =
        UnboundedReceiverStream::new(rx).map(|event| Ok::<_, Infallible>(event.to_line()));
    Ok(ndjson(Body::from_stream(stream)))
}

fn ndjson(body: Body) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        body,
    )
        .into_response()
}

fn bad_request(err: axum::extract::multipart::MultipartError) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, format!("invalid form data: {err}"))
}
