use crate::error::{Error, Result, snippet};
use reqwest::header::{CONTENT_RANGE, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Chunk size for resumable uploads. Google accepts any multiple of 256 KiB.
const CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// An initiated resumable upload session: the session URI from the
/// `Location` header plus what the chunk requests must repeat.
pub(crate) struct ResumableSession {
    pub uri: String,
    pub total: u64,
    pub mime: String,
}

impl ResumableSession {
    /// Extract the session URI from an initiation response.
    pub(crate) fn from_initiation(
        response: &reqwest::Response,
        total: u64,
        mime: String,
    ) -> Result<Self> {
        let uri = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or(Error::MissingSessionUri)?;
        Ok(Self { uri, total, mime })
    }

    /// Stream the file to the session URI in sequential chunks, invoking
    /// `progress` with a percentage in [0,100] after each chunk. Blocks the
    /// caller until the upload completes or fails; returns the final
    /// response so the caller can parse the created resource.
    pub(crate) async fn put_file(
        &self,
        http: &Client,
        path: &Path,
        progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<reqwest::Response> {
        if self.total == 0 {
            return self.put_empty(http, progress).await;
        }

        let mut file = File::open(path).await?;
        let mut offset = 0u64;
        let mut buffer = vec![0u8; CHUNK_SIZE];

        loop {
            let read = fill_chunk(&mut file, &mut buffer).await?;
            if read == 0 {
                // The file shrank under us; the session is unrecoverable.
                return Err(Error::UploadInterrupted {
                    status: StatusCode::OK,
                    message: format!("file truncated at byte {offset} of {}", self.total),
                });
            }

            let end = offset + read as u64 - 1;
            let response = http
                .put(&self.uri)
                .header(CONTENT_TYPE, &self.mime)
                .header(
                    CONTENT_RANGE,
                    format!("bytes {offset}-{end}/{}", self.total),
                )
                .body(buffer[..read].to_vec())
                .send()
                .await?;

            offset = end + 1;
            let percent = ((offset.min(self.total) * 100) / self.total) as u8;

            let status = response.status();
            // 308 means the chunk was accepted and the session expects more.
            if status == StatusCode::PERMANENT_REDIRECT {
                progress(percent);
                continue;
            }
            if status.is_success() {
                progress(percent);
                return Ok(response);
            }

            let body = response.text().await.unwrap_or_default();
            return Err(Error::UploadInterrupted {
                status,
                message: snippet(&body),
            });
        }
    }

    async fn put_empty(
        &self,
        http: &Client,
        progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<reqwest::Response> {
        let response = http
            .put(&self.uri)
            .header(CONTENT_TYPE, &self.mime)
            .header(CONTENT_RANGE, "bytes */0")
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            progress(100);
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::UploadInterrupted {
            status,
            message: snippet(&body),
        })
    }
}

async fn fill_chunk(file: &mut File, buffer: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        let n = file.read(&mut buffer[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// MIME type for a filename, defaulting to a generic binary type.
pub(crate) fn mime_for(filename: &str) -> String {
    mime_guess::MimeGuess::from_path(filename)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

/// Build an HTTP client for upload traffic. Redirects are disabled so the
/// 308 chunk acknowledgements from the upload endpoints reach the loop
/// instead of being followed.
pub(crate) fn upload_http_client(user_agent: &str) -> Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|err| Error::InvalidConfig(format!("failed to build client: {err}")))
}
