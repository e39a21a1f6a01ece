use crate::auth::CredentialProvider;
use crate::batch::{FileStore, ProgressFn};
use crate::error::{Error, Result, snippet};
use crate::models::*;
use crate::upload::{ResumableSession, mime_for, upload_http_client};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Url};
use std::path::Path;
use std::sync::Arc;

const FILES_ENDPOINT: &str = "https://www.googleapis.com/drive/v3/files";
const UPLOAD_ENDPOINT: &str =
    "https://www.googleapis.com/upload/drive/v3/files?uploadType=resumable";
const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// Upload adapter for the file destination: folder resolution, resumable
/// upload into it, then a public-reader permission grant.
#[derive(Clone)]
pub struct DriveClient {
    http: Client,
    auth: Arc<CredentialProvider>,
}

impl DriveClient {
    pub fn new(auth: Arc<CredentialProvider>) -> Result<Self> {
        Ok(Self {
            http: upload_http_client("gallery-drive/0.1")?,
            auth,
        })
    }

    async fn bearer(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.auth.access_token().await?))
    }

    /// Exact-name lookup among non-trashed folders.
    pub async fn find_folder(&self, name: &str) -> Result<Option<String>> {
        let mut url = files_url()?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair(
                "q",
                &format!(
                    "mimeType='{FOLDER_MIME}' and name='{}' and trashed=false",
                    escape_query_value(name)
                ),
            );
            pairs.append_pair("fields", "files(id)");
        }
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.bearer().await?)
            .send()
            .await?;
        let listing: DriveFileList = self.parse_json(response).await?;
        Ok(listing.files.into_iter().next().map(|file| file.id))
    }

    pub async fn create_folder(&self, name: &str) -> Result<String> {
        let mut url = files_url()?;
        url.query_pairs_mut().append_pair("fields", "id");
        let body = DriveFileMetadata {
            name: name.to_string(),
            mime_type: Some(FOLDER_MIME.to_string()),
            parents: None,
        };
        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, self.bearer().await?)
            .json(&body)
            .send()
            .await?;
        let created: DriveFile = self.parse_json(response).await?;
        Ok(created.id)
    }

    async fn begin_upload(&self, name: &str, folder_id: &str, size: u64) -> Result<ResumableSession> {
        let mime = mime_for(name);
        let body = DriveFileMetadata {
            name: name.to_string(),
            mime_type: None,
            parents: Some(vec![folder_id.to_string()]),
        };
        let response = self
            .http
            .post(UPLOAD_ENDPOINT)
            .header(AUTHORIZATION, self.bearer().await?)
            .header("X-Upload-Content-Type", &mime)
            .header("X-Upload-Content-Length", size)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Drive {
                status,
                message: snippet(&body),
            });
        }
        ResumableSession::from_initiation(&response, size, mime)
    }

    /// Grant anyone read access to an uploaded file.
    pub async fn share_public(&self, file_id: &str) -> Result<()> {
        let url = format!("{FILES_ENDPOINT}/{file_id}/permissions");
        let body = PermissionRequest {
            grantee_type: "anyone".to_string(),
            role: "reader".to_string(),
        };
        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, self.bearer().await?)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Drive {
                status,
                message: snippet(&body),
            });
        }
        Ok(())
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Drive {
                status,
                message: snippet(&body),
            });
        }
        response.json::<T>().await.map_err(Error::Http)
    }
}

#[async_trait]
impl FileStore for DriveClient {
    async fn upload(
        &self,
        path: &Path,
        folder_name: &str,
        progress: ProgressFn<'_>,
    ) -> Result<String> {
        let folder_id = match self.find_folder(folder_name).await? {
            Some(id) => id,
            None => {
                tracing::info!(folder = %folder_name, "creating folder");
                self.create_folder(folder_name).await?
            }
        };

        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("upload.bin");
        let size = tokio::fs::metadata(path).await?.len();

        let session = self.begin_upload(name, &folder_id, size).await?;
        let response = session.put_file(&self.http, path, progress).await?;
        let file: DriveFile = response.json().await?;

        self.share_public(&file.id).await?;
        tracing::info!(file_id = %file.id, %name, "file uploaded");
        Ok(file.id)
    }
}

fn files_url() -> Result<Url> {
    FILES_ENDPOINT
        .parse::<Url>()
        .map_err(|err| Error::InvalidConfig(format!("invalid drive url: {err}")))
}

/// Escape a value for embedding in a drive query string literal.
/// Backslashes first, then single quotes.
pub fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
