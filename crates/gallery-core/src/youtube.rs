use crate::auth::CredentialProvider;
use crate::batch::{ProgressFn, VideoHost};
use crate::error::{Error, Result, snippet};
use crate::models::*;
use crate::upload::{ResumableSession, mime_for, upload_http_client};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Url};
use std::path::Path;
use std::sync::Arc;

const UPLOAD_ENDPOINT: &str =
    "https://www.googleapis.com/upload/youtube/v3/videos?uploadType=resumable&part=snippet,status";
const API_BASE: &str = "https://www.googleapis.com/youtube/v3/";

const VIDEO_CATEGORY_ID: &str = "22";
const VIDEO_DESCRIPTION: &str = "Uploaded via Cloud Gallery";
const PLAYLIST_DESCRIPTION: &str = "Cloud Gallery Playlist";
const PRIVACY_UNLISTED: &str = "unlisted";
// Lookup is bounded to one page; playlists beyond it are treated as absent.
const PLAYLIST_PAGE_SIZE: u32 = 50;

/// Upload adapter for the video destination: resumable insert, then
/// playlist resolution and membership.
#[derive(Clone)]
pub struct YouTubeClient {
    http: Client,
    api_base: Url,
    auth: Arc<CredentialProvider>,
}

impl YouTubeClient {
    pub fn new(auth: Arc<CredentialProvider>) -> Result<Self> {
        let api_base = API_BASE
            .parse::<Url>()
            .map_err(|err| Error::InvalidConfig(format!("invalid youtube base url: {err}")))?;
        Ok(Self {
            http: upload_http_client("gallery-youtube/0.1")?,
            api_base,
            auth,
        })
    }

    async fn bearer(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.auth.access_token().await?))
    }

    async fn begin_upload(&self, title: &str, size: u64, mime: &str) -> Result<ResumableSession> {
        let body = VideoInsertRequest {
            snippet: VideoSnippet {
                title: title.to_string(),
                description: VIDEO_DESCRIPTION.to_string(),
                category_id: VIDEO_CATEGORY_ID.to_string(),
            },
            status: ResourceStatus {
                privacy_status: PRIVACY_UNLISTED.to_string(),
            },
        };

        let response = self
            .http
            .post(UPLOAD_ENDPOINT)
            .header(AUTHORIZATION, self.bearer().await?)
            .header("X-Upload-Content-Type", mime)
            .header("X-Upload-Content-Length", size)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::YouTube {
                status,
                message: snippet(&body),
            });
        }
        ResumableSession::from_initiation(&response, size, mime.to_string())
    }

    /// Exact-title playlist lookup among the authenticated channel's
    /// playlists, first page only.
    pub async fn find_playlist(&self, title: &str) -> Result<Option<String>> {
        let mut url = self.api_url("playlists")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("part", "snippet");
            pairs.append_pair("mine", "true");
            pairs.append_pair("maxResults", &PLAYLIST_PAGE_SIZE.to_string());
        }
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.bearer().await?)
            .send()
            .await?;
        let listing: PlaylistListResponse = self.parse_json(response).await?;
        Ok(playlist_id_by_title(&listing, title))
    }

    pub async fn create_playlist(&self, title: &str) -> Result<String> {
        let mut url = self.api_url("playlists")?;
        url.query_pairs_mut().append_pair("part", "snippet,status");
        let body = PlaylistInsertRequest {
            snippet: PlaylistSnippet {
                title: title.to_string(),
                description: Some(PLAYLIST_DESCRIPTION.to_string()),
            },
            status: ResourceStatus {
                privacy_status: PRIVACY_UNLISTED.to_string(),
            },
        };
        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, self.bearer().await?)
            .json(&body)
            .send()
            .await?;
        let created: PlaylistResource = self.parse_json(response).await?;
        Ok(created.id)
    }

    pub async fn insert_playlist_item(&self, playlist_id: &str, video_id: &str) -> Result<()> {
        let mut url = self.api_url("playlistItems")?;
        url.query_pairs_mut().append_pair("part", "snippet");
        let body = PlaylistItemRequest {
            snippet: PlaylistItemSnippet {
                playlist_id: playlist_id.to_string(),
                resource_id: ResourceId {
                    kind: "youtube#video".to_string(),
                    video_id: video_id.to_string(),
                },
            },
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
            return Err(Error::YouTube {
                status,
                message: snippet(&body),
            });
        }
        Ok(())
    }

    fn api_url(&self, path: &str) -> Result<Url> {
        self.api_base
            .join(path)
            .map_err(|err| Error::InvalidConfig(format!("invalid youtube url: {err}")))
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::YouTube {
                status,
                message: snippet(&body),
            });
        }
        response.json::<T>().await.map_err(Error::Http)
    }
}

/// Exact title match; an existing playlist is always reused over creating
/// a duplicate.
pub fn playlist_id_by_title(listing: &PlaylistListResponse, title: &str) -> Option<String> {
    listing
        .items
        .iter()
        .find(|playlist| playlist.snippet.title == title)
        .map(|playlist| playlist.id.clone())
}

#[async_trait]
impl VideoHost for YouTubeClient {
    async fn upload(
        &self,
        path: &Path,
        title: &str,
        playlist_name: &str,
        progress: ProgressFn<'_>,
    ) -> Result<String> {
        let size = tokio::fs::metadata(path).await?.len();
        let mime = mime_for(title);

        let session = self.begin_upload(title, size, &mime).await?;
        let response = session.put_file(&self.http, path, progress).await?;
        let video: VideoResource = response.json().await?;
        tracing::info!(video_id = %video.id, %title, "video uploaded");

        let playlist_id = match self.find_playlist(playlist_name).await? {
            Some(id) => id,
            None => {
                tracing::info!(playlist = %playlist_name, "creating playlist");
                self.create_playlist(playlist_name).await?
            }
        };
        self.insert_playlist_item(&playlist_id, &video.id).await?;
        Ok(video.id)
    }
}
