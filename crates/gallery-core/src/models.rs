use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// OAuth2 token endpoint response.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
}

/// youtube#video insert body (snippet + status parts).
#[derive(Debug, Clone, Serialize)]
pub struct VideoInsertRequest {
    pub snippet: VideoSnippet,
    pub status: ResourceStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    pub title: String,
    pub description: String,
    pub category_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStatus {
    pub privacy_status: String,
}

/// youtube#video resource (subset).
#[derive(Debug, Clone, Deserialize)]
pub struct VideoResource {
    pub id: String,
}

/// youtube#playlistListResponse (subset).
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistListResponse {
    #[serde(default)]
    pub items: Vec<Playlist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub snippet: PlaylistSnippet,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistSnippet {
    pub title: String,
    pub description: Option<String>,
}

/// youtube#playlist insert body.
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistInsertRequest {
    pub snippet: PlaylistSnippet,
    pub status: ResourceStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistResource {
    pub id: String,
}

/// youtube#playlistItem insert body.
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistItemRequest {
    pub snippet: PlaylistItemSnippet,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    pub playlist_id: String,
    pub resource_id: ResourceId,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub kind: String,
    pub video_id: String,
}

/// drive#fileList (subset).
#[derive(Debug, Clone, Deserialize)]
pub struct DriveFileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriveFile {
    pub id: String,
    pub name: Option<String>,
}

/// drive#file create metadata.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFileMetadata {
    pub name: String,
    pub mime_type: Option<String>,
    pub parents: Option<Vec<String>>,
}

/// drive#permission create body.
#[derive(Debug, Clone, Serialize)]
pub struct PermissionRequest {
    #[serde(rename = "type")]
    pub grantee_type: String,
    pub role: String,
}
