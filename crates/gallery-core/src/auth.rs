use crate::config::Config;
use crate::error::{Error, Result, snippet};
use crate::models::TokenResponse;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/youtube",
    "https://www.googleapis.com/auth/drive",
];

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
// Loopback redirect for the manual copy-the-code fallback flow.
const REDIRECT_URI: &str = "http://127.0.0.1";
const EXPIRY_SKEW_SECONDS: i64 = 60;

/// OAuth client registration, parsed from a Google client-secret document.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    /// Accepts both the `installed` and `web` document shapes.
    pub fn parse(json: &str) -> Result<Self> {
        let file: ClientSecretFile = serde_json::from_str(json)?;
        file.installed
            .or(file.web)
            .ok_or_else(|| Error::Auth("client secret document has no installed/web section".into()))
    }
}

/// Persisted access/refresh-token state. Skips the interactive login on
/// every run after the first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expiry: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl TokenSnapshot {
    /// A snapshot without a known expiry is treated as expired so it gets
    /// refreshed before first use.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => expiry <= now + Duration::seconds(EXPIRY_SKEW_SECONDS),
            None => true,
        }
    }

    fn from_response(response: TokenResponse, previous_refresh: Option<String>) -> Self {
        let expiry = Utc::now() + Duration::seconds(response.expires_in);
        let scopes = response
            .scope
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_else(|| SCOPES.iter().map(|s| s.to_string()).collect());
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(previous_refresh),
            expiry: Some(expiry),
            scopes,
        }
    }
}

/// Holds the OAuth client registration and the cached credential for the
/// process lifetime. Constructed once at startup and shared by both upload
/// clients; refreshes the token in place when it expires.
pub struct CredentialProvider {
    http: Client,
    secret: ClientSecret,
    token_file: PathBuf,
    cached: Mutex<Option<TokenSnapshot>>,
}

impl CredentialProvider {
    pub fn new(config: &Config) -> Result<Self> {
        materialize_bootstrap(config)?;

        let raw = fs::read_to_string(&config.client_secret_file).map_err(|err| {
            Error::Auth(format!(
                "read client secret {}: {err}",
                config.client_secret_file.display()
            ))
        })?;
        let secret = ClientSecret::parse(&raw)?;

        let http = Client::builder()
            .user_agent("gallery/0.1")
            .build()
            .map_err(|err| Error::InvalidConfig(format!("failed to build auth client: {err}")))?;

        Ok(Self {
            http,
            secret,
            token_file: config.token_file.clone(),
            cached: Mutex::new(None),
        })
    }

    /// Obtain a valid credential, caching it for the process lifetime.
    /// Any failure here is fatal for the session: no uploads run without it.
    pub async fn authenticate(&self) -> Result<()> {
        self.access_token().await.map(|_| ())
    }

    /// The current access token, refreshed in place if the cached snapshot
    /// has expired.
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        let snapshot = match cached.take() {
            Some(snapshot) => snapshot,
            None => self.load_snapshot()?.unwrap_or(TokenSnapshot {
                access_token: String::new(),
                refresh_token: None,
                expiry: None,
                scopes: Vec::new(),
            }),
        };

        let snapshot = if !snapshot.access_token.is_empty() && !snapshot.is_expired(Utc::now()) {
            snapshot
        } else {
            let renewed = match &snapshot.refresh_token {
                Some(refresh_token) if !snapshot.access_token.is_empty() => {
                    self.refresh(refresh_token.clone()).await?
                }
                _ => self.interactive_flow().await?,
            };
            self.persist(&renewed)?;
            renewed
        };

        let token = snapshot.access_token.clone();
        *cached = Some(snapshot);
        Ok(token)
    }

    fn load_snapshot(&self) -> Result<Option<TokenSnapshot>> {
        if !self.token_file.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.token_file)?;
        match serde_json::from_str::<TokenSnapshot>(&raw) {
            Ok(snapshot) => Ok(Some(snapshot)),
            // An unreadable snapshot is the same as no snapshot.
            Err(err) => {
                tracing::warn!(path = %self.token_file.display(), %err, "discarding unreadable token snapshot");
                Ok(None)
            }
        }
    }

    fn persist(&self, snapshot: &TokenSnapshot) -> Result<()> {
        let serialized = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.token_file, serialized)?;
        Ok(())
    }

    async fn refresh(&self, refresh_token: String) -> Result<TokenSnapshot> {
        let params = [
            ("client_id", self.secret.client_id.as_str()),
            ("client_secret", self.secret.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];
        let response = self
            .http
            .post(&self.secret.token_uri)
            .form(&params)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TokenRefresh {
                status,
                message: snippet(&body),
            });
        }
        let parsed = response.json::<TokenResponse>().await?;
        Ok(TokenSnapshot::from_response(parsed, Some(refresh_token)))
    }

    /// Manual consent fallback for local use: print the consent URL, read
    /// the authorization code from stdin, exchange it for tokens. Not
    /// expected to succeed on a non-interactive host.
    async fn interactive_flow(&self) -> Result<TokenSnapshot> {
        let url = self.consent_url()?;
        println!("Open this URL in a browser, approve access, then paste the `code` query parameter from the redirect:");
        println!("{url}");

        let code = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).map(|_| line)
        })
        .await
        .map_err(|err| Error::Auth(format!("authorization prompt aborted: {err}")))??;

        let code = code.trim();
        if code.is_empty() {
            return Err(Error::Auth("no authorization code provided".into()));
        }
        self.exchange_code(code).await
    }

    fn consent_url(&self) -> Result<Url> {
        let mut url = self
            .secret
            .auth_uri
            .parse::<Url>()
            .map_err(|err| Error::Auth(format!("invalid auth uri: {err}")))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.secret.client_id)
            .append_pair("redirect_uri", REDIRECT_URI)
            .append_pair("response_type", "code")
            .append_pair("scope", &SCOPES.join(" "))
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");
        Ok(url)
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenSnapshot> {
        let params = [
            ("client_id", self.secret.client_id.as_str()),
            ("client_secret", self.secret.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", REDIRECT_URI),
            ("grant_type", "authorization_code"),
        ];
        let response = self
            .http
            .post(&self.secret.token_uri)
            .form(&params)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "code exchange rejected: {status} {}",
                snippet(&body)
            )));
        }
        let parsed = response.json::<TokenResponse>().await?;
        Ok(TokenSnapshot::from_response(parsed, None))
    }
}

/// Write the inline secrets to their on-disk locations. First-run bootstrap
/// for hosts that supply credentials through the environment instead of a
/// pre-seeded filesystem.
pub fn materialize_bootstrap(config: &Config) -> Result<()> {
    let Some(bootstrap) = &config.bootstrap else {
        return Ok(());
    };

    write_with_parent(&config.client_secret_file, bootstrap.client_secret_json.as_bytes())?;

    if let Some(token_b64) = &bootstrap.token_snapshot_b64 {
        let decoded = BASE64
            .decode(token_b64.trim())
            .map_err(|err| Error::Auth(format!("invalid base64 token snapshot: {err}")))?;
        write_with_parent(&config.token_file, &decoded)?;
    }
    Ok(())
}

fn write_with_parent(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}
