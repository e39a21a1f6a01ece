use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{Duration, Utc};
use gallery_core::auth::{ClientSecret, CredentialProvider, TokenSnapshot, materialize_bootstrap};
use gallery_core::config::{Config, SecretsBootstrap};
use std::path::Path;

const CLIENT_SECRET_JSON: &str =
    r#"{"installed":{"client_id":"id-123","client_secret":"sec-456"}}"#;

fn test_config(dir: &Path, bootstrap: Option<SecretsBootstrap>) -> Config {
    Config {
        client_secret_file: dir.join("client_secret.json"),
        token_file: dir.join("token.json"),
        scratch_dir: dir.join("temp_uploads"),
        bind_addr: "127.0.0.1:0".to_string(),
        bootstrap,
    }
}

#[test]
fn client_secret_parse_installed() {
    let secret = ClientSecret::parse(CLIENT_SECRET_JSON).unwrap();
    assert_eq!(secret.client_id, "id-123");
    assert_eq!(secret.client_secret, "sec-456");
    assert_eq!(secret.token_uri, "https://oauth2.googleapis.com/token");
}

#[test]
fn client_secret_parse_web_alias() {
    let raw = r#"{"web":{"client_id":"w","client_secret":"s","token_uri":"https://example.test/token"}}"#;
    let secret = ClientSecret::parse(raw).unwrap();
    assert_eq!(secret.client_id, "w");
    assert_eq!(secret.token_uri, "https://example.test/token");
}

#[test]
fn client_secret_parse_rejects_empty_document() {
    assert!(ClientSecret::parse("{}").is_err());
}

#[test]
fn snapshot_expiry() {
    let now = Utc::now();
    let mut snapshot = TokenSnapshot {
        access_token: "at".into(),
        refresh_token: Some("rt".into()),
        expiry: Some(now + Duration::hours(1)),
        scopes: vec![],
    };
    assert!(!snapshot.is_expired(now));

    snapshot.expiry = Some(now - Duration::seconds(1));
    assert!(snapshot.is_expired(now));

    // Inside the refresh skew counts as expired.
    snapshot.expiry = Some(now + Duration::seconds(30));
    assert!(snapshot.is_expired(now));

    snapshot.expiry = None;
    assert!(snapshot.is_expired(now));
}

#[test]
fn snapshot_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token.json");
    let snapshot = TokenSnapshot {
        access_token: "ya29.abc".into(),
        refresh_token: Some("1//xyz".into()),
        expiry: Some(Utc::now() + Duration::hours(1)),
        scopes: vec!["https://www.googleapis.com/auth/youtube".into()],
    };
    std::fs::write(&path, serde_json::to_string_pretty(&snapshot).unwrap()).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let restored: TokenSnapshot = serde_json::from_str(&raw).unwrap();
    assert_eq!(restored.access_token, snapshot.access_token);
    assert_eq!(restored.refresh_token, snapshot.refresh_token);
    assert_eq!(restored.expiry, snapshot.expiry);
    assert_eq!(restored.scopes, snapshot.scopes);
}

#[test]
fn bootstrap_materializes_credential_files() {
    let dir = tempfile::tempdir().unwrap();
    let token_json = r#"{"access_token":"at","refresh_token":"rt","expiry":null,"scopes":[]}"#;
    let config = test_config(
        dir.path(),
        Some(SecretsBootstrap {
            client_secret_json: CLIENT_SECRET_JSON.to_string(),
            token_snapshot_b64: Some(BASE64.encode(token_json)),
        }),
    );

    materialize_bootstrap(&config).unwrap();

    let written = std::fs::read_to_string(&config.client_secret_file).unwrap();
    assert_eq!(written, CLIENT_SECRET_JSON);
    let snapshot: TokenSnapshot =
        serde_json::from_str(&std::fs::read_to_string(&config.token_file).unwrap()).unwrap();
    assert_eq!(snapshot.access_token, "at");
    assert_eq!(snapshot.refresh_token.as_deref(), Some("rt"));
}

#[test]
fn bootstrap_without_inline_secrets_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), None);
    materialize_bootstrap(&config).unwrap();
    assert!(!config.client_secret_file.exists());
    assert!(!config.token_file.exists());
}

#[test]
fn provider_construction_reads_bootstrapped_secret() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(
        dir.path(),
        Some(SecretsBootstrap {
            client_secret_json: CLIENT_SECRET_JSON.to_string(),
            token_snapshot_b64: None,
        }),
    );
    assert!(CredentialProvider::new(&config).is_ok());
}

#[test]
fn provider_construction_fails_without_client_secret() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), None);
    assert!(CredentialProvider::new(&config).is_err());
}
