use gallery_core::models::PlaylistListResponse;
use gallery_core::youtube::playlist_id_by_title;

fn listing() -> PlaylistListResponse {
    serde_json::from_str(
        r#"{"items":[
            {"id":"pl-1","snippet":{"title":"GALLERY-Trip"}},
            {"id":"pl-2","snippet":{"title":"GALLERY-Beach"}},
            {"id":"pl-3","snippet":{"title":"gallery-beach"}}
        ]}"#,
    )
    .unwrap()
}

#[test]
fn existing_playlist_is_reused() {
    assert_eq!(
        playlist_id_by_title(&listing(), "GALLERY-Beach").as_deref(),
        Some("pl-2")
    );
}

#[test]
fn title_match_is_exact() {
    assert!(playlist_id_by_title(&listing(), "GALLERY-beach").is_none());
    assert!(playlist_id_by_title(&listing(), "Beach").is_none());
}

#[test]
fn empty_listing_yields_no_match() {
    let empty: PlaylistListResponse = serde_json::from_str(r#"{"items":[]}"#).unwrap();
    assert!(playlist_id_by_title(&empty, "GALLERY-Trip").is_none());
}
