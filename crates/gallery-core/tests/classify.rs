use gallery_core::classify::{MediaKind, classify};

#[test]
fn video_extensions_match() {
    for name in ["clip.mp4", "clip.mov", "clip.avi", "clip.mkv", "clip.webm"] {
        assert_eq!(classify(name), MediaKind::Video, "{name}");
    }
}

#[test]
fn image_extensions_match() {
    for name in [
        "shot.jpg",
        "shot.jpeg",
        "shot.png",
        "shot.gif",
        "shot.bmp",
        "shot.tiff",
    ] {
        assert_eq!(classify(name), MediaKind::Image, "{name}");
    }
}

#[test]
fn suffix_match_is_case_insensitive() {
    assert_eq!(classify("CLIP.MP4"), MediaKind::Video);
    assert_eq!(classify("holiday.WebM"), MediaKind::Video);
    assert_eq!(classify("photo.JPeG"), MediaKind::Image);
    assert_eq!(classify("scan.TIFF"), MediaKind::Image);
}

#[test]
fn everything_else_is_unsupported() {
    for name in [
        "notes.txt",
        "archive.tar.gz",
        "mp4",
        "movie.mp4.part",
        "noextension",
        "",
    ] {
        assert_eq!(classify(name), MediaKind::Unsupported, "{name:?}");
    }
}
