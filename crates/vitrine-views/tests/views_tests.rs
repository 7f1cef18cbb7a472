//! Page tests — file-name parsing, settings validation, and every route
//! rendered through the shipped templates with the full HTTP stack.

use std::path::{Path, PathBuf};

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use tempfile::TempDir;
use tower::ServiceExt;
use vitrine_http::{ServerConfig, build_router};
use vitrine_render::{JinjaTemplates, Renderer};
use vitrine_views::account::SettingsForm;
use vitrine_views::discovery::discover;
use vitrine_views::packages::Package;
use vitrine_views::videos::Video;
use vitrine_views::{AppState, SettingsStore, ViewError, app_router};

// ─────────────────────────────────────────────────────────────────────────────
// Fixtures
// ─────────────────────────────────────────────────────────────────────────────

fn templates_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../templates")
}

struct Fixture {
    _media: TempDir,
    _channel: TempDir,
    state: AppState,
    router: Router,
}

fn fixture(videos: &[&str], packages: &[&str], page_size: usize) -> Fixture {
    let media = TempDir::new().unwrap();
    for name in videos {
        std::fs::write(media.path().join(name), b"not really a video").unwrap();
    }
    let channel = TempDir::new().unwrap();
    for name in packages {
        std::fs::write(channel.path().join(name), b"archive").unwrap();
    }

    let config = ServerConfig {
        templates_dir: templates_dir(),
        media_dir: media.path().to_path_buf(),
        channel_dir: channel.path().to_path_buf(),
        page_size,
        ..ServerConfig::default()
    };

    let renderer = Renderer::new(JinjaTemplates::from_dir(&config.templates_dir));
    let state = AppState::new(renderer, config.clone());
    let router = build_router(app_router(state.clone()), &config);

    Fixture {
        _media: media,
        _channel: channel,
        state,
        router,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, String, Response<()>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    (
        parts.status,
        String::from_utf8(bytes.to_vec()).unwrap(),
        Response::from_parts(parts, ()),
    )
}

async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
    let (status, body, _) = send(router, Request::get(uri).body(Body::empty()).unwrap()).await;
    (status, body)
}

async fn get_partial(router: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::get(uri)
        .header("HX-Request", "true")
        .body(Body::empty())
        .unwrap();
    let (status, body, _) = send(router, request).await;
    (status, body)
}

async fn post_form(router: &Router, uri: &str, form: &str) -> (StatusCode, String) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    let (status, body, _) = send(router, request).await;
    (status, body)
}

const VIDEOS: &[&str] = &[
    "2024-03-01_big-buck-bunny.mp4",
    "2024-05-12_sintel.webm",
    "2023-11-30_tears_of_steel.mkv",
];

const PACKAGES: &[&str] = &[
    "numpy-1.26.4-py312h_0.conda",
    "python-dateutil-2.8.2-pyhd8ed1ab_0.tar.bz2",
    "requests-2.31.0-pyhd8ed1ab_0.tar.bz2",
];

// ─────────────────────────────────────────────────────────────────────────────
// Parsing
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn video_file_names_are_parsed() {
    let video = Video::from_file_name("2024-03-01_big-buck-bunny.mp4").unwrap();
    assert_eq!(video.title, "Big Buck Bunny");
    assert_eq!(video.slug, "big-buck-bunny");
    assert_eq!(video.date.to_string(), "2024-03-01");
    assert_eq!(video.format, "mp4");
    assert_eq!(video.url, "/media/2024-03-01_big-buck-bunny.mp4");
    assert_eq!(video.page_url, "/videos/2024-03-01_big-buck-bunny.mp4");

    let video = Video::from_file_name("2023-11-30_tears_of_steel.MKV").unwrap();
    assert_eq!(video.title, "Tears Of Steel");
    assert_eq!(video.format, "mkv");
}

#[test]
fn malformed_video_names_are_rejected() {
    for name in [
        "holiday.mp4",
        "2024-13-01_bad-month.mp4",
        "2024-01-01_.mp4",
        "2024-01-01_notes.txt",
        "no-extension",
        "../2024-01-01_escape.mp4",
    ] {
        let err = Video::from_file_name(name).unwrap_err();
        assert!(
            matches!(err, ViewError::MalformedName { .. }),
            "{name} should be malformed, got {err:?}"
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}

#[test]
fn package_names_may_contain_dashes() {
    let pkg = Package::from_file_name("python-dateutil-2.8.2-pyhd8ed1ab_0.tar.bz2").unwrap();
    assert_eq!(pkg.name, "python-dateutil");
    assert_eq!(pkg.version, "2.8.2");
    assert_eq!(pkg.build, "pyhd8ed1ab_0");
    assert_eq!(pkg.format, "tar.bz2");

    let pkg = Package::from_file_name("numpy-1.26.4-py312h_0.conda").unwrap();
    assert_eq!(pkg.format, "conda");
}

#[test]
fn malformed_package_names_are_rejected() {
    assert!(Package::from_file_name("numpy.tar.bz2").is_err());
    assert!(Package::from_file_name("numpy-1.0.tar.bz2").is_err());
    assert!(Package::from_file_name("numpy-1.0-0.zip").is_err());
    assert!(Package::from_file_name("-1.0-0.conda").is_err());
}

#[test]
fn discovery_unions_patterns_in_order() {
    let dir = TempDir::new().unwrap();
    for name in ["b.mp4", "a.webm", "c.txt"] {
        std::fs::write(dir.path().join(name), b"").unwrap();
    }
    std::fs::create_dir(dir.path().join("d.mp4")).unwrap();

    let found = discover(dir.path(), &["*.mp4", "*.webm", "*.mp4"]).unwrap();
    let names: Vec<_> = found
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["a.webm", "b.mp4"]);

    assert!(discover(&dir.path().join("missing"), &["*.mp4"]).unwrap().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn settings_form_validation_reports_each_field() {
    let form = SettingsForm {
        display_name: "  ".into(),
        email: "nope".into(),
        theme: "neon".into(),
        notifications: None,
    };

    let errors = form.validate().unwrap_err();
    assert_eq!(errors.len(), 3);
    assert!(errors.contains_key("display_name"));
    assert!(errors.contains_key("email"));
    assert!(errors.contains_key("theme"));
}

#[test]
fn settings_store_applies_only_valid_updates() {
    let store = SettingsStore::default();
    let before = store.get();

    let bad = SettingsForm {
        email: "missing-at".into(),
        ..SettingsForm::default()
    };
    assert!(store.update(&bad).is_err());
    assert_eq!(store.get(), before);

    let good = SettingsForm {
        display_name: "Ada".into(),
        email: "ada@example.com".into(),
        theme: "dark".into(),
        notifications: Some("on".into()),
    };
    let saved = store.update(&good).unwrap();
    assert_eq!(saved.display_name, "Ada");
    assert!(saved.notifications);
    assert_eq!(store.get(), saved);
}

// ─────────────────────────────────────────────────────────────────────────────
// Pages
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn home_page_renders_full_document() {
    let fx = fixture(VIDEOS, &[], 12);
    let request = Request::get("/").body(Body::empty()).unwrap();
    let (status, body, head) = send(&fx.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(
        head.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    assert!(body.contains("<!DOCTYPE html>"));
    assert!(body.contains("Demo Stream"));
    assert!(body.contains("3 videos in the library."));
    // Newest first.
    let sintel = body.find("Sintel").unwrap();
    let bunny = body.find("Big Buck Bunny").unwrap();
    assert!(sintel < bunny);
}

#[tokio::test]
async fn partial_requests_skip_the_layout() {
    let fx = fixture(VIDEOS, &[], 12);
    let (status, body) = get_partial(&fx.router, "/videos").await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains("<!DOCTYPE html>"));
    assert!(!body.contains("<nav hx-target"));
    assert!(body.contains("Tears Of Steel"));
}

#[tokio::test]
async fn gallery_is_paginated_and_skips_malformed_files() {
    let mut files = VIDEOS.to_vec();
    files.push("untitled.mp4");
    let fx = fixture(&files, &[], 2);

    let (status, body) = get(&fx.router, "/videos").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Sintel"));
    assert!(body.contains("Big Buck Bunny"));
    assert!(!body.contains("Tears Of Steel"));
    assert!(body.contains("Page 1 of 2"));
    assert!(body.contains("1 file skipped."));

    let (_, body) = get(&fx.router, "/videos?page=2").await;
    assert!(body.contains("Tears Of Steel"));
    assert!(body.contains("Page 2 of 2"));
}

#[tokio::test]
async fn video_page_shows_player_and_related() {
    let fx = fixture(VIDEOS, &[], 12);
    let (status, body) = get(&fx.router, "/videos/2024-05-12_sintel.webm").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h1>Sintel</h1>"));
    assert!(body.contains(r#"src="/media/2024-05-12_sintel.webm""#));
    assert!(body.contains("More videos"));
    assert!(body.contains("Big Buck Bunny"));
}

#[tokio::test]
async fn malformed_video_name_is_bad_request() {
    let fx = fixture(VIDEOS, &[], 12);
    let (status, body) = get(&fx.router, "/videos/holiday.mp4").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("malformed file name"));
}

#[tokio::test]
async fn unknown_video_is_not_found() {
    let fx = fixture(VIDEOS, &[], 12);
    let (status, _) = get(&fx.router, "/videos/2020-01-01_missing.mp4").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn media_files_are_served() {
    let fx = fixture(VIDEOS, &[], 12);
    let (status, body) = get(&fx.router, "/media/2024-03-01_big-buck-bunny.mp4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "not really a video");
}

#[tokio::test]
async fn packages_are_listed_and_filtered() {
    let fx = fixture(&[], PACKAGES, 12);

    let (status, body) = get(&fx.router, "/packages").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("numpy"));
    assert!(body.contains("python-dateutil"));
    assert!(body.contains("3 packages"));

    let (_, body) = get(&fx.router, "/packages?q=DATE").await;
    assert!(body.contains("python-dateutil"));
    assert!(!body.contains("<td>numpy</td>"));
    assert!(body.contains("1 package</p>"));
}

#[tokio::test]
async fn account_form_round_trip() {
    let fx = fixture(&[], &[], 12);

    let (status, body) = get(&fx.router, "/account").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"value="Guest""#));

    let (status, body) = post_form(
        &fx.router,
        "/account",
        "display_name=Ada&email=ada%40example.com&theme=dark&notifications=on",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Settings saved."));
    assert!(body.contains(r#"value="Ada""#));
    assert_eq!(fx.state.settings.get().theme, "dark");

    let (_, body) = get(&fx.router, "/account").await;
    assert!(body.contains(r#"value="Ada""#));
}

#[tokio::test]
async fn invalid_account_form_is_unprocessable() {
    let fx = fixture(&[], &[], 12);

    let (status, body) = post_form(&fx.router, "/account", "display_name=&email=nope&theme=dark").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("Display name is required"));
    assert!(body.contains("Enter a valid email address"));
    assert!(!body.contains("Settings saved."));
    assert_eq!(fx.state.settings.get().display_name, "Guest");
}

#[tokio::test]
async fn unknown_routes_render_not_found_page() {
    let fx = fixture(&[], &[], 12);
    let (status, body) = get(&fx.router, "/nowhere").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("<h1>Not found</h1>"));
    assert!(body.contains("nowhere"));
}

#[tokio::test]
async fn upper_case_extensions_are_listed() {
    let fx = fixture(&["2024-06-01_holiday-reel.MP4", "2024-05-12_sintel.webm"], &[], 12);

    let (status, body) = get(&fx.router, "/videos").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Holiday Reel"));
    assert!(!body.contains("skipped"));

    let (_, home) = get(&fx.router, "/").await;
    assert!(home.contains("2 videos in the library."));

    let (status, page) = get(&fx.router, "/videos/2024-06-01_holiday-reel.MP4").await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains(r#"src="/media/2024-06-01_holiday-reel.MP4""#));
}

#[test]
fn discovery_ignores_case() {
    let dir = TempDir::new().unwrap();
    for name in ["LOUD.MP4", "quiet.mp4", "Mixed.WebM"] {
        std::fs::write(dir.path().join(name), b"").unwrap();
    }

    let found = discover(dir.path(), &["*.mp4", "*.webm"]).unwrap();
    assert_eq!(found.len(), 3);

    let pkg = Package::from_file_name("zlib-1.3.1-h4ab18f5_1.CONDA").unwrap();
    assert_eq!(pkg.name, "zlib");
    assert_eq!(pkg.build, "h4ab18f5_1");
    assert_eq!(pkg.format, "conda");
}

#[tokio::test]
async fn package_page_zero_means_first_page() {
    let fx = fixture(&[], PACKAGES, 2);

    let (status, body) = get(&fx.router, "/packages?page=0").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Page 1 of 2"));
    assert!(body.contains("<td>numpy</td>"));
}

#[tokio::test]
async fn unreadable_media_directory_is_a_server_error() {
    // A regular file where the media directory should be: lookups fail with
    // "not a directory" rather than "not found".
    let scratch = TempDir::new().unwrap();
    let not_a_dir = scratch.path().join("media");
    std::fs::write(&not_a_dir, b"").unwrap();

    let config = ServerConfig {
        templates_dir: templates_dir(),
        media_dir: not_a_dir,
        ..ServerConfig::default()
    };
    let renderer = Renderer::new(JinjaTemplates::from_dir(&config.templates_dir));
    let router = build_router(app_router(AppState::new(renderer, config.clone())), &config);

    let (status, body) = get(&router, "/videos/2024-05-12_sintel.webm").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("I/O error"));
}
