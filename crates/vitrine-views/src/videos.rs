//! Video gallery — home page, paginated gallery and single-video pages.
//!
//! Videos are discovered in the media directory and described entirely by
//! their file names: `YYYY-MM-DD_some-title.mp4`.

use std::path::Path;

use axum::extract::{Path as UrlPath, Query, State};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::AppState;
use crate::discovery::{discover_blocking, file_name};
use crate::error::ViewError;
use crate::pagination::{PageQuery, Paginated, paginate};

/// Extensions recognised as videos.
pub const VIDEO_PATTERNS: &[&str] = &["*.mp4", "*.webm", "*.mkv", "*.mov"];

/// URL prefix media files are served under.
pub const MEDIA_PREFIX: &str = "/media";

const HOME_LATEST: usize = 6;
const RELATED: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Video {
    pub slug: String,
    pub title: String,
    pub date: NaiveDate,
    pub file_name: String,
    pub format: String,
    /// Where the media file itself is served.
    pub url: String,
    /// Where the video's page lives.
    pub page_url: String,
}

impl Video {
    pub fn from_file_name(name: &str) -> Result<Self, ViewError> {
        if name.contains(['/', '\\']) {
            return Err(ViewError::malformed(name, "path separators are not allowed"));
        }

        let (stem, ext) = name
            .rsplit_once('.')
            .ok_or_else(|| ViewError::malformed(name, "missing extension"))?;
        let format = ext.to_ascii_lowercase();
        if !VIDEO_PATTERNS.iter().any(|p| p.trim_start_matches("*.") == format) {
            return Err(ViewError::malformed(name, "unsupported video format"));
        }

        let (date, words) = stem
            .split_once('_')
            .ok_or_else(|| ViewError::malformed(name, "expected DATE_title"))?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| ViewError::malformed(name, "date must be YYYY-MM-DD"))?;

        let title = title_case(words);
        if title.is_empty() {
            return Err(ViewError::malformed(name, "missing title"));
        }

        Ok(Self {
            slug: words.to_ascii_lowercase().replace('_', "-"),
            title,
            date,
            file_name: name.to_string(),
            format,
            url: format!("{MEDIA_PREFIX}/{name}"),
            page_url: format!("/videos/{name}"),
        })
    }
}

/// Scan `dir` for videos, newest first. Returns the videos and how many files
/// were skipped for not following the naming scheme.
pub async fn load_videos(dir: &Path) -> Result<(Vec<Video>, usize), ViewError> {
    let paths = discover_blocking(dir.to_path_buf(), VIDEO_PATTERNS).await?;

    let mut skipped = 0;
    let mut videos: Vec<Video> = paths
        .iter()
        .filter_map(|path| {
            let name = file_name(path)?;
            match Video::from_file_name(name) {
                Ok(video) => Some(video),
                Err(e) => {
                    warn!("Skipping video: {e}");
                    skipped += 1;
                    None
                }
            }
        })
        .collect();

    videos.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.title.cmp(&b.title)));
    Ok((videos, skipped))
}

// ─────────────────────────────────────────────────────────────────────────────
// View models
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Home {
    pub latest: Vec<Video>,
    pub video_count: usize,
}

#[derive(Debug, Serialize)]
pub struct Gallery {
    pub videos: Paginated<Video>,
    pub skipped: usize,
}

#[derive(Debug, Serialize)]
pub struct VideoPage {
    pub video: Video,
    pub related: Vec<Video>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

pub async fn home(State(state): State<AppState>) -> Result<Home, ViewError> {
    let (videos, _) = load_videos(&state.config.media_dir).await?;
    Ok(Home {
        video_count: videos.len(),
        latest: videos.into_iter().take(HOME_LATEST).collect(),
    })
}

pub async fn gallery(
    (State(state), Query(query)): (State<AppState>, Query<PageQuery>),
) -> Result<Gallery, ViewError> {
    let (videos, skipped) = load_videos(&state.config.media_dir).await?;
    Ok(Gallery {
        videos: paginate(videos, query.number(), state.config.page_size),
        skipped,
    })
}

pub async fn detail(
    (State(state), UrlPath(name)): (State<AppState>, UrlPath<String>),
) -> Result<VideoPage, ViewError> {
    let video = Video::from_file_name(&name)?;

    let path = state.config.media_dir.join(&video.file_name);
    if !tokio::fs::try_exists(&path).await? {
        return Err(ViewError::NotFound(format!("video {name}")));
    }

    let (videos, _) = load_videos(&state.config.media_dir).await?;
    let related = videos
        .into_iter()
        .filter(|v| v.file_name != video.file_name)
        .take(RELATED)
        .collect();

    Ok(VideoPage { video, related })
}

fn title_case(words: &str) -> String {
    words
        .split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
