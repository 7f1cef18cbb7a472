//! Package channel listing.
//!
//! Archives in the channel directory are named `name-version-build.ext`; the
//! last two dash-separated fields are version and build, so package names
//! may themselves contain dashes.

use std::path::Path;

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::AppState;
use crate::discovery::{discover_blocking, file_name};
use crate::error::ViewError;
use crate::pagination::{PageQuery, Paginated, paginate};

pub const PACKAGE_PATTERNS: &[&str] = &["*.tar.bz2", "*.conda"];

const FORMATS: &[(&str, &str)] = &[(".tar.bz2", "tar.bz2"), (".conda", "conda")];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    pub name: String,
    pub version: String,
    pub build: String,
    pub file_name: String,
    pub format: String,
}

impl Package {
    pub fn from_file_name(file: &str) -> Result<Self, ViewError> {
        let lower = file.to_ascii_lowercase();
        let (stem, format) = FORMATS
            .iter()
            .find(|(suffix, _)| lower.ends_with(suffix))
            .map(|(suffix, format)| (&file[..file.len() - suffix.len()], *format))
            .ok_or_else(|| ViewError::malformed(file, "unsupported package format"))?;

        let mut fields = stem.rsplitn(3, '-');
        let (Some(build), Some(version), Some(name)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(ViewError::malformed(file, "expected name-version-build"));
        };
        if name.is_empty() || version.is_empty() || build.is_empty() {
            return Err(ViewError::malformed(file, "expected name-version-build"));
        }

        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
            build: build.to_string(),
            file_name: file.to_string(),
            format: format.to_string(),
        })
    }
}

/// All well-formed packages in `dir`, ordered by name then version.
pub async fn load_packages(dir: &Path) -> Result<Vec<Package>, ViewError> {
    let paths = discover_blocking(dir.to_path_buf(), PACKAGE_PATTERNS).await?;

    let mut packages: Vec<Package> = paths
        .iter()
        .filter_map(|path| file_name(path))
        .filter_map(|name| match Package::from_file_name(name) {
            Ok(pkg) => Some(pkg),
            Err(e) => {
                warn!("Skipping package: {e}");
                None
            }
        })
        .collect();

    packages.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.version.cmp(&b.version)));
    Ok(packages)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageQuery {
    pub page: Option<usize>,
    /// Case-insensitive substring filter on package names.
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChannelListing {
    pub channel: String,
    pub query: Option<String>,
    pub packages: Paginated<Package>,
}

pub async fn listing(
    (State(state), Query(query)): (State<AppState>, Query<PackageQuery>),
) -> Result<ChannelListing, ViewError> {
    let dir = &state.config.channel_dir;
    let mut packages = load_packages(dir).await?;

    let filter = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);
    if let Some(needle) = &filter {
        packages.retain(|p| p.name.to_lowercase().contains(needle.as_str()));
    }

    let page = PageQuery { page: query.page }.number();
    Ok(ChannelListing {
        channel: dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| dir.display().to_string()),
        query: filter,
        packages: paginate(packages, page, state.config.page_size),
    })
}
