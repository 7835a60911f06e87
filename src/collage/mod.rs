//! # Collage Pipeline
//!
//! Turns a user's top tracks into an N×N cover-art grid.
//!
//! ```text
//! TrackSource (proxy / upstream)
//!      ↓  accumulate_tracks   paginate, 50 per page, optional album dedup
//!      ↓  sort_tracks         popularity | release_date | album_name | most_played
//!      ↓  track_images        largest cover per track
//!      ↓  create_collage      exactly N² cells, placeholder backfill
//! Renderer (HTML grid / raster PNG) → export
//! ```
//!
//! The pipeline never knows where tracks come from or how the grid is drawn:
//! [`TrackSource`] and [`Renderer`] are the two seams. The web pages plug in
//! the upstream API and [`HtmlRenderer`]; the command-line client plugs in the
//! app's own proxy endpoint and [`RasterRenderer`].

mod pipeline;
mod render;
mod settings;
mod source;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spotify::UpstreamError;

pub use pipeline::{
    Collage, PAGE_SIZE, PLACEHOLDER_COVER, accumulate_tracks, build_collage, create_collage,
    filter_unique_tracks, sort_tracks, track_images,
};
pub use render::{Export, HtmlRenderer, RasterRenderer, RenderError, Renderer, TILE_SIZE};
pub use settings::{CollageSettings, SettingKind, SettingsQuery};
pub use source::{ProxyTrackSource, TrackSource, UpstreamTrackSource};

#[derive(Debug, Error)]
pub enum CollageError {
    #[error("failed to fetch top tracks: {0}")]
    Fetch(#[from] UpstreamError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    #[default]
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl TimeRange {
    pub const ALL: [TimeRange; 3] = [
        TimeRange::ShortTerm,
        TimeRange::MediumTerm,
        TimeRange::LongTerm,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "short_term",
            TimeRange::MediumTerm => "medium_term",
            TimeRange::LongTerm => "long_term",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "Last 4 Months",
            TimeRange::MediumTerm => "Last 6 Months",
            TimeRange::LongTerm => "Last Year",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRange::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| format!("invalid time range '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Popularity,
    ReleaseDate,
    /// Orders by *track* name. The key keeps its historical label.
    AlbumName,
    MostPlayed,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::Popularity,
        SortKey::ReleaseDate,
        SortKey::AlbumName,
        SortKey::MostPlayed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Popularity => "popularity",
            SortKey::ReleaseDate => "release_date",
            SortKey::AlbumName => "album_name",
            SortKey::MostPlayed => "most_played",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Popularity => "Popularity",
            SortKey::ReleaseDate => "Release Date",
            SortKey::AlbumName => "Album Name",
            SortKey::MostPlayed => "Most Played",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| format!("invalid sort key '{s}'"))
    }
}

/// Grid sizes offered in the UI.
pub const COLLAGE_SIZES: [u32; 4] = [3, 5, 7, 10];

/// Parameters of one collage generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollageConfig {
    /// Grid dimension; the collage is `size × size`.
    pub size: u32,
    pub time_range: TimeRange,
    pub sort_by: SortKey,
    /// Keep at most one track per album.
    pub unique_only: bool,
}

impl Default for CollageConfig {
    fn default() -> Self {
        Self {
            size: COLLAGE_SIZES[0],
            time_range: TimeRange::default(),
            sort_by: SortKey::default(),
            unique_only: false,
        }
    }
}

impl CollageConfig {
    pub fn track_limit(&self) -> usize {
        (self.size as usize).pow(2)
    }
}

/// Row-major grid of image references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollageGrid {
    pub size: u32,
    pub cells: Vec<String>,
}

impl CollageGrid {
    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.cells.chunks(self.size.max(1) as usize)
    }
}
