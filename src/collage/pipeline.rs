use std::{cmp::Ordering, collections::HashSet};

use tracing::debug;

use super::{CollageConfig, CollageError, CollageGrid, SortKey, TrackSource};
use crate::{types::Track, utils};

/// Tracks requested per page.
pub const PAGE_SIZE: u32 = 50;

/// Image reference used for cells without a track.
pub const PLACEHOLDER_COVER: &str = "/images/default-cover.svg";

/// Pages through `source` until enough tracks are collected.
///
/// Pages are requested one after another with offsets `0, 50, 100, ...`.
/// Paging stops when the upstream reports no next page or when the
/// accumulator holds `config.track_limit()` tracks. With `unique_only` the
/// accumulator is deduplicated by album after every page, so a page full of
/// repeats does not count towards the limit. The result is truncated to the
/// track limit.
///
/// # Errors
///
/// The first failed page aborts the run; nothing accumulated so far is
/// returned.
pub async fn accumulate_tracks<S>(
    source: &S,
    config: &CollageConfig,
) -> Result<Vec<Track>, CollageError>
where
    S: TrackSource,
{
    let mut tracks = fetch_pages(source, config).await?;
    tracks.truncate(config.track_limit());
    Ok(tracks)
}

/// The paging loop behind [`accumulate_tracks`]. Keeps every track of the
/// last page, so the result can exceed the track limit.
async fn fetch_pages<S>(source: &S, config: &CollageConfig) -> Result<Vec<Track>, CollageError>
where
    S: TrackSource,
{
    let track_limit = config.track_limit();
    let mut tracks: Vec<Track> = Vec::new();
    let mut offset = 0;

    loop {
        let page = source
            .fetch_page(config.time_range, offset, PAGE_SIZE)
            .await?;
        debug!(offset, received = page.items.len(), "fetched top tracks page");

        tracks.extend(page.items);
        if config.unique_only {
            tracks = filter_unique_tracks(tracks);
        }

        if page.next.is_none() || tracks.len() >= track_limit {
            break;
        }
        offset += PAGE_SIZE;
    }

    Ok(tracks)
}

/// Keeps the first track of every album, preserving order.
pub fn filter_unique_tracks(mut tracks: Vec<Track>) -> Vec<Track> {
    let mut seen = HashSet::new();
    tracks.retain(|track| seen.insert(track.album.name.clone()));
    tracks
}

/// Stable sort by `key`.
///
/// [`SortKey::AlbumName`] compares track names, case-insensitively.
/// [`SortKey::MostPlayed`] keeps the upstream order, which is already ranked
/// by listening affinity.
pub fn sort_tracks(tracks: &mut [Track], key: SortKey) {
    match key {
        SortKey::Popularity => tracks.sort_by(|a, b| b.popularity.cmp(&a.popularity)),
        SortKey::ReleaseDate => tracks.sort_by(|a, b| {
            let a_date = utils::parse_release_date(&a.album.release_date);
            let b_date = utils::parse_release_date(&b.album.release_date);
            match (a_date, b_date) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }),
        SortKey::AlbumName => {
            tracks.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        }
        SortKey::MostPlayed => {}
    }
}

/// Largest cover per track. Tracks without art yield the placeholder.
pub fn track_images(tracks: &[Track]) -> Vec<String> {
    tracks
        .iter()
        .map(|track| {
            track
                .album
                .images
                .first()
                .map(|image| image.url.clone())
                .unwrap_or_else(|| PLACEHOLDER_COVER.to_string())
        })
        .collect()
}

/// Lays out exactly `size²` cells in row-major order.
pub fn create_collage(images: &[String], size: u32) -> CollageGrid {
    let length = (size as usize).pow(2);
    let cells = (0..length)
        .map(|i| {
            images
                .get(i)
                .cloned()
                .unwrap_or_else(|| PLACEHOLDER_COVER.to_string())
        })
        .collect();

    CollageGrid { size, cells }
}

/// Sorted tracks of a run together with their grid.
#[derive(Debug, Clone)]
pub struct Collage {
    pub tracks: Vec<Track>,
    pub grid: CollageGrid,
}

/// Runs the whole pipeline: accumulate, sort, extract covers, lay out.
///
/// Everything fetched is sorted before the grid takes its first `size²`
/// tracks; `Collage::tracks` holds exactly the tracks shown.
pub async fn build_collage<S>(source: &S, config: &CollageConfig) -> Result<Collage, CollageError>
where
    S: TrackSource,
{
    let mut tracks = fetch_pages(source, config).await?;
    sort_tracks(&mut tracks, config.sort_by);
    tracks.truncate(config.track_limit());
    let grid = create_collage(&track_images(&tracks), config.size);
    Ok(Collage { tracks, grid })
}
