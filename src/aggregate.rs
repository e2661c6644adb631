use std::collections::HashMap;

use tracing::debug;

use crate::models::{Album, AlbumType, MediaItem, MediaKind, MergedSet, RawMediaRow};
use crate::normalize::normalize;

pub const FAVORITES_ALBUM_ID: &str = "favorites";
pub const VIDEOS_ALBUM_ID: &str = "videos";

/// Normalizes both sources, merges them newest first and derives albums.
pub fn aggregate(photo_rows: &[RawMediaRow], video_rows: &[RawMediaRow]) -> MergedSet {
    let mut items = Vec::with_capacity(photo_rows.len() + video_rows.len());
    let mut skipped = 0usize;
    for (kind, rows) in [(MediaKind::Photo, photo_rows), (MediaKind::Video, video_rows)] {
        for row in rows {
            match normalize(kind, row) {
                Ok(item) => items.push(item),
                Err(err) => {
                    skipped += 1;
                    debug!(kind = kind.as_str(), error = %err, "skipping media row");
                }
            }
        }
    }
    sort_newest_first(&mut items);
    let albums = build_albums(&items);
    MergedSet {
        items,
        albums,
        skipped,
    }
}

/// Stable: items sharing a `date_taken` keep their concatenation order.
pub fn sort_newest_first(items: &mut [MediaItem]) {
    items.sort_by(|a, b| b.date_taken.cmp(&a.date_taken));
}

pub fn classify_bucket(bucket_name: &str) -> AlbumType {
    match bucket_name.to_lowercase().as_str() {
        "camera" => AlbumType::CameraRoll,
        "screenshots" => AlbumType::Screenshots,
        "download" | "downloads" => AlbumType::Downloads,
        _ => AlbumType::UserCreated,
    }
}

/// Bucket albums plus the synthetic Favorites/Videos albums, sorted by name.
pub fn build_albums(items: &[MediaItem]) -> Vec<Album> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<(&MediaItem, usize)> = Vec::new();
    for item in items {
        match index.get(item.bucket_id.as_str()) {
            Some(&slot) => buckets[slot].1 += 1,
            None => {
                index.insert(item.bucket_id.as_str(), buckets.len());
                buckets.push((item, 1));
            }
        }
    }

    let mut albums: Vec<Album> = buckets
        .into_iter()
        .map(|(first, count)| Album {
            id: first.bucket_id.clone(),
            name: first.bucket_display_name.clone(),
            cover_locator: Some(first.locator.clone()),
            item_count: count,
            is_default: false,
            album_type: classify_bucket(&first.bucket_display_name),
        })
        .collect();

    if let Some(album) = synthetic_album(
        items,
        FAVORITES_ALBUM_ID,
        "Favorites",
        AlbumType::Favorites,
        |item| item.is_favorite,
    ) {
        albums.push(album);
    }
    if let Some(album) = synthetic_album(
        items,
        VIDEOS_ALBUM_ID,
        "Videos",
        AlbumType::Videos,
        MediaItem::is_video,
    ) {
        albums.push(album);
    }

    albums.sort_by(|a, b| a.name.cmp(&b.name));
    albums
}

fn synthetic_album<F>(
    items: &[MediaItem],
    id: &str,
    name: &str,
    album_type: AlbumType,
    predicate: F,
) -> Option<Album>
where
    F: Fn(&MediaItem) -> bool,
{
    let mut matching = items.iter().filter(|&item| predicate(item));
    let first = matching.next()?;
    Some(Album {
        id: id.to_string(),
        name: name.to_string(),
        cover_locator: Some(first.locator.clone()),
        item_count: 1 + matching.count(),
        is_default: true,
        album_type,
    })
}
