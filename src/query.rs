use std::collections::HashSet;

use chrono::{DateTime, Datelike, Utc};

use crate::aggregate::{FAVORITES_ALBUM_ID, VIDEOS_ALBUM_ID};
use crate::models::{Album, Curated, CurationLimits, MediaGroup, MediaItem, ViewType};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

pub const DAYS_VIEW_WINDOW_DAYS: i64 = 30;

const SEARCH_SUGGESTIONS: &[&str] = &[
    "Summer vacation",
    "Family photos",
    "Screenshots",
    "Videos",
    "Camera",
    "Nature",
    "Portraits",
];

pub fn by_album(items: &[MediaItem], album_id: &str) -> Vec<MediaItem> {
    match album_id {
        FAVORITES_ALBUM_ID => items.iter().filter(|item| item.is_favorite).cloned().collect(),
        VIDEOS_ALBUM_ID => items.iter().filter(|item| item.is_video()).cloned().collect(),
        _ => items
            .iter()
            .filter(|item| item.bucket_id == album_id)
            .cloned()
            .collect(),
    }
}

/// Case-insensitive substring match on the file name or the bucket name.
/// A blank query matches nothing.
pub fn search(items: &[MediaItem], query: &str) -> Vec<MediaItem> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| {
            item.display_name.to_lowercase().contains(&needle)
                || item.bucket_display_name.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

pub fn temporal_view(kind: ViewType, items: &[MediaItem], now: DateTime<Utc>) -> Vec<MediaItem> {
    temporal_view_with_window(kind, items, now, DAYS_VIEW_WINDOW_DAYS)
}

pub fn temporal_view_with_window(
    kind: ViewType,
    items: &[MediaItem],
    now: DateTime<Utc>,
    days_window: i64,
) -> Vec<MediaItem> {
    match kind {
        ViewType::AllPhotos => items.to_vec(),
        ViewType::Days => {
            let cutoff = window_start(now, days_window);
            items
                .iter()
                .filter(|item| item.date_taken > cutoff)
                .cloned()
                .collect()
        }
        ViewType::Months => first_per_key(items, month_key),
        ViewType::Years => first_per_key(items, year_key),
    }
}

pub fn curated(items: &[MediaItem], now: DateTime<Utc>, limits: &CurationLimits) -> Curated {
    let favorites = items
        .iter()
        .filter(|item| item.is_favorite)
        .take(limits.favorite_limit)
        .cloned()
        .collect();
    let cutoff = window_start(now, limits.recent_window_days);
    let recent = items
        .iter()
        .filter(|item| item.date_taken > cutoff)
        .take(limits.recent_limit)
        .cloned()
        .collect();
    Curated { favorites, recent }
}

/// Splits sections for the grid header rows. Sections appear in the order
/// their first item appears in `items`.
pub fn group_by_view(kind: ViewType, items: &[MediaItem]) -> Vec<MediaGroup> {
    if items.is_empty() {
        return Vec::new();
    }
    if kind == ViewType::AllPhotos {
        return vec![MediaGroup {
            title: "All Photos".to_string(),
            date: items[0].date_taken,
            items: items.to_vec(),
        }];
    }

    let mut groups: Vec<(Option<(i32, u32, u32)>, MediaGroup)> = Vec::new();
    for item in items {
        let key = day_key(item).map(|(y, m, d)| match kind {
            ViewType::Years => (y, 0, 0),
            ViewType::Months => (y, m, 0),
            _ => (y, m, d),
        });
        match groups.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, group)) => group.items.push(item.clone()),
            None => groups.push((
                key,
                MediaGroup {
                    title: group_title(kind, item),
                    date: item.date_taken,
                    items: vec![item.clone()],
                },
            )),
        }
    }
    groups.into_iter().map(|(_, group)| group).collect()
}

pub fn partition_albums(albums: &[Album]) -> (Vec<Album>, Vec<Album>) {
    albums.iter().cloned().partition(|album| !album.is_default)
}

pub fn search_suggestions() -> Vec<String> {
    SEARCH_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
}

fn window_start(now: DateTime<Utc>, days: i64) -> i64 {
    now.timestamp_millis().saturating_sub(days.saturating_mul(DAY_MS))
}

fn first_per_key<K, F>(items: &[MediaItem], key: F) -> Vec<MediaItem>
where
    K: Eq + std::hash::Hash,
    F: Fn(&MediaItem) -> K,
{
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|&item| seen.insert(key(item)))
        .cloned()
        .collect()
}

fn day_key(item: &MediaItem) -> Option<(i32, u32, u32)> {
    item.date_taken_utc().map(|dt| (dt.year(), dt.month(), dt.day()))
}

fn month_key(item: &MediaItem) -> Option<(i32, u32)> {
    item.date_taken_utc().map(|dt| (dt.year(), dt.month()))
}

fn year_key(item: &MediaItem) -> Option<i32> {
    item.date_taken_utc().map(|dt| dt.year())
}

fn group_title(kind: ViewType, item: &MediaItem) -> String {
    let Some(dt) = item.date_taken_utc() else {
        return "Unknown date".to_string();
    };
    match kind {
        ViewType::Years => dt.format("%Y").to_string(),
        ViewType::Months => dt.format("%B %Y").to_string(),
        _ => dt.format("%b %-d, %Y").to_string(),
    }
}
