use chrono::{DateTime, Duration, TimeZone, Utc};
use gallery_core::models::{CurationLimits, MediaItem, MediaKind, ViewType};
use gallery_core::query::{
    by_album, curated, group_by_view, partition_albums, search, search_suggestions, temporal_view,
};
use gallery_core::aggregate::build_albums;

fn item(id: i64, name: &str, bucket: &str, taken: i64) -> MediaItem {
    MediaItem {
        id,
        kind: MediaKind::Photo,
        locator: MediaKind::Photo.locator_for(id),
        display_name: name.to_string(),
        date_taken: taken,
        date_modified: taken,
        size_bytes: 2048,
        mime_type: "image/jpeg".to_string(),
        width: 10,
        height: 20,
        duration_ms: 0,
        bucket_id: bucket.to_lowercase(),
        bucket_display_name: bucket.to_string(),
        is_favorite: false,
        is_selected: false,
    }
}

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).single().expect("valid date")
}

fn sample() -> Vec<MediaItem> {
    let mut favorite = item(2, "beach.jpg", "MyTrip", at(2024, 3, 5).timestamp_millis());
    favorite.is_favorite = true;
    let mut clip = item(4, "clip.mp4", "Camera", at(2024, 2, 20).timestamp_millis());
    clip.kind = MediaKind::Video;
    clip.mime_type = "video/mp4".to_string();
    clip.duration_ms = 4000;
    vec![
        item(1, "IMG_0001.jpg", "Camera", at(2024, 3, 30).timestamp_millis()),
        favorite,
        item(3, "Screenshot_1.png", "Screenshots", at(2024, 3, 1).timestamp_millis()),
        clip,
        item(5, "old.jpg", "Camera", at(2023, 12, 1).timestamp_millis()),
    ]
}

#[test]
fn blank_queries_match_nothing() {
    let items = sample();
    assert!(search(&items, "").is_empty());
    assert!(search(&items, "   ").is_empty());
    assert!(search(&[], "camera").is_empty());
}

#[test]
fn search_matches_name_or_bucket_case_insensitively() {
    let items = sample();
    for query in ["CAMERA", "img", "trip", ".jpg", "zzz"] {
        let hits = search(&items, query);
        let needle = query.to_lowercase();
        for hit in &hits {
            assert!(items.contains(hit));
            assert!(
                hit.display_name.to_lowercase().contains(&needle)
                    || hit.bucket_display_name.to_lowercase().contains(&needle)
            );
        }
        let expected = items
            .iter()
            .filter(|i| {
                i.display_name.to_lowercase().contains(&needle)
                    || i.bucket_display_name.to_lowercase().contains(&needle)
            })
            .count();
        assert_eq!(hits.len(), expected);
    }
    let ids: Vec<i64> = search(&items, "camera").iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![1, 4, 5]);
}

#[test]
fn by_album_resolves_synthetic_and_bucket_ids() {
    let items = sample();
    let favorites = by_album(&items, "favorites");
    assert_eq!(favorites.len(), 1);
    assert!(favorites.iter().all(|i| i.is_favorite));
    assert!(by_album(&[], "favorites").is_empty());

    let videos = by_album(&items, "videos");
    assert_eq!(videos.iter().map(|i| i.id).collect::<Vec<_>>(), vec![4]);

    let camera = by_album(&items, "camera");
    assert_eq!(camera.len(), 3);
    assert!(by_album(&items, "missing").is_empty());
}

#[test]
fn days_view_keeps_the_trailing_window() {
    let now = at(2024, 3, 31);
    let edge = (now - Duration::days(30)).timestamp_millis();
    let items = vec![
        item(1, "in.jpg", "A", edge + 1),
        item(2, "edge.jpg", "A", edge),
        item(3, "out.jpg", "A", edge - 1),
    ];
    let days = temporal_view(ViewType::Days, &items, now);
    assert_eq!(days.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1]);
}

#[test]
fn months_and_years_take_the_first_item_per_bucket() {
    let items = sample();
    let now = at(2024, 3, 31);
    let months: Vec<i64> = temporal_view(ViewType::Months, &items, now)
        .iter()
        .map(|i| i.id)
        .collect();
    assert_eq!(months, vec![1, 4, 5]);
    let years: Vec<i64> = temporal_view(ViewType::Years, &items, now)
        .iter()
        .map(|i| i.id)
        .collect();
    assert_eq!(years, vec![1, 5]);
    assert_eq!(temporal_view(ViewType::AllPhotos, &items, now), items);
}

#[test]
fn curated_truncates_favorites_in_order() {
    let now = at(2024, 3, 31);
    let items: Vec<MediaItem> = (1..=12)
        .map(|id| {
            let mut fav = item(id, "f.jpg", "A", at(2020, 1, 1).timestamp_millis() - id);
            fav.is_favorite = true;
            fav
        })
        .collect();
    let picked = curated(&items, now, &CurationLimits::default());
    assert_eq!(picked.favorites.len(), 10);
    assert_eq!(
        picked.favorites.iter().map(|i| i.id).collect::<Vec<_>>(),
        (1..=10).collect::<Vec<_>>()
    );
    assert!(picked.recent.is_empty());
}

#[test]
fn curated_recent_uses_the_seven_day_window() {
    let items = sample();
    let picked = curated(&items, at(2024, 3, 31), &CurationLimits::default());
    assert_eq!(picked.recent.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1]);
    assert_eq!(picked.favorites.iter().map(|i| i.id).collect::<Vec<_>>(), vec![2]);

    let tight = CurationLimits {
        favorite_limit: 0,
        recent_limit: 1,
        recent_window_days: 60,
    };
    let picked = curated(&items, at(2024, 3, 31), &tight);
    assert!(picked.favorites.is_empty());
    assert_eq!(picked.recent.len(), 1);
}

#[test]
fn groups_carry_calendar_titles() {
    let items = sample();
    let months = group_by_view(ViewType::Months, &items);
    let titles: Vec<&str> = months.iter().map(|g| g.title.as_str()).collect();
    assert_eq!(titles, vec!["March 2024", "February 2024", "December 2023"]);
    assert_eq!(months[0].items.len(), 3);
    assert_eq!(months[0].date, items[0].date_taken);

    let days = group_by_view(ViewType::Days, &items[..2]);
    assert_eq!(days[0].title, "Mar 30, 2024");
    assert_eq!(days[1].title, "Mar 5, 2024");

    let years = group_by_view(ViewType::Years, &items);
    assert_eq!(years.iter().map(|g| g.title.as_str()).collect::<Vec<_>>(), vec!["2024", "2023"]);

    let all = group_by_view(ViewType::AllPhotos, &items);
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "All Photos");
    assert!(group_by_view(ViewType::Days, &[]).is_empty());
}

#[test]
fn partition_splits_user_and_default_albums() {
    let albums = build_albums(&sample());
    let (user, default) = partition_albums(&albums);
    assert_eq!(
        user.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(),
        vec!["Camera", "MyTrip", "Screenshots"]
    );
    assert_eq!(
        default.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(),
        vec!["Favorites", "Videos"]
    );
}

#[test]
fn suggestions_are_fixed() {
    let suggestions = search_suggestions();
    assert_eq!(suggestions.len(), 7);
    assert_eq!(suggestions[0], "Summer vacation");
}
