use gallery_core::aggregate::{aggregate, build_albums, FAVORITES_ALBUM_ID, VIDEOS_ALBUM_ID};
use gallery_core::models::{AlbumType, MediaKey, RawMediaRow};
use gallery_core::overlay::Overlay;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

fn photo(id: i64, bucket_id: &str, bucket: &str, taken: i64) -> RawMediaRow {
    RawMediaRow {
        id: Some(id),
        display_name: Some(format!("IMG_{}.jpg", id)),
        date_taken: Some(taken),
        date_modified: Some(taken / 1000),
        size: Some(1024),
        mime_type: Some("image/jpeg".to_string()),
        width: Some(100),
        height: Some(100),
        duration: None,
        bucket_id: Some(bucket_id.to_string()),
        bucket_display_name: Some(bucket.to_string()),
    }
}

fn video(id: i64, bucket_id: &str, bucket: &str, taken: i64, duration: i64) -> RawMediaRow {
    RawMediaRow {
        display_name: Some(format!("VID_{}.mp4", id)),
        mime_type: Some("video/mp4".to_string()),
        duration: Some(duration),
        ..photo(id, bucket_id, bucket, taken)
    }
}

#[test]
fn camera_photo_and_video_merge_into_one_album() {
    let merged = aggregate(
        &[photo(1, "cam", "Camera", 200)],
        &[video(2, "cam", "Camera", 100, 5000)],
    );
    let ids: Vec<i64> = merged.items.iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(merged.items[1].duration_ms, 5000);

    let camera: Vec<_> = merged.albums.iter().filter(|a| a.id == "cam").collect();
    assert_eq!(camera.len(), 1);
    assert_eq!(camera[0].name, "Camera");
    assert_eq!(camera[0].album_type, AlbumType::CameraRoll);
    assert_eq!(camera[0].item_count, 2);
    assert_eq!(camera[0].cover_locator.as_deref(), Some(merged.items[0].locator.as_str()));
    assert!(!camera[0].is_default);

    // the video also materializes the synthetic Videos album
    let videos = merged
        .albums
        .iter()
        .find(|a| a.id == VIDEOS_ALBUM_ID)
        .expect("videos album");
    assert_eq!(videos.item_count, 1);
    assert!(videos.is_default);
    assert!(merged.albums.iter().all(|a| a.id != FAVORITES_ALBUM_ID));
}

#[test]
fn albums_sort_by_name() {
    let merged = aggregate(
        &[
            photo(1, "s", "Screenshots", 30),
            photo(2, "t", "MyTrip", 20),
            photo(3, "t", "MyTrip", 10),
        ],
        &[],
    );
    let names: Vec<&str> = merged.albums.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["MyTrip", "Screenshots"]);
    assert_eq!(merged.albums[0].item_count, 2);
    assert_eq!(merged.albums[1].album_type, AlbumType::Screenshots);
}

#[test]
fn equal_timestamps_keep_concatenation_order() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let mut photos: Vec<RawMediaRow> = (1..=12)
            .map(|id| photo(id, "b", "Bucket", if id % 3 == 0 { 500 } else { id * 10 }))
            .collect();
        let mut videos: Vec<RawMediaRow> = (100..106)
            .map(|id| video(id, "b", "Bucket", 500, 1000))
            .collect();
        photos.shuffle(&mut rng);
        videos.shuffle(&mut rng);

        let merged = aggregate(&photos, &videos);
        assert!(merged
            .items
            .windows(2)
            .all(|pair| pair[0].date_taken >= pair[1].date_taken));

        let expected: Vec<i64> = photos
            .iter()
            .chain(videos.iter())
            .filter(|row| row.date_taken == Some(500))
            .filter_map(|row| row.id)
            .collect();
        let actual: Vec<i64> = merged
            .items
            .iter()
            .filter(|item| item.date_taken == 500)
            .map(|item| item.id)
            .collect();
        assert_eq!(actual, expected);
    }
}

#[test]
fn aggregation_is_idempotent() {
    let photos = vec![photo(1, "a", "Alpha", 5), photo(2, "b", "Beta", 9)];
    let videos = vec![video(3, "a", "Alpha", 7, 2000)];
    let first = aggregate(&photos, &videos);
    let second = aggregate(&photos, &videos);
    assert_eq!(first, second);
    assert!(first.items.iter().all(|item| !item.is_favorite && !item.is_selected));
}

#[test]
fn malformed_rows_are_skipped_and_counted() {
    let mut broken = photo(0, "a", "Alpha", 1);
    broken.id = None;
    let merged = aggregate(&[broken, photo(4, "a", "Alpha", 2)], &[video(-1, "a", "Alpha", 3, 10)]);
    assert_eq!(merged.skipped, 2);
    assert_eq!(merged.items.len(), 1);
    assert_eq!(merged.items[0].id, 4);
}

#[test]
fn favorites_album_counts_overlay_favorites() {
    let merged = aggregate(
        &[photo(1, "a", "Alpha", 3), photo(2, "a", "Alpha", 2), photo(3, "b", "Beta", 1)],
        &[],
    );
    assert!(build_albums(&merged.items)
        .iter()
        .all(|a| a.album_type != AlbumType::Favorites));

    let overlay = Overlay::new()
        .with_favorite(MediaKey::photo(2), true)
        .with_favorite(MediaKey::photo(3), true);
    let items = overlay.apply(&merged.items);
    let albums = build_albums(&items);
    let favorites: Vec<_> = albums
        .iter()
        .filter(|a| a.album_type == AlbumType::Favorites)
        .collect();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, FAVORITES_ALBUM_ID);
    assert_eq!(favorites[0].item_count, 2);
    assert_eq!(favorites[0].cover_locator.as_deref(), Some(items[1].locator.as_str()));
    // the merged set itself is untouched
    assert!(merged.items.iter().all(|item| !item.is_favorite));
}

#[test]
fn missing_bucket_names_group_under_unknown() {
    let mut row = photo(1, "x", "ignored", 1);
    row.bucket_display_name = None;
    row.bucket_id = None;
    let merged = aggregate(&[row], &[]);
    assert_eq!(merged.albums.len(), 1);
    assert_eq!(merged.albums[0].name, "Unknown");
    assert_eq!(merged.albums[0].id, "");
}
