use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::aggregate::{aggregate, build_albums};
use crate::config::LibraryConfig;
use crate::diagnostics;
use crate::error::CoreError;
use crate::models::{
    Album, Curated, LoadState, LoadSummary, MediaGroup, MediaItem, MediaKey, MergedSet, ViewType,
};
use crate::overlay::Overlay;
use crate::query;
use crate::source::MediaSource;

/// One published view of the library: the immutable merged set of a load
/// cycle with the session overlay written over it.
#[derive(Debug)]
pub struct Snapshot {
    base: Arc<MergedSet>,
    overlay: Overlay,
    items: Vec<MediaItem>,
    albums: Vec<Album>,
    summary: Option<LoadSummary>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::from_parts(Arc::new(MergedSet::default()), Overlay::new(), None)
    }

    fn from_parts(base: Arc<MergedSet>, overlay: Overlay, summary: Option<LoadSummary>) -> Self {
        let (items, albums) = if overlay.is_empty() {
            (base.items.clone(), base.albums.clone())
        } else {
            let items = overlay.apply(&base.items);
            let albums = build_albums(&items);
            (items, albums)
        };
        Self {
            base,
            overlay,
            items,
            albums,
            summary,
        }
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn summary(&self) -> Option<&LoadSummary> {
        self.summary.as_ref()
    }

    pub fn contains(&self, key: MediaKey) -> bool {
        self.base.items.iter().any(|item| item.key() == key)
    }

    pub fn by_album(&self, album_id: &str) -> Vec<MediaItem> {
        query::by_album(&self.items, album_id)
    }

    pub fn search(&self, query_text: &str) -> Vec<MediaItem> {
        query::search(&self.items, query_text)
    }

    /// User albums first, synthetic albums second.
    pub fn partition_albums(&self) -> (Vec<Album>, Vec<Album>) {
        query::partition_albums(&self.albums)
    }
}

#[derive(Debug)]
struct LoadSlot {
    generation: u64,
    token: Option<CancellationToken>,
    last_outcome: LoadState<LoadSummary>,
}

/// Owns the media source and the current snapshot. Every load is a full
/// re-scan; a newer load cancels the one in flight.
pub struct MediaLibrary {
    source: Arc<dyn MediaSource>,
    config: LibraryConfig,
    snapshot: RwLock<Arc<Snapshot>>,
    state: watch::Sender<LoadState<LoadSummary>>,
    slot: Mutex<LoadSlot>,
}

impl std::fmt::Debug for MediaLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaLibrary")
            .field("config", &self.config)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl MediaLibrary {
    pub fn new(source: Arc<dyn MediaSource>, config: LibraryConfig) -> Self {
        let (state, _) = watch::channel(LoadState::Idle);
        Self {
            source,
            config,
            snapshot: RwLock::new(Arc::new(Snapshot::empty())),
            state,
            slot: Mutex::new(LoadSlot {
                generation: 0,
                token: None,
                last_outcome: LoadState::Idle,
            }),
        }
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        match self.snapshot.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn state(&self) -> LoadState<LoadSummary> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState<LoadSummary>> {
        self.state.subscribe()
    }

    pub async fn reload(&self) -> Result<LoadSummary, CoreError> {
        self.reload_with_token(CancellationToken::new()).await
    }

    /// Runs one load cycle. Cancelling `token`, or starting another load,
    /// makes this call return `Cancelled` without publishing anything; the
    /// previous snapshot stays visible until a load finishes either way.
    pub async fn reload_with_token(&self, token: CancellationToken) -> Result<LoadSummary, CoreError> {
        let generation = self.claim_slot(&token);
        let load_id = Uuid::new_v4().to_string();
        self.state.send_replace(LoadState::Loading);
        info!(load_id = %load_id, "media load started");

        let merged = fetch_merged(Arc::clone(&self.source), &token).await;

        let mut slot = self.lock_slot();
        if slot.generation != generation {
            debug!(load_id = %load_id, "media load superseded");
            return Err(CoreError::Cancelled);
        }
        slot.token = None;
        if token.is_cancelled() || matches!(merged, Err(CoreError::Cancelled)) {
            debug!(load_id = %load_id, "media load cancelled");
            self.state.send_replace(slot.last_outcome.clone());
            return Err(CoreError::Cancelled);
        }

        match merged {
            Ok(merged) => {
                let summary = LoadSummary {
                    load_id: load_id.clone(),
                    item_count: merged.items.len(),
                    album_count: merged.albums.len(),
                    skipped: merged.skipped,
                    loaded_at: Utc::now().timestamp_millis(),
                };
                self.publish(Snapshot::from_parts(
                    Arc::new(merged),
                    Overlay::new(),
                    Some(summary.clone()),
                ));
                slot.last_outcome = LoadState::Success(summary.clone());
                self.state.send_replace(slot.last_outcome.clone());
                info!(
                    load_id = %load_id,
                    items = summary.item_count,
                    albums = summary.album_count,
                    skipped = summary.skipped,
                    "media load complete"
                );
                self.log_diagnostic(
                    "load_complete",
                    &load_id,
                    &format!(
                        "items={} albums={} skipped={}",
                        summary.item_count, summary.album_count, summary.skipped
                    ),
                );
                Ok(summary)
            }
            Err(err) => {
                // stale data must not outlive a failed load
                self.publish(Snapshot::empty());
                slot.last_outcome = LoadState::Failed(err.kind());
                self.state.send_replace(slot.last_outcome.clone());
                warn!(load_id = %load_id, error = %err, "media load failed");
                self.log_diagnostic("load_failed", &load_id, &err.to_string());
                Err(err)
            }
        }
    }

    pub fn cancel_load(&self) {
        if let Some(token) = self.lock_slot().token.as_ref() {
            token.cancel();
        }
    }

    /// Flips the favorite flag of one item; returns the new value.
    pub fn toggle_favorite(&self, key: MediaKey) -> Result<bool, CoreError> {
        self.edit_overlay(key, |overlay| {
            let favorite = !overlay.get(key).favorite;
            (overlay.with_favorite(key, favorite), favorite)
        })
    }

    pub fn set_favorite(&self, key: MediaKey, favorite: bool) -> Result<(), CoreError> {
        self.edit_overlay(key, |overlay| (overlay.with_favorite(key, favorite), ()))
    }

    pub fn set_selected(&self, key: MediaKey, selected: bool) -> Result<(), CoreError> {
        self.edit_overlay(key, |overlay| (overlay.with_selected(key, selected), ()))
    }

    pub fn clear_selection(&self) {
        let mut guard = self.write_snapshot();
        let current = Arc::clone(&guard);
        *guard = Arc::new(Snapshot::from_parts(
            Arc::clone(&current.base),
            current.overlay.without_selection(),
            current.summary.clone(),
        ));
    }

    pub fn items(&self) -> Vec<MediaItem> {
        self.snapshot().items().to_vec()
    }

    pub fn albums(&self) -> Vec<Album> {
        self.snapshot().albums().to_vec()
    }

    pub fn by_album(&self, album_id: &str) -> Vec<MediaItem> {
        self.snapshot().by_album(album_id)
    }

    pub fn search(&self, query_text: &str) -> Vec<MediaItem> {
        self.snapshot().search(query_text)
    }

    pub fn temporal_view(&self, kind: ViewType) -> Vec<MediaItem> {
        self.temporal_view_at(kind, Utc::now())
    }

    pub fn temporal_view_at(&self, kind: ViewType, now: DateTime<Utc>) -> Vec<MediaItem> {
        query::temporal_view_with_window(
            kind,
            self.snapshot().items(),
            now,
            self.config.days_window_days,
        )
    }

    pub fn groups(&self, kind: ViewType) -> Vec<MediaGroup> {
        self.groups_at(kind, Utc::now())
    }

    /// Sections over every item of the period. Only the Days view is
    /// windowed first; Months and Years keep all their items.
    pub fn groups_at(&self, kind: ViewType, now: DateTime<Utc>) -> Vec<MediaGroup> {
        let snapshot = self.snapshot();
        match kind {
            ViewType::Days => {
                let items = query::temporal_view_with_window(
                    kind,
                    snapshot.items(),
                    now,
                    self.config.days_window_days,
                );
                query::group_by_view(kind, &items)
            }
            _ => query::group_by_view(kind, snapshot.items()),
        }
    }

    pub fn curated(&self) -> Curated {
        self.curated_at(Utc::now())
    }

    pub fn curated_at(&self, now: DateTime<Utc>) -> Curated {
        query::curated(self.snapshot().items(), now, &self.config.curation)
    }

    fn claim_slot(&self, token: &CancellationToken) -> u64 {
        let mut slot = self.lock_slot();
        if let Some(previous) = slot.token.replace(token.clone()) {
            previous.cancel();
        }
        slot.generation += 1;
        slot.generation
    }

    // Both locks hold values that are only ever replaced whole; a poisoned
    // guard still holds a consistent value.
    fn lock_slot(&self) -> MutexGuard<'_, LoadSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_snapshot(&self) -> RwLockWriteGuard<'_, Arc<Snapshot>> {
        self.snapshot.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, snapshot: Snapshot) {
        *self.write_snapshot() = Arc::new(snapshot);
    }

    fn edit_overlay<F, T>(&self, key: MediaKey, edit: F) -> Result<T, CoreError>
    where
        F: FnOnce(&Overlay) -> (Overlay, T),
    {
        let mut guard = self.write_snapshot();
        let current = Arc::clone(&guard);
        if !current.contains(key) {
            return Err(CoreError::InvalidArgument(format!(
                "unknown {} id {}",
                key.kind.as_str(),
                key.id
            )));
        }
        let (overlay, value) = edit(&current.overlay);
        *guard = Arc::new(Snapshot::from_parts(
            Arc::clone(&current.base),
            overlay,
            current.summary.clone(),
        ));
        Ok(value)
    }

    fn log_diagnostic(&self, kind: &str, load_id: &str, message: &str) {
        let Some(log_dir) = self.config.log_dir.as_ref() else { return };
        if let Err(err) = diagnostics::log_event(log_dir, kind, Some(load_id), message) {
            warn!(error = %err, "diagnostics log write failed");
        }
    }
}

/// Scan and aggregation both run on the blocking pool; awaiting them is the
/// only suspension point of a load cycle.
async fn fetch_merged(
    source: Arc<dyn MediaSource>,
    token: &CancellationToken,
) -> Result<MergedSet, CoreError> {
    let scan = tokio::task::spawn_blocking(move || -> Result<_, CoreError> {
        let photos = source.photo_rows()?;
        let videos = source.video_rows()?;
        Ok(aggregate(&photos, &videos))
    });
    tokio::select! {
        _ = token.cancelled() => Err(CoreError::Cancelled),
        joined = scan => joined
            .map_err(|e| CoreError::SourceUnavailable(format!("scan task failed: {}", e)))?,
    }
}
