use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{MediaItem, MediaKey};

/// Session-local flags for one item. Never persisted, never read from the
/// store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayState {
    pub favorite: bool,
    pub selected: bool,
}

impl OverlayState {
    fn is_empty(&self) -> bool {
        !self.favorite && !self.selected
    }
}

/// Keyed by [`MediaKey`], never by the bare id. Edits return a new overlay
/// so snapshots that already hold the old one keep seeing it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    entries: HashMap<MediaKey, OverlayState>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: MediaKey) -> OverlayState {
        self.entries.get(&key).copied().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn with_favorite(&self, key: MediaKey, favorite: bool) -> Self {
        self.edited(key, |state| state.favorite = favorite)
    }

    pub fn with_selected(&self, key: MediaKey, selected: bool) -> Self {
        self.edited(key, |state| state.selected = selected)
    }

    pub fn without_selection(&self) -> Self {
        let entries = self
            .entries
            .iter()
            .filter(|(_, state)| state.favorite)
            .map(|(key, state)| {
                (
                    *key,
                    OverlayState {
                        favorite: true,
                        selected: false,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn selected_keys(&self) -> Vec<MediaKey> {
        let mut keys: Vec<MediaKey> = self
            .entries
            .iter()
            .filter(|(_, state)| state.selected)
            .map(|(key, _)| *key)
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Copies of `items` with the overlay flags written in.
    pub fn apply(&self, items: &[MediaItem]) -> Vec<MediaItem> {
        items
            .iter()
            .map(|item| {
                let state = self.get(item.key());
                MediaItem {
                    is_favorite: state.favorite,
                    is_selected: state.selected,
                    ..item.clone()
                }
            })
            .collect()
    }

    fn edited<F>(&self, key: MediaKey, edit: F) -> Self
    where
        F: FnOnce(&mut OverlayState),
    {
        let mut entries = self.entries.clone();
        let mut state = entries.get(&key).copied().unwrap_or_default();
        edit(&mut state);
        if state.is_empty() {
            entries.remove(&key);
        } else {
            entries.insert(key, state);
        }
        Self { entries }
    }
}
