use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::CoreError;
use crate::library::MediaLibrary;
use crate::models::{LoadState, SearchResults};

#[derive(Debug, Default)]
struct PendingSearch {
    generation: u64,
    token: Option<CancellationToken>,
    handle: Option<JoinHandle<()>>,
}

#[derive(Clone)]
struct SearchContext {
    library: Arc<MediaLibrary>,
    debounce: Duration,
    reload_first: bool,
    results: Arc<watch::Sender<LoadState<SearchResults>>>,
    pending: Arc<Mutex<PendingSearch>>,
}

impl SearchContext {
    fn lock_pending(&self) -> MutexGuard<'_, PendingSearch> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publishes only while `generation` is still the newest submission.
    fn publish(&self, generation: u64, state: LoadState<SearchResults>) -> bool {
        let pending = self.lock_pending();
        if pending.generation != generation {
            return false;
        }
        self.results.send_replace(state);
        true
    }
}

/// Debounced, cancellable search over a [`MediaLibrary`]. At most one search
/// is pending; each submission cancels the previous one, and results of a
/// superseded submission are never published.
pub struct SearchSupervisor {
    ctx: SearchContext,
}

impl SearchSupervisor {
    pub fn new(library: Arc<MediaLibrary>) -> Self {
        let debounce = library.config().search_debounce();
        let reload_first = library.config().reload_on_search;
        Self::with_options(library, debounce, reload_first)
    }

    pub fn with_options(library: Arc<MediaLibrary>, debounce: Duration, reload_first: bool) -> Self {
        let (results, _) = watch::channel(LoadState::Idle);
        Self {
            ctx: SearchContext {
                library,
                debounce,
                reload_first,
                results: Arc::new(results),
                pending: Arc::new(Mutex::new(PendingSearch::default())),
            },
        }
    }

    pub fn state(&self) -> LoadState<SearchResults> {
        self.ctx.results.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState<SearchResults>> {
        self.ctx.results.subscribe()
    }

    /// Must be called from within a Tokio runtime. Returns the generation
    /// assigned to this submission.
    pub fn submit(&self, query: &str) -> u64 {
        let mut pending = self.ctx.lock_pending();
        if let Some(token) = pending.token.take() {
            token.cancel();
        }
        pending.handle = None;
        pending.generation += 1;
        let generation = pending.generation;

        if query.trim().is_empty() {
            self.ctx.results.send_replace(LoadState::Success(SearchResults {
                query: query.to_string(),
                items: Vec::new(),
            }));
            return generation;
        }

        let token = CancellationToken::new();
        pending.token = Some(token.clone());
        pending.handle = Some(tokio::spawn(run_search(
            self.ctx.clone(),
            generation,
            query.to_string(),
            token,
        )));
        generation
    }

    /// Drops the pending search, if any, without publishing a result.
    pub fn cancel(&self) {
        let mut pending = self.ctx.lock_pending();
        if let Some(token) = pending.token.take() {
            token.cancel();
        }
        pending.handle = None;
        pending.generation += 1;
    }

    pub fn has_pending(&self) -> bool {
        self.ctx
            .lock_pending()
            .handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for SearchSupervisor {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_search(ctx: SearchContext, generation: u64, query: String, token: CancellationToken) {
    tokio::select! {
        _ = token.cancelled() => return,
        _ = tokio::time::sleep(ctx.debounce) => {}
    }
    if !ctx.publish(generation, LoadState::Loading) {
        return;
    }

    if ctx.reload_first {
        match ctx.library.reload_with_token(token.clone()).await {
            Ok(_) => {}
            Err(CoreError::Cancelled) if token.is_cancelled() => {
                debug!(generation, "search cancelled during reload");
                return;
            }
            Err(CoreError::Cancelled) => {
                // another load took over; search whatever it publishes
                let mut state = ctx.library.subscribe();
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = state.wait_for(|s| !s.is_loading()) => {}
                }
            }
            Err(err) => {
                ctx.publish(generation, LoadState::Failed(err.kind()));
                return;
            }
        }
    }

    if token.is_cancelled() {
        return;
    }
    let items = ctx.library.search(&query);
    debug!(generation, hits = items.len(), "search finished");
    ctx.publish(generation, LoadState::Success(SearchResults { query, items }));
}
