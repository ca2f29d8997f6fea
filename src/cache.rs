//! The response cache and the memory router built on it.
//!
//! [`MemoryRouterCache`] memoizes an opaque per-(method, path) value behind a
//! single mutex. Writes are fire-and-forget spawned tasks so they never
//! extend the critical request path; visibility of a just-served response is
//! eventual, not immediate. Eviction is coarse: an external tick source calls
//! [`on_tick`](MemoryRouterCache::on_tick), which either flushes everything
//! (no configured maximum) or replaces any per-method bucket that reached the
//! maximum with an empty one. Entries are advisory only; absence always
//! means "recompute".

use crate::context::Context;
use crate::handler::Handlers;
use crate::params::Params;
use crate::router::Router;
use crate::tree::Lookup;

use http::Method;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;

type Buckets<T> = HashMap<String, HashMap<String, T>>;

/// A concurrent (method, path) → value side-table with tick-driven eviction.
pub struct MemoryRouterCache<T> {
    items: Arc<Mutex<Buckets<T>>>,
    max_items: usize,
}

impl<T> Default for MemoryRouterCache<T> {
    fn default() -> Self {
        MemoryRouterCache {
            items: Arc::new(Mutex::new(HashMap::new())),
            max_items: 0,
        }
    }
}

impl<T> Clone for MemoryRouterCache<T> {
    fn clone(&self) -> Self {
        MemoryRouterCache {
            items: Arc::clone(&self.items),
            max_items: self.max_items,
        }
    }
}

impl<T: Clone + Send + 'static> MemoryRouterCache<T> {
    pub fn new() -> MemoryRouterCache<T> {
        MemoryRouterCache::default()
    }

    /// Sets the per-method bucket size at which [`on_tick`] evicts the
    /// bucket. Zero (the default) means every tick flushes the whole cache.
    ///
    /// [`on_tick`]: MemoryRouterCache::on_tick
    pub fn set_max_items(&mut self, max_items: usize) {
        self.max_items = max_items;
    }

    /// Stores `value` under (method, path) as a fire-and-forget task;
    /// last write wins on key collision.
    ///
    /// The returned handle may be dropped; it exists so callers that need
    /// write visibility (tests, shutdown paths) can await it. Must be called
    /// from within a tokio runtime.
    pub fn add_item(&self, method: &Method, path: &str, value: T) -> JoinHandle<()> {
        let items = Arc::clone(&self.items);
        let method = method.as_str().to_string();
        let path = path.to_string();
        tokio::spawn(async move {
            let mut items = items.lock().unwrap_or_else(PoisonError::into_inner);
            items.entry(method).or_default().insert(path, value);
        })
    }

    /// Looks up (method, path). Returns `None` for a never-stored or evicted
    /// key; never an error.
    pub fn get_item(&self, method: &Method, path: &str) -> Option<T> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.get(method.as_str())?.get(path).cloned()
    }

    /// Periodic eviction, driven by an external scheduler.
    ///
    /// With no configured maximum every entry is dropped unconditionally;
    /// otherwise each per-method bucket whose entry count has reached the
    /// maximum is replaced with an empty one. Deliberately coarse: growth is
    /// bounded by periodic bucket resets, not per-entry recency.
    pub fn on_tick(&self) {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        if self.max_items == 0 {
            items.clear();
            return;
        }
        for bucket in items.values_mut() {
            if bucket.len() >= self.max_items {
                *bucket = HashMap::new();
            }
        }
    }
}

/// The request-handling context a [`MemoryRouter`] memoizes per (method,
/// path): the matched route's built chain and its extracted parameters.
#[derive(Clone)]
pub struct CachedDispatch {
    pub handlers: Handlers,
    pub params: Params,
}

/// A router variant that memoizes lookups in a [`MemoryRouterCache`].
///
/// On a cache hit the stored chain runs without touching the garden; on a
/// miss the regular lookup runs and, when it matches, the prepared context
/// is stored fire-and-forget for subsequent requests.
pub struct MemoryRouter {
    router: Router,
    cache: MemoryRouterCache<CachedDispatch>,
}

impl MemoryRouter {
    pub fn new(router: Router) -> MemoryRouter {
        MemoryRouter {
            router,
            cache: MemoryRouterCache::new(),
        }
    }

    pub fn with_cache(router: Router, cache: MemoryRouterCache<CachedDispatch>) -> MemoryRouter {
        MemoryRouter { router, cache }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// The cache, cloneable and shareable with an external tick driver.
    pub fn cache(&self) -> &MemoryRouterCache<CachedDispatch> {
        &self.cache
    }

    /// Dispatches like [`Router::dispatch`], consulting the cache first.
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, ctx: &mut Context) -> bool {
        if let Some(hit) = self.cache.get_item(&ctx.method, &ctx.path) {
            trace!("cache hit for {} {}", ctx.method, ctx.path);
            ctx.params = hit.params;
            self.router.serve_chain(&hit.handlers, ctx);
            return true;
        }

        let mut params = Params::new();
        let path = ctx.path.clone();
        match self.router.lookup(&ctx.method.clone(), &path, &mut params) {
            Lookup::Found { handlers, .. } => {
                let chain = handlers.clone();
                ctx.params = params;
                let _ = self.cache.add_item(
                    &ctx.method,
                    &ctx.path,
                    CachedDispatch {
                        handlers: chain.clone(),
                        params: ctx.params.clone(),
                    },
                );
                self.router.serve_chain(&chain, ctx);
                true
            }
            Lookup::Redirect if self.router.path_correction => {
                self.router.redirect_corrected(ctx);
                false
            }
            _ => {
                self.router.serve_miss(ctx);
                false
            }
        }
    }
}
