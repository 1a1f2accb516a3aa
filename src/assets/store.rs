use crate::assets::{AssetLoader, AssetSource, LoadContext};
use crate::error::{AssetError, Result};
use crate::jobs::JobId;
use crate::resources::{
    AssetHandle, Release, ResourceCache, ResourceId, ResourceManager, ResourceState,
};
use slotmap::SecondaryMap;
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{error, info, info_span, trace};

type Payloads<A> = Rc<RefCell<SecondaryMap<ResourceId, A>>>;

/// Payload of an asynchronous load job
struct DecodeJob<L: AssetLoader> {
    key: String,
    loader: Arc<L>,
    source: Arc<dyn AssetSource>,
    /// `None` until the work function ran
    raw: Option<Result<L::Raw>>,
}

impl<L: AssetLoader> DecodeJob<L> {
    fn run(&mut self) {
        let _span = info_span!("decode", tag = L::TYPE_TAG, key = %self.key).entered();
        let ctx = LoadContext::new(&self.key, self.source.as_ref());
        self.raw = Some(self.loader.decode(&ctx));
    }
}

/// Payloads of one asset type plus the create/destroy protocol around them
///
/// Records and reference counts live in the manager's cache; the store only
/// owns the finalized payloads, indexed by the same [`ResourceId`].
pub struct AssetStore<L: AssetLoader> {
    loader: Arc<L>,
    assets: Payloads<L::Asset>,
}

impl<L: AssetLoader> AssetStore<L> {
    /// Create the store for `L::TYPE_TAG`; each tag may only be served once
    pub fn new(manager: &mut ResourceManager, loader: L) -> Result<Self> {
        manager.register_type_tag(L::TYPE_TAG)?;
        Ok(Self {
            loader: Arc::new(loader),
            assets: Rc::new(RefCell::new(SecondaryMap::new())),
        })
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Get a handle to the asset `key`, creating it if it is not cached
    ///
    /// A cached key is always shared, whatever its state. Otherwise an
    /// immediate create decodes and finalizes right here and returns `None`
    /// on failure without touching the cache; an asynchronous create returns
    /// a `Creating` handle at once and finishes when the manager drains
    /// completions. Asynchronous requests become immediate while background
    /// loading is disabled.
    pub fn create(
        &self,
        manager: &mut ResourceManager,
        key: &str,
        immediate: bool,
    ) -> Option<AssetHandle<L>> {
        let immediate = immediate || !manager.async_loading_supported();

        {
            let mut cache = manager.cache_rc().borrow_mut();
            let hit = cache.find(L::TYPE_TAG, key);
            cache.note_lookup(hit.is_some());
            if let Some(id) = hit {
                return match cache.acquire(id) {
                    Ok(refs) => {
                        trace!(refs, "Sharing {} resource '{}'", L::TYPE_TAG, key);
                        Some(AssetHandle::new(id))
                    }
                    Err(err) => {
                        error!("Failed to share {} '{}': {err}", L::TYPE_TAG, key);
                        None
                    }
                };
            }
        }

        if immediate {
            self.create_immediate(manager, key)
        } else {
            self.create_async(manager, key)
        }
    }

    fn create_immediate(&self, manager: &mut ResourceManager, key: &str) -> Option<AssetHandle<L>> {
        let _span = info_span!("create_immediate", tag = L::TYPE_TAG, key).entered();
        let ctx = LoadContext::new(key, manager.source().as_ref());
        let asset = match self
            .loader
            .decode(&ctx)
            .and_then(|raw| self.loader.finalize(key, raw))
        {
            Ok(asset) => asset,
            Err(err) => {
                error!("Failed to create {} '{}': {err}", L::TYPE_TAG, key);
                return None;
            }
        };

        let mut cache = manager.cache_rc().borrow_mut();
        let id = cache.insert(L::TYPE_TAG, key, ResourceState::Created);
        if let Err(err) = cache.acquire(id) {
            error!("Failed to cache {} '{}': {err}", L::TYPE_TAG, key);
            return None;
        }
        self.assets.borrow_mut().insert(id, asset);
        Some(AssetHandle::new(id))
    }

    fn create_async(&self, manager: &mut ResourceManager, key: &str) -> Option<AssetHandle<L>> {
        let id = {
            let mut cache = manager.cache_rc().borrow_mut();
            let id = cache.insert(L::TYPE_TAG, key, ResourceState::Creating);
            if let Err(err) = cache.acquire(id) {
                error!("Failed to cache {} '{}': {err}", L::TYPE_TAG, key);
                return None;
            }
            id
        };

        let job = DecodeJob {
            key: key.to_string(),
            loader: Arc::clone(&self.loader),
            source: Arc::clone(manager.source()),
            raw: None,
        };
        let on_done = completion::<L>(id, Rc::clone(manager.cache_rc()), Rc::clone(&self.assets));
        let job_id = manager
            .scheduler_mut()
            .submit(job, DecodeJob::<L>::run, on_done);

        // The completion can only run from a later call on this thread, so
        // the job id is always attached before it is read.
        manager.cache_rc().borrow_mut().set_job(id, Some(job_id));
        trace!(job = %job_id, "Loading {} '{}' in the background", L::TYPE_TAG, key);
        Some(AssetHandle::new(id))
    }

    /// Take another reference to the resource behind `handle`
    pub fn clone_handle(
        &self,
        manager: &mut ResourceManager,
        handle: &AssetHandle<L>,
    ) -> Result<AssetHandle<L>> {
        manager.cache_rc().borrow_mut().acquire(handle.id())?;
        Ok(AssetHandle::new(handle.id()))
    }

    /// Give back one reference; returns how many remain
    ///
    /// The last destroy of a `Creating` resource cancels its job first. If
    /// the worker is already decoding it, this blocks until it is done and
    /// the late result is discarded.
    pub fn destroy(&self, manager: &mut ResourceManager, handle: AssetHandle<L>) -> Result<u32> {
        let id = handle.id();
        let released = manager.cache_rc().borrow_mut().release(id)?;
        match released {
            Release::Shared(remaining) => Ok(remaining),
            Release::Last(record) => {
                if let Some(job) = record.job() {
                    manager.scheduler_mut().cancel(job);
                }
                self.assets.borrow_mut().remove(id);
                info!("Destroyed {} resource '{}'", record.type_tag(), record.key());
                Ok(0)
            }
        }
    }

    /// State of the resource; `Uninitialized` for a handle that was destroyed
    pub fn state(&self, manager: &ResourceManager, handle: &AssetHandle<L>) -> ResourceState {
        manager
            .cache()
            .state(handle.id())
            .unwrap_or(ResourceState::Uninitialized)
    }

    /// Load job of a resource that is still `Creating`
    pub fn job(&self, manager: &ResourceManager, handle: &AssetHandle<L>) -> Option<JobId> {
        manager.cache().get(handle.id()).and_then(|record| record.job())
    }

    pub fn key(&self, manager: &ResourceManager, handle: &AssetHandle<L>) -> Option<String> {
        manager
            .cache()
            .get(handle.id())
            .map(|record| record.key().to_string())
    }

    /// Borrow the payload of a `Created` resource
    ///
    /// Release the borrow before draining completions or destroying
    /// handles of this type. A load of this type that finishes while the
    /// borrow is held ends in `AsyncError`.
    pub fn get(&self, handle: &AssetHandle<L>) -> Option<Ref<'_, L::Asset>> {
        Ref::filter_map(self.assets.borrow(), |assets| assets.get(handle.id())).ok()
    }

    /// Block until the resource has left `Creating`; returns the new state
    pub fn wait(&self, manager: &mut ResourceManager, handle: &AssetHandle<L>) -> ResourceState {
        if let Some(job) = self.job(manager, handle) {
            manager.scheduler_mut().wait(job);
        }
        self.state(manager, handle)
    }

    /// Cancel the load of a `Creating` resource
    ///
    /// A load that has not started ends in `AsyncError`; one that is running
    /// is waited for. Handles stay valid either way.
    pub fn cancel(&self, manager: &mut ResourceManager, handle: &AssetHandle<L>) -> ResourceState {
        if let Some(job) = self.job(manager, handle) {
            manager.scheduler_mut().cancel(job);
        }
        self.state(manager, handle)
    }

    /// Number of finalized payloads held
    pub fn len(&self) -> usize {
        self.assets.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.borrow().is_empty()
    }
}

/// Main-thread half of an asynchronous load
fn completion<L: AssetLoader>(
    id: ResourceId,
    cache: Rc<RefCell<ResourceCache>>,
    assets: Payloads<L::Asset>,
) -> impl FnOnce(bool, DecodeJob<L>) {
    move |canceled, job| {
        let DecodeJob {
            key, loader, raw, ..
        } = job;

        if !cache.borrow().contains(id) {
            trace!("Discarding load of destroyed {} '{}'", L::TYPE_TAG, key);
            return;
        }

        let outcome = if canceled {
            Err(AssetError::Canceled)
        } else {
            raw.unwrap_or_else(|| Err(AssetError::decode(&key, "decoder did not produce a result")))
                .and_then(|raw| loader.finalize(&key, raw))
        };

        let state = match outcome {
            Ok(asset) => match assets.try_borrow_mut() {
                Ok(mut assets) => {
                    assets.insert(id, asset);
                    info!("Finished loading {} '{}'", L::TYPE_TAG, key);
                    ResourceState::Created
                }
                Err(_) => {
                    error!(
                        "Failed to load {} '{}': payloads are borrowed while draining",
                        L::TYPE_TAG,
                        key
                    );
                    ResourceState::AsyncError
                }
            },
            Err(AssetError::Canceled) => {
                info!("Canceled loading {} '{}'", L::TYPE_TAG, key);
                ResourceState::AsyncError
            }
            Err(err) => {
                error!("Failed to load {} '{}': {err}", L::TYPE_TAG, key);
                ResourceState::AsyncError
            }
        };
        cache.borrow_mut().complete(id, state);
    }
}
