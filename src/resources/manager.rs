use crate::assets::{AssetSource, FileSource};
use crate::config::RuntimeConfig;
use crate::error::{AssetError, Result};
use crate::jobs::JobScheduler;
use crate::resources::{CacheStats, LiveResource, ResourceCache, ResourceId};
use smallvec::SmallVec;
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Owner of the resource cache, the job scheduler and the asset source
///
/// Lives on the main thread. Asset stores borrow it for every create and
/// destroy; completion callbacks only run from calls made on it
/// ([`ResourceManager::drain_completed`], [`ResourceManager::wait_for_all`],
/// store waits and destroys).
pub struct ResourceManager {
    config: RuntimeConfig,
    cache: Rc<RefCell<ResourceCache>>,
    scheduler: JobScheduler,
    source: Arc<dyn AssetSource>,
    registered_tags: SmallVec<[&'static str; 8]>,
    shut_down: bool,
}

impl ResourceManager {
    /// Create a manager reading from the configured root data directories
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        let source = FileSource::new(config.root_data_dirs.iter().cloned());
        Self::with_source(config, Arc::new(source))
    }

    /// Create a manager reading from a custom source
    pub fn with_source(config: RuntimeConfig, source: Arc<dyn AssetSource>) -> Result<Self> {
        config.validate()?;
        let scheduler = JobScheduler::with_config(&config)?;
        debug!(
            async_loading = config.support_async_loading,
            "resource manager started"
        );
        Ok(Self {
            config,
            cache: Rc::new(RefCell::new(ResourceCache::new())),
            scheduler,
            source,
            registered_tags: SmallVec::new(),
            shut_down: false,
        })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Whether asynchronous creates go through the job worker
    pub fn async_loading_supported(&self) -> bool {
        self.config.support_async_loading && !self.shut_down
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Turn background loading on or off; off forces every create to be immediate
    pub fn set_async_loading(&mut self, enabled: bool) {
        self.config.support_async_loading = enabled;
    }

    pub fn scheduler(&self) -> &JobScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut JobScheduler {
        &mut self.scheduler
    }

    /// Borrow the cache; do not hold the borrow across calls that run
    /// completion callbacks
    pub fn cache(&self) -> Ref<'_, ResourceCache> {
        self.cache.borrow()
    }

    pub(crate) fn cache_rc(&self) -> &Rc<RefCell<ResourceCache>> {
        &self.cache
    }

    pub fn source(&self) -> &Arc<dyn AssetSource> {
        &self.source
    }

    /// Live resource for `(type_tag, key)`, if any
    pub fn find(&self, type_tag: &str, key: &str) -> Option<ResourceId> {
        self.cache.borrow().find(type_tag, key)
    }

    pub fn list_live(&self) -> Vec<LiveResource> {
        self.cache.borrow().list_live()
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.borrow().stats().clone()
    }

    /// Finalize completed loads for at most `budget` (at least one if any)
    pub fn drain_completed(&mut self, budget: Duration) -> usize {
        self.scheduler.drain_completed(budget)
    }

    /// Block until every submitted load has been finalized
    pub fn wait_for_all(&mut self) {
        self.scheduler.wait_for_all();
    }

    /// Claim a type tag for one asset store
    pub fn register_type_tag(&mut self, type_tag: &'static str) -> Result<()> {
        if self.registered_tags.contains(&type_tag) {
            return Err(AssetError::TypeTagInUse(type_tag));
        }
        self.registered_tags.push(type_tag);
        Ok(())
    }

    pub fn registered_type_tags(&self) -> &[&'static str] {
        &self.registered_tags
    }

    /// Log every resource that still has references; returns how many
    pub fn report_leaks(&self) -> usize {
        let live = self.list_live();
        for resource in &live {
            warn!("Resource was never destroyed: {resource}");
        }
        if !live.is_empty() {
            warn!("{} resources leaked", live.len());
        }
        live.len()
    }

    /// Stop the job worker and report leaks
    ///
    /// Queued loads are canceled and their resources end up in
    /// `AsyncError`. Runs on drop if not called explicitly.
    pub fn shutdown(&mut self) -> usize {
        if self.shut_down {
            return 0;
        }
        self.shut_down = true;
        self.scheduler.shutdown();
        self.report_leaks()
    }
}

impl Drop for ResourceManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemorySource;
    use crate::resources::ResourceState;

    fn manager() -> ResourceManager {
        ResourceManager::with_source(RuntimeConfig::default(), Arc::new(MemorySource::new()))
            .unwrap()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = RuntimeConfig {
            root_data_dirs: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(
            ResourceManager::new(config),
            Err(AssetError::Config(_))
        ));
    }

    #[test]
    fn test_type_tags_are_exclusive() {
        let mut manager = manager();
        manager.register_type_tag("texture").unwrap();
        manager.register_type_tag("sound").unwrap();
        assert_eq!(
            manager.register_type_tag("texture"),
            Err(AssetError::TypeTagInUse("texture"))
        );
        assert_eq!(manager.registered_type_tags(), &["texture", "sound"]);
    }

    #[test]
    fn test_async_flag_toggle() {
        let mut manager = manager();
        assert!(manager.async_loading_supported());
        manager.set_async_loading(false);
        assert!(!manager.async_loading_supported());
    }

    #[test]
    fn test_report_leaks() {
        let mut manager = manager();
        assert_eq!(manager.report_leaks(), 0);

        let id = {
            let mut cache = manager.cache_rc().borrow_mut();
            let id = cache.insert("texture", "leak.png", ResourceState::Created);
            cache.acquire(id).unwrap();
            id
        };
        assert_eq!(manager.find("texture", "leak.png"), Some(id));
        assert_eq!(manager.report_leaks(), 1);

        assert_eq!(manager.shutdown(), 1);
        assert_eq!(manager.shutdown(), 0);
    }
}
