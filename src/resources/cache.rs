use crate::error::{AssetError, Result};
use crate::jobs::JobId;
use crate::resources::{CacheStats, LiveResource, ResourceId, ResourceRecord, ResourceState};
use ahash::AHashMap;
use slotmap::SlotMap;
use tracing::{debug, info};

/// Outcome of [`ResourceCache::release`]
#[derive(Debug, PartialEq)]
pub enum Release {
    /// Other references remain
    Shared(u32),
    /// That was the last reference; the record left the cache and the
    /// caller now frees the payload
    Last(ResourceRecord),
}

/// Interning cache of named, typed resources with manual reference counts
///
/// Records live in a generational arena; the index maps
/// `type_tag -> key -> id` and only contains records with a nonzero count.
/// The cache never owns payloads. It is main-thread state and is never
/// touched by work functions.
pub struct ResourceCache {
    records: SlotMap<ResourceId, ResourceRecord>,
    index: AHashMap<&'static str, AHashMap<String, ResourceId>>,
    stats: CacheStats,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self {
            records: SlotMap::with_key(),
            index: AHashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// Look up a live resource without side effects
    pub fn find(&self, type_tag: &str, key: &str) -> Option<ResourceId> {
        self.index.get(type_tag)?.get(key).copied()
    }

    /// Allocate a record with no references; it becomes visible to
    /// [`ResourceCache::find`] on its first [`ResourceCache::acquire`]
    pub fn insert(
        &mut self,
        type_tag: &'static str,
        key: impl Into<String>,
        state: ResourceState,
    ) -> ResourceId {
        self.records
            .insert(ResourceRecord::new(type_tag, key.into(), state))
    }

    /// Take one reference; returns the new count
    ///
    /// The 0 -> 1 transition publishes the record in the index. Publishing a
    /// key that another live record already holds is a contract violation.
    pub fn acquire(&mut self, id: ResourceId) -> Result<u32> {
        let record = self.records.get_mut(id).ok_or(AssetError::StaleResource)?;

        if record.ref_count == 0 {
            let keys = self.index.entry(record.type_tag).or_default();
            if keys.contains_key(&record.key) {
                debug_assert!(
                    false,
                    "{} resource '{}' is already cached",
                    record.type_tag, record.key
                );
                return Err(AssetError::AlreadyCached {
                    type_tag: record.type_tag,
                    key: record.key.clone(),
                });
            }
            keys.insert(record.key.clone(), id);
            self.stats.created += 1;
            info!("Created {} resource '{}'", record.type_tag, record.key);
        }

        record.ref_count += 1;
        Ok(record.ref_count)
    }

    /// Drop one reference
    ///
    /// Releasing a stale id or a record without references is a programming
    /// error: it panics in debug builds and returns
    /// [`AssetError::StaleResource`] otherwise.
    pub fn release(&mut self, id: ResourceId) -> Result<Release> {
        let remaining = match self.records.get_mut(id) {
            Some(record) if record.ref_count > 0 => {
                record.ref_count -= 1;
                record.ref_count
            }
            _ => {
                debug_assert!(false, "release of a stale resource {id:?}");
                return Err(AssetError::StaleResource);
            }
        };

        if remaining > 0 {
            return Ok(Release::Shared(remaining));
        }

        let record = self.records.remove(id).ok_or(AssetError::StaleResource)?;
        if let Some(keys) = self.index.get_mut(record.type_tag) {
            if keys.get(&record.key) == Some(&id) {
                keys.remove(&record.key);
            }
        }
        self.stats.destroyed += 1;
        debug!("Released last reference to {} '{}'", record.type_tag, record.key);
        Ok(Release::Last(record))
    }

    pub fn get(&self, id: ResourceId) -> Option<&ResourceRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: ResourceId) -> bool {
        self.records.contains_key(id)
    }

    pub fn state(&self, id: ResourceId) -> Option<ResourceState> {
        self.records.get(id).map(|record| record.state)
    }

    /// Attach the load job of a `Creating` record
    pub fn set_job(&mut self, id: ResourceId, job: Option<JobId>) {
        if let Some(record) = self.records.get_mut(id) {
            record.job = job;
        }
    }

    /// Move a record to a terminal state and detach its job
    ///
    /// Returns false when the record no longer exists.
    pub fn complete(&mut self, id: ResourceId, state: ResourceState) -> bool {
        let Some(record) = self.records.get_mut(id) else {
            return false;
        };
        debug_assert!(state.is_terminal(), "complete() needs a terminal state");
        record.state = state;
        record.job = None;
        if state == ResourceState::AsyncError {
            self.stats.async_failures += 1;
        }
        true
    }

    pub(crate) fn note_lookup(&mut self, hit: bool) {
        if hit {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
    }

    /// Every resource still referenced, sorted by type tag and key
    pub fn list_live(&self) -> Vec<LiveResource> {
        let mut live: Vec<_> = self
            .records
            .values()
            .filter(|record| record.ref_count > 0)
            .map(|record| LiveResource {
                type_tag: record.type_tag,
                key: record.key.clone(),
                ref_count: record.ref_count,
                state: record.state,
            })
            .collect();
        live.sort_by(|a, b| (a.type_tag, &a.key).cmp(&(b.type_tag, &b.key)));
        live
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Number of records, including ones not yet acquired
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for ResourceCache {
    fn default() -> Self {
        Self::new()
    }
}
