use crate::jobs::JobId;
use std::fmt;

/// Lifecycle of a cached resource
///
/// `Uninitialized -> Created` (immediate), `Uninitialized -> Creating ->
/// Created | AsyncError` (asynchronous). `Created` and `AsyncError` are
/// terminal; only `Creating` resources have a job to cancel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceState {
    Uninitialized,
    Creating,
    Created,
    AsyncError,
}

impl ResourceState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ResourceState::Created | ResourceState::AsyncError)
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceState::Uninitialized => "uninitialized",
            ResourceState::Creating => "creating",
            ResourceState::Created => "created",
            ResourceState::AsyncError => "async error",
        };
        f.write_str(name)
    }
}

/// Bookkeeping for one named, typed resource
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceRecord {
    pub(crate) type_tag: &'static str,
    pub(crate) key: String,
    pub(crate) ref_count: u32,
    pub(crate) state: ResourceState,
    pub(crate) job: Option<JobId>,
}

impl ResourceRecord {
    pub(crate) fn new(type_tag: &'static str, key: String, state: ResourceState) -> Self {
        Self {
            type_tag,
            key,
            ref_count: 0,
            state,
            job: None,
        }
    }

    pub fn type_tag(&self) -> &'static str {
        self.type_tag
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn ref_count(&self) -> u32 {
        self.ref_count
    }

    pub fn state(&self) -> ResourceState {
        self.state
    }

    /// Load job still attached to a `Creating` resource
    pub fn job(&self) -> Option<JobId> {
        self.job
    }
}

/// Snapshot of a live resource for diagnostics
#[derive(Clone, Debug, PartialEq)]
pub struct LiveResource {
    pub type_tag: &'static str,
    pub key: String,
    pub ref_count: u32,
    pub state: ResourceState,
}

impl fmt::Display for LiveResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' ({} refs, {})",
            self.type_tag, self.key, self.ref_count, self.state
        )
    }
}

/// Resource cache statistics
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub created: u64,
    pub destroyed: u64,
    pub async_failures: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f32 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f32 / total as f32
        }
    }
}
