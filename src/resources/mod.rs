//! Resource bookkeeping: the interning cache, typed handles and the manager
//! that ties the cache to the job scheduler.

pub mod cache;
pub mod handle;
pub mod manager;
pub mod resource;

pub use cache::{Release, ResourceCache};
pub use handle::{AssetHandle, ResourceId};
pub use manager::ResourceManager;
pub use resource::{CacheStats, LiveResource, ResourceRecord, ResourceState};
