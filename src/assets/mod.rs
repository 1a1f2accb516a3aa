//! Asset loading: the loader trait, byte sources, the generic store and the
//! concrete asset kinds built on it.
//!
//! Every asset type goes through the same protocol in [`AssetStore`]: a
//! cached key is shared, an immediate miss decodes on the caller, and an
//! asynchronous miss publishes a `Creating` placeholder and decodes on the
//! job worker.

pub mod kinds;
pub mod loader;
pub mod source;
pub mod store;

pub use loader::{AssetLoader, LoadContext};
pub use source::{AssetSource, FileSource, MemorySource};
pub use store::AssetStore;
