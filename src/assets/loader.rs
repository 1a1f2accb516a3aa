use crate::assets::AssetSource;
use crate::error::Result;

/// What a decode function gets to work with
pub struct LoadContext<'a> {
    key: &'a str,
    source: &'a dyn AssetSource,
}

impl<'a> LoadContext<'a> {
    pub fn new(key: &'a str, source: &'a dyn AssetSource) -> Self {
        Self { key, source }
    }

    /// Cache key of the asset being loaded
    pub fn key(&self) -> &'a str {
        self.key
    }

    /// Read a named asset from the runtime's source
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        self.source.read(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.source.exists(name)
    }
}

/// Per-type glue between the cache and the decoding collaborators
///
/// `decode` runs on the job worker for asynchronous creates (and on the
/// caller for immediate ones) and must only produce plain owned data.
/// `finalize` always runs on the thread that owns the
/// [`ResourceManager`](crate::resources::ResourceManager) and turns that data
/// into the payload kept by the [`AssetStore`](crate::assets::AssetStore).
pub trait AssetLoader: Send + Sync + 'static {
    /// Cache namespace; identical keys under different tags never collide
    const TYPE_TAG: &'static str;

    /// Output of `decode`, moved from the worker to the main thread
    type Raw: Send + 'static;

    /// Payload of a created resource
    type Asset: 'static;

    fn decode(&self, ctx: &LoadContext<'_>) -> Result<Self::Raw>;

    fn finalize(&self, key: &str, raw: Self::Raw) -> Result<Self::Asset>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemorySource;

    #[test]
    fn test_context_reads_from_source() {
        let source = MemorySource::new();
        source.insert("a.txt", b"abc".to_vec());

        let ctx = LoadContext::new("a.txt", &source);
        assert_eq!(ctx.key(), "a.txt");
        assert!(ctx.exists("a.txt"));
        assert_eq!(ctx.read(ctx.key()).unwrap(), b"abc");
    }
}
