//! Everything a host needs for the rendering asset runtime, in one place.

use crate::assets::kinds::{
    AudioDecoder, EffectLoader, FontLoader, ImageDecoder, MaterialLoader, MusicLoader,
    SoundLoader, SpriteLoader, TextureLoader,
};
use crate::assets::{AssetSource, AssetStore};
use crate::config::RuntimeConfig;
use crate::error::Result;
use crate::frame::FrameClock;
use crate::resources::ResourceManager;
use std::sync::Arc;
use tracing::trace;

/// Resource manager, frame clock and one store per asset kind
///
/// ```no_run
/// use asset_runtime::prelude::*;
/// use std::sync::Arc;
///
/// let mut runtime = AssetRuntime::new(
///     RuntimeConfig::default(),
///     Arc::new(RawImageDecoder),
///     Arc::new(PcmDecoder::default()),
/// )
/// .unwrap();
///
/// let hero = runtime
///     .sprites
///     .create(&mut runtime.manager, "hero.json", false)
///     .unwrap();
/// loop {
///     runtime.update();
///     if runtime.sprites.state(&runtime.manager, &hero) != ResourceState::Creating {
///         break;
///     }
/// }
/// runtime.sprites.destroy(&mut runtime.manager, hero).unwrap();
/// ```
pub struct AssetRuntime {
    pub frame: FrameClock,
    pub textures: AssetStore<TextureLoader>,
    pub sounds: AssetStore<SoundLoader>,
    pub music: AssetStore<MusicLoader>,
    pub fonts: AssetStore<FontLoader>,
    pub sprites: AssetStore<SpriteLoader>,
    pub materials: AssetStore<MaterialLoader>,
    pub effects: AssetStore<EffectLoader>,
    pub manager: ResourceManager,
}

impl AssetRuntime {
    /// Runtime reading from the configured root data directories
    pub fn new(
        config: RuntimeConfig,
        images: Arc<dyn ImageDecoder>,
        audio: Arc<dyn AudioDecoder>,
    ) -> Result<Self> {
        let manager = ResourceManager::new(config)?;
        Self::build(manager, images, audio)
    }

    /// Runtime reading from a custom source
    pub fn with_source(
        config: RuntimeConfig,
        source: Arc<dyn AssetSource>,
        images: Arc<dyn ImageDecoder>,
        audio: Arc<dyn AudioDecoder>,
    ) -> Result<Self> {
        let manager = ResourceManager::with_source(config, source)?;
        Self::build(manager, images, audio)
    }

    fn build(
        mut manager: ResourceManager,
        images: Arc<dyn ImageDecoder>,
        audio: Arc<dyn AudioDecoder>,
    ) -> Result<Self> {
        let texture_loader = TextureLoader::from_config(images, manager.config());
        Ok(Self {
            frame: FrameClock::new(),
            textures: AssetStore::new(&mut manager, texture_loader)?,
            sounds: AssetStore::new(&mut manager, SoundLoader::new(audio))?,
            music: AssetStore::new(&mut manager, MusicLoader)?,
            fonts: AssetStore::new(&mut manager, FontLoader)?,
            sprites: AssetStore::new(&mut manager, SpriteLoader)?,
            materials: AssetStore::new(&mut manager, MaterialLoader)?,
            effects: AssetStore::new(&mut manager, EffectLoader)?,
            manager,
        })
    }

    /// Start a frame and finalize completed loads within the frame budget
    ///
    /// Returns the number of loads finalized.
    pub fn update(&mut self) -> usize {
        self.frame.tick();
        let budget = self.frame.drain_budget(self.manager.config());
        let finalized = self.manager.drain_completed(budget);
        if finalized > 0 {
            trace!(finalized, frame = self.frame.frame_count(), "finalized loads");
        }
        finalized
    }

    /// Finish or cancel pending loads, stop the worker and report leaks
    ///
    /// Returns the number of leaked resources.
    pub fn shutdown(&mut self) -> usize {
        self.manager.shutdown()
    }
}
