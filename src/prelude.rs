//! Convenient re-exports of commonly used types.
//!
//! The prelude can be imported with:
//! ```
//! use asset_runtime::prelude::*;
//! ```

pub use crate::assets::kinds::{
    AudioDecoder, Effect, EffectLoader, Font, FontLoader, ImageDecoder, Material,
    MaterialLoader, Music, MusicLoader, PcmDecoder, RawImageDecoder, Sound, SoundLoader, Sprite,
    SpriteLoader, Texture, TextureLoader,
};
pub use crate::assets::{AssetLoader, AssetSource, AssetStore, FileSource, LoadContext, MemorySource};
pub use crate::config::RuntimeConfig;
pub use crate::error::{AssetError, Result};
pub use crate::frame::FrameClock;
pub use crate::jobs::{JobId, JobScheduler};
pub use crate::resources::{AssetHandle, ResourceManager, ResourceState};
pub use crate::runtime::AssetRuntime;
