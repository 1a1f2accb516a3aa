//! Loaders for the asset types of the rendering runtime.
//!
//! Pixel and sample decoding belong to the host and plug in through
//! [`ImageDecoder`] and [`AudioDecoder`]; descriptor formats (sprites,
//! materials, particle effects) are JSON and decoded here.

pub mod effect;
pub mod font;
pub mod material;
pub mod sound;
pub mod sprite;
pub mod texture;

pub use effect::{Effect, EffectLoader, Emitter, Range};
pub use font::{Font, FontLoader};
pub use material::{Material, MaterialLoader, MaterialParam, ParamValue};
pub use sound::{AudioDecoder, DecodedAudio, Music, MusicLoader, PcmDecoder, Sound, SoundLoader};
pub use sprite::{Animation, Frame, Sprite, SpriteLoader};
pub use texture::{DecodedImage, ImageDecoder, RawImageDecoder, Texture, TextureLoader};

use crate::assets::LoadContext;
use crate::error::{AssetError, Result};
use serde::de::DeserializeOwned;

/// Read the asset named by the context key and parse it as JSON
pub(crate) fn read_json<T: DeserializeOwned>(ctx: &LoadContext<'_>) -> Result<T> {
    let bytes = ctx.read(ctx.key())?;
    serde_json::from_slice(&bytes).map_err(|e| AssetError::decode(ctx.key(), e))
}
