use crate::assets::{AssetLoader, LoadContext};
use crate::config::RuntimeConfig;
use crate::error::{AssetError, Result};
use glam::{UVec2, Vec2};
use std::sync::Arc;
use tracing::debug;

/// RGBA8 pixels produced by an [`ImageDecoder`]
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Host image codec; runs on the job worker
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, name: &str, bytes: &[u8]) -> Result<DecodedImage>;
}

/// Decoder for uncompressed images: little-endian `u32` width and height
/// followed by RGBA8 rows
#[derive(Clone, Copy, Debug, Default)]
pub struct RawImageDecoder;

impl RawImageDecoder {
    /// Encode pixels in the format this decoder reads
    pub fn encode(width: u32, height: u32, pixels: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + pixels.len());
        bytes.extend_from_slice(&width.to_le_bytes());
        bytes.extend_from_slice(&height.to_le_bytes());
        bytes.extend_from_slice(pixels);
        bytes
    }
}

impl ImageDecoder for RawImageDecoder {
    fn decode(&self, name: &str, bytes: &[u8]) -> Result<DecodedImage> {
        if bytes.len() < 8 {
            return Err(AssetError::decode(name, "truncated image header"));
        }
        let (header, pixels) = bytes.split_at(8);
        let width = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let height = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        Ok(DecodedImage {
            width,
            height,
            pixels: pixels.to_vec(),
        })
    }
}

/// Decoded image plus the size scale of the file it came from
#[derive(Debug)]
pub struct RawTexture {
    pub image: DecodedImage,
    pub size_scale: f32,
}

/// Texture payload, ready for upload by the renderer
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub dimensions: UVec2,
    pub pixels: Vec<u8>,
    /// Pixel size over logical size (2.0 for an "@2x" texture)
    pub size_scale: f32,
    pub has_alpha: bool,
}

impl Texture {
    /// Size in logical units
    pub fn size(&self) -> Vec2 {
        self.dimensions.as_vec2() / self.size_scale
    }
}

/// `name` with `version` inserted before its extension
///
/// `"gfx/a.png"` with `"@2x"` becomes `"gfx/a@2x.png"`; names without an
/// extension get the version appended.
pub fn versioned_name(name: &str, version: &str) -> String {
    let file_start = name.rfind('/').map_or(0, |slash| slash + 1);
    match name[file_start..].rfind('.') {
        Some(dot) => {
            let (stem, extension) = name.split_at(file_start + dot);
            format!("{stem}{version}{extension}")
        }
        None => format!("{name}{version}"),
    }
}

pub struct TextureLoader {
    decoder: Arc<dyn ImageDecoder>,
    version: Option<String>,
    version_size_multiplier: f32,
}

impl TextureLoader {
    pub fn new(decoder: Arc<dyn ImageDecoder>) -> Self {
        Self {
            decoder,
            version: None,
            version_size_multiplier: 1.0,
        }
    }

    /// Loader using the texture version settings of `config`
    pub fn from_config(decoder: Arc<dyn ImageDecoder>, config: &RuntimeConfig) -> Self {
        Self::new(decoder)
            .with_version(config.texture_version.clone(), config.texture_version_size_multiplier)
    }

    /// Prefer `name` + `version` files, recording `multiplier` as their size scale
    pub fn with_version(mut self, version: Option<String>, multiplier: f32) -> Self {
        self.version = version.filter(|version| !version.is_empty());
        self.version_size_multiplier = multiplier;
        self
    }

    fn read(&self, ctx: &LoadContext<'_>) -> Result<(Vec<u8>, f32)> {
        let key = ctx.key();
        if let Some(version) = &self.version {
            let versioned = versioned_name(key, version);
            match ctx.read(&versioned) {
                Ok(bytes) => return Ok((bytes, self.version_size_multiplier)),
                Err(AssetError::NotFound(_)) => {
                    debug!("No {versioned}, falling back to {key}");
                }
                Err(err) => return Err(err),
            }
        }
        Ok((ctx.read(key)?, 1.0))
    }
}

impl AssetLoader for TextureLoader {
    const TYPE_TAG: &'static str = "texture";
    type Raw = RawTexture;
    type Asset = Texture;

    fn decode(&self, ctx: &LoadContext<'_>) -> Result<RawTexture> {
        let (bytes, size_scale) = self.read(ctx)?;
        let image = self.decoder.decode(ctx.key(), &bytes)?;
        Ok(RawTexture { image, size_scale })
    }

    fn finalize(&self, key: &str, raw: RawTexture) -> Result<Texture> {
        let DecodedImage {
            width,
            height,
            pixels,
        } = raw.image;
        if width == 0 || height == 0 {
            return Err(AssetError::finalize(
                key,
                format!("invalid dimensions {width}x{height}"),
            ));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|count| count.checked_mul(4))
            .ok_or_else(|| AssetError::finalize(key, "image dimensions overflow"))?;
        if pixels.len() != expected {
            return Err(AssetError::finalize(
                key,
                format!("expected {expected} bytes of RGBA data, got {}", pixels.len()),
            ));
        }
        let has_alpha = pixels.chunks_exact(4).any(|pixel| pixel[3] != u8::MAX);
        Ok(Texture {
            dimensions: UVec2::new(width, height),
            pixels,
            size_scale: raw.size_scale,
            has_alpha,
        })
    }
}
