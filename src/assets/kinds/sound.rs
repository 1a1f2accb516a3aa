use crate::assets::{AssetLoader, LoadContext};
use crate::error::{AssetError, Result};
use std::sync::Arc;

/// Interleaved PCM produced by an [`AudioDecoder`]
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedAudio {
    pub channels: u16,
    pub sample_rate: u32,
    pub samples: Vec<i16>,
}

/// Host audio codec; runs on the job worker
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, name: &str, bytes: &[u8]) -> Result<DecodedAudio>;
}

/// Treats the file as headerless little-endian 16-bit PCM
#[derive(Clone, Copy, Debug)]
pub struct PcmDecoder {
    pub channels: u16,
    pub sample_rate: u32,
}

impl Default for PcmDecoder {
    fn default() -> Self {
        Self {
            channels: 2,
            sample_rate: 44_100,
        }
    }
}

impl AudioDecoder for PcmDecoder {
    fn decode(&self, name: &str, bytes: &[u8]) -> Result<DecodedAudio> {
        if bytes.len() % 2 != 0 {
            return Err(AssetError::decode(name, "odd number of PCM bytes"));
        }
        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Ok(DecodedAudio {
            channels: self.channels,
            sample_rate: self.sample_rate,
            samples,
        })
    }
}

/// Fully decoded sound effect
#[derive(Clone, Debug, PartialEq)]
pub struct Sound {
    pub channels: u16,
    pub sample_rate: u32,
    pub samples: Vec<i16>,
}

impl Sound {
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration_secs(&self) -> f32 {
        self.frames() as f32 / self.sample_rate as f32
    }
}

/// Sound effects, decoded up front
pub struct SoundLoader {
    decoder: Arc<dyn AudioDecoder>,
}

impl SoundLoader {
    pub fn new(decoder: Arc<dyn AudioDecoder>) -> Self {
        Self { decoder }
    }
}

impl AssetLoader for SoundLoader {
    const TYPE_TAG: &'static str = "sound";
    type Raw = DecodedAudio;
    type Asset = Sound;

    fn decode(&self, ctx: &LoadContext<'_>) -> Result<DecodedAudio> {
        let bytes = ctx.read(ctx.key())?;
        self.decoder.decode(ctx.key(), &bytes)
    }

    fn finalize(&self, key: &str, raw: DecodedAudio) -> Result<Sound> {
        if raw.channels == 0 || raw.sample_rate == 0 {
            return Err(AssetError::finalize(
                key,
                format!("unsupported format: {} channels at {} Hz", raw.channels, raw.sample_rate),
            ));
        }
        if raw.samples.len() % raw.channels as usize != 0 {
            return Err(AssetError::finalize(key, "incomplete sample frame"));
        }
        Ok(Sound {
            channels: raw.channels,
            sample_rate: raw.sample_rate,
            samples: raw.samples,
        })
    }
}

/// Music track, kept encoded and streamed by the mixer
#[derive(Clone, Debug, PartialEq)]
pub struct Music {
    pub data: Vec<u8>,
}

/// Music tracks; a separate cache namespace from sound effects so the same
/// file can be loaded both ways
#[derive(Clone, Copy, Debug, Default)]
pub struct MusicLoader;

impl AssetLoader for MusicLoader {
    const TYPE_TAG: &'static str = "music";
    type Raw = Vec<u8>;
    type Asset = Music;

    fn decode(&self, ctx: &LoadContext<'_>) -> Result<Vec<u8>> {
        ctx.read(ctx.key())
    }

    fn finalize(&self, key: &str, raw: Vec<u8>) -> Result<Music> {
        if raw.is_empty() {
            return Err(AssetError::finalize(key, "empty music file"));
        }
        Ok(Music { data: raw })
    }
}
