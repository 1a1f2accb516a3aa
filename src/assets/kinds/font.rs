use crate::assets::{AssetLoader, LoadContext};
use crate::error::{AssetError, Result};

/// Style flags carried in the font key
pub mod style {
    pub const BOLD: u32 = 1 << 0;
    pub const ITALIC: u32 = 1 << 1;
    pub const UNDERLINED: u32 = 1 << 2;
    pub const STRIKE_THROUGH: u32 = 1 << 3;
}

const TRUETYPE_MAGICS: [[u8; 4]; 4] = [*b"\0\x01\0\0", *b"OTTO", *b"true", *b"ttcf"];

/// Font face at one point size, glyphs are rasterized by the host
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    pub face: String,
    pub point_size: u32,
    pub style: u32,
    pub data: Vec<u8>,
}

/// Parsed `face:size[:style]` key
#[derive(Debug)]
pub struct RawFont {
    face: String,
    point_size: u32,
    style: u32,
    data: Vec<u8>,
}

/// Fonts are cached per face, size and style: `"fonts/arial.ttf:16"` or
/// `"fonts/arial.ttf:16:1"`
#[derive(Clone, Copy, Debug, Default)]
pub struct FontLoader;

impl FontLoader {
    /// Cache key for a face, size and style
    pub fn key(face: &str, point_size: u32, style: u32) -> String {
        if style == 0 {
            format!("{face}:{point_size}")
        } else {
            format!("{face}:{point_size}:{style}")
        }
    }

    fn parse_key(key: &str) -> Result<(&str, u32, u32)> {
        let malformed = || AssetError::decode(key, "font key must look like 'face:size[:style]'");
        let mut parts = key.rsplitn(3, ':');
        let last = parts.next().ok_or_else(malformed)?;
        let middle = parts.next().ok_or_else(malformed)?;

        let (face, size, style) = match parts.next() {
            Some(face) if middle.parse::<u32>().is_ok() => (face, middle, Some(last)),
            Some(face) => (&key[..face.len() + 1 + middle.len()], last, None),
            None => (middle, last, None),
        };

        let point_size: u32 = size.parse().map_err(|_| malformed())?;
        if point_size == 0 || face.is_empty() {
            return Err(malformed());
        }
        let style = match style {
            Some(style) => style.parse().map_err(|_| malformed())?,
            None => 0,
        };
        Ok((face, point_size, style))
    }
}

impl AssetLoader for FontLoader {
    const TYPE_TAG: &'static str = "font";
    type Raw = RawFont;
    type Asset = Font;

    fn decode(&self, ctx: &LoadContext<'_>) -> Result<RawFont> {
        let (face, point_size, style) = Self::parse_key(ctx.key())?;
        let data = ctx.read(face)?;
        Ok(RawFont {
            face: face.to_string(),
            point_size,
            style,
            data,
        })
    }

    fn finalize(&self, key: &str, raw: RawFont) -> Result<Font> {
        let magic = raw.data.get(..4).unwrap_or_default();
        if !TRUETYPE_MAGICS.iter().any(|known| known.as_slice() == magic) {
            return Err(AssetError::finalize(key, "not a TrueType or OpenType font"));
        }
        Ok(Font {
            face: raw.face,
            point_size: raw.point_size,
            style: raw.style,
            data: raw.data,
        })
    }
}
