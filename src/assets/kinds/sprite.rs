use crate::assets::kinds::read_json;
use crate::assets::{AssetLoader, LoadContext};
use crate::error::{AssetError, Result};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Rectangle of the sprite sheet, in texels
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub position: Vec2,
    pub size: Vec2,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub name: String,
    /// Seconds per frame
    pub frame_time: f32,
    #[serde(default = "default_looping")]
    pub looping: bool,
    pub frames: SmallVec<[Frame; 8]>,
}

fn default_looping() -> bool {
    true
}

/// Animated sprite descriptor
///
/// ```json
/// { "texture": "hero.png",
///   "animations": [{ "name": "idle", "frame_time": 0.1,
///                    "frames": [{ "position": [0, 0], "size": [16, 16] }] }] }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    /// Sprite sheet, resolved by the host through the texture store
    pub texture: String,
    /// Animation played first; the first one when absent
    #[serde(default)]
    pub default_animation: Option<String>,
    #[serde(default)]
    pub origin: Vec2,
    pub animations: Vec<Animation>,
}

impl Sprite {
    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.iter().find(|animation| animation.name == name)
    }

    pub fn default_animation(&self) -> Option<&Animation> {
        match &self.default_animation {
            Some(name) => self.animation(name),
            None => self.animations.first(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SpriteLoader;

impl AssetLoader for SpriteLoader {
    const TYPE_TAG: &'static str = "sprite";
    type Raw = Sprite;
    type Asset = Sprite;

    fn decode(&self, ctx: &LoadContext<'_>) -> Result<Sprite> {
        read_json(ctx)
    }

    fn finalize(&self, key: &str, sprite: Sprite) -> Result<Sprite> {
        if sprite.texture.is_empty() {
            return Err(AssetError::finalize(key, "sprite has no texture"));
        }
        if sprite.animations.is_empty() {
            return Err(AssetError::finalize(key, "sprite has no animations"));
        }
        for animation in &sprite.animations {
            if !(animation.frame_time.is_finite() && animation.frame_time > 0.0) {
                return Err(AssetError::finalize(
                    key,
                    format!("animation '{}' has a non-positive frame time", animation.name),
                ));
            }
            if animation.frames.is_empty() {
                return Err(AssetError::finalize(
                    key,
                    format!("animation '{}' has no frames", animation.name),
                ));
            }
        }
        if sprite.default_animation().is_none() {
            return Err(AssetError::finalize(
                key,
                format!(
                    "unknown default animation '{}'",
                    sprite.default_animation.as_deref().unwrap_or_default()
                ),
            ));
        }
        Ok(sprite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemorySource;

    const HERO: &str = r#"{
        "texture": "hero.png",
        "default_animation": "run",
        "animations": [
            { "name": "idle", "frame_time": 0.2,
              "frames": [{ "position": [0, 0], "size": [16, 16] }] },
            { "name": "run", "frame_time": 0.1, "looping": false,
              "frames": [{ "position": [16, 0], "size": [16, 16] },
                         { "position": [32, 0], "size": [16, 16] }] }
        ]
    }"#;

    fn load(json: &str) -> Result<Sprite> {
        let source = MemorySource::new();
        source.insert("hero.json", json.as_bytes().to_vec());
        let raw = SpriteLoader.decode(&LoadContext::new("hero.json", &source))?;
        SpriteLoader.finalize("hero.json", raw)
    }

    #[test]
    fn test_sprite_descriptor() {
        let sprite = load(HERO).unwrap();
        let run = sprite.default_animation().unwrap();
        assert_eq!(run.name, "run");
        assert!(!run.looping);
        assert_eq!(run.frames.len(), 2);
        assert!(sprite.animation("idle").unwrap().looping);
        assert_eq!(sprite.origin, Vec2::ZERO);
    }

    #[test]
    fn test_sprite_validation() {
        assert!(matches!(
            load(r#"{ "texture": "a.png", "animations": [] }"#),
            Err(AssetError::Finalize { .. })
        ));
        let bad_default = HERO.replace(r#""default_animation": "run""#, r#""default_animation": "walk""#);
        assert!(load(&bad_default).is_err());
        let bad_time = HERO.replace("0.2", "0.0");
        assert!(load(&bad_time).is_err());
        assert!(matches!(load("{"), Err(AssetError::Decode { .. })));
    }
}
