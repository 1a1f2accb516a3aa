use crate::assets::kinds::read_json;
use crate::assets::{AssetLoader, LoadContext};
use crate::error::{AssetError, Result};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

const MAX_PARTICLES_LIMIT: u32 = 16_384;

/// Closed interval sampled per particle
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

impl<T: Copy> Range<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    pub fn constant(value: T) -> Self {
        Self {
            min: value,
            max: value,
        }
    }
}

impl Range<f32> {
    fn is_ordered(&self) -> bool {
        self.min <= self.max
    }

    /// Value at `t` in `[0, 1]`
    pub fn lerp(&self, t: f32) -> f32 {
        self.min + (self.max - self.min) * t
    }
}

impl Range<Vec2> {
    fn is_ordered(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    pub fn lerp(&self, t: f32) -> Vec2 {
        self.min.lerp(self.max, t)
    }
}

/// One particle emitter; simulation and drawing are up to the host
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Emitter {
    /// Particle texture, required
    pub color_map: String,
    pub material: Option<String>,
    pub max_particles: u32,
    pub local_simulation: bool,
    pub spawn_count: Range<f32>,
    pub velocity: Range<Vec2>,
    pub rotation: Range<f32>,
    /// Emitter lifetime in seconds
    pub life_total: Range<f32>,
    pub cycles_total: Range<f32>,
}

impl Default for Emitter {
    fn default() -> Self {
        Self {
            color_map: String::new(),
            material: None,
            max_particles: 16,
            local_simulation: true,
            spawn_count: Range::constant(0.0),
            velocity: Range::new(Vec2::NEG_ONE, Vec2::ONE),
            rotation: Range::new(-PI, PI),
            life_total: Range::constant(10.0),
            cycles_total: Range::constant(1.0),
        }
    }
}

/// Particle effect descriptor: `{ "emitters": [{ "color_map": "spark.png", ... }] }`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub emitters: Vec<Emitter>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct EffectLoader;

impl AssetLoader for EffectLoader {
    const TYPE_TAG: &'static str = "effect";
    type Raw = Effect;
    type Asset = Effect;

    fn decode(&self, ctx: &LoadContext<'_>) -> Result<Effect> {
        read_json(ctx)
    }

    fn finalize(&self, key: &str, mut effect: Effect) -> Result<Effect> {
        if effect.emitters.is_empty() {
            return Err(AssetError::finalize(key, "effect has no emitters"));
        }
        for (index, emitter) in effect.emitters.iter_mut().enumerate() {
            if emitter.color_map.is_empty() {
                return Err(AssetError::finalize(
                    key,
                    format!("emitter {index} has no color map"),
                ));
            }
            let ordered = emitter.spawn_count.is_ordered()
                && emitter.velocity.is_ordered()
                && emitter.rotation.is_ordered()
                && emitter.life_total.is_ordered()
                && emitter.cycles_total.is_ordered();
            if !ordered {
                return Err(AssetError::finalize(
                    key,
                    format!("emitter {index} has a range with min > max"),
                ));
            }
            emitter.max_particles = emitter.max_particles.min(MAX_PARTICLES_LIMIT);
        }
        Ok(effect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemorySource;

    fn load(json: &str) -> Result<Effect> {
        let source = MemorySource::new();
        source.insert("fx.json", json.as_bytes().to_vec());
        let raw = EffectLoader.decode(&LoadContext::new("fx.json", &source))?;
        EffectLoader.finalize("fx.json", raw)
    }

    #[test]
    fn test_effect_defaults_and_clamp() {
        let effect = load(
            r#"{ "emitters": [
                { "color_map": "spark.png", "max_particles": 100000,
                  "velocity": { "min": [-2, 0], "max": [2, 5] } } ] }"#,
        )
        .unwrap();

        let emitter = &effect.emitters[0];
        assert_eq!(emitter.max_particles, MAX_PARTICLES_LIMIT);
        assert!(emitter.local_simulation);
        assert_eq!(emitter.velocity.lerp(0.5), Vec2::new(0.0, 2.5));
        assert_eq!(emitter.life_total, Range::constant(10.0));
    }

    #[test]
    fn test_effect_validation() {
        assert!(load(r#"{ "emitters": [] }"#).is_err());
        assert!(load(r#"{ "emitters": [{ "max_particles": 4 }] }"#).is_err());
        assert!(load(
            r#"{ "emitters": [{ "color_map": "a.png",
                 "life_total": { "min": 3, "max": 1 } }] }"#
        )
        .is_err());
        assert!(matches!(
            load(r#"{ "emitters": 3 }"#),
            Err(AssetError::Decode { .. })
        ));
    }
}
