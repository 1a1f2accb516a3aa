use crate::assets::kinds::read_json;
use crate::assets::{AssetLoader, LoadContext};
use crate::error::{AssetError, Result};
use ahash::AHashSet;
use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Uniform value; the JSON shape picks the variant (`1.0`, `[1, 2]`, ...)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialParam {
    pub name: String,
    pub value: ParamValue,
}

/// Shader plus its inputs; compiling and binding are up to the renderer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub shader: String,
    #[serde(default)]
    pub textures: SmallVec<[String; 4]>,
    #[serde(default)]
    pub parameters: Vec<MaterialParam>,
}

impl Material {
    pub fn parameter(&self, name: &str) -> Option<ParamValue> {
        self.parameters
            .iter()
            .find(|param| param.name == name)
            .map(|param| param.value)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MaterialLoader;

impl AssetLoader for MaterialLoader {
    const TYPE_TAG: &'static str = "material";
    type Raw = Material;
    type Asset = Material;

    fn decode(&self, ctx: &LoadContext<'_>) -> Result<Material> {
        read_json(ctx)
    }

    fn finalize(&self, key: &str, material: Material) -> Result<Material> {
        if material.shader.trim().is_empty() {
            return Err(AssetError::finalize(key, "material has no shader"));
        }
        let mut seen = AHashSet::with_capacity(material.parameters.len());
        for param in &material.parameters {
            if !seen.insert(param.name.as_str()) {
                return Err(AssetError::finalize(
                    key,
                    format!("duplicate parameter '{}'", param.name),
                ));
            }
        }
        Ok(material)
    }
}
