//! Material deduplication

use crate::graph::GraphTables;
use crate::scene::{Material, MaterialId};
use gltf_json as json;
use gltf_json::validation::Checked::Valid;
use hashbrown::HashMap;

/// Maps material identity to its glTF index, building each material once
#[derive(Debug, Default)]
pub struct MaterialCache {
    indices: HashMap<MaterialId, json::Index<json::Material>>,
}

impl MaterialCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Index of the material for `id`, appending it on first sight
    pub fn resolve(
        &mut self,
        tables: &mut GraphTables,
        material: &Material,
        id: &MaterialId,
    ) -> json::Index<json::Material> {
        if let Some(&index) = self.indices.get(id) {
            return index;
        }

        let index = tables.push_material(to_json_material(material));
        tracing::debug!("Added material {:?} as #{}", id.0, index.value());
        self.indices.insert(id.clone(), index);
        index
    }
}

fn to_json_material(material: &Material) -> json::Material {
    let alpha_mode = if material.base_color[3] < 1.0 {
        json::material::AlphaMode::Blend
    } else {
        json::material::AlphaMode::Opaque
    };

    json::Material {
        alpha_cutoff: None,
        alpha_mode: Valid(alpha_mode),
        double_sided: material.double_sided,
        name: material.name.clone(),
        pbr_metallic_roughness: json::material::PbrMetallicRoughness {
            base_color_factor: json::material::PbrBaseColorFactor(material.base_color),
            base_color_texture: None,
            metallic_factor: json::material::StrengthFactor(material.metallic),
            roughness_factor: json::material::StrengthFactor(material.roughness),
            metallic_roughness_texture: None,
            extensions: None,
            extras: Default::default(),
        },
        normal_texture: None,
        occlusion_texture: None,
        emissive_texture: None,
        emissive_factor: json::material::EmissiveFactor(material.emissive),
        extensions: None,
        extras: Default::default(),
    }
}
