//! Per-object encoding: one glTF mesh and one scene node per sanitized object

use crate::attributes::{
    AttributeKind, EncodedAttribute, build_accessor, encode_indices, encode_normals,
    encode_positions, encode_tex_coords,
};
use crate::buffer::AttributeSink;
use crate::codec::{CodecAdapter, CompressionOptions, DRACO_EXTENSION, MeshCodec};
use crate::error::ExportError;
use crate::graph::GraphTables;
use crate::material::MaterialCache;
use crate::options::{EncodingMode, ExportOptions};
use crate::scene::{Mesh, SanitizedObject, Z_UP_TO_Y_UP};
use gltf_json as json;
use gltf_json::validation::Checked::Valid;
use std::collections::BTreeMap;

pub const POSITION_ATTRIBUTE: &str = "POSITION";
pub const NORMAL_ATTRIBUTE: &str = "NORMAL";
pub const TEX_COORD_0_ATTRIBUTE: &str = "TEXCOORD_0";

/// Borrowed view of the pass state needed to encode one object
pub struct ObjectEncoder<'a> {
    pub options: &'a ExportOptions,
    pub mode: EncodingMode,
    pub tables: &'a mut GraphTables,
    pub materials: &'a mut MaterialCache,
    pub sink: &'a mut dyn AttributeSink,
    pub codec: Option<&'a dyn MeshCodec>,
}

impl ObjectEncoder<'_> {
    /// Encode `object`, returning its scene node, or `None` when it had
    /// nothing to draw.
    pub fn encode(
        mut self,
        object: &SanitizedObject,
    ) -> Result<Option<json::Index<json::Node>>, ExportError> {
        let meshes: Vec<&Mesh> = object
            .meshes
            .iter()
            .filter(|mesh| {
                let keep = !(self.options.skip_empty_meshes && mesh.is_empty());
                if !keep {
                    tracing::warn!(
                        "Skipping empty mesh ({} vertices, {} faces) in {:?}",
                        mesh.vertex_count(),
                        mesh.faces.len(),
                        object.source_name
                    );
                }
                keep
            })
            .collect();

        if meshes.is_empty() {
            tracing::warn!("Object {:?} has no geometry, skipped", object.source_name);
            return Ok(None);
        }

        let material = self
            .materials
            .resolve(self.tables, &object.material, &object.material_id);

        let mut primitives = Vec::with_capacity(meshes.len());
        for mesh in meshes {
            let prepared = self.prepare(mesh);
            let primitive = match self.mode {
                EncodingMode::Compressed(options) => {
                    self.encode_compressed(&prepared, options, material)?
                }
                EncodingMode::Binary | EncodingMode::Text => {
                    self.encode_uncompressed(&prepared, material)
                }
            };
            primitives.push(primitive);
        }

        let mesh = self.tables.push_mesh(json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            primitives,
            weights: None,
        });

        let name = object.source_name.clone().filter(|n| !n.is_empty());
        let node = self.tables.push_scene_node(json::Node {
            camera: None,
            children: None,
            extensions: Default::default(),
            extras: Default::default(),
            matrix: None,
            mesh: Some(mesh),
            name,
            rotation: None,
            scale: None,
            skin: None,
            translation: None,
            weights: None,
        });

        tracing::debug!(
            "Encoded object {:?} as mesh #{} / node #{}",
            object.source_name,
            mesh.value(),
            node.value()
        );
        Ok(Some(node))
    }

    /// Copy `mesh` into glTF conventions: Y-up, flipped V, triangles only
    fn prepare(&self, mesh: &Mesh) -> Mesh {
        let mut prepared = mesh.clone();
        if self.options.map_z_to_y {
            prepared.transform(&Z_UP_TO_Y_UP);
        }
        prepared.flip_tex_coords_v();
        prepared.triangulate();
        prepared
    }

    fn store(&mut self, attribute: &EncodedAttribute) -> json::Index<json::Accessor> {
        let range = self.sink.store(self.tables, &attribute.bytes);
        let view = self.tables.push_view(range.view(Some(attribute.kind.target())));
        self.tables.push_accessor(attribute.accessor(view))
    }

    fn encode_uncompressed(
        &mut self,
        mesh: &Mesh,
        material: json::Index<json::Material>,
    ) -> json::mesh::Primitive {
        let positions = encode_positions(&mesh.vertices);
        let indices = encode_indices(&mesh.faces, mesh.vertex_count());

        // Stored in this order: vertices, indices, normals, texcoords
        let positions = self.store(&positions);
        let indices = self.store(&indices);
        let normals =
            (!mesh.normals.is_empty()).then(|| self.store(&encode_normals(&mesh.normals)));
        let tex_coords = (!mesh.tex_coords.is_empty())
            .then(|| self.store(&encode_tex_coords(&mesh.tex_coords)));

        primitive(positions, normals, tex_coords, indices, material, None)
    }

    fn encode_compressed(
        &mut self,
        mesh: &Mesh,
        options: CompressionOptions,
        material: json::Index<json::Material>,
    ) -> Result<json::mesh::Primitive, ExportError> {
        let codec = self.codec.ok_or(ExportError::MissingCodec)?;
        let compressed = CodecAdapter::new(codec, options).compress(mesh)?;
        let stats = &compressed.stats;

        let range = self.sink.store(self.tables, &compressed.bytes);
        let view = self.tables.push_view(range.view(None));

        let positions = self.tables.push_accessor(build_accessor(
            AttributeKind::Position,
            None,
            stats.vertex_count,
            &stats.position_bounds,
        ));
        let indices = self.tables.push_accessor(build_accessor(
            AttributeKind::Index,
            None,
            stats.index_count(),
            &stats.index_bounds(),
        ));
        let normals = (stats.normal_count > 0).then(|| {
            self.tables.push_accessor(build_accessor(
                AttributeKind::Normal,
                None,
                stats.normal_count,
                &stats.normal_bounds,
            ))
        });
        let tex_coords = (stats.tex_coord_count > 0).then(|| {
            self.tables.push_accessor(build_accessor(
                AttributeKind::TexCoord,
                None,
                stats.tex_coord_count,
                &stats.tex_coord_bounds,
            ))
        });

        // Codec attribute ids follow the order attributes were handed over
        let mut slots = serde_json::Map::new();
        for (semantic, present) in [
            (POSITION_ATTRIBUTE, true),
            (NORMAL_ATTRIBUTE, normals.is_some()),
            (TEX_COORD_0_ATTRIBUTE, tex_coords.is_some()),
        ] {
            if present {
                let slot = slots.len();
                slots.insert(semantic.to_string(), json::Value::from(slot));
            }
        }

        let mut extension = json::extensions::mesh::Primitive::default();
        extension.others.insert(
            DRACO_EXTENSION.to_string(),
            serde_json::json!({
                "bufferView": view.value(),
                "attributes": slots,
            }),
        );

        Ok(primitive(
            positions,
            normals,
            tex_coords,
            indices,
            material,
            Some(extension),
        ))
    }
}

fn primitive(
    positions: json::Index<json::Accessor>,
    normals: Option<json::Index<json::Accessor>>,
    tex_coords: Option<json::Index<json::Accessor>>,
    indices: json::Index<json::Accessor>,
    material: json::Index<json::Material>,
    extensions: Option<json::extensions::mesh::Primitive>,
) -> json::mesh::Primitive {
    let mut attributes = BTreeMap::new();
    attributes.insert(Valid(json::mesh::Semantic::Positions), positions);
    if let Some(normals) = normals {
        attributes.insert(Valid(json::mesh::Semantic::Normals), normals);
    }
    if let Some(tex_coords) = tex_coords {
        attributes.insert(Valid(json::mesh::Semantic::TexCoords(0)), tex_coords);
    }

    json::mesh::Primitive {
        attributes,
        extensions,
        extras: Default::default(),
        indices: Some(indices),
        material: Some(material),
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    }
}
