//! Attribute packing and bounds
//!
//! Every stream is written tightly packed and little-endian, with accessor
//! bounds computed component-wise over the values exactly as stored.

use crate::scene::Face;
use gltf_json as json;
use gltf_json::validation::Checked::Valid;

/// Which glTF attribute a packed stream feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Position,
    Normal,
    TexCoord,
    Index,
}

impl AttributeKind {
    fn accessor_type(self) -> json::accessor::Type {
        match self {
            AttributeKind::Position | AttributeKind::Normal => json::accessor::Type::Vec3,
            AttributeKind::TexCoord => json::accessor::Type::Vec2,
            AttributeKind::Index => json::accessor::Type::Scalar,
        }
    }

    fn component_type(self) -> json::accessor::ComponentType {
        match self {
            AttributeKind::Index => json::accessor::ComponentType::U32,
            _ => json::accessor::ComponentType::F32,
        }
    }

    /// Buffer view target for uncompressed streams
    pub fn target(self) -> json::buffer::Target {
        match self {
            AttributeKind::Index => json::buffer::Target::ElementArrayBuffer,
            _ => json::buffer::Target::ArrayBuffer,
        }
    }
}

/// Component-wise accessor bounds
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    pub min: Vec<f64>,
    pub max: Vec<f64>,
}

impl Bounds {
    /// Index-range bounds: 0 ..= vertex_count - 1
    pub fn index_range(vertex_count: usize) -> Self {
        Self {
            min: vec![0.0],
            max: vec![vertex_count as f64 - 1.0],
        }
    }

    fn to_json(values: &[f64]) -> Option<json::Value> {
        // JSON has no infinities; an empty stream keeps its seeds and gets no bounds
        if values.iter().all(|v| v.is_finite()) {
            Some(json::Value::Array(
                values.iter().copied().map(json::Value::from).collect(),
            ))
        } else {
            None
        }
    }
}

/// Compute component-wise bounds, seeded from +inf / -inf
pub fn compute_bounds<const N: usize>(items: &[[f32; N]]) -> Bounds {
    let mut min = [f32::INFINITY; N];
    let mut max = [f32::NEG_INFINITY; N];

    for item in items {
        for i in 0..N {
            min[i] = min[i].min(item[i]);
            max[i] = max[i].max(item[i]);
        }
    }

    Bounds {
        min: min.iter().map(|&v| v as f64).collect(),
        max: max.iter().map(|&v| v as f64).collect(),
    }
}

/// A packed attribute stream ready to be stored
#[derive(Debug, Clone)]
pub struct EncodedAttribute {
    pub kind: AttributeKind,
    pub bytes: Vec<u8>,
    /// Element count (vertices for vec attributes, scalars for indices)
    pub count: usize,
    pub bounds: Bounds,
}

impl EncodedAttribute {
    pub fn accessor(&self, buffer_view: json::Index<json::buffer::View>) -> json::Accessor {
        build_accessor(self.kind, Some(buffer_view), self.count, &self.bounds)
    }
}

/// Build an accessor; `buffer_view` is `None` for compressed attributes
pub fn build_accessor(
    kind: AttributeKind,
    buffer_view: Option<json::Index<json::buffer::View>>,
    count: usize,
    bounds: &Bounds,
) -> json::Accessor {
    json::Accessor {
        buffer_view,
        // byteOffset is only meaningful alongside a bufferView
        byte_offset: buffer_view.map(|_| 0u64.into()),
        count: count.into(),
        component_type: Valid(json::accessor::GenericComponentType(kind.component_type())),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(kind.accessor_type()),
        min: Bounds::to_json(&bounds.min),
        max: Bounds::to_json(&bounds.max),
        name: None,
        normalized: false,
        sparse: None,
    }
}

fn pack_f32<const N: usize>(items: &[[f32; N]]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(items.len() * N * 4);
    for item in items {
        for component in item {
            bytes.extend_from_slice(&component.to_le_bytes());
        }
    }
    bytes
}

/// Narrow positions to f32 and pack them
pub fn encode_positions(vertices: &[[f64; 3]]) -> EncodedAttribute {
    let narrowed: Vec<[f32; 3]> = vertices
        .iter()
        .map(|v| [v[0] as f32, v[1] as f32, v[2] as f32])
        .collect();

    EncodedAttribute {
        kind: AttributeKind::Position,
        bytes: pack_f32(&narrowed),
        count: narrowed.len(),
        bounds: compute_bounds(&narrowed),
    }
}

pub fn encode_normals(normals: &[[f32; 3]]) -> EncodedAttribute {
    EncodedAttribute {
        kind: AttributeKind::Normal,
        bytes: pack_f32(normals),
        count: normals.len(),
        bounds: compute_bounds(normals),
    }
}

/// Pack texture coordinates; V must already be flipped by the caller
pub fn encode_tex_coords(tex_coords: &[[f32; 2]]) -> EncodedAttribute {
    EncodedAttribute {
        kind: AttributeKind::TexCoord,
        bytes: pack_f32(tex_coords),
        count: tex_coords.len(),
        bounds: compute_bounds(tex_coords),
    }
}

/// Flatten faces to a triangle list; quad (A,B,C,D) becomes (A,B,C), (A,C,D)
pub fn triangulate(faces: &[Face]) -> Vec<u32> {
    let mut indices = Vec::with_capacity(faces.len() * 3);
    for face in faces {
        match *face {
            Face::Triangle([a, b, c]) => indices.extend_from_slice(&[a, b, c]),
            Face::Quad([a, b, c, d]) => indices.extend_from_slice(&[a, b, c, a, c, d]),
        }
    }
    indices
}

/// Pack triangulated indices as u32.
///
/// Bounds describe the index range of the vertex space, not the indices
/// actually referenced.
pub fn encode_indices(faces: &[Face], vertex_count: usize) -> EncodedAttribute {
    let indices = triangulate(faces);
    let mut bytes = Vec::with_capacity(indices.len() * 4);
    for idx in &indices {
        bytes.extend_from_slice(&idx.to_le_bytes());
    }

    EncodedAttribute {
        kind: AttributeKind::Index,
        bytes,
        count: indices.len(),
        bounds: Bounds::index_range(vertex_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_bounds() {
        let encoded = encode_positions(&[[0.0, 0.0, 0.0], [1.0, 2.0, 3.0], [-1.0, 5.0, 0.0]]);
        assert_eq!(encoded.bounds.min, vec![-1.0, 0.0, 0.0]);
        assert_eq!(encoded.bounds.max, vec![1.0, 5.0, 3.0]);
        assert_eq!(encoded.count, 3);
        assert_eq!(encoded.bytes.len(), 36);
    }

    #[test]
    fn test_positions_narrowed_little_endian() {
        let encoded = encode_positions(&[[0.1, -2.0, 1.0e10]]);
        let decoded: Vec<f32> = encoded
            .bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(decoded, vec![0.1f64 as f32, -2.0, 1.0e10f64 as f32]);
    }

    #[test]
    fn test_triangulate() {
        assert_eq!(triangulate(&[Face::Quad([0, 1, 2, 3])]), vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(triangulate(&[Face::Triangle([0, 1, 2])]), vec![0, 1, 2]);
    }

    #[test]
    fn test_indices_bounds_are_index_range() {
        let encoded = encode_indices(&[Face::Triangle([0, 1, 2])], 10);
        assert_eq!(encoded.count, 3);
        assert_eq!(encoded.bytes.len(), 12);
        assert_eq!(encoded.bounds.min, vec![0.0]);
        assert_eq!(encoded.bounds.max, vec![9.0]);
    }

    #[test]
    fn test_empty_stream_keeps_seeds() {
        let encoded = encode_normals(&[]);
        assert_eq!(encoded.count, 0);
        assert!(encoded.bytes.is_empty());
        assert_eq!(encoded.bounds.min, vec![f64::INFINITY; 3]);
        assert_eq!(encoded.bounds.max, vec![f64::NEG_INFINITY; 3]);

        let view = json::Index::new(0);
        let accessor = encoded.accessor(view);
        assert!(accessor.min.is_none());
        assert!(accessor.max.is_none());
    }

    #[test]
    fn test_tex_coord_accessor() {
        let encoded = encode_tex_coords(&[[0.0, 1.0], [0.5, 0.25]]);
        let accessor = encoded.accessor(json::Index::new(3));
        assert_eq!(accessor.buffer_view.map(|v| v.value()), Some(3));
        assert_eq!(accessor.type_, Valid(json::accessor::Type::Vec2));
        assert_eq!(
            accessor.min,
            Some(json::Value::Array(vec![0.0.into(), 0.25.into()]))
        );
    }

    #[test]
    fn test_byte_offset_only_with_buffer_view() {
        let bounds = Bounds::index_range(3);
        let viewed = build_accessor(AttributeKind::Index, Some(json::Index::new(2)), 3, &bounds);
        assert_eq!(viewed.byte_offset.map(|o| o.0), Some(0));

        let detached = build_accessor(AttributeKind::Index, None, 3, &bounds);
        assert!(detached.buffer_view.is_none());
        assert!(detached.byte_offset.is_none());
    }
}
