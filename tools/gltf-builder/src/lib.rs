//! Geometry-to-glTF encoding engine
//!
//! Turns already-sanitized geometry into a glTF 2.0 object graph:
//! - Scene model: meshes, faces, materials and the Z-up to Y-up remap
//! - Attribute packing: tightly packed little-endian streams with bounds
//! - Buffer sinks: one shared binary blob, or one data-uri buffer per stream
//! - Compressed mode: opaque codec streams framed by `KHR_draco_mesh_compression`
//! - Containers: GLB assembly and glTF JSON with a `.bin` sidecar
//!
//! # Example
//!
//! ```no_run
//! use gltf_builder::*;
//!
//! let object = SanitizedObject {
//!     meshes: vec![Mesh {
//!         vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
//!         faces: vec![Face::Triangle([0, 1, 2])],
//!         ..Default::default()
//!     }],
//!     material: Material::default(),
//!     material_id: "default".into(),
//!     source_name: Some("Triangle".to_string()),
//! };
//!
//! let document = DocumentBuilder::new(ExportOptions::default()).build([&object])?;
//! write_document(std::path::Path::new("triangle.glb"), &document)?;
//! # Ok::<(), ExportError>(())
//! ```

pub mod attributes;
pub mod buffer;
pub mod codec;
pub mod container;
pub mod document;
pub mod error;
pub mod graph;
pub mod material;
pub mod object;
pub mod options;
pub mod scene;

pub use attributes::{Bounds, compute_bounds};
pub use buffer::{AttributeSink, BlobSink, ByteBufferWriter, DataUriSink};
pub use codec::{CodecError, CompressionOptions, DRACO_EXTENSION, MeshCodec};
pub use container::{assemble_glb, is_glb_path, to_gltf_json, write_document};
pub use document::{BuiltDocument, DocumentBuilder};
pub use error::ExportError;
pub use material::MaterialCache;
pub use options::{EncodingMode, ExportOptions};
pub use scene::{Face, Material, MaterialId, Mesh, SanitizedObject, Z_UP_TO_Y_UP};

// Re-export commonly used gltf-json types
pub use gltf_json as json;
pub use gltf_json::validation::Checked::Valid;
