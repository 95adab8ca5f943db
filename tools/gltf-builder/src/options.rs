//! Export configuration

use crate::codec::CompressionOptions;
use serde::Deserialize;

/// Options recognized by the encoder.
///
/// Field defaults match an out-of-the-box export: single binary buffer,
/// Z-up sources remapped to Y-up, no compression.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub use_draco_compression: bool,
    pub draco_compression_level: u32,
    /// Quantization bit-depth shared by positions, normals and texcoords
    pub draco_quantization_bits: u32,
    /// Single binary blob (true) or one base64 data-uri buffer per attribute (false)
    pub use_binary: bool,
    #[serde(alias = "map_rhino_z_to_gltf_y")]
    pub map_z_to_y: bool,
    /// Drop meshes with no vertices or no faces instead of emitting
    /// degenerate accessors
    pub skip_empty_meshes: bool,
    pub generator: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            use_draco_compression: false,
            draco_compression_level: 10,
            draco_quantization_bits: 16,
            use_binary: true,
            map_z_to_y: true,
            skip_empty_meshes: true,
            generator: concat!("gltf-builder ", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ExportOptions {
    /// Resolve the buffer layout for a conversion pass
    pub fn encoding_mode(&self) -> EncodingMode {
        if self.use_draco_compression {
            EncodingMode::Compressed(CompressionOptions::uniform(
                self.draco_compression_level,
                self.draco_quantization_bits,
            ))
        } else if self.use_binary {
            EncodingMode::Binary
        } else {
            EncodingMode::Text
        }
    }
}

/// How geometry lands in the document's buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingMode {
    /// One opaque codec stream per mesh, framed by KHR_draco_mesh_compression
    Compressed(CompressionOptions),
    /// Every attribute packed into one contiguous blob (buffer 0)
    Binary,
    /// Every attribute in its own base64 data-uri buffer
    Text,
}
