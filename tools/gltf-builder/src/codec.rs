//! Mesh-compression codec boundary
//!
//! The codec itself is external. [`CodecAdapter`] stages its stream in a
//! scoped temporary file, reads the bytes back, and decodes the same file to
//! recover the statistics the accessors need: the codec may reorder or
//! requantize vertices, so counts and bounds come from the decoded side.

use crate::attributes::{Bounds, compute_bounds};
use crate::error::ExportError;
use crate::scene::Mesh;
use std::path::Path;
use thiserror::Error;

/// Name of the glTF extension framing compressed primitives
pub const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

/// Codec quality settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionOptions {
    pub compression_level: u32,
    pub position_bits: u32,
    pub normal_bits: u32,
    pub tex_coord_bits: u32,
}

impl CompressionOptions {
    /// One quantization depth for every attribute
    pub fn uniform(compression_level: u32, bits: u32) -> Self {
        Self {
            compression_level,
            position_bits: bits,
            normal_bits: bits,
            tex_coord_bits: bits,
        }
    }
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("compress: {0}")]
    Compress(String),

    #[error("decompress: {0}")]
    Decompress(String),

    #[error("codec IO: {0}")]
    Io(#[from] std::io::Error),
}

/// An external mesh-compression codec working through files
pub trait MeshCodec {
    /// Compress `mesh` into a stream written to `path`
    fn compress_to_file(
        &self,
        mesh: &Mesh,
        options: &CompressionOptions,
        path: &Path,
    ) -> Result<(), CodecError>;

    /// Decode the stream at `path` back into geometry
    fn decompress_file(&self, path: &Path) -> Result<Mesh, CodecError>;
}

/// Decode-side statistics of a compressed mesh
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedStats {
    pub vertex_count: usize,
    pub position_bounds: Bounds,
    pub triangle_count: usize,
    pub normal_count: usize,
    pub normal_bounds: Bounds,
    pub tex_coord_count: usize,
    pub tex_coord_bounds: Bounds,
}

impl DecodedStats {
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let positions: Vec<[f32; 3]> = mesh
            .vertices
            .iter()
            .map(|v| [v[0] as f32, v[1] as f32, v[2] as f32])
            .collect();

        Self {
            vertex_count: mesh.vertex_count(),
            position_bounds: compute_bounds(&positions),
            triangle_count: mesh.triangle_count(),
            normal_count: mesh.normals.len(),
            normal_bounds: compute_bounds(&mesh.normals),
            tex_coord_count: mesh.tex_coords.len(),
            tex_coord_bounds: compute_bounds(&mesh.tex_coords),
        }
    }

    /// Synthesized the same way as for uncompressed indices
    pub fn index_bounds(&self) -> Bounds {
        Bounds::index_range(self.vertex_count)
    }

    /// Scalar index count
    pub fn index_count(&self) -> usize {
        self.triangle_count * 3
    }
}

/// An opaque compressed stream plus its decode-side statistics
#[derive(Debug, Clone)]
pub struct CompressedMesh {
    pub bytes: Vec<u8>,
    pub stats: DecodedStats,
}

/// Runs a [`MeshCodec`] round trip for one mesh
pub struct CodecAdapter<'a> {
    codec: &'a dyn MeshCodec,
    options: CompressionOptions,
}

impl<'a> CodecAdapter<'a> {
    pub fn new(codec: &'a dyn MeshCodec, options: CompressionOptions) -> Self {
        Self { codec, options }
    }

    pub fn compress(&self, mesh: &Mesh) -> Result<CompressedMesh, ExportError> {
        // Removed on drop, so every early return below cleans up too
        let staging = tempfile::Builder::new()
            .prefix("gltf-builder-")
            .suffix(".drc")
            .tempfile()?
            .into_temp_path();

        self.codec.compress_to_file(mesh, &self.options, &staging)?;
        let bytes = std::fs::read(&staging)?;
        let decoded = self.codec.decompress_file(&staging)?;
        let stats = DecodedStats::from_mesh(&decoded);

        tracing::debug!(
            "Compressed mesh: {} vertices -> {} bytes ({} decoded vertices, {} triangles)",
            mesh.vertex_count(),
            bytes.len(),
            stats.vertex_count,
            stats.triangle_count
        );

        staging.close()?;
        Ok(CompressedMesh { bytes, stats })
    }
}
