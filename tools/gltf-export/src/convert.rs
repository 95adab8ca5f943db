//! OBJ to glTF conversion

use crate::obj::load_obj;
use anyhow::{Context, Result};
use gltf_builder::{DocumentBuilder, ExportError, ExportOptions, MeshCodec, write_document};
use std::path::Path;

/// Outcome of one conversion, for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertSummary {
    pub objects: usize,
    pub nodes: usize,
    pub materials: usize,
    pub blob_bytes: usize,
}

/// Convert an OBJ scene to a `.gltf` or `.glb` file.
///
/// `codec` is required when `options.use_draco_compression` is set.
pub fn convert_obj(
    input: &Path,
    output: &Path,
    options: ExportOptions,
    codec: Option<Box<dyn MeshCodec>>,
) -> Result<ConvertSummary> {
    let objects = load_obj(input)?;

    let mut builder = DocumentBuilder::new(options);
    if let Some(codec) = codec {
        builder = builder.with_codec(codec);
    }

    let document = match builder.build(&objects) {
        Err(ExportError::MissingCodec) => anyhow::bail!(
            "Draco compression requested, but no mesh codec is linked into this build"
        ),
        result => result.with_context(|| format!("Failed to encode {:?}", input))?,
    };

    write_document(output, &document)
        .with_context(|| format!("Failed to write output: {:?}", output))?;

    Ok(ConvertSummary {
        objects: objects.len(),
        nodes: document.root.nodes.len(),
        materials: document.root.materials.len(),
        blob_bytes: document.blob.len(),
    })
}
