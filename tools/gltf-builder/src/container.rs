//! Container serialization: GLB binary or glTF JSON

use crate::document::BuiltDocument;
use crate::error::ExportError;
use gltf_json as json;
use std::fs;
use std::path::Path;

const GLB_MAGIC: &[u8; 4] = b"glTF";
const GLB_VERSION: u32 = 2;
const CHUNK_JSON: u32 = 0x4E4F534A; // "JSON"
const CHUNK_BIN: u32 = 0x004E4942; // "BIN\0"

/// Whether `path` names a binary container (`.glb`, any case)
pub fn is_glb_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("glb"))
}

/// Pack a root and its blob into a GLB container.
///
/// The BIN chunk is omitted when `buffer_data` is empty.
pub fn assemble_glb(root: &json::Root, buffer_data: &[u8]) -> Result<Vec<u8>, ExportError> {
    let json_string = json::serialize::to_string(root)?;
    let json_bytes = json_string.as_bytes();

    // Pad JSON to 4-byte alignment
    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let json_chunk_length = json_bytes.len() + json_padding;

    let buffer_padding = (4 - (buffer_data.len() % 4)) % 4;
    let buffer_chunk_length = buffer_data.len() + buffer_padding;

    let mut total_length = 12 + 8 + json_chunk_length;
    if !buffer_data.is_empty() {
        total_length += 8 + buffer_chunk_length;
    }
    if total_length > u32::MAX as usize {
        return Err(ExportError::ContainerTooLarge(total_length));
    }

    let mut glb = Vec::with_capacity(total_length);

    // GLB header
    glb.extend_from_slice(GLB_MAGIC);
    glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
    glb.extend_from_slice(&(total_length as u32).to_le_bytes());

    // JSON chunk, padded with spaces
    glb.extend_from_slice(&(json_chunk_length as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    glb.extend_from_slice(json_bytes);
    glb.resize(glb.len() + json_padding, b' ');

    if !buffer_data.is_empty() {
        glb.extend_from_slice(&(buffer_chunk_length as u32).to_le_bytes());
        glb.extend_from_slice(&CHUNK_BIN.to_le_bytes());
        glb.extend_from_slice(buffer_data);
        glb.resize(glb.len() + buffer_padding, 0);
    }

    Ok(glb)
}

/// Pretty-printed glTF JSON
pub fn to_gltf_json(root: &json::Root) -> Result<String, ExportError> {
    Ok(json::serialize::to_string_pretty(root)?)
}

/// Write `document` to `path`, choosing the container from the extension.
///
/// A `.gltf` target with a binary blob gets the blob as a sidecar
/// `<stem>.bin` next to it, referenced by relative uri.
pub fn write_document(path: &Path, document: &BuiltDocument) -> Result<(), ExportError> {
    if is_glb_path(path) {
        let glb = assemble_glb(&document.root, &document.blob)?;
        fs::write(path, &glb)?;
        tracing::info!("Wrote {} ({} bytes)", path.display(), glb.len());
        return Ok(());
    }

    let mut root = document.root.clone();
    if let Some(buffer) = document.blob_buffer {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("buffer");
        let bin_name = format!("{}.bin", stem);
        let bin_path = path.with_file_name(&bin_name);

        fs::write(&bin_path, &document.blob)?;
        tracing::info!("Wrote {} ({} bytes)", bin_path.display(), document.blob.len());
        root.buffers[buffer.value()].uri = Some(bin_name);
    }

    let text = to_gltf_json(&root)?;
    fs::write(path, &text)?;
    tracing::info!("Wrote {} ({} bytes)", path.display(), text.len());
    Ok(())
}
