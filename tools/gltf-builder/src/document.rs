//! glTF document construction

use crate::buffer::{AttributeSink, BlobSink, DataUriSink};
use crate::codec::{DRACO_EXTENSION, MeshCodec};
use crate::error::ExportError;
use crate::graph::GraphTables;
use crate::material::MaterialCache;
use crate::object::ObjectEncoder;
use crate::options::{EncodingMode, ExportOptions};
use crate::scene::SanitizedObject;
use gltf_json as json;
use gltf_json::validation::Checked::Valid;

/// A finished document: the object graph plus the binary-mode blob
#[derive(Debug)]
pub struct BuiltDocument {
    pub root: json::Root,
    /// Payload of `blob_buffer`; empty when no blob was written
    pub blob: Vec<u8>,
    /// The buffer whose bytes are `blob`, supplied out-of-band by the container
    pub blob_buffer: Option<json::Index<json::Buffer>>,
}

/// Owns all state of one conversion pass.
///
/// Objects are encoded strictly in the order they are added; that order is
/// the scene's node order.
pub struct DocumentBuilder {
    options: ExportOptions,
    mode: EncodingMode,
    tables: GraphTables,
    materials: MaterialCache,
    sink: Box<dyn AttributeSink>,
    codec: Option<Box<dyn MeshCodec>>,
}

impl DocumentBuilder {
    pub fn new(options: ExportOptions) -> Self {
        let mode = options.encoding_mode();
        // Compressed streams follow `use_binary` for where their bytes live
        let sink: Box<dyn AttributeSink> = if options.use_binary {
            Box::new(BlobSink::new())
        } else {
            Box::new(DataUriSink)
        };

        Self {
            options,
            mode,
            tables: GraphTables::new(),
            materials: MaterialCache::new(),
            sink,
            codec: None,
        }
    }

    /// Attach the codec used in compressed mode
    pub fn with_codec(mut self, codec: Box<dyn MeshCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn mode(&self) -> EncodingMode {
        self.mode
    }

    /// Encode one object, returning its scene node if it produced one
    pub fn add_object(
        &mut self,
        object: &SanitizedObject,
    ) -> Result<Option<json::Index<json::Node>>, ExportError> {
        ObjectEncoder {
            options: &self.options,
            mode: self.mode,
            tables: &mut self.tables,
            materials: &mut self.materials,
            sink: self.sink.as_mut(),
            codec: self.codec.as_deref(),
        }
        .encode(object)
    }

    /// Encode every object in order and finish the document
    pub fn build<'o>(
        mut self,
        objects: impl IntoIterator<Item = &'o SanitizedObject>,
    ) -> Result<BuiltDocument, ExportError> {
        if matches!(self.mode, EncodingMode::Compressed(_)) && self.codec.is_none() {
            return Err(ExportError::MissingCodec);
        }

        let mut skipped = 0usize;
        for object in objects {
            if self.add_object(object)?.is_none() {
                skipped += 1;
            }
        }
        if skipped > 0 {
            tracing::warn!("{} object(s) produced no geometry", skipped);
        }

        Ok(self.finish())
    }

    /// Assemble the root, appending the blob buffer if one was written
    pub fn finish(self) -> BuiltDocument {
        let Self {
            options,
            mode,
            mut tables,
            materials,
            sink,
            ..
        } = self;

        let blob = sink.into_blob().unwrap_or_default();
        let blob_buffer = if blob.is_empty() {
            None
        } else {
            Some(tables.push_buffer(json::Buffer {
                byte_length: (blob.len() as u64).into(),
                extensions: Default::default(),
                extras: Default::default(),
                name: None,
                uri: None,
            }))
        };

        let extensions = if matches!(mode, EncodingMode::Compressed(_)) {
            vec![DRACO_EXTENSION.to_string()]
        } else {
            Vec::new()
        };

        tracing::info!(
            "Built document: {} nodes, {} meshes, {} materials, {} accessors, {} bytes of binary data",
            tables.nodes.len(),
            tables.meshes.len(),
            materials.len(),
            tables.accessors.len(),
            blob.len()
        );

        let root = json::Root {
            accessors: tables.accessors,
            animations: Vec::new(),
            asset: json::Asset {
                copyright: None,
                extensions: Default::default(),
                extras: Default::default(),
                generator: Some(options.generator.clone()),
                min_version: None,
                version: "2.0".to_string(),
            },
            buffers: tables.buffers,
            buffer_views: tables.buffer_views,
            cameras: Vec::new(),
            extensions: Default::default(),
            extensions_required: extensions.clone(),
            extensions_used: extensions,
            extras: Default::default(),
            images: Vec::new(),
            materials: tables.materials,
            meshes: tables.meshes,
            nodes: tables.nodes,
            samplers: vec![default_sampler()],
            scene: Some(json::Index::new(0)),
            scenes: vec![json::Scene {
                extensions: Default::default(),
                extras: Default::default(),
                name: None,
                nodes: tables.scene_nodes,
            }],
            skins: Vec::new(),
            textures: Vec::new(),
        };

        BuiltDocument {
            root,
            blob,
            blob_buffer,
        }
    }
}

/// Linear filtering, repeat wrapping
fn default_sampler() -> json::texture::Sampler {
    json::texture::Sampler {
        mag_filter: Some(Valid(json::texture::MagFilter::Linear)),
        min_filter: Some(Valid(json::texture::MinFilter::Linear)),
        name: None,
        wrap_s: Valid(json::texture::WrappingMode::Repeat),
        wrap_t: Valid(json::texture::WrappingMode::Repeat),
        extensions: Default::default(),
        extras: Default::default(),
    }
}
