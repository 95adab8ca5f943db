//! Byte destinations for encoded attribute streams

use crate::graph::GraphTables;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use gltf_json as json;

/// Prefix of the data-uri carried by text-mode buffers
pub const DATA_URI_PREFIX: &str = "data:application/octet-stream;base64,";

/// Growing blob backing the single binary-mode buffer
#[derive(Debug, Default)]
pub struct ByteBufferWriter {
    buffer: Vec<u8>,
}

impl ByteBufferWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current length, which is also the offset of the next write
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Append bytes and return the offset they were written at
    pub fn append(&mut self, bytes: &[u8]) -> usize {
        let offset = self.buffer.len();
        self.buffer.extend_from_slice(bytes);
        offset
    }

    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

/// Where a stored byte range ended up
#[derive(Debug, Clone, Copy)]
pub struct StoredRange {
    pub buffer: json::Index<json::Buffer>,
    pub byte_offset: u64,
    pub byte_length: u64,
}

impl StoredRange {
    /// A buffer view over this range
    pub fn view(&self, target: Option<json::buffer::Target>) -> json::buffer::View {
        json::buffer::View {
            buffer: self.buffer,
            byte_length: self.byte_length.into(),
            byte_offset: Some(self.byte_offset.into()),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: target.map(json::validation::Checked::Valid),
        }
    }
}

/// Destination for encoded bytes, fixed once per conversion pass
pub trait AttributeSink {
    /// Store `bytes`, registering any buffer they need in `tables`
    fn store(&mut self, tables: &mut GraphTables, bytes: &[u8]) -> StoredRange;

    /// The accumulated blob, for sinks that write one
    fn into_blob(self: Box<Self>) -> Option<Vec<u8>>;
}

/// Packs everything into the shared blob, always buffer 0
#[derive(Debug, Default)]
pub struct BlobSink {
    writer: ByteBufferWriter,
}

impl BlobSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writer(&self) -> &ByteBufferWriter {
        &self.writer
    }
}

impl AttributeSink for BlobSink {
    fn store(&mut self, _tables: &mut GraphTables, bytes: &[u8]) -> StoredRange {
        let offset = self.writer.append(bytes);
        StoredRange {
            buffer: json::Index::new(0),
            byte_offset: offset as u64,
            byte_length: bytes.len() as u64,
        }
    }

    fn into_blob(self: Box<Self>) -> Option<Vec<u8>> {
        Some(self.writer.into_inner())
    }
}

/// Gives every stored range its own base64 data-uri buffer
#[derive(Debug, Default)]
pub struct DataUriSink;

impl AttributeSink for DataUriSink {
    fn store(&mut self, tables: &mut GraphTables, bytes: &[u8]) -> StoredRange {
        let buffer = tables.push_buffer(json::Buffer {
            byte_length: (bytes.len() as u64).into(),
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            uri: Some(data_uri(bytes)),
        });
        StoredRange {
            buffer,
            byte_offset: 0,
            byte_length: bytes.len() as u64,
        }
    }

    fn into_blob(self: Box<Self>) -> Option<Vec<u8>> {
        None
    }
}

pub fn data_uri(bytes: &[u8]) -> String {
    format!("{}{}", DATA_URI_PREFIX, BASE64_ENGINE.encode(bytes))
}
