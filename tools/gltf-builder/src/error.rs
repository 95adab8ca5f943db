//! Error type for document construction and serialization

use crate::codec::CodecError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Mesh compression failed: {0}")]
    Codec(#[from] CodecError),

    #[error("Compressed encoding requested but no mesh codec is configured")]
    MissingCodec,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Container of {0} bytes exceeds the 4 GiB GLB limit")]
    ContainerTooLarge(usize),
}
