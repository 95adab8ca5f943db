//! gltf-export library
//!
//! Loads OBJ/MTL scenes into [`gltf_builder::SanitizedObject`]s and writes them
//! out through the builder as `.gltf` or `.glb`.

pub mod config;
pub mod convert;
pub mod inspect;
pub mod mtl;
pub mod obj;

pub use config::{ExportConfig, Overrides, load_config, parse_config, resolve_options};
pub use convert::{ConvertSummary, convert_obj};
pub use inspect::{DocumentSummary, inspect};
pub use obj::{load_obj, parse_obj};
