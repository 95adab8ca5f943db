//! Export configuration from TOML plus command-line overrides

use anyhow::{Context, Result};
use gltf_builder::{ExportOptions, is_glb_path};
use std::path::Path;

/// Options read from a config file
#[derive(Debug, Clone, Default)]
pub struct ExportConfig {
    pub options: ExportOptions,
    /// The file set `use_binary` itself rather than leaving it to the output extension
    pub explicit_buffer_mode: bool,
}

/// Flags given on the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub draco: bool,
    pub text: bool,
    pub no_axis_remap: bool,
}

pub fn load_config(path: &Path) -> Result<ExportConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {:?}", path))?;
    parse_config(&text).with_context(|| format!("Failed to parse config: {:?}", path))
}

pub fn parse_config(text: &str) -> Result<ExportConfig> {
    let table: toml::Table = toml::from_str(text)?;
    let options: ExportOptions = toml::from_str(text)?;

    Ok(ExportConfig {
        explicit_buffer_mode: table.contains_key("use_binary"),
        options,
    })
}

/// Final options for writing to `output`.
///
/// Precedence: command-line flags, then the config file, then the output
/// extension (`.glb` binary, anything else text) for the buffer mode.
pub fn resolve_options(
    config: Option<ExportConfig>,
    overrides: Overrides,
    output: &Path,
) -> ExportOptions {
    let config = config.unwrap_or_default();
    let mut options = config.options;

    if overrides.text {
        options.use_binary = false;
    } else if !config.explicit_buffer_mode {
        options.use_binary = is_glb_path(output);
    }
    if overrides.draco {
        options.use_draco_compression = true;
    }
    if overrides.no_axis_remap {
        options.map_z_to_y = false;
    }

    tracing::debug!("Resolved export options: {:?}", options);
    options
}
