//! gltf-export - OBJ/MTL to glTF 2.0 exporter
//!
//! Writes `.glb` (single binary buffer) or `.gltf` (embedded data-uri
//! buffers, or a `.bin` sidecar when configured for binary).

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use gltf_export::{Overrides, config, convert, inspect};

#[derive(Parser)]
#[command(name = "gltf-export")]
#[command(about = "Export OBJ scenes to glTF 2.0")]
#[command(version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an OBJ file to .gltf or .glb
    Convert {
        /// Input OBJ file
        input: PathBuf,

        /// Output .gltf/.glb file (default: input with .glb extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export options TOML file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Compress meshes with KHR_draco_mesh_compression
        #[arg(long)]
        draco: bool,

        /// Embed buffers as base64 data-uris instead of one binary buffer
        #[arg(long)]
        text: bool,

        /// Keep source coordinates instead of remapping Z-up to Y-up
        #[arg(long)]
        no_axis_remap: bool,
    },

    /// Print a summary of a .gltf/.glb file
    Inspect {
        /// Input glTF/GLB file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert {
            input,
            output,
            config: config_path,
            draco,
            text,
            no_axis_remap,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension("glb"));
            tracing::info!("Converting {:?} -> {:?}", input, output);

            let loaded = config_path
                .as_deref()
                .map(config::load_config)
                .transpose()?;
            let overrides = Overrides {
                draco,
                text,
                no_axis_remap,
            };
            let options = config::resolve_options(loaded, overrides, &output);

            let summary = convert::convert_obj(&input, &output, options, None)?;
            tracing::info!(
                "Exported {} objects as {} nodes, {} materials, {} bytes of binary data",
                summary.objects,
                summary.nodes,
                summary.materials,
                summary.blob_bytes
            );
        }

        Commands::Inspect { input } => {
            let summary = inspect::inspect(&input)?;
            print!("{}", summary);
        }
    }

    Ok(())
}
