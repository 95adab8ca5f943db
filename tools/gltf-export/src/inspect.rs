//! Summaries of existing glTF / GLB files

use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub generator: Option<String>,
    pub scenes: usize,
    pub nodes: Vec<NodeSummary>,
    pub meshes: usize,
    pub primitives: usize,
    pub accessors: usize,
    pub buffer_views: usize,
    pub buffers: usize,
    pub materials: usize,
    pub extensions_used: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSummary {
    pub name: Option<String>,
    pub mesh: Option<usize>,
}

/// Read `path` without resolving its buffers
pub fn inspect(path: &Path) -> Result<DocumentSummary> {
    let gltf = gltf::Gltf::open(path).with_context(|| format!("Failed to load glTF: {:?}", path))?;
    Ok(summarize(&gltf.document))
}

pub fn summarize(document: &gltf::Document) -> DocumentSummary {
    DocumentSummary {
        generator: document.as_json().asset.generator.clone(),
        scenes: document.scenes().len(),
        nodes: document
            .nodes()
            .map(|node| NodeSummary {
                name: node.name().map(str::to_string),
                mesh: node.mesh().map(|m| m.index()),
            })
            .collect(),
        meshes: document.meshes().len(),
        primitives: document.meshes().map(|m| m.primitives().len()).sum(),
        accessors: document.accessors().len(),
        buffer_views: document.views().len(),
        buffers: document.buffers().len(),
        materials: document.materials().len(),
        extensions_used: document.extensions_used().map(str::to_string).collect(),
    }
}

impl fmt::Display for DocumentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "generator:    {}",
            self.generator.as_deref().unwrap_or("<none>")
        )?;
        writeln!(f, "scenes:       {}", self.scenes)?;
        writeln!(f, "nodes:        {}", self.nodes.len())?;
        writeln!(
            f,
            "meshes:       {} ({} primitives)",
            self.meshes, self.primitives
        )?;
        writeln!(f, "accessors:    {}", self.accessors)?;
        writeln!(f, "buffer views: {}", self.buffer_views)?;
        writeln!(f, "buffers:      {}", self.buffers)?;
        writeln!(f, "materials:    {}", self.materials)?;
        if !self.extensions_used.is_empty() {
            writeln!(f, "extensions:   {}", self.extensions_used.join(", "))?;
        }
        for (i, node) in self.nodes.iter().enumerate() {
            write!(f, "  node {}: {}", i, node.name.as_deref().unwrap_or("<unnamed>"))?;
            if let Some(mesh) = node.mesh {
                write!(f, " -> mesh {}", mesh)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
