//! Append-only glTF tables
//!
//! A table position is the identity every later entity refers to, so tables
//! only ever grow and entries are never rewritten once referenced.

use gltf_json as json;

/// Append `item` and return its index
pub fn push<T>(table: &mut Vec<T>, item: T) -> json::Index<T> {
    table.push(item);
    json::Index::new(table.len() as u32 - 1)
}

/// The document tables shared by every object encoded in a pass
#[derive(Debug, Default)]
pub struct GraphTables {
    pub buffers: Vec<json::Buffer>,
    pub buffer_views: Vec<json::buffer::View>,
    pub accessors: Vec<json::Accessor>,
    pub materials: Vec<json::Material>,
    pub meshes: Vec<json::Mesh>,
    pub nodes: Vec<json::Node>,
    /// Root nodes of scene 0, in encoding order
    pub scene_nodes: Vec<json::Index<json::Node>>,
}

impl GraphTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_buffer(&mut self, buffer: json::Buffer) -> json::Index<json::Buffer> {
        push(&mut self.buffers, buffer)
    }

    pub fn push_view(&mut self, view: json::buffer::View) -> json::Index<json::buffer::View> {
        push(&mut self.buffer_views, view)
    }

    pub fn push_accessor(&mut self, accessor: json::Accessor) -> json::Index<json::Accessor> {
        push(&mut self.accessors, accessor)
    }

    pub fn push_material(&mut self, material: json::Material) -> json::Index<json::Material> {
        push(&mut self.materials, material)
    }

    pub fn push_mesh(&mut self, mesh: json::Mesh) -> json::Index<json::Mesh> {
        push(&mut self.meshes, mesh)
    }

    /// Append a node and make it a root of the scene
    pub fn push_scene_node(&mut self, node: json::Node) -> json::Index<json::Node> {
        let index = push(&mut self.nodes, node);
        self.scene_nodes.push(index);
        index
    }
}
