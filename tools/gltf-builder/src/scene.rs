//! Scene input handed to the encoder by the sanitizer

/// Rotation taking a Z-up frame to glTF's Y-up frame: (x, y, z) -> (x, z, -y)
pub const Z_UP_TO_Y_UP: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, -1.0, 0.0]];

/// A mesh face indexing into the mesh's shared vertex space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Triangle([u32; 3]),
    Quad([u32; 4]),
}

impl Face {
    /// Number of triangles this face contributes once triangulated
    pub fn triangle_count(&self) -> usize {
        match self {
            Face::Triangle(_) => 1,
            Face::Quad(_) => 2,
        }
    }
}

/// Index-aligned mesh geometry.
///
/// `vertices`, `normals` and `tex_coords` share one ordering; `normals` and
/// `tex_coords` may be empty when the source carries no such attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<[f64; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub faces: Vec<Face>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.faces.iter().map(Face::triangle_count).sum()
    }

    /// True when there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Apply a 3x3 rotation to vertices and normals in place
    pub fn transform(&mut self, m: &[[f64; 3]; 3]) {
        for v in &mut self.vertices {
            *v = mul(m, *v);
        }
        for n in &mut self.normals {
            let r = mul(m, [n[0] as f64, n[1] as f64, n[2] as f64]);
            *n = [r[0] as f32, r[1] as f32, r[2] as f32];
        }
    }

    /// Reverse the V channel of the texture coordinates (v -> 1 - v)
    pub fn flip_tex_coords_v(&mut self) {
        for uv in &mut self.tex_coords {
            uv[1] = 1.0 - uv[1];
        }
    }

    /// Split every quad into two triangles, keeping face order
    pub fn triangulate(&mut self) {
        if self.faces.iter().all(|f| matches!(f, Face::Triangle(_))) {
            return;
        }
        let mut faces = Vec::with_capacity(self.triangle_count());
        for face in &self.faces {
            match *face {
                Face::Triangle(t) => faces.push(Face::Triangle(t)),
                Face::Quad([a, b, c, d]) => {
                    faces.push(Face::Triangle([a, b, c]));
                    faces.push(Face::Triangle([a, c, d]));
                }
            }
        }
        self.faces = faces;
    }
}

fn mul(m: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// Identity key used to deduplicate materials
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaterialId(pub String);

impl From<&str> for MaterialId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MaterialId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Metallic-roughness material description
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: Option<String>,
    /// Linear RGBA
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: [f32; 3],
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            base_color: [1.0, 1.0, 1.0, 1.0],
            metallic: 0.0,
            roughness: 1.0,
            emissive: [0.0, 0.0, 0.0],
            double_sided: false,
        }
    }
}

/// One encodable unit: meshes sharing a material, from one source object
#[derive(Debug, Clone)]
pub struct SanitizedObject {
    pub meshes: Vec<Mesh>,
    pub material: Material,
    pub material_id: MaterialId,
    pub source_name: Option<String>,
}
