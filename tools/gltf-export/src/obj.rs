//! Wavefront OBJ scene loading
//!
//! Produces the encoder's [`SanitizedObject`]s: one per `o`/`g` group and
//! material run, with face corners welded into one index-aligned vertex space.

use crate::mtl::{MaterialLibrary, load_mtl};
use anyhow::{Context, Result, bail};
use gltf_builder::{Face, Material, MaterialId, Mesh, SanitizedObject};
use hashbrown::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const DEFAULT_MATERIAL_ID: &str = "default";

/// Statements that carry nothing the encoder uses
const IGNORED_STATEMENTS: &[&str] = &["s", "vp", "l", "p"];

/// Load an OBJ file, resolving `mtllib` relative to its directory
pub fn load_obj(path: &Path) -> Result<Vec<SanitizedObject>> {
    let file = File::open(path).with_context(|| format!("Failed to open OBJ: {:?}", path))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_obj(BufReader::new(file), Some(base_dir))
        .with_context(|| format!("Failed to parse OBJ: {:?}", path))
}

/// Parse OBJ text. Without `base_dir`, `mtllib` statements are ignored.
pub fn parse_obj<R: BufRead>(reader: R, base_dir: Option<&Path>) -> Result<Vec<SanitizedObject>> {
    let mut positions: Vec<[f64; 3]> = Vec::new();
    let mut tex_coords: Vec<[f32; 2]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();

    let mut library = MaterialLibrary::new();
    let mut objects = Vec::new();
    let mut current = ObjectBuilder::new(None, None);
    let mut unknown: HashSet<String> = HashSet::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let args = &parts[1..];

        match parts[0] {
            "v" => positions.push(parse_vec::<f64, 3>(args, line_no)?),
            "vt" => {
                // v defaults to 0, optional w is dropped
                let uv = if args.len() == 1 {
                    [parse_vec::<f32, 1>(args, line_no)?[0], 0.0]
                } else {
                    parse_vec::<f32, 2>(args, line_no)?
                };
                tex_coords.push(uv);
            }
            "vn" => normals.push(parse_vec::<f32, 3>(args, line_no)?),
            "f" => {
                let mut corners = Vec::with_capacity(args.len());
                for corner in args {
                    corners.push(parse_corner(
                        corner,
                        (positions.len(), tex_coords.len(), normals.len()),
                        line_no,
                    )?);
                }
                if corners.len() < 3 {
                    tracing::warn!(
                        "line {}: face with {} corners skipped",
                        line_no + 1,
                        corners.len()
                    );
                    continue;
                }
                current.add_face(&corners, &positions, &tex_coords, &normals);
            }
            "o" | "g" => {
                let name = (!args.is_empty()).then(|| args.join(" "));
                let material = current.material.clone();
                let finished = std::mem::replace(&mut current, ObjectBuilder::new(name, material));
                objects.extend(finished.finish(&library));
            }
            "usemtl" => {
                let material = (!args.is_empty()).then(|| args.join(" "));
                if material != current.material {
                    if current.faces.is_empty() {
                        current.material = material;
                    } else {
                        let name = current.name.clone();
                        let finished =
                            std::mem::replace(&mut current, ObjectBuilder::new(name, material));
                        objects.extend(finished.finish(&library));
                    }
                }
            }
            "mtllib" => match base_dir {
                Some(dir) => {
                    for file in args {
                        library.extend(load_mtl(&dir.join(file))?);
                    }
                }
                None => tracing::debug!("line {}: mtllib ignored", line_no + 1),
            },
            keyword if IGNORED_STATEMENTS.contains(&keyword) => {}
            keyword => {
                unknown.insert(keyword.to_string());
            }
        }
    }
    objects.extend(current.finish(&library));

    if !unknown.is_empty() {
        let mut keywords: Vec<_> = unknown.into_iter().collect();
        keywords.sort();
        tracing::warn!("Unsupported OBJ statements ignored: {}", keywords.join(", "));
    }

    tracing::info!(
        "Loaded OBJ: {} positions, {} texcoords, {} normals, {} objects",
        positions.len(),
        tex_coords.len(),
        normals.len(),
        objects.len()
    );
    Ok(objects)
}

/// Resolved zero-based indices of one face corner: (v, vt, vn)
type Corner = (usize, Option<usize>, Option<usize>);

/// Parse `v`, `v/vt`, `v//vn` or `v/vt/vn`; `counts` are the pool sizes so far
fn parse_corner(token: &str, counts: (usize, usize, usize), line_no: usize) -> Result<Corner> {
    let mut fields = token.split('/');
    let position = fields
        .next()
        .filter(|s| !s.is_empty())
        .with_context(|| format!("line {}: face corner '{}' has no position", line_no + 1, token))?;
    let position = resolve_index(position, counts.0, line_no)?;

    let tex_coord = match fields.next() {
        Some(s) if !s.is_empty() => Some(resolve_index(s, counts.1, line_no)?),
        _ => None,
    };
    let normal = match fields.next() {
        Some(s) if !s.is_empty() => Some(resolve_index(s, counts.2, line_no)?),
        _ => None,
    };

    Ok((position, tex_coord, normal))
}

/// 1-based, or negative relative to the end of the pool
fn resolve_index(token: &str, count: usize, line_no: usize) -> Result<usize> {
    let raw: i64 = token
        .parse()
        .with_context(|| format!("line {}: invalid index '{}'", line_no + 1, token))?;

    let index = if raw > 0 {
        raw - 1
    } else {
        count as i64 + raw
    };
    if raw == 0 || index < 0 || index >= count as i64 {
        bail!(
            "line {}: index {} out of range ({} defined)",
            line_no + 1,
            raw,
            count
        );
    }
    Ok(index as usize)
}

fn parse_vec<T, const N: usize>(args: &[&str], line_no: usize) -> Result<[T; N]>
where
    T: std::str::FromStr + Default + Copy,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if args.len() < N {
        bail!(
            "line {}: expected {} values, found {}",
            line_no + 1,
            N,
            args.len()
        );
    }

    let mut values = [T::default(); N];
    for (value, arg) in values.iter_mut().zip(args) {
        *value = arg
            .parse()
            .with_context(|| format!("line {}: invalid number '{}'", line_no + 1, arg))?;
    }
    Ok(values)
}

/// Accumulates one object's welded geometry
struct ObjectBuilder {
    name: Option<String>,
    material: Option<String>,
    vertices: Vec<[f64; 3]>,
    normals: Vec<Option<[f32; 3]>>,
    tex_coords: Vec<Option<[f32; 2]>>,
    faces: Vec<Face>,
    welded: HashMap<Corner, u32>,
}

impl ObjectBuilder {
    fn new(name: Option<String>, material: Option<String>) -> Self {
        Self {
            name,
            material,
            vertices: Vec::new(),
            normals: Vec::new(),
            tex_coords: Vec::new(),
            faces: Vec::new(),
            welded: HashMap::new(),
        }
    }

    fn vertex(
        &mut self,
        corner: Corner,
        positions: &[[f64; 3]],
        tex_coords: &[[f32; 2]],
        normals: &[[f32; 3]],
    ) -> u32 {
        if let Some(&index) = self.welded.get(&corner) {
            return index;
        }

        let (v, vt, vn) = corner;
        let index = self.vertices.len() as u32;
        self.vertices.push(positions[v]);
        self.tex_coords.push(vt.map(|i| tex_coords[i]));
        self.normals.push(vn.map(|i| normals[i]));
        self.welded.insert(corner, index);
        index
    }

    fn add_face(
        &mut self,
        corners: &[Corner],
        positions: &[[f64; 3]],
        tex_coords: &[[f32; 2]],
        normals: &[[f32; 3]],
    ) {
        let indices: Vec<u32> = corners
            .iter()
            .map(|&c| self.vertex(c, positions, tex_coords, normals))
            .collect();

        match indices[..] {
            [a, b, c] => self.faces.push(Face::Triangle([a, b, c])),
            [a, b, c, d] => self.faces.push(Face::Quad([a, b, c, d])),
            _ => {
                for i in 1..indices.len() - 1 {
                    self.faces
                        .push(Face::Triangle([indices[0], indices[i], indices[i + 1]]));
                }
            }
        }
    }

    fn finish(self, library: &MaterialLibrary) -> Option<SanitizedObject> {
        if self.faces.is_empty() {
            if !self.vertices.is_empty() || self.name.is_some() {
                tracing::warn!("OBJ object {:?} has no faces, skipped", self.name);
            }
            return None;
        }

        let normals = if self.normals.iter().all(Option::is_some) {
            self.normals.into_iter().flatten().collect()
        } else {
            tracing::debug!("Rebuilding normals for {:?}", self.name);
            vertex_normals(&self.vertices, &self.faces)
        };

        // Corners without a texcoord in a textured object map to the origin
        let tex_coords = if self.tex_coords.iter().any(Option::is_some) {
            self.tex_coords
                .into_iter()
                .map(|uv| uv.unwrap_or_default())
                .collect()
        } else {
            Vec::new()
        };

        let (material, material_id) = match self.material {
            Some(name) => {
                let material = library.get(&name).cloned().unwrap_or_else(|| {
                    tracing::warn!("Material {:?} not found in any mtllib", name);
                    Material {
                        name: Some(name.clone()),
                        ..Default::default()
                    }
                });
                (material, MaterialId::from(name))
            }
            None => (Material::default(), MaterialId::from(DEFAULT_MATERIAL_ID)),
        };

        tracing::debug!(
            "OBJ object {:?}: {} vertices, {} faces, material {:?}",
            self.name,
            self.vertices.len(),
            self.faces.len(),
            material_id.0
        );

        Some(SanitizedObject {
            meshes: vec![Mesh {
                vertices: self.vertices,
                normals,
                tex_coords,
                faces: self.faces,
            }],
            material,
            material_id,
            source_name: self.name,
        })
    }
}

/// Area-weighted vertex normals
fn vertex_normals(vertices: &[[f64; 3]], faces: &[Face]) -> Vec<[f32; 3]> {
    let mut sums = vec![[0.0f64; 3]; vertices.len()];

    let mut accumulate = |[a, b, c]: [u32; 3]| {
        let (pa, pb, pc) = (
            vertices[a as usize],
            vertices[b as usize],
            vertices[c as usize],
        );
        let e1 = [pb[0] - pa[0], pb[1] - pa[1], pb[2] - pa[2]];
        let e2 = [pc[0] - pa[0], pc[1] - pa[1], pc[2] - pa[2]];
        // Unnormalized cross product: its length is twice the triangle area
        let n = [
            e1[1] * e2[2] - e1[2] * e2[1],
            e1[2] * e2[0] - e1[0] * e2[2],
            e1[0] * e2[1] - e1[1] * e2[0],
        ];
        for i in [a, b, c] {
            let sum = &mut sums[i as usize];
            sum[0] += n[0];
            sum[1] += n[1];
            sum[2] += n[2];
        }
    };

    for face in faces {
        match *face {
            Face::Triangle(t) => accumulate(t),
            Face::Quad([a, b, c, d]) => {
                accumulate([a, b, c]);
                accumulate([a, c, d]);
            }
        }
    }

    sums.into_iter()
        .map(|[x, y, z]| {
            let len = (x * x + y * y + z * z).sqrt();
            if len > 0.0 {
                [(x / len) as f32, (y / len) as f32, (z / len) as f32]
            } else {
                [0.0, 0.0, 1.0]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Vec<SanitizedObject> {
        parse_obj(source.as_bytes(), None).unwrap()
    }

    #[test]
    fn test_quad_welded_and_preserved() {
        let objects = parse(
            "\
o plate
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
",
        );
        assert_eq!(objects.len(), 1);
        let object = &objects[0];
        assert_eq!(object.source_name.as_deref(), Some("plate"));
        assert_eq!(object.material_id, MaterialId::from("default"));

        let mesh = &object.meshes[0];
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces, vec![Face::Quad([0, 1, 2, 3])]);
        assert_eq!(mesh.normals, vec![[0.0, 0.0, 1.0]; 4]);
        assert_eq!(mesh.tex_coords[2], [1.0, 1.0]);
    }

    #[test]
    fn test_shared_corners_weld() {
        let objects = parse(
            "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3
f 1 3 4
",
        );
        let mesh = &objects[0].meshes[0];
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(
            mesh.faces,
            vec![Face::Triangle([0, 1, 2]), Face::Triangle([0, 2, 3])]
        );
        assert!(objects[0].source_name.is_none());
    }

    #[test]
    fn test_split_corners_do_not_weld() {
        let objects = parse(
            "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
vn 0 0 -1
f 1//1 2//1 3//1
f 1//2 3//2 2//2
",
        );
        assert_eq!(objects[0].meshes[0].vertex_count(), 6);
    }

    #[test]
    fn test_negative_indices() {
        let objects = parse(
            "\
v 0 0 0
v 1 0 0
v 0 1 0
f -3 -2 -1
",
        );
        assert_eq!(objects[0].meshes[0].vertices[2], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_ngon_fan_triangulated() {
        let objects = parse(
            "\
v 0 0 0
v 1 0 0
v 2 1 0
v 1 2 0
v 0 1 0
f 1 2 3 4 5
",
        );
        assert_eq!(
            objects[0].meshes[0].faces,
            vec![
                Face::Triangle([0, 1, 2]),
                Face::Triangle([0, 2, 3]),
                Face::Triangle([0, 3, 4]),
            ]
        );
    }

    #[test]
    fn test_missing_normals_rebuilt() {
        let objects = parse(
            "\
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
",
        );
        let mesh = &objects[0].meshes[0];
        assert_eq!(mesh.normals, vec![[0.0, 0.0, 1.0]; 3]);
        assert!(mesh.tex_coords.is_empty());
    }

    #[test]
    fn test_objects_and_material_runs() {
        let objects = parse(
            "\
v 0 0 0
v 1 0 0
v 0 1 0
o first
usemtl red
f 1 2 3
usemtl blue
f 1 3 2
o second
f 1 2 3
",
        );
        let summary: Vec<_> = objects
            .iter()
            .map(|o| (o.source_name.as_deref(), o.material_id.0.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Some("first"), "red"),
                (Some("first"), "blue"),
                (Some("second"), "blue"),
            ]
        );
        // Unknown material keeps its name
        assert_eq!(objects[0].material.name.as_deref(), Some("red"));
    }

    #[test]
    fn test_faceless_object_skipped() {
        let objects = parse(
            "\
o empty
v 0 0 0
o full
v 1 0 0
v 0 1 0
f 1 2 3
",
        );
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].source_name.as_deref(), Some("full"));
    }

    #[test]
    fn test_out_of_range_index_is_error() {
        let err = parse_obj("v 0 0 0\nf 1 2 3\n".as_bytes(), None).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
        assert!(parse_obj("v 0 0 0\nf 0 1 1\n".as_bytes(), None).is_err());
    }

    #[test]
    fn test_mtllib_resolved_from_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("scene.mtl"),
            "newmtl red\nKd 1 0 0\nd 0.5\n",
        )
        .unwrap();

        let source = "\
mtllib scene.mtl
v 0 0 0
v 1 0 0
v 0 1 0
usemtl red
f 1 2 3
";
        let objects = parse_obj(source.as_bytes(), Some(dir.path())).unwrap();
        assert_eq!(objects[0].material.base_color, [1.0, 0.0, 0.0, 0.5]);
    }

    #[test]
    fn test_area_weighted_normals() {
        // Two faces at a fold: the larger one dominates the shared edge
        let vertices = [
            [0.0, 0.0, 0.0],
            [4.0, 0.0, 0.0],
            [0.0, 4.0, 0.0],
            [0.0, 0.0, 1.0],
        ];
        let faces = [Face::Triangle([0, 1, 2]), Face::Triangle([0, 3, 1])];
        let normals = vertex_normals(&vertices, &faces);

        assert_eq!(normals[2], [0.0, 0.0, 1.0]);
        assert_eq!(normals[3], [0.0, 1.0, 0.0]);
        assert!(normals[0][2] > normals[0][1]);
    }
}
