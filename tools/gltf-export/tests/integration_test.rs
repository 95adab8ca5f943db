//! Integration tests for gltf-export
//!
//! Tests the full pipeline: write an OBJ scene -> run the binary -> re-import
//! the output with the gltf crate

use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

const CUBE_OBJ: &str = "\
# Z-up unit cube, two materials
mtllib cube.mtl
o Cube
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
usemtl red
f 1/1 4/4 3/3 2/2
f 5/1 6/2 7/3 8/4
usemtl glass
f 1/1 2/2 6/3 5/4
f 2/1 3/2 7/3 6/4
f 3/1 4/2 8/3 7/4
f 4/1 1/2 5/3 8/4
o Marker
v 2 2 2
v 3 2 2
v 2 3 2
f 9 10 11
";

const CUBE_MTL: &str = "\
newmtl red
Kd 1 0 0
newmtl glass
Kd 0.8 0.9 1
d 0.4
";

fn write_scene(dir: &Path) -> std::path::PathBuf {
    let obj_path = dir.join("cube.obj");
    std::fs::write(&obj_path, CUBE_OBJ).expect("Failed to write OBJ");
    std::fs::write(dir.join("cube.mtl"), CUBE_MTL).expect("Failed to write MTL");
    obj_path
}

// Helper to run gltf-export with arguments
fn gltf_export(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gltf-export"))
        .args(args)
        .output()
        .expect("Failed to run gltf-export")
}

fn convert(input: &Path, output: &Path, extra: &[&str]) {
    let mut args = vec![
        "convert",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ];
    args.extend_from_slice(extra);
    let result = gltf_export(&args);
    assert!(
        result.status.success(),
        "gltf-export convert failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );
}

fn read_positions(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
) -> Vec<[f32; 3]> {
    primitive
        .reader(|buffer| Some(&buffers[buffer.index()]))
        .read_positions()
        .expect("Primitive has no positions")
        .collect()
}

/// Test OBJ -> GLB conversion
#[test]
fn test_obj_to_glb() {
    let dir = tempdir().expect("Failed to create temp dir");
    let obj_path = write_scene(dir.path());
    let glb_path = dir.path().join("cube.glb");

    convert(&obj_path, &glb_path, &[]);

    let bytes = std::fs::read(&glb_path).expect("Failed to read GLB");
    assert_eq!(&bytes[0..4], b"glTF", "Invalid GLB magic");

    let (document, buffers, _) = gltf::import(&glb_path).expect("Failed to import GLB");
    assert_eq!(buffers.len(), 1);

    // Red run, glass run, then the marker
    let names: Vec<_> = document.nodes().map(|n| n.name().map(str::to_string)).collect();
    assert_eq!(
        names,
        vec![
            Some("Cube".to_string()),
            Some("Cube".to_string()),
            Some("Marker".to_string())
        ]
    );
    assert_eq!(document.meshes().len(), 3);
    assert_eq!(document.materials().len(), 2);

    let glass = document.materials().nth(1).unwrap();
    assert_eq!(glass.name(), Some("glass"));
    assert_eq!(glass.alpha_mode(), gltf::material::AlphaMode::Blend);

    // Quads are split into triangles
    let red = document.meshes().next().unwrap().primitives().next().unwrap();
    let indices: Vec<u32> = red
        .reader(|buffer| Some(&buffers[buffer.index()]))
        .read_indices()
        .expect("Primitive has no indices")
        .into_u32()
        .collect();
    assert_eq!(indices.len(), 12);

    // Z-up source lands Y-up: the marker's z = 2 becomes y = 2, y in [2, 3] becomes z in [-3, -2]
    let marker = document.meshes().nth(2).unwrap().primitives().next().unwrap();
    let positions = read_positions(&marker, &buffers);
    assert_eq!(positions, vec![[2.0, 2.0, -2.0], [3.0, 2.0, -2.0], [2.0, 2.0, -3.0]]);
    let bounds = marker.bounding_box();
    assert_eq!(bounds.min, [2.0, 2.0, -3.0]);
    assert_eq!(bounds.max, [3.0, 2.0, -2.0]);
    assert!(marker.get(&gltf::Semantic::Normals).is_some());
    assert!(marker.get(&gltf::Semantic::TexCoords(0)).is_none());
}

/// Test OBJ -> glTF with embedded data-uri buffers
#[test]
fn test_obj_to_gltf_text() {
    let dir = tempdir().expect("Failed to create temp dir");
    let obj_path = write_scene(dir.path());
    let gltf_path = dir.path().join("cube.gltf");

    convert(&obj_path, &gltf_path, &[]);

    assert!(!dir.path().join("cube.bin").exists());
    let (document, buffers, _) = gltf::import(&gltf_path).expect("Failed to import glTF");
    assert!(buffers.len() > 1, "Text mode should use a buffer per attribute");
    for buffer in document.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Uri(uri) => {
                assert!(uri.starts_with("data:application/octet-stream;base64,"))
            }
            gltf::buffer::Source::Bin => panic!("Unexpected GLB buffer"),
        }
    }

    // Texcoords have V flipped
    let red = document.meshes().next().unwrap().primitives().next().unwrap();
    let tex_coords: Vec<[f32; 2]> = red
        .reader(|buffer| Some(&buffers[buffer.index()]))
        .read_tex_coords(0)
        .expect("Primitive has no texcoords")
        .into_f32()
        .collect();
    assert!(tex_coords.contains(&[0.0, 1.0]));
    assert!(tex_coords.contains(&[1.0, 0.0]));
}

/// Test config file selecting a binary sidecar and disabling the axis remap
#[test]
fn test_config_binary_sidecar() {
    let dir = tempdir().expect("Failed to create temp dir");
    let obj_path = write_scene(dir.path());
    let gltf_path = dir.path().join("cube.gltf");
    let config_path = dir.path().join("export.toml");
    std::fs::write(
        &config_path,
        "use_binary = true\nmap_z_to_y = false\ngenerator = \"integration\"\n",
    )
    .unwrap();

    convert(
        &obj_path,
        &gltf_path,
        &["--config", config_path.to_str().unwrap()],
    );

    assert!(dir.path().join("cube.bin").exists());
    let (document, buffers, _) = gltf::import(&gltf_path).expect("Failed to import glTF");
    assert_eq!(buffers.len(), 1);
    assert_eq!(document.as_json().asset.generator.as_deref(), Some("integration"));

    let marker = document.meshes().nth(2).unwrap().primitives().next().unwrap();
    let positions = read_positions(&marker, &buffers);
    assert_eq!(positions[2], [2.0, 3.0, 2.0]);
}

/// Test that --no-axis-remap overrides the default remap
#[test]
fn test_no_axis_remap_flag() {
    let dir = tempdir().expect("Failed to create temp dir");
    let obj_path = write_scene(dir.path());
    let glb_path = dir.path().join("raw.glb");

    convert(&obj_path, &glb_path, &["--no-axis-remap"]);

    let (document, buffers, _) = gltf::import(&glb_path).expect("Failed to import GLB");
    let marker = document.meshes().nth(2).unwrap().primitives().next().unwrap();
    assert_eq!(read_positions(&marker, &buffers)[1], [3.0, 2.0, 2.0]);
}

/// Test that requesting Draco without a linked codec fails cleanly
#[test]
fn test_draco_without_codec_fails() {
    let dir = tempdir().expect("Failed to create temp dir");
    let obj_path = write_scene(dir.path());
    let glb_path = dir.path().join("cube.glb");

    let result = gltf_export(&[
        "convert",
        obj_path.to_str().unwrap(),
        "-o",
        glb_path.to_str().unwrap(),
        "--draco",
    ]);

    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("no mesh codec"));
    assert!(!glb_path.exists());
}

/// Test the inspect command on a converted file
#[test]
fn test_inspect_output() {
    let dir = tempdir().expect("Failed to create temp dir");
    let obj_path = write_scene(dir.path());
    let glb_path = dir.path().join("cube.glb");
    convert(&obj_path, &glb_path, &[]);

    let result = gltf_export(&["inspect", glb_path.to_str().unwrap()]);
    assert!(result.status.success());

    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("nodes:        3"));
    assert!(stdout.contains("node 2: Marker -> mesh 2"));
}

/// Test default output path next to the input
#[test]
fn test_default_output_path() {
    let dir = tempdir().expect("Failed to create temp dir");
    let obj_path = write_scene(dir.path());

    let result = gltf_export(&["convert", obj_path.to_str().unwrap()]);
    assert!(result.status.success());
    assert!(dir.path().join("cube.glb").exists());
}
