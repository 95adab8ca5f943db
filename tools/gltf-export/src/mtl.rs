//! MTL material library parsing
//!
//! Only the keys with a metallic-roughness counterpart are read: `Kd`,
//! `d` / `Tr`, `Ke`, `Pm` and `Pr`. Texture maps are ignored.

use anyhow::{Context, Result, bail};
use gltf_builder::Material;
use hashbrown::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Materials by `newmtl` name
pub type MaterialLibrary = HashMap<String, Material>;

/// Load an MTL file from disk
pub fn load_mtl(path: &Path) -> Result<MaterialLibrary> {
    let file = File::open(path).with_context(|| format!("Failed to open MTL: {:?}", path))?;
    parse_mtl(BufReader::new(file)).with_context(|| format!("Failed to parse MTL: {:?}", path))
}

pub fn parse_mtl<R: BufRead>(reader: R) -> Result<MaterialLibrary> {
    let mut library = MaterialLibrary::new();
    let mut current: Option<(String, Material)> = None;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts[0] == "newmtl" {
            if let Some((name, material)) = current.take() {
                library.insert(name, material);
            }
            let name = parts[1..].join(" ");
            let material = Material {
                name: Some(name.clone()),
                ..Default::default()
            };
            current = Some((name, material));
            continue;
        }

        let Some((_, material)) = current.as_mut() else {
            bail!("line {}: '{}' before any newmtl", line_no + 1, parts[0]);
        };

        match parts[0] {
            "Kd" => {
                let [r, g, b] = parse_floats::<3>(&parts[1..], line_no)?;
                material.base_color[..3].copy_from_slice(&[r, g, b]);
            }
            "d" => material.base_color[3] = parse_floats::<1>(&parts[1..], line_no)?[0],
            "Tr" => material.base_color[3] = 1.0 - parse_floats::<1>(&parts[1..], line_no)?[0],
            "Ke" => material.emissive = parse_floats::<3>(&parts[1..], line_no)?,
            "Pm" => material.metallic = parse_floats::<1>(&parts[1..], line_no)?[0],
            "Pr" => material.roughness = parse_floats::<1>(&parts[1..], line_no)?[0],
            _ => {}
        }
    }

    if let Some((name, material)) = current.take() {
        library.insert(name, material);
    }

    tracing::debug!("Parsed {} materials", library.len());
    Ok(library)
}

fn parse_floats<const N: usize>(args: &[&str], line_no: usize) -> Result<[f32; N]> {
    if args.len() < N {
        bail!(
            "line {}: expected {} values, found {}",
            line_no + 1,
            N,
            args.len()
        );
    }

    let mut values = [0.0f32; N];
    for (value, arg) in values.iter_mut().zip(args) {
        *value = arg
            .parse()
            .with_context(|| format!("line {}: invalid number '{}'", line_no + 1, arg))?;
    }
    Ok(values)
}
