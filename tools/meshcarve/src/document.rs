//! Mesh documents on disk
//!
//! A mesh document is the JSON form of [`Mesh`], stored as `<name>.mesh.json`.
//! glTF/GLB files are accepted wherever a mesh is read and are imported on the
//! fly (first mesh in the file).

use anyhow::{Context, Result};
use meshcarve_core::Mesh;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::import::import_gltf;

/// File extension of mesh documents
pub const MESH_EXT: &str = "mesh.json";

/// Load a mesh from a document or a glTF/GLB file
pub fn load_mesh(path: &Path) -> Result<Mesh> {
    if is_gltf(path) {
        return import_gltf(path, None);
    }

    let file = File::open(path).with_context(|| format!("Failed to open mesh: {:?}", path))?;
    let mesh: Mesh = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse mesh document: {:?}", path))?;

    tracing::debug!(
        "Loaded {:?}: {} vertices, {} sub-meshes",
        path,
        mesh.vertex_count(),
        mesh.sub_mesh_count()
    );
    Ok(mesh)
}

/// Write a mesh document, creating parent directories as needed
pub fn write_mesh(path: &Path, mesh: &Mesh) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let file =
        File::create(path).with_context(|| format!("Failed to create output: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, mesh)
        .with_context(|| format!("Failed to write mesh document: {:?}", path))?;
    writer.flush()?;
    Ok(())
}

/// Whether `path` names a glTF or GLB file
pub fn is_gltf(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();
    matches!(ext.as_str(), "gltf" | "glb")
}

/// Base name of a mesh file without `.mesh.json` or its last extension
pub fn document_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("mesh");
    let suffix = format!(".{}", MESH_EXT);
    match name.strip_suffix(&suffix) {
        Some(stem) => stem.to_string(),
        None => path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("mesh")
            .to_string(),
    }
}

/// `<dir>/<stem>_<suffix>.mesh.json`
pub fn derived_path(dir: &Path, stem: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{}_{}.{}", stem, suffix, MESH_EXT))
}

/// Directory holding `path`, or `.` for bare file names
pub fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use tempfile::tempdir;

    #[test]
    fn test_document_stem() {
        assert_eq!(document_stem(Path::new("out/body.mesh.json")), "body");
        assert_eq!(document_stem(Path::new("hero.glb")), "hero");
        assert_eq!(document_stem(Path::new("plain")), "plain");
    }

    #[test]
    fn test_derived_path() {
        let path = derived_path(Path::new("parts"), "body", "extracted2");
        assert_eq!(path, Path::new("parts/body_extracted2.mesh.json"));
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir(Path::new("body.mesh.json")), Path::new("."));
        assert_eq!(parent_dir(Path::new("a/body.mesh.json")), Path::new("a"));
    }

    #[test]
    fn test_is_gltf() {
        assert!(is_gltf(Path::new("a.gltf")));
        assert!(is_gltf(Path::new("a.GLB")));
        assert!(!is_gltf(Path::new("a.mesh.json")));
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested/tri.mesh.json");
        let mesh = Mesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y]).with_sub_mesh(&[0, 1, 2]);

        write_mesh(&path, &mesh).expect("Failed to write mesh");
        let loaded = load_mesh(&path).expect("Failed to load mesh");
        assert_eq!(loaded, mesh);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_mesh(Path::new("does/not/exist.mesh.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to open mesh"));
    }
}
