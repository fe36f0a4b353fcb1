//! Transforms run by the CLI and by manifest jobs

use anyhow::{Context, Result};
use meshcarve_core::{
    prune_blend_shapes, reverse_triangle_order, BoundsMode, Mesh, MeshError, PruneOptions,
    SplitOptions, SubMeshSplitter, DEFAULT_PRUNE_THRESHOLD,
};
use serde::Deserialize;
use std::fmt::Write;
use std::path::{Path, PathBuf};

use crate::document::{derived_path, document_stem, load_mesh, parent_dir, write_mesh};

/// Options shared by every transform
///
/// Read from the `[options]` table of a manifest; `--bounds` overrides.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bounds: BoundsMode,
    /// Prune threshold used when a job does not set its own
    pub threshold: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bounds: BoundsMode::default(),
            threshold: DEFAULT_PRUNE_THRESHOLD,
        }
    }
}

impl Settings {
    pub fn splitter(&self) -> SubMeshSplitter {
        SubMeshSplitter::new(SplitOptions {
            bounds: self.bounds,
        })
    }
}

/// A mesh-to-mesh transform
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    Extract(usize),
    Remove(Vec<usize>),
    /// Extract each selected sub-mesh and write the remainder
    Split(Vec<usize>),
    Reverse,
    /// Optional threshold overriding [`Settings::threshold`]
    Prune(Option<f32>),
}

impl Transform {
    pub fn name(&self) -> &'static str {
        match self {
            Transform::Extract(_) => "extract",
            Transform::Remove(_) => "remove",
            Transform::Split(_) => "split",
            Transform::Reverse => "reverse",
            Transform::Prune(_) => "prune",
        }
    }

    /// Whether the output path names a directory rather than a file
    pub fn writes_directory(&self) -> bool {
        matches!(self, Transform::Split(_))
    }

    /// Run the transform, returning each result with its file-name suffix
    pub fn apply(&self, mesh: &Mesh, settings: &Settings) -> Result<Vec<(String, Mesh)>, MeshError> {
        let splitter = settings.splitter();
        let outputs = match self {
            Transform::Extract(index) => vec![(
                format!("extracted{}", index),
                splitter.extract(mesh, *index)?,
            )],
            Transform::Remove(indices) => {
                vec![("remainder".to_string(), splitter.remove(mesh, indices)?)]
            }
            Transform::Split(indices) => {
                let split = splitter.split(mesh, indices)?;
                let mut outputs: Vec<(String, Mesh)> = split
                    .extracted
                    .into_iter()
                    .map(|(index, mesh)| (format!("extracted{}", index), mesh))
                    .collect();
                outputs.push(("remainder".to_string(), split.remainder));
                outputs
            }
            Transform::Reverse => vec![("reversed".to_string(), reverse_triangle_order(mesh)?)],
            Transform::Prune(threshold) => {
                let options = PruneOptions {
                    threshold: threshold.unwrap_or(settings.threshold),
                };
                vec![("pruned".to_string(), prune_blend_shapes(mesh, &options)?)]
            }
        };
        Ok(outputs)
    }
}

/// Load `input`, apply `transform` and write the results
///
/// `output` is a file for single-result transforms and a directory for
/// [`Transform::Split`]. Without it, results go next to the input (or into
/// `default_dir`) as `<stem>_<suffix>.mesh.json`. Returns the written paths.
pub fn run(
    input: &Path,
    transform: &Transform,
    settings: &Settings,
    output: Option<&Path>,
    default_dir: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let mesh = load_mesh(input)?;
    let results = transform
        .apply(&mesh, settings)
        .with_context(|| format!("Failed to {} {:?}", transform.name(), input))?;

    let stem = document_stem(input);
    let dir = default_dir.unwrap_or_else(|| parent_dir(input));

    let mut written = Vec::with_capacity(results.len());
    for (suffix, result) in &results {
        let path = match output {
            Some(dir) if transform.writes_directory() => derived_path(dir, &stem, suffix),
            Some(file) => file.to_path_buf(),
            None => derived_path(dir, &stem, suffix),
        };
        write_mesh(&path, result)?;
        tracing::info!(
            "Wrote {:?}: {} vertices, {} triangles, {} sub-meshes",
            path,
            result.vertex_count(),
            result.triangle_count(),
            result.sub_mesh_count()
        );
        written.push(path);
    }
    Ok(written)
}

/// Human-readable summary printed by `meshcarve info`
pub fn describe(mesh: &Mesh) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(out, "vertices: {}", mesh.vertex_count());
    let _ = writeln!(out, "triangles: {}", mesh.triangle_count());

    let streams = mesh.populated_streams();
    if streams.is_empty() {
        let _ = writeln!(out, "streams: none");
    } else {
        let _ = writeln!(out, "streams: {}", streams.join(", "));
    }
    let _ = writeln!(out, "bind poses: {}", mesh.bind_poses.len());
    let _ = writeln!(
        out,
        "bounds: center {:?}, extents {:?}",
        mesh.bounds.center.to_array(),
        mesh.bounds.extents.to_array()
    );

    let _ = writeln!(out, "sub-meshes: {}", mesh.sub_mesh_count());
    for (i, sub_mesh) in mesh.sub_meshes.iter().enumerate() {
        let _ = writeln!(
            out,
            "  [{}] {} triangles, indices {}..{}, vertices {}..{}",
            i,
            sub_mesh.triangle_count(),
            sub_mesh.index_start,
            sub_mesh.index_range().end,
            sub_mesh.first_vertex,
            sub_mesh.first_vertex.saturating_add(sub_mesh.vertex_count)
        );
    }

    let _ = writeln!(out, "blend shapes: {}", mesh.blend_shape_count());
    for shape in &mesh.blend_shapes {
        let weights: Vec<String> = shape.frames.iter().map(|f| f.weight.to_string()).collect();
        let _ = writeln!(
            out,
            "  {} ({} frames, weights {})",
            shape.name,
            shape.frames.len(),
            weights.join(", ")
        );
    }
    out
}
