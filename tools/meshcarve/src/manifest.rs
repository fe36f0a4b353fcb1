//! Job manifest parsing and batch runs
//!
//! A manifest (`meshcarve.toml`) lists transforms to run in order:
//!
//! ```toml
//! [output]
//! dir = "out/"
//!
//! [options]
//! bounds = "preserve"
//! threshold = 0.05
//!
//! [[jobs]]
//! input = "character.glb"
//! op = "split"
//! sub_meshes = [3, 5]
//!
//! [[jobs]]
//! input = "character.glb"
//! op = "import"
//! mesh = "Body"
//! output = "body.mesh.json"
//! ```
//!
//! Relative `output` paths are resolved against the output directory. A job
//! may read a file an earlier job wrote there, e.g.
//! `input = "out/character_remainder.mesh.json"`.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::document::{document_stem, write_mesh, MESH_EXT};
use crate::import::{import_gltf, MeshSelector};
use crate::ops::{self, Settings, Transform};

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub options: Settings,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("out/")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    Extract,
    Remove,
    Split,
    Reverse,
    Prune,
    Import,
}

/// One `[[jobs]]` entry
#[derive(Debug, Deserialize)]
pub struct Job {
    pub input: PathBuf,
    pub op: Op,
    #[serde(default)]
    pub sub_meshes: Vec<usize>,
    /// Prune threshold for this job only
    #[serde(default)]
    pub threshold: Option<f32>,
    /// glTF mesh name or index, for `import`
    #[serde(default)]
    pub mesh: Option<String>,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl Job {
    /// The transform this job runs, or `None` for `import`
    pub fn transform(&self) -> Result<Option<Transform>> {
        let transform = match self.op {
            Op::Extract => match self.sub_meshes.as_slice() {
                [index] => Transform::Extract(*index),
                other => bail!(
                    "extract takes exactly one sub-mesh, got {}",
                    other.len()
                ),
            },
            Op::Remove => Transform::Remove(self.sub_meshes.clone()),
            Op::Split => {
                if self.sub_meshes.is_empty() {
                    bail!("split needs at least one sub-mesh");
                }
                Transform::Split(self.sub_meshes.clone())
            }
            Op::Reverse => Transform::Reverse,
            Op::Prune => Transform::Prune(self.threshold),
            Op::Import => return Ok(None),
        };
        Ok(Some(transform))
    }
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let manifest: Manifest = toml::from_str(&content)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))?;
    Ok(manifest)
}

/// Validate a manifest without building
///
/// Inputs under the output directory may be written by an earlier job, so
/// only inputs outside it must already exist.
pub fn validate(manifest: &Manifest) -> Result<()> {
    validate_jobs(manifest, &manifest.output.dir)
}

fn validate_jobs(manifest: &Manifest, output_dir: &Path) -> Result<()> {
    for (i, job) in manifest.jobs.iter().enumerate() {
        if !job.input.exists() && !job.input.starts_with(output_dir) {
            bail!("Job {} input not found: {:?}", i, job.input);
        }
        job.transform()
            .with_context(|| format!("Job {} ({:?}) is invalid", i, job.input))?;
        if job.op == Op::Import && !crate::document::is_gltf(&job.input) {
            bail!("Job {} imports {:?}, which is not a glTF/GLB file", i, job.input);
        }
    }
    Ok(())
}

/// Run every job in order
///
/// Stops at the first failing job. Returns every path written.
pub fn build_all(
    manifest: &Manifest,
    settings: &Settings,
    output_override: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let output_dir = output_override.unwrap_or(&manifest.output.dir);
    validate_jobs(manifest, output_dir)?;

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let mut written = Vec::new();
    for (i, job) in manifest.jobs.iter().enumerate() {
        tracing::info!("Job {}: {:?} {:?}", i, job.op, job.input);
        let output = job.output.as_ref().map(|p| output_dir.join(p));

        match job.transform()? {
            Some(transform) => {
                let paths = ops::run(
                    &job.input,
                    &transform,
                    settings,
                    output.as_deref(),
                    Some(output_dir),
                )
                .with_context(|| format!("Job {} failed", i))?;
                written.extend(paths);
            }
            None => {
                let selector = job.mesh.as_deref().map(MeshSelector::from);
                let mesh = import_gltf(&job.input, selector.as_ref())
                    .with_context(|| format!("Job {} failed", i))?;
                let path = output.unwrap_or_else(|| {
                    output_dir.join(format!("{}.{}", document_stem(&job.input), MESH_EXT))
                });
                write_mesh(&path, &mesh)?;
                written.push(path);
            }
        }
    }

    tracing::info!("Ran {} jobs, wrote {} files", manifest.jobs.len(), written.len());
    Ok(written)
}
