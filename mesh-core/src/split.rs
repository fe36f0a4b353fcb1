//! Sub-mesh extraction and removal
//!
//! Both operations build a [`VertexRemap`] over the surviving triangle ranges,
//! then gather every populated per-vertex stream and every blend-shape frame
//! through it. Unreferenced vertices are dropped; geometrically identical
//! vertices are never merged.
//!
//! # Example
//! ```no_run
//! use meshcarve_core::{BoundsMode, Mesh, SplitOptions, SubMeshSplitter};
//!
//! # fn load() -> Mesh { Mesh::default() }
//! let character = load();
//! let splitter = SubMeshSplitter::new(SplitOptions {
//!     bounds: BoundsMode::Preserve,
//! });
//!
//! // Pull the hair and the eyelashes into their own meshes
//! let split = splitter.split(&character, &[3, 5])?;
//! for (index, mesh) in &split.extracted {
//!     println!("sub-mesh {}: {} vertices", index, mesh.vertex_count());
//! }
//! println!("remainder: {} sub-meshes", split.remainder.sub_mesh_count());
//! # Ok::<(), meshcarve_core::MeshError>(())
//! ```

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::error::{InvalidArgument, MeshError};
use crate::mesh::{Bounds, Mesh, SubMesh};
use crate::remap::VertexRemap;

/// How the result's bounding box is produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundsMode {
    /// Fit the bounds to the surviving vertices
    #[default]
    Recompute,
    /// Copy the source bounds unchanged
    Preserve,
}

/// Options shared by extraction, removal and splitting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitOptions {
    pub bounds: BoundsMode,
}

/// Result of [`SubMeshSplitter::split`]
#[derive(Debug, Clone, PartialEq)]
pub struct SplitResult {
    /// One mesh per selected sub-mesh, ascending by source sub-mesh index
    pub extracted: Vec<(usize, Mesh)>,
    /// The source mesh without the selected sub-meshes
    pub remainder: Mesh,
}

/// Builds compacted meshes from sub-mesh selections
#[derive(Debug, Clone, Default)]
pub struct SubMeshSplitter {
    options: SplitOptions,
}

impl SubMeshSplitter {
    pub fn new(options: SplitOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SplitOptions {
        &self.options
    }

    /// Extract one sub-mesh into a standalone mesh
    ///
    /// The result has a single sub-mesh spanning all of its triangles. Vertex
    /// ids are assigned in first-reference order over the sub-mesh's range.
    pub fn extract(&self, mesh: &Mesh, index: usize) -> Result<Mesh, MeshError> {
        mesh.validate()?;
        self.extract_validated(mesh, index)
    }

    /// Remove a set of sub-meshes, keeping everything else
    ///
    /// Duplicate indices are tolerated and order does not matter. Removing
    /// every sub-mesh yields an empty mesh. Kept triangles are emitted in
    /// sub-mesh order, which differs from triangle-list order when the
    /// descriptors are not sorted by `index_start`.
    pub fn remove(&self, mesh: &Mesh, indices: &[usize]) -> Result<Mesh, MeshError> {
        mesh.validate()?;
        let removed = selection(mesh, indices)?;
        self.remove_validated(mesh, &removed)
    }

    /// Extract every selected sub-mesh and remove them all from the source
    ///
    /// The whole selection is checked before any mesh is built.
    pub fn split(&self, mesh: &Mesh, indices: &[usize]) -> Result<SplitResult, MeshError> {
        mesh.validate()?;
        let selected = selection(mesh, indices)?;

        let mut order: Vec<usize> = selected.iter().copied().collect();
        order.sort_unstable();

        let extracted = order
            .into_iter()
            .map(|index| Ok((index, self.extract_validated(mesh, index)?)))
            .collect::<Result<Vec<_>, MeshError>>()?;
        let remainder = self.remove_validated(mesh, &selected)?;

        Ok(SplitResult {
            extracted,
            remainder,
        })
    }

    fn extract_validated(&self, mesh: &Mesh, index: usize) -> Result<Mesh, MeshError> {
        let indices = mesh.sub_mesh_indices(index)?;
        let remap = VertexRemap::from_indices(mesh.vertex_count(), indices);
        let triangles = remap.remap_indices(indices);

        let sub_mesh = SubMesh {
            index_start: 0,
            index_count: triangles.len(),
            first_vertex: 0,
            vertex_count: remap.len(),
        };
        let result = self.gather(mesh, &remap, triangles, vec![sub_mesh]);

        tracing::debug!(
            "Extracted sub-mesh {}: {} -> {} vertices, {} triangles",
            index,
            mesh.vertex_count(),
            result.vertex_count(),
            result.triangle_count()
        );

        Ok(result)
    }

    fn remove_validated(&self, mesh: &Mesh, removed: &HashSet<usize>) -> Result<Mesh, MeshError> {
        let kept: Vec<usize> = (0..mesh.sub_mesh_count())
            .filter(|s| !removed.contains(s))
            .collect();

        let mut remap = VertexRemap::new(mesh.vertex_count());
        for &s in &kept {
            remap.visit_all(mesh.sub_mesh_indices(s)?);
        }

        // Walk kept ranges only: a removed triangle may still reference a
        // vertex shared with a kept sub-mesh.
        let mut triangles = Vec::with_capacity(
            kept.iter()
                .map(|&s| mesh.sub_meshes[s].index_count)
                .sum(),
        );
        let mut sub_meshes = Vec::with_capacity(kept.len());
        for &s in &kept {
            let start = triangles.len();
            triangles.extend(remap.remap_indices(mesh.sub_mesh_indices(s)?));
            sub_meshes.push(SubMesh::from_indices(start, &triangles[start..]));
        }

        let result = self.gather(mesh, &remap, triangles, sub_meshes);

        tracing::debug!(
            "Removed {} of {} sub-meshes: {} -> {} vertices, {} -> {} triangles",
            removed.len(),
            mesh.sub_mesh_count(),
            mesh.vertex_count(),
            result.vertex_count(),
            mesh.triangle_count(),
            result.triangle_count()
        );

        Ok(result)
    }

    /// Build the output mesh from a finished remap
    fn gather(
        &self,
        mesh: &Mesh,
        remap: &VertexRemap,
        triangles: Vec<u32>,
        sub_meshes: Vec<SubMesh>,
    ) -> Mesh {
        let vertices = remap.remap_stream(&mesh.vertices);
        let bounds = match self.options.bounds {
            BoundsMode::Recompute => Bounds::from_points(&vertices),
            BoundsMode::Preserve => mesh.bounds,
        };

        Mesh {
            vertices,
            uvs: std::array::from_fn(|channel| remap.remap_stream(&mesh.uvs[channel])),
            normals: remap.remap_stream(&mesh.normals),
            tangents: remap.remap_stream(&mesh.tangents),
            colors: remap.remap_stream(&mesh.colors),
            bone_weights: remap.remap_stream(&mesh.bone_weights),
            bind_poses: mesh.bind_poses.clone(),
            bounds,
            triangles,
            sub_meshes,
            blend_shapes: remap.remap_blend_shapes(&mesh.blend_shapes),
        }
    }
}

/// Check a sub-mesh selection and collapse duplicates
fn selection(mesh: &Mesh, indices: &[usize]) -> Result<HashSet<usize>, MeshError> {
    let count = mesh.sub_mesh_count();
    if let Some(&index) = indices.iter().find(|&&i| i >= count) {
        return Err(InvalidArgument::SubMeshOutOfRange { index, count }.into());
    }
    Ok(indices.iter().copied().collect())
}

/// Extract one sub-mesh with default options
pub fn extract_sub_mesh(mesh: &Mesh, index: usize) -> Result<Mesh, MeshError> {
    SubMeshSplitter::default().extract(mesh, index)
}

/// Remove a set of sub-meshes with default options
pub fn remove_sub_meshes(mesh: &Mesh, indices: &[usize]) -> Result<Mesh, MeshError> {
    SubMeshSplitter::default().remove(mesh, indices)
}

/// Split selected sub-meshes off a mesh with default options
pub fn split_sub_meshes(mesh: &Mesh, indices: &[usize]) -> Result<SplitResult, MeshError> {
    SubMeshSplitter::default().split(mesh, indices)
}
