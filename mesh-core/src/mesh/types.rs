//! Mesh data model

use glam::{Mat4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use super::Bounds;
use crate::error::{InvalidArgument, MeshError};

/// Number of UV channels a mesh can carry
pub const UV_CHANNELS: usize = 8;

/// Linear RGBA vertex color
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Skinning influences for one vertex (up to 4 bones)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoneWeight {
    /// Bone indices into the mesh's bind pose table
    pub bone_indices: [u32; 4],
    /// Weight of each influence, normally summing to 1
    pub weights: [f32; 4],
}

impl BoneWeight {
    pub const fn new(bone_indices: [u32; 4], weights: [f32; 4]) -> Self {
        Self {
            bone_indices,
            weights,
        }
    }

    /// Single-bone influence with full weight
    pub const fn single(bone: u32) -> Self {
        Self::new([bone, 0, 0, 0], [1.0, 0.0, 0.0, 0.0])
    }
}

/// A contiguous range of the triangle index list
///
/// `first_vertex` and `vertex_count` cache the span of vertex ids the range
/// touches (`first_vertex..first_vertex + vertex_count`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubMesh {
    pub index_start: usize,
    pub index_count: usize,
    pub first_vertex: usize,
    pub vertex_count: usize,
}

impl SubMesh {
    /// Describe `indices`, which start at `index_start` in the triangle list
    ///
    /// The vertex span is derived from the smallest and largest id referenced.
    pub fn from_indices(index_start: usize, indices: &[u32]) -> Self {
        let (first_vertex, vertex_count) = vertex_span(indices);
        Self {
            index_start,
            index_count: indices.len(),
            first_vertex,
            vertex_count,
        }
    }

    /// Index range into the triangle list
    ///
    /// The end saturates at `usize::MAX`, so an overflowing range never wraps
    /// back into the list.
    pub fn index_range(&self) -> std::ops::Range<usize> {
        self.index_start..self.index_start.saturating_add(self.index_count)
    }

    /// Number of triangles in this sub-mesh
    pub fn triangle_count(&self) -> usize {
        self.index_count / 3
    }
}

/// Smallest referenced id and the span up to the largest one
fn vertex_span(indices: &[u32]) -> (usize, usize) {
    let mut iter = indices.iter().copied();
    let Some(first) = iter.next() else {
        return (0, 0);
    };
    let (min, max) = iter.fold((first, first), |(lo, hi), i| (lo.min(i), hi.max(i)));
    (min as usize, (max - min) as usize + 1)
}

/// One weighted frame of a blend shape
///
/// `delta_vertices` always holds one entry per mesh vertex. Normal and tangent
/// deltas are either empty or one entry per vertex.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlendShapeFrame {
    pub weight: f32,
    pub delta_vertices: Vec<Vec3>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub delta_normals: Vec<Vec3>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub delta_tangents: Vec<Vec3>,
}

impl BlendShapeFrame {
    /// Create a frame with position deltas only
    pub fn new(weight: f32, delta_vertices: Vec<Vec3>) -> Self {
        Self {
            weight,
            delta_vertices,
            delta_normals: Vec::new(),
            delta_tangents: Vec::new(),
        }
    }

    /// Vector sum of all position deltas
    pub fn delta_sum(&self) -> Vec3 {
        self.delta_vertices.iter().copied().sum()
    }
}

/// Named morph target made of one or more weighted frames
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlendShape {
    pub name: String,
    pub frames: Vec<BlendShapeFrame>,
}

impl BlendShape {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frames: Vec::new(),
        }
    }

    /// Append a frame and return `self` for chaining
    pub fn with_frame(mut self, frame: BlendShapeFrame) -> Self {
        self.frames.push(frame);
        self
    }
}

/// Indexed triangle mesh with optional per-vertex streams and blend shapes
///
/// Every optional per-vertex stream is either empty or exactly
/// `vertices.len()` long; see [`Mesh::validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    #[serde(default, skip_serializing_if = "all_empty")]
    pub uvs: [Vec<Vec2>; UV_CHANNELS],
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub normals: Vec<Vec3>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tangents: Vec<Vec4>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<Color>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bone_weights: Vec<BoneWeight>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bind_poses: Vec<Mat4>,
    #[serde(default)]
    pub bounds: Bounds,
    #[serde(default)]
    pub triangles: Vec<u32>,
    #[serde(default)]
    pub sub_meshes: Vec<SubMesh>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blend_shapes: Vec<BlendShape>,
}

fn all_empty(uvs: &[Vec<Vec2>; UV_CHANNELS]) -> bool {
    uvs.iter().all(Vec::is_empty)
}

impl Mesh {
    /// Create a mesh with positions only
    pub fn new(vertices: Vec<Vec3>) -> Self {
        Self {
            vertices,
            ..Default::default()
        }
    }

    /// Append a sub-mesh made of `indices` to the end of the triangle list
    ///
    /// Returns the index of the new sub-mesh.
    pub fn push_sub_mesh(&mut self, indices: &[u32]) -> usize {
        let sub_mesh = SubMesh::from_indices(self.triangles.len(), indices);
        self.triangles.extend_from_slice(indices);
        self.sub_meshes.push(sub_mesh);
        self.sub_meshes.len() - 1
    }

    /// Builder form of [`Mesh::push_sub_mesh`]
    pub fn with_sub_mesh(mut self, indices: &[u32]) -> Self {
        self.push_sub_mesh(indices);
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn sub_mesh_count(&self) -> usize {
        self.sub_meshes.len()
    }

    pub fn blend_shape_count(&self) -> usize {
        self.blend_shapes.len()
    }

    /// Get a sub-mesh descriptor, failing on an out-of-range index
    pub fn sub_mesh(&self, index: usize) -> Result<&SubMesh, MeshError> {
        self.sub_meshes.get(index).ok_or_else(|| {
            InvalidArgument::SubMeshOutOfRange {
                index,
                count: self.sub_meshes.len(),
            }
            .into()
        })
    }

    /// Triangle indices covered by a sub-mesh
    pub fn sub_mesh_indices(&self, index: usize) -> Result<&[u32], MeshError> {
        let sub_mesh = self.sub_mesh(index)?;
        self.triangles
            .get(sub_mesh.index_range())
            .ok_or_else(|| {
                InvalidArgument::SubMeshRangeOutOfBounds {
                    sub_mesh: index,
                    start: sub_mesh.index_start,
                    count: sub_mesh.index_count,
                    len: self.triangles.len(),
                }
                .into()
            })
    }

    /// Recompute [`Mesh::bounds`] from the current vertex positions
    pub fn recalculate_bounds(&mut self) {
        self.bounds = Bounds::from_points(&self.vertices);
    }

    /// Names of the populated optional streams, in a fixed order
    ///
    /// Used for logging and the `info` summary.
    pub fn populated_streams(&self) -> Vec<String> {
        let mut streams = Vec::new();
        for (channel, uv) in self.uvs.iter().enumerate() {
            if !uv.is_empty() {
                streams.push(format!("uv{}", channel));
            }
        }
        let named = [
            ("normals", self.normals.is_empty()),
            ("tangents", self.tangents.is_empty()),
            ("colors", self.colors.is_empty()),
            ("bone_weights", self.bone_weights.is_empty()),
        ];
        streams.extend(
            named
                .into_iter()
                .filter(|(_, empty)| !empty)
                .map(|(name, _)| name.to_string()),
        );
        streams
    }
}
