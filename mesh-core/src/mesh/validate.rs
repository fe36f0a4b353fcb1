//! Structural validation run before every transform

use super::{Mesh, UV_CHANNELS};
use crate::error::{InvalidArgument, MeshError};

/// Check that an optional stream is either absent or fully populated
fn check_stream(name: &str, len: usize, vertex_count: usize) -> Result<(), MeshError> {
    if len == 0 || len == vertex_count {
        Ok(())
    } else {
        Err(MeshError::stream_length(name, len, vertex_count))
    }
}

impl Mesh {
    /// Verify the structural invariants of the mesh
    ///
    /// Checks, in order:
    /// - every optional per-vertex stream is empty or `vertex_count` long
    /// - every blend-shape frame carries one position delta per vertex
    /// - the triangle list and every sub-mesh hold whole triangles
    /// - every sub-mesh range lies inside the triangle list
    /// - no two non-empty sub-mesh ranges overlap
    /// - every triangle index addresses an existing vertex
    pub fn validate(&self) -> Result<(), MeshError> {
        let vertex_count = self.vertices.len();

        const UV_NAMES: [&str; UV_CHANNELS] = ["uv0", "uv1", "uv2", "uv3", "uv4", "uv5", "uv6", "uv7"];
        for (name, uv) in UV_NAMES.iter().zip(&self.uvs) {
            check_stream(name, uv.len(), vertex_count)?;
        }
        check_stream("normals", self.normals.len(), vertex_count)?;
        check_stream("tangents", self.tangents.len(), vertex_count)?;
        check_stream("colors", self.colors.len(), vertex_count)?;
        check_stream("bone_weights", self.bone_weights.len(), vertex_count)?;

        for shape in &self.blend_shapes {
            for (f, frame) in shape.frames.iter().enumerate() {
                if frame.delta_vertices.len() != vertex_count {
                    return Err(MeshError::stream_length(
                        format!("{}[{}].delta_vertices", shape.name, f),
                        frame.delta_vertices.len(),
                        vertex_count,
                    ));
                }
                check_stream(
                    &format!("{}[{}].delta_normals", shape.name, f),
                    frame.delta_normals.len(),
                    vertex_count,
                )?;
                check_stream(
                    &format!("{}[{}].delta_tangents", shape.name, f),
                    frame.delta_tangents.len(),
                    vertex_count,
                )?;
            }
        }

        if self.triangles.len() % 3 != 0 {
            return Err(InvalidArgument::MalformedIndexCount {
                sub_mesh: None,
                count: self.triangles.len(),
            }
            .into());
        }

        for (s, sub_mesh) in self.sub_meshes.iter().enumerate() {
            if sub_mesh.index_count % 3 != 0 {
                return Err(InvalidArgument::MalformedIndexCount {
                    sub_mesh: Some(s),
                    count: sub_mesh.index_count,
                }
                .into());
            }
            if sub_mesh
                .index_start
                .checked_add(sub_mesh.index_count)
                .is_none_or(|end| end > self.triangles.len())
            {
                return Err(InvalidArgument::SubMeshRangeOutOfBounds {
                    sub_mesh: s,
                    start: sub_mesh.index_start,
                    count: sub_mesh.index_count,
                    len: self.triangles.len(),
                }
                .into());
            }
        }

        let mut ranges: Vec<(usize, usize, usize)> = self
            .sub_meshes
            .iter()
            .enumerate()
            .filter(|(_, sub_mesh)| sub_mesh.index_count > 0)
            .map(|(s, sub_mesh)| (sub_mesh.index_start, sub_mesh.index_start + sub_mesh.index_count, s))
            .collect();
        ranges.sort_unstable();
        for pair in ranges.windows(2) {
            let (_, end, first) = pair[0];
            let (start, _, second) = pair[1];
            if start < end {
                return Err(InvalidArgument::OverlappingSubMeshes {
                    first: first.min(second),
                    second: first.max(second),
                }
                .into());
            }
        }

        if let Some((position, &index)) = self
            .triangles
            .iter()
            .enumerate()
            .find(|&(_, &i)| i as usize >= vertex_count)
        {
            return Err(InvalidArgument::TriangleIndexOutOfRange {
                position,
                index,
                vertex_count,
            }
            .into());
        }

        Ok(())
    }
}
