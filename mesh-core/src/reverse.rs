//! Triangle order reversal
//!
//! Reverses the draw order of triangles inside each sub-mesh. Each triangle
//! keeps its own vertex order, so winding and facing are unchanged; only the
//! sequence in which overlapping transparent layers (hair cards, lashes) are
//! drawn flips.

use crate::error::MeshError;
use crate::mesh::Mesh;

/// Reverse the order of triangles within every sub-mesh
///
/// Vertex data, sub-mesh descriptors, bounds, bind poses and blend shapes are
/// copied unchanged. Indices outside every sub-mesh range keep their place.
pub fn reverse_triangle_order(mesh: &Mesh) -> Result<Mesh, MeshError> {
    mesh.validate()?;

    let mut triangles = mesh.triangles.clone();
    for sub_mesh in &mesh.sub_meshes {
        let range = sub_mesh.index_range();
        let forward = &mesh.triangles[range.clone()];
        for (dst, tri) in triangles[range]
            .chunks_exact_mut(3)
            .zip(forward.chunks_exact(3).rev())
        {
            dst.copy_from_slice(tri);
        }
    }

    tracing::debug!(
        "Reversed triangle order: {} triangles in {} sub-meshes",
        mesh.triangle_count(),
        mesh.sub_mesh_count()
    );

    Ok(Mesh {
        triangles,
        ..mesh.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{BlendShape, BlendShapeFrame};
    use glam::Vec3;

    fn mesh() -> Mesh {
        Mesh::new(vec![Vec3::ZERO; 8])
            .with_sub_mesh(&[0, 1, 2, 1, 2, 3, 2, 3, 4])
            .with_sub_mesh(&[5, 6, 7, 7, 6, 5])
    }

    #[test]
    fn test_reverse_per_sub_mesh() {
        let result = reverse_triangle_order(&mesh()).unwrap();
        assert_eq!(
            result.triangles,
            vec![2, 3, 4, 1, 2, 3, 0, 1, 2, 7, 6, 5, 5, 6, 7]
        );
        assert_eq!(result.sub_meshes, mesh().sub_meshes);
    }

    #[test]
    fn test_reverse_twice_is_identity() {
        let original = mesh();
        let twice = reverse_triangle_order(&reverse_triangle_order(&original).unwrap()).unwrap();
        assert_eq!(twice, original);
    }

    #[test]
    fn test_uncovered_indices_kept() {
        let mut mesh = mesh();
        mesh.triangles.extend_from_slice(&[7, 0, 3]);
        let result = reverse_triangle_order(&mesh).unwrap();
        assert_eq!(&result.triangles[15..], &[7, 0, 3]);
    }

    #[test]
    fn test_blend_shapes_untouched() {
        let mut mesh = mesh();
        mesh.blend_shapes
            .push(BlendShape::new("brow").with_frame(BlendShapeFrame::new(100.0, vec![Vec3::Y; 8])));
        let result = reverse_triangle_order(&mesh).unwrap();
        assert_eq!(result.blend_shapes, mesh.blend_shapes);
        assert_eq!(result.vertices, mesh.vertices);
    }

    #[test]
    fn test_overflowing_range_rejected() {
        let mut mesh = mesh();
        mesh.sub_meshes[1].index_start = usize::MAX;
        let err = reverse_triangle_order(&mesh).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_overlapping_ranges_rejected() {
        let mut mesh = mesh();
        mesh.sub_meshes[1].index_start = 6;
        assert!(reverse_triangle_order(&mesh).is_err());
    }

    #[test]
    fn test_invalid_mesh_rejected() {
        let mut mesh = mesh();
        mesh.triangles[0] = 42;
        assert!(reverse_triangle_order(&mesh).is_err());
    }
}
