//! Dense vertex renumbering
//!
//! A [`VertexRemap`] maps source vertex ids to a compact new numbering in
//! first-reference order. It is built once per operation and then applied to
//! every per-vertex stream, the triangle list and all blend-shape frames, so
//! all of them stay consistent.

use crate::mesh::{BlendShape, BlendShapeFrame};

/// Marker for source vertices that received no new id
const UNUSED: u32 = u32::MAX;

/// Old-to-new vertex id mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexRemap {
    /// Source id -> new id, or `UNUSED`
    table: Vec<u32>,
    /// New id -> source id
    order: Vec<u32>,
}

impl VertexRemap {
    /// Create an empty remap for a mesh with `vertex_count` vertices
    pub fn new(vertex_count: usize) -> Self {
        Self {
            table: vec![UNUSED; vertex_count],
            order: Vec::new(),
        }
    }

    /// Build a remap from a single run of triangle indices
    pub fn from_indices(vertex_count: usize, indices: &[u32]) -> Self {
        let mut remap = Self::new(vertex_count);
        remap.visit_all(indices);
        remap
    }

    /// Assign the next new id to `old` unless it already has one
    ///
    /// Returns the new id of `old`.
    ///
    /// # Panics
    /// Panics if `old` is not below the vertex count given to [`VertexRemap::new`].
    pub fn visit(&mut self, old: u32) -> u32 {
        let slot = &mut self.table[old as usize];
        if *slot == UNUSED {
            *slot = self.order.len() as u32;
            self.order.push(old);
        }
        *slot
    }

    /// Visit every index in order
    pub fn visit_all(&mut self, indices: &[u32]) {
        for &old in indices {
            self.visit(old);
        }
    }

    /// New id of a source vertex, if it is referenced
    pub fn get(&self, old: u32) -> Option<u32> {
        match self.table.get(old as usize) {
            Some(&new) if new != UNUSED => Some(new),
            _ => None,
        }
    }

    /// Number of vertices in the remapped mesh
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of vertices in the source mesh
    pub fn source_len(&self) -> usize {
        self.table.len()
    }

    /// Source vertex id of each new vertex, indexed by new id
    pub fn source_vertices(&self) -> &[u32] {
        &self.order
    }

    /// Gather a per-vertex stream into the new numbering
    ///
    /// An empty stream stays empty.
    pub fn remap_stream<T: Copy>(&self, src: &[T]) -> Vec<T> {
        if src.is_empty() {
            return Vec::new();
        }
        self.order.iter().map(|&old| src[old as usize]).collect()
    }

    /// Translate triangle indices, dropping indices of unreferenced vertices
    pub fn remap_indices(&self, indices: &[u32]) -> Vec<u32> {
        indices.iter().filter_map(|&old| self.get(old)).collect()
    }

    /// Remap all three delta channels of a frame together
    pub fn remap_frame(&self, frame: &BlendShapeFrame) -> BlendShapeFrame {
        BlendShapeFrame {
            weight: frame.weight,
            delta_vertices: self.remap_stream(&frame.delta_vertices),
            delta_normals: self.remap_stream(&frame.delta_normals),
            delta_tangents: self.remap_stream(&frame.delta_tangents),
        }
    }

    /// Remap every frame of every blend shape, keeping names, weights and order
    pub fn remap_blend_shapes(&self, shapes: &[BlendShape]) -> Vec<BlendShape> {
        shapes
            .iter()
            .map(|shape| BlendShape {
                name: shape.name.clone(),
                frames: shape.frames.iter().map(|f| self.remap_frame(f)).collect(),
            })
            .collect()
    }
}
