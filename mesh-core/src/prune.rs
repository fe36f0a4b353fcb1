//! Blend-shape pruning
//!
//! Character exports often carry dozens of morph targets that do nothing on a
//! given part (a shoe mesh with every facial expression). Pruning drops the
//! frames whose summed position delta is negligible.

use serde::{Deserialize, Serialize};

use crate::error::MeshError;
use crate::mesh::{BlendShape, Mesh};

/// Default magnitude a frame's summed delta must exceed to be kept
pub const DEFAULT_PRUNE_THRESHOLD: f32 = 0.1;

/// Options for [`prune_blend_shapes`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PruneOptions {
    /// A frame survives when `|sum(delta_vertices)| > threshold`
    pub threshold: f32,
}

impl Default for PruneOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_PRUNE_THRESHOLD,
        }
    }
}

/// Drop blend-shape frames whose summed position delta is within the threshold
///
/// The sum is a vector sum, so opposing deltas cancel. Shapes left without
/// frames are removed. Geometry and sub-meshes are copied unchanged.
pub fn prune_blend_shapes(mesh: &Mesh, options: &PruneOptions) -> Result<Mesh, MeshError> {
    mesh.validate()?;

    let mut dropped = 0;
    let blend_shapes: Vec<BlendShape> = mesh
        .blend_shapes
        .iter()
        .filter_map(|shape| {
            let frames: Vec<_> = shape
                .frames
                .iter()
                .filter(|frame| frame.delta_sum().length() > options.threshold)
                .cloned()
                .collect();
            dropped += shape.frames.len() - frames.len();
            (!frames.is_empty()).then(|| BlendShape {
                name: shape.name.clone(),
                frames,
            })
        })
        .collect();

    tracing::debug!(
        "Pruned {} blend-shape frames: {} -> {} shapes",
        dropped,
        mesh.blend_shape_count(),
        blend_shapes.len()
    );

    Ok(Mesh {
        blend_shapes,
        ..mesh.clone()
    })
}
