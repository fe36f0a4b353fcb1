//! Mesh data model
//!
//! - [`Mesh`] - positions, optional per-vertex streams, triangles, sub-meshes
//!   and blend shapes
//! - [`Bounds`] - axis-aligned bounding box
//! - [`Mesh::validate`] - structural checks shared by every transform

mod bounds;
mod types;
mod validate;

pub use bounds::Bounds;
pub use types::{BlendShape, BlendShapeFrame, BoneWeight, Color, Mesh, SubMesh, UV_CHANNELS};
