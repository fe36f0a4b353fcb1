//! Sub-mesh surgery for skinned character meshes
//!
//! This crate operates on a plain in-memory [`Mesh`] (positions, up to eight UV
//! channels, normals, tangents, colors, bone weights, bind poses, sub-meshes and
//! blend shapes) and produces new, compacted meshes from it:
//!
//! - [`split`] - extract one sub-mesh, remove a set of sub-meshes, or both at once
//! - [`reverse`] - reverse triangle order within each sub-mesh
//! - [`prune`] - drop blend-shape frames with negligible deltas
//!
//! The source mesh is never modified. Every operation validates its input first
//! and either returns a fully built mesh or a [`MeshError`].
//!
//! # Example
//!
//! ```no_run
//! use meshcarve_core::{extract_sub_mesh, remove_sub_meshes, Mesh};
//!
//! # fn load() -> Mesh { Mesh::default() }
//! let body = load();
//! let hair = extract_sub_mesh(&body, 2)?;
//! let bald = remove_sub_meshes(&body, &[2])?;
//! # Ok::<(), meshcarve_core::MeshError>(())
//! ```

pub mod error;
pub mod mesh;
pub mod prune;
pub mod remap;
pub mod reverse;
pub mod split;

pub use error::{ErrorKind, InvalidArgument, MeshError};
pub use mesh::{BlendShape, BlendShapeFrame, BoneWeight, Bounds, Color, Mesh, SubMesh, UV_CHANNELS};
pub use prune::{prune_blend_shapes, PruneOptions, DEFAULT_PRUNE_THRESHOLD};
pub use remap::VertexRemap;
pub use reverse::reverse_triangle_order;
pub use split::{
    extract_sub_mesh, remove_sub_meshes, split_sub_meshes, BoundsMode, SplitOptions, SplitResult,
    SubMeshSplitter,
};
