//! meshcarve library
//!
//! File-level plumbing around `meshcarve-core`: mesh documents, glTF import,
//! batch manifests and the transforms the `meshcarve` binary exposes.

pub mod document;
pub mod import;
pub mod manifest;
pub mod ops;

pub use document::{load_mesh, write_mesh, MESH_EXT};
pub use import::{import_gltf, MeshSelector};
pub use ops::{Settings, Transform};
