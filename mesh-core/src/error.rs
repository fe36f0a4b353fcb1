//! Error types for mesh operations

use thiserror::Error;

/// Errors returned by mesh validation and transforms
///
/// All errors are raised before any output mesh is built, so a failed call
/// never yields a partial result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// The mesh or the requested selection is not usable
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),

    /// A populated per-vertex stream does not match the vertex count
    #[error("attribute stream '{stream}' has {len} entries, expected 0 or {expected}")]
    InconsistentAttributeLength {
        stream: String,
        len: usize,
        expected: usize,
    },
}

/// Details of an [`MeshError::InvalidArgument`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidArgument {
    #[error("sub-mesh index {index} out of range (mesh has {count} sub-meshes)")]
    SubMeshOutOfRange { index: usize, count: usize },

    #[error("triangle index {index} at position {position} exceeds vertex count {vertex_count}")]
    TriangleIndexOutOfRange {
        position: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("sub-mesh {sub_mesh} range {start}..{start}+{count} exceeds {len} triangle indices")]
    SubMeshRangeOutOfBounds {
        sub_mesh: usize,
        start: usize,
        count: usize,
        len: usize,
    },

    #[error("sub-meshes {first} and {second} share triangle indices")]
    OverlappingSubMeshes { first: usize, second: usize },

    #[error("index count {count} is not a multiple of 3{}", sub_mesh_suffix(.sub_mesh))]
    MalformedIndexCount { sub_mesh: Option<usize>, count: usize },
}

fn sub_mesh_suffix(sub_mesh: &Option<usize>) -> String {
    match sub_mesh {
        Some(index) => format!(" (sub-mesh {})", index),
        None => String::new(),
    }
}

/// Coarse error category, independent of the detailed variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    InconsistentAttributeLength,
}

impl MeshError {
    /// Get the coarse category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            MeshError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            MeshError::InconsistentAttributeLength { .. } => ErrorKind::InconsistentAttributeLength,
        }
    }

    pub(crate) fn stream_length(stream: impl Into<String>, len: usize, expected: usize) -> Self {
        MeshError::InconsistentAttributeLength {
            stream: stream.into(),
            len,
            expected,
        }
    }
}
