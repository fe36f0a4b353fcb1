//! Test asset generation
//!
//! Writes small glTF (+ .bin) files and mesh documents into a scratch
//! directory.

#![allow(dead_code)]

use bytemuck::Pod;
use glam::Vec3;
use meshcarve_core::{BlendShape, BlendShapeFrame, BoneWeight, Mesh};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

const FLOAT: u32 = 5126;
const UNSIGNED_SHORT: u32 = 5123;
const UNSIGNED_INT: u32 = 5125;

/// Number of joints in the fixture skin
pub const BONE_COUNT: usize = 2;

/// Accumulates binary data with matching buffer views and accessors
#[derive(Default)]
struct BufferBuilder {
    bin: Vec<u8>,
    views: Vec<Value>,
    accessors: Vec<Value>,
}

impl BufferBuilder {
    /// Append `data` and return the index of its accessor
    fn push<T: Pod>(&mut self, data: &[T], component_type: u32, kind: &str, count: usize) -> usize {
        while self.bin.len() % 4 != 0 {
            self.bin.push(0);
        }
        let bytes: &[u8] = bytemuck::cast_slice(data);
        self.views.push(json!({
            "buffer": 0,
            "byteOffset": self.bin.len(),
            "byteLength": bytes.len(),
        }));
        self.bin.extend_from_slice(bytes);

        self.accessors.push(json!({
            "bufferView": self.views.len() - 1,
            "componentType": component_type,
            "count": count,
            "type": kind,
        }));
        self.accessors.len() - 1
    }

    /// Append VEC3 positions with the min/max glTF requires
    fn push_positions(&mut self, positions: &[[f32; 3]]) -> usize {
        let index = self.push(positions, FLOAT, "VEC3", positions.len());
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for p in positions {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        self.accessors[index]["min"] = json!(min);
        self.accessors[index]["max"] = json!(max);
        index
    }
}

/// Write `<dir>/character.gltf` and its `.bin`
///
/// Mesh 0 "Body" is skinned to a two-joint skin and has two primitives:
/// - a quad (4 vertices, 2 triangles) with normals, UVs, joints and weights
/// - a triangle at y = 2 with positions only
///
/// Both carry the morph target "Smile". Mesh 1 "Hat" is a single unindexed
/// triangle on an unskinned node.
pub fn write_character_gltf(dir: &Path) -> PathBuf {
    let mut buffer = BufferBuilder::default();

    let quad_positions = buffer.push_positions(&[
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
    ]);
    let quad_normals = buffer.push(&[[0.0f32, 0.0, 1.0]; 4], FLOAT, "VEC3", 4);
    let quad_uvs = buffer.push(
        &[[0.0f32, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        FLOAT,
        "VEC2",
        4,
    );
    let quad_joints = buffer.push(&[[0u16, 1, 0, 0]; 4], UNSIGNED_SHORT, "VEC4", 4);
    let quad_weights = buffer.push(&[[0.5f32, 0.5, 0.0, 0.0]; 4], FLOAT, "VEC4", 4);
    let quad_indices = buffer.push(&[0u32, 1, 2, 0, 2, 3], UNSIGNED_INT, "SCALAR", 6);
    let quad_smile = buffer.push_positions(&[[0.0, 0.0, 0.1]; 4]);

    let tri_positions = buffer.push_positions(&[[0.0, 2.0, 0.0], [1.0, 2.0, 0.0], [0.0, 3.0, 0.0]]);
    let tri_indices = buffer.push(&[0u32, 1, 2], UNSIGNED_INT, "SCALAR", 3);
    let tri_smile = buffer.push_positions(&[[0.0, 0.5, 0.0]; 3]);

    let hat_positions = buffer.push_positions(&[[0.0, 4.0, 0.0], [1.0, 4.0, 0.0], [0.0, 5.0, 0.0]]);

    #[rustfmt::skip]
    let inverse_bind_matrices: [[f32; 16]; BONE_COUNT] = [
        [1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0],
        [1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, -1.0, 0.0, 1.0],
    ];
    let ibm = buffer.push(&inverse_bind_matrices, FLOAT, "MAT4", BONE_COUNT);

    let bin_path = dir.join("character.bin");
    std::fs::write(&bin_path, &buffer.bin).expect("Failed to write .bin");

    let document = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0, 1, 3] }],
        "nodes": [
            { "name": "body", "mesh": 0, "skin": 0 },
            { "name": "root", "children": [2] },
            { "name": "spine", "translation": [0.0, 1.0, 0.0] },
            { "name": "hat", "mesh": 1 },
        ],
        "skins": [{ "joints": [1, 2], "inverseBindMatrices": ibm }],
        "meshes": [
            {
                "name": "Body",
                "extras": { "targetNames": ["Smile"] },
                "primitives": [
                    {
                        "attributes": {
                            "POSITION": quad_positions,
                            "NORMAL": quad_normals,
                            "TEXCOORD_0": quad_uvs,
                            "JOINTS_0": quad_joints,
                            "WEIGHTS_0": quad_weights,
                        },
                        "indices": quad_indices,
                        "targets": [{ "POSITION": quad_smile }],
                    },
                    {
                        "attributes": { "POSITION": tri_positions },
                        "indices": tri_indices,
                        "targets": [{ "POSITION": tri_smile }],
                    },
                ],
            },
            {
                "name": "Hat",
                "primitives": [{ "attributes": { "POSITION": hat_positions } }],
            },
        ],
        "accessors": buffer.accessors,
        "bufferViews": buffer.views,
        "buffers": [{ "byteLength": buffer.bin.len(), "uri": "character.bin" }],
    });

    let gltf_path = dir.join("character.gltf");
    std::fs::write(
        &gltf_path,
        serde_json::to_string_pretty(&document).expect("Failed to serialize glTF"),
    )
    .expect("Failed to write .gltf");
    gltf_path
}

/// Three sub-meshes sharing border vertices, with bone weights and a blend shape
///
/// ```text
/// sub-mesh 0: [0, 1, 2]
/// sub-mesh 1: [2, 3, 4]
/// sub-mesh 2: [4, 5, 6, 6, 5, 7]
/// ```
pub fn body_mesh() -> Mesh {
    let vertices: Vec<Vec3> = (0..8).map(|i| Vec3::new(i as f32, (i % 2) as f32, 0.0)).collect();
    let mut mesh = Mesh::new(vertices)
        .with_sub_mesh(&[0, 1, 2])
        .with_sub_mesh(&[2, 3, 4])
        .with_sub_mesh(&[4, 5, 6, 6, 5, 7]);
    mesh.normals = vec![Vec3::Z; 8];
    mesh.bone_weights = (0..8).map(|i| BoneWeight::single(i % 2)).collect();
    mesh.blend_shapes = vec![
        BlendShape::new("wave")
            .with_frame(BlendShapeFrame::new(100.0, (0..8).map(|i| Vec3::Y * i as f32).collect())),
        BlendShape::new("noop").with_frame(BlendShapeFrame::new(100.0, vec![Vec3::ZERO; 8])),
    ];
    mesh.recalculate_bounds();
    mesh
}

/// Write [`body_mesh`] as `<dir>/body.mesh.json`
pub fn write_body_document(dir: &Path) -> PathBuf {
    let path = dir.join("body.mesh.json");
    let json = serde_json::to_string(&body_mesh()).expect("Failed to serialize mesh");
    std::fs::write(&path, json).expect("Failed to write mesh document");
    path
}

/// Read a mesh document back
pub fn read_document(path: &Path) -> Mesh {
    let json = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {:?}: {}", path, e));
    serde_json::from_str(&json).expect("Failed to parse mesh document")
}
