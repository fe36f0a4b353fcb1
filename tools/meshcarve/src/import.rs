//! glTF/GLB import
//!
//! Turns one glTF mesh into a [`Mesh`]:
//! - every primitive becomes a sub-mesh, vertex data concatenated in order
//! - morph targets become single-frame blend shapes (weight 100)
//! - JOINTS_0/WEIGHTS_0 become bone weights
//! - the inverse bind matrices of the skin used by the mesh's node become
//!   bind poses
//!
//! Streams present on only some primitives are padded so every stream spans
//! the whole mesh.

use anyhow::{bail, Context, Result};
use glam::{Mat4, Vec2, Vec3, Vec4};
use meshcarve_core::{BlendShape, BlendShapeFrame, BoneWeight, Color, Mesh, UV_CHANNELS};
use serde::Deserialize;
use std::convert::Infallible;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Frame weight given to imported morph targets
const TARGET_WEIGHT: f32 = 100.0;

/// Which mesh of a glTF document to import
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshSelector {
    Index(usize),
    Name(String),
}

impl From<&str> for MeshSelector {
    /// Numbers select by index, anything else by name
    fn from(s: &str) -> Self {
        match s.parse::<usize>() {
            Ok(index) => MeshSelector::Index(index),
            Err(_) => MeshSelector::Name(s.to_string()),
        }
    }
}

impl FromStr for MeshSelector {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(MeshSelector::from(s))
    }
}

impl fmt::Display for MeshSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshSelector::Index(index) => write!(f, "#{}", index),
            MeshSelector::Name(name) => write!(f, "'{}'", name),
        }
    }
}

/// Morph target names, stored by exporters in the mesh extras
#[derive(Debug, Default, Deserialize)]
struct MeshExtras {
    #[serde(default, rename = "targetNames")]
    target_names: Vec<String>,
}

/// Vertex data of one primitive, before merging
struct Primitive {
    positions: Vec<Vec3>,
    normals: Option<Vec<Vec3>>,
    tangents: Option<Vec<Vec4>>,
    uvs: [Option<Vec<Vec2>>; UV_CHANNELS],
    colors: Option<Vec<Color>>,
    bone_weights: Option<Vec<BoneWeight>>,
    indices: Vec<u32>,
    targets: Vec<MorphTarget>,
}

struct MorphTarget {
    positions: Option<Vec<Vec3>>,
    normals: Option<Vec<Vec3>>,
}

/// Import a mesh from a glTF/GLB file
///
/// Without a selector the first mesh in the document is used.
pub fn import_gltf(path: &Path, selector: Option<&MeshSelector>) -> Result<Mesh> {
    let (document, buffers, _images) =
        gltf::import(path).with_context(|| format!("Failed to load glTF: {:?}", path))?;

    let source = select_mesh(&document, selector)?;
    let source_name = source.name().unwrap_or("unnamed").to_string();

    let primitives = source
        .primitives()
        .enumerate()
        .map(|(i, primitive)| {
            read_primitive(&primitive, &buffers)
                .with_context(|| format!("Mesh '{}' primitive {}", source_name, i))
        })
        .collect::<Result<Vec<_>>>()?;
    if primitives.is_empty() {
        bail!("Mesh '{}' has no primitives", source_name);
    }

    let mut mesh = merge_primitives(&primitives, &target_names(&source));
    mesh.bind_poses = read_bind_poses(&document, &source, &buffers)?;
    mesh.recalculate_bounds();

    if !mesh.bone_weights.is_empty() && mesh.bind_poses.is_empty() {
        tracing::warn!(
            "Mesh '{}' has bone weights but no skinned node uses it, bind poses left empty",
            source_name
        );
    }

    mesh.validate()
        .with_context(|| format!("Imported mesh '{}' is inconsistent", source_name))?;

    tracing::info!(
        "Imported mesh '{}': {} vertices, {} triangles, {} sub-meshes, {} blend shapes, {} bones",
        source_name,
        mesh.vertex_count(),
        mesh.triangle_count(),
        mesh.sub_mesh_count(),
        mesh.blend_shape_count(),
        mesh.bind_poses.len()
    );

    Ok(mesh)
}

fn select_mesh<'a>(
    document: &'a gltf::Document,
    selector: Option<&MeshSelector>,
) -> Result<gltf::Mesh<'a>> {
    match selector {
        None => document.meshes().next().context("No meshes found in glTF"),
        Some(MeshSelector::Index(index)) => document
            .meshes()
            .nth(*index)
            .with_context(|| format!("Mesh index {} not found in glTF", index)),
        Some(MeshSelector::Name(name)) => document
            .meshes()
            .find(|m| m.name() == Some(name.as_str()))
            .with_context(|| format!("Mesh '{}' not found in glTF", name)),
    }
}

fn target_names(mesh: &gltf::Mesh) -> Vec<String> {
    mesh.extras()
        .as_ref()
        .and_then(|raw| serde_json::from_str::<MeshExtras>(raw.get()).ok())
        .unwrap_or_default()
        .target_names
}

fn read_primitive(primitive: &gltf::Primitive, buffers: &[gltf::buffer::Data]) -> Result<Primitive> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        bail!("Unsupported primitive mode {:?} (only triangle lists)", primitive.mode());
    }

    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    let positions: Vec<Vec3> = reader
        .read_positions()
        .context("No positions in primitive")?
        .map(Vec3::from)
        .collect();
    let count = positions.len();

    let normals = reader
        .read_normals()
        .map(|iter| iter.map(Vec3::from).collect::<Vec<_>>());
    let tangents = reader
        .read_tangents()
        .map(|iter| iter.map(Vec4::from).collect::<Vec<_>>());
    let uvs = std::array::from_fn(|set| {
        reader
            .read_tex_coords(set as u32)
            .map(|iter| iter.into_f32().map(Vec2::from).collect::<Vec<_>>())
    });
    let colors = reader.read_colors(0).map(|iter| {
        iter.into_rgba_f32()
            .map(|[r, g, b, a]| Color::new(r, g, b, a))
            .collect::<Vec<_>>()
    });

    let joints: Option<Vec<[u16; 4]>> = reader.read_joints(0).map(|iter| iter.into_u16().collect());
    let weights: Option<Vec<[f32; 4]>> =
        reader.read_weights(0).map(|iter| iter.into_f32().collect());
    let bone_weights = match (joints, weights) {
        (Some(joints), Some(weights)) => Some(
            joints
                .into_iter()
                .zip(weights)
                .map(|(j, w)| BoneWeight::new(j.map(u32::from), w))
                .collect::<Vec<_>>(),
        ),
        (Some(_), None) | (None, Some(_)) => {
            tracing::warn!(
                "Primitive has partial skinning data (joints or weights missing), ignoring skinning"
            );
            None
        }
        (None, None) => None,
    };

    let indices: Vec<u32> = match reader.read_indices() {
        Some(iter) => iter.into_u32().collect(),
        None => (0..count as u32).collect(),
    };
    if indices.len() % 3 != 0 {
        bail!("Index count {} is not a multiple of 3", indices.len());
    }
    if let Some((position, &index)) = indices
        .iter()
        .enumerate()
        .find(|&(_, &i)| i as usize >= count)
    {
        bail!(
            "Index {} at position {} exceeds vertex count {}",
            index,
            position,
            count
        );
    }

    // Morph target tangent deltas are not imported
    let targets = reader
        .read_morph_targets()
        .map(|(positions, normals, _tangents)| MorphTarget {
            positions: positions.map(|iter| iter.map(Vec3::from).collect()),
            normals: normals.map(|iter| iter.map(Vec3::from).collect()),
        })
        .collect::<Vec<_>>();

    let primitive = Primitive {
        positions,
        normals,
        tangents,
        uvs,
        colors,
        bone_weights,
        indices,
        targets,
    };
    check_lengths(&primitive)?;
    Ok(primitive)
}

/// Reject attribute accessors whose count differs from POSITION
fn check_lengths(primitive: &Primitive) -> Result<()> {
    let count = primitive.positions.len();
    let mut streams = vec![
        ("normals", primitive.normals.as_ref().map(Vec::len)),
        ("tangents", primitive.tangents.as_ref().map(Vec::len)),
        ("colors", primitive.colors.as_ref().map(Vec::len)),
        ("bone_weights", primitive.bone_weights.as_ref().map(Vec::len)),
    ];
    streams.extend(primitive.uvs.iter().map(|uv| ("uv", uv.as_ref().map(Vec::len))));
    for target in &primitive.targets {
        streams.push(("morph positions", target.positions.as_ref().map(Vec::len)));
        streams.push(("morph normals", target.normals.as_ref().map(Vec::len)));
    }

    for (name, len) in streams {
        if let Some(len) = len.filter(|&len| len != count) {
            bail!(
                "Attribute '{}' has {} entries, expected {}",
                name,
                len,
                count
            );
        }
    }
    Ok(())
}

/// Concatenate primitives into one mesh, one sub-mesh each
fn merge_primitives(primitives: &[Primitive], target_names: &[String]) -> Mesh {
    let mut mesh = Mesh::default();
    for primitive in primitives {
        let base = mesh.vertices.len() as u32;
        mesh.vertices.extend_from_slice(&primitive.positions);
        let indices: Vec<u32> = primitive.indices.iter().map(|&i| i + base).collect();
        mesh.push_sub_mesh(&indices);
    }

    mesh.normals = merge_stream("normals", primitives, |p| p.normals.as_deref(), Vec3::ZERO);
    mesh.tangents = merge_stream(
        "tangents",
        primitives,
        |p| p.tangents.as_deref(),
        Vec4::new(1.0, 0.0, 0.0, 1.0),
    );
    for channel in 0..UV_CHANNELS {
        mesh.uvs[channel] = merge_stream(
            &format!("uv{}", channel),
            primitives,
            |p| p.uvs[channel].as_deref(),
            Vec2::ZERO,
        );
    }
    mesh.colors = merge_stream(
        "colors",
        primitives,
        |p| p.colors.as_deref(),
        Color::new(1.0, 1.0, 1.0, 1.0),
    );
    mesh.bone_weights = merge_stream(
        "bone_weights",
        primitives,
        |p| p.bone_weights.as_deref(),
        BoneWeight::default(),
    );

    let target_count = primitives.iter().map(|p| p.targets.len()).max().unwrap_or(0);
    mesh.blend_shapes = (0..target_count)
        .map(|t| {
            let name = target_names
                .get(t)
                .cloned()
                .unwrap_or_else(|| format!("target{}", t));

            let mut delta_vertices = merge_stream(
                &format!("{} positions", name),
                primitives,
                |p| p.targets.get(t).and_then(|target| target.positions.as_deref()),
                Vec3::ZERO,
            );
            if delta_vertices.is_empty() {
                delta_vertices = vec![Vec3::ZERO; mesh.vertices.len()];
            }
            let delta_normals = merge_stream(
                &format!("{} normals", name),
                primitives,
                |p| p.targets.get(t).and_then(|target| target.normals.as_deref()),
                Vec3::ZERO,
            );

            BlendShape::new(name).with_frame(BlendShapeFrame {
                weight: TARGET_WEIGHT,
                delta_vertices,
                delta_normals,
                delta_tangents: Vec::new(),
            })
        })
        .collect();

    mesh
}

/// Concatenate one stream across primitives
///
/// Returns an empty stream when no primitive has it; pads primitives that lack
/// it with `fill` otherwise.
fn merge_stream<'a, T: Copy + 'a>(
    stream: &str,
    primitives: &'a [Primitive],
    get: impl Fn(&'a Primitive) -> Option<&'a [T]>,
    fill: T,
) -> Vec<T> {
    let missing = primitives.iter().filter(|&p| get(p).is_none()).count();
    if missing == primitives.len() {
        return Vec::new();
    }
    if missing > 0 {
        tracing::warn!(
            "Stream '{}' missing on {} of {} primitives, padding",
            stream,
            missing,
            primitives.len()
        );
    }

    let mut merged = Vec::new();
    for primitive in primitives {
        match get(primitive) {
            Some(data) => merged.extend_from_slice(data),
            None => merged.extend(std::iter::repeat_n(fill, primitive.positions.len())),
        }
    }
    merged
}

/// Inverse bind matrices of the skin attached to the node that uses `mesh`
fn read_bind_poses(
    document: &gltf::Document,
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
) -> Result<Vec<Mat4>> {
    let Some(skin) = document
        .nodes()
        .filter(|node| node.mesh().is_some_and(|m| m.index() == mesh.index()))
        .find_map(|node| node.skin())
    else {
        return Ok(Vec::new());
    };

    let joint_count = skin.joints().count();
    let reader = skin.reader(|buffer| Some(&buffers[buffer.index()]));
    let bind_poses: Vec<Mat4> = match reader.read_inverse_bind_matrices() {
        Some(iter) => iter.map(|m| Mat4::from_cols_array_2d(&m)).collect(),
        // glTF default when the accessor is omitted
        None => vec![Mat4::IDENTITY; joint_count],
    };

    if bind_poses.len() != joint_count {
        bail!(
            "Skin '{}' has {} joints but {} inverse bind matrices",
            skin.name().unwrap_or("unnamed"),
            joint_count,
            bind_poses.len()
        );
    }
    Ok(bind_poses)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primitive(count: usize, with_normals: bool) -> Primitive {
        Primitive {
            positions: vec![Vec3::ONE; count],
            normals: with_normals.then(|| vec![Vec3::Y; count]),
            tangents: None,
            uvs: Default::default(),
            colors: None,
            bone_weights: None,
            indices: (0..count as u32).collect(),
            targets: Vec::new(),
        }
    }

    #[test]
    fn test_selector_parse() {
        assert_eq!("2".parse::<MeshSelector>(), Ok(MeshSelector::Index(2)));
        assert_eq!(
            "Body".parse::<MeshSelector>(),
            Ok(MeshSelector::Name("Body".to_string()))
        );
    }

    #[test]
    fn test_merge_offsets_indices() {
        let mesh = merge_primitives(&[primitive(3, true), primitive(6, true)], &[]);

        assert_eq!(mesh.vertex_count(), 9);
        assert_eq!(mesh.sub_mesh_count(), 2);
        assert_eq!(mesh.sub_mesh_indices(1).unwrap(), &[3, 4, 5, 6, 7, 8]);
        assert_eq!(mesh.normals.len(), 9);
        assert!(mesh.tangents.is_empty());
    }

    #[test]
    fn test_merge_pads_partial_stream() {
        let mesh = merge_primitives(&[primitive(3, false), primitive(3, true)], &[]);

        assert_eq!(mesh.normals[..3], [Vec3::ZERO; 3]);
        assert_eq!(mesh.normals[3..], [Vec3::Y; 3]);
        assert_eq!(mesh.validate(), Ok(()));
    }

    #[test]
    fn test_merge_morph_targets() {
        let mut first = primitive(3, false);
        first.targets.push(MorphTarget {
            positions: Some(vec![Vec3::X; 3]),
            normals: None,
        });
        let mut second = primitive(3, false);
        second.targets.push(MorphTarget {
            positions: None,
            normals: None,
        });

        let mesh = merge_primitives(&[first, second], &["blink".to_string()]);

        assert_eq!(mesh.blend_shape_count(), 1);
        let shape = &mesh.blend_shapes[0];
        assert_eq!(shape.name, "blink");
        assert_eq!(shape.frames[0].weight, TARGET_WEIGHT);
        assert_eq!(shape.frames[0].delta_vertices[..3], [Vec3::X; 3]);
        assert_eq!(shape.frames[0].delta_vertices[3..], [Vec3::ZERO; 3]);
        assert!(shape.frames[0].delta_normals.is_empty());
    }

    #[test]
    fn test_unnamed_target() {
        let mut only = primitive(3, false);
        only.targets.push(MorphTarget {
            positions: None,
            normals: None,
        });
        let mesh = merge_primitives(&[only], &[]);
        assert_eq!(mesh.blend_shapes[0].name, "target0");
        assert_eq!(mesh.blend_shapes[0].frames[0].delta_vertices.len(), 3);
    }

    #[test]
    fn test_check_lengths() {
        let mut bad = primitive(3, true);
        bad.normals = Some(vec![Vec3::Y; 2]);
        let err = check_lengths(&bad).unwrap_err();
        assert!(err.to_string().contains("normals"));
    }
}
