//! GLB decoding into [`MeshData`].
//!
//! Only self-contained binary glTF is accepted: the bomb model ships as a
//! single `.glb` with its geometry in the BIN chunk, so a buffer that points
//! at an external uri is a decode error rather than a file lookup. Node
//! transforms are baked down the tree so every mesh carries its full
//! model-space placement.

use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector3};
use gltf::{buffer, Gltf};

use crate::error::ViewerError;
use crate::scene::mesh::MeshData;

/// Everything the scene builder needs from a decoded model.
#[derive(Debug, Default)]
pub struct ModelPayload {
    pub meshes: Vec<MeshData>,
}

/// Parse a GLB byte payload. `name` only feeds error messages and logs.
pub fn decode(name: &str, bytes: &[u8]) -> Result<ModelPayload, ViewerError> {
    let model = Gltf::from_slice(bytes).map_err(|err| ViewerError::decode(name, err))?;

    let mut buffers: Vec<Vec<u8>> = Vec::new();
    for buffer in model.buffers() {
        match buffer.source() {
            buffer::Source::Bin => {
                let blob = model
                    .blob
                    .as_deref()
                    .ok_or_else(|| ViewerError::decode(name, "binary chunk missing from GLB"))?;
                buffers.push(blob.to_vec());
            }
            buffer::Source::Uri(uri) => {
                return Err(ViewerError::decode(
                    name,
                    format!("external buffer uri `{uri}` is not supported"),
                ));
            }
        }
    }

    let mut meshes = Vec::new();
    for scene in model.scenes() {
        for node in scene.nodes() {
            collect_meshes(node, Matrix4::identity(), &buffers, &mut meshes);
        }
    }

    if meshes.is_empty() {
        return Err(ViewerError::decode(name, "model contains no triangle meshes"));
    }
    log::debug!("decoded `{name}`: {} meshes", meshes.len());
    Ok(ModelPayload { meshes })
}

fn collect_meshes(
    node: gltf::Node<'_>,
    parent: Matrix4<f32>,
    buffers: &[Vec<u8>],
    meshes: &mut Vec<MeshData>,
) {
    let transform = parent * Matrix4::from(node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let name = node
            .name()
            .or_else(|| mesh.name())
            .map(str::to_owned)
            .unwrap_or_else(|| format!("mesh_{}", mesh.index()));

        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "skipping primitive of `{name}` with unsupported mode {:?}",
                    primitive.mode()
                );
                continue;
            }
            let reader =
                primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data[..]));

            let positions: Vec<[f32; 3]> = match reader.read_positions() {
                Some(iter) => iter.collect(),
                None => {
                    log::warn!("skipping primitive of `{name}` without positions");
                    continue;
                }
            };
            if positions.is_empty() {
                continue;
            }

            let indices: Vec<u32> = match reader.read_indices() {
                Some(raw) => raw.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };
            let normals: Vec<[f32; 3]> = match reader.read_normals() {
                Some(iter) => iter.collect(),
                None => face_normals(&positions, &indices),
            };

            let material = primitive.material();
            let base_color = material.pbr_metallic_roughness().base_color_factor();

            meshes.push(MeshData {
                name: name.clone(),
                positions,
                normals,
                indices,
                transform,
                base_color,
                material: material.index(),
            });
        }
    }

    for child in node.children() {
        collect_meshes(child, transform, buffers, meshes);
    }
}

/// Area-weighted vertex normals for primitives that ship without any.
fn face_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vector3::new(0.0f32, 0.0, 0.0); positions.len()];
    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let (Some(p0), Some(p1), Some(p2)) =
            (positions.get(i0), positions.get(i1), positions.get(i2))
        else {
            continue;
        };
        let a = Vector3::from(*p0);
        let b = Vector3::from(*p1);
        let c = Vector3::from(*p2);
        let face = (b - a).cross(c - a);
        acc[i0] += face;
        acc[i1] += face;
        acc[i2] += face;
    }
    acc.into_iter()
        .map(|n| {
            if n.magnitude2() > f32::EPSILON {
                n.normalize().into()
            } else {
                [0.0, 0.0, 1.0]
            }
        })
        .collect()
}
