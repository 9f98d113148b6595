#![allow(dead_code)]

use std::collections::HashMap;

use cgmath::{Matrix4, Point3, SquareMatrix};
use fuseview::assets::loader::{LoadDriver, LoadOutcome};
use fuseview::assets::source::{ModelReader, ReadFuture};
use fuseview::scene::mesh::MeshData;

pub const EPSILON: f32 = 1e-4;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn assert_point_near(actual: Point3<f32>, expected: [f32; 3]) {
    for axis in 0..3 {
        assert!(
            (actual[axis] - expected[axis]).abs() < EPSILON,
            "axis {axis} of {actual:?} is not near {expected:?}"
        );
    }
}

pub fn zone_map(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(zone, module)| (zone.to_string(), module.to_string()))
        .collect()
}

pub fn status_map(entries: &[(&str, bool)]) -> HashMap<String, bool> {
    entries
        .iter()
        .map(|(module, done)| (module.to_string(), *done))
        .collect()
}

/// Axis-aligned quad lying in a horizontal plane, two triangles, CCW from
/// above.
pub fn flat_quad(name: &str, center_x: f32, y: f32, half: f32) -> MeshData {
    MeshData {
        name: name.to_string(),
        positions: vec![
            [center_x - half, y, -half],
            [center_x - half, y, half],
            [center_x + half, y, half],
            [center_x + half, y, -half],
        ],
        normals: vec![[0.0, 1.0, 0.0]; 4],
        indices: vec![0, 1, 2, 0, 2, 3],
        transform: Matrix4::identity(),
        base_color: [0.5, 0.5, 0.5, 1.0],
        material: None,
    }
}

/// Eight corner points of a box, no triangles. Enough for bounds work.
pub fn corner_mesh(name: &str, center: [f32; 3], half: [f32; 3]) -> MeshData {
    let mut positions = Vec::with_capacity(8);
    for sx in [-1.0f32, 1.0] {
        for sy in [-1.0f32, 1.0] {
            for sz in [-1.0f32, 1.0] {
                positions.push([
                    center[0] + sx * half[0],
                    center[1] + sy * half[1],
                    center[2] + sz * half[2],
                ]);
            }
        }
    }
    MeshData {
        name: name.to_string(),
        positions,
        normals: vec![[0.0, 1.0, 0.0]; 8],
        indices: Vec::new(),
        transform: Matrix4::identity(),
        base_color: [0.5, 0.5, 0.5, 1.0],
        material: None,
    }
}

/// Builds a self-contained binary glTF with one triangle mesh: three
/// positions, three u16 indices, no normals, one material. The node carries
/// `translation` so decoding has a real transform to bake in.
pub fn tiny_glb(mesh_name: &str, translation: [f32; 3]) -> Vec<u8> {
    let mut bin = Vec::new();
    for position in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
        for component in position {
            bin.extend_from_slice(&component.to_le_bytes());
        }
    }
    for index in [0u16, 1, 2] {
        bin.extend_from_slice(&index.to_le_bytes());
    }
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let json = format!(
        concat!(
            r#"{{"asset":{{"version":"2.0"}},"scene":0,"scenes":[{{"nodes":[0]}}],"#,
            r#""nodes":[{{"mesh":0,"name":"{name}","translation":[{tx},{ty},{tz}]}}],"#,
            r#""meshes":[{{"primitives":[{{"attributes":{{"POSITION":0}},"indices":1,"material":0}}]}}],"#,
            r#""materials":[{{"pbrMetallicRoughness":{{"baseColorFactor":[0.8,0.2,0.2,1.0]}}}}],"#,
            r#""accessors":[{{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3","min":[0.0,0.0,0.0],"max":[1.0,1.0,0.0]}},"#,
            r#"{{"bufferView":1,"componentType":5123,"count":3,"type":"SCALAR"}}],"#,
            r#""bufferViews":[{{"buffer":0,"byteOffset":0,"byteLength":36}},{{"buffer":0,"byteOffset":36,"byteLength":6}}],"#,
            r#""buffers":[{{"byteLength":{len}}}]}}"#,
        ),
        name = mesh_name,
        tx = translation[0],
        ty = translation[1],
        tz = translation[2],
        len = bin.len(),
    );
    glb_from_chunks(json.into_bytes(), Some(bin))
}

/// Like [`tiny_glb`] but the buffer points at an external `.bin` file the
/// archive does not carry, which self-contained decoding must reject.
pub fn external_buffer_glb() -> Vec<u8> {
    let json = concat!(
        r#"{"asset":{"version":"2.0"},"scene":0,"scenes":[{"nodes":[0]}],"#,
        r#""nodes":[{"mesh":0,"name":"m"}],"#,
        r#""meshes":[{"primitives":[{"attributes":{"POSITION":0},"indices":1}]}],"#,
        r#""accessors":[{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3","min":[0.0,0.0,0.0],"max":[1.0,1.0,0.0]},"#,
        r#"{"bufferView":1,"componentType":5123,"count":3,"type":"SCALAR"}],"#,
        r#""bufferViews":[{"buffer":0,"byteOffset":0,"byteLength":36},{"buffer":0,"byteOffset":36,"byteLength":6}],"#,
        r#""buffers":[{"uri":"geometry.bin","byteLength":44}]}"#,
    );
    glb_from_chunks(json.as_bytes().to_vec(), None)
}

/// A structurally valid GLB whose scene holds a single empty node.
pub fn empty_scene_glb() -> Vec<u8> {
    let json = r#"{"asset":{"version":"2.0"},"scene":0,"scenes":[{"nodes":[0]}],"nodes":[{"name":"empty"}]}"#;
    glb_from_chunks(json.as_bytes().to_vec(), None)
}

fn glb_from_chunks(mut json: Vec<u8>, bin: Option<Vec<u8>>) -> Vec<u8> {
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let bin_chunk_len = bin.as_ref().map_or(0, |b| 8 + b.len());
    let total = 12 + 8 + json.len() + bin_chunk_len;

    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(&0x4654_6C67u32.to_le_bytes()); // "glTF"
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());
    glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
    glb.extend_from_slice(&0x4E4F_534Au32.to_le_bytes()); // "JSON"
    glb.extend_from_slice(&json);
    if let Some(bin) = bin {
        glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        glb.extend_from_slice(&0x004E_4942u32.to_le_bytes()); // "BIN\0"
        glb.extend_from_slice(&bin);
    }
    glb
}

pub fn failing_reader(message: &str) -> ModelReader {
    let message = message.to_string();
    Box::new(move |_asset| {
        let message = message.clone();
        Box::pin(async move { Err::<Vec<u8>, _>(anyhow::anyhow!(message)) }) as ReadFuture
    })
}

pub fn slow_reader(bytes: Vec<u8>, delay: std::time::Duration) -> ModelReader {
    Box::new(move |_asset| {
        let bytes = bytes.clone();
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            Ok(bytes)
        }) as ReadFuture
    })
}

/// A reader whose future never resolves. Exercises supersede and timeout.
pub fn pending_reader() -> ModelReader {
    Box::new(|_asset| Box::pin(std::future::pending::<anyhow::Result<Vec<u8>>>()) as ReadFuture)
}

/// Polls the driver until the in-flight load settles. Panics rather than
/// hanging a test run forever.
pub fn poll_outcome(driver: &mut LoadDriver, asset: &str) -> LoadOutcome {
    for _ in 0..400 {
        if let Some(outcome) = driver.poll(asset) {
            return outcome;
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    panic!("load of `{asset}` did not settle in time");
}
