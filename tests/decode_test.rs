mod common;

use cgmath::{Point3, Transform};

use crate::common::test_utils::{assert_point_near, empty_scene_glb, external_buffer_glb, tiny_glb};
use fuseview::assets::gltf;

#[test]
fn should_decode_a_binary_gltf_payload() {
    let bytes = tiny_glb("zona_cables", [0.0, 0.0, 0.0]);

    let payload = gltf::decode("bomb.glb", &bytes).expect("decode");

    assert_eq!(payload.meshes.len(), 1);
    let mesh = &payload.meshes[0];
    assert_eq!(mesh.name, "zona_cables");
    assert_eq!(mesh.positions.len(), 3);
    assert_eq!(mesh.indices, vec![0, 1, 2]);
    assert_eq!(mesh.base_color, [0.8, 0.2, 0.2, 1.0]);
    assert_eq!(mesh.material, Some(0));
    assert_eq!(mesh.triangle_count(), 1);
}

#[test]
fn should_compute_face_normals_when_the_model_ships_none() {
    let bytes = tiny_glb("zona_cables", [0.0, 0.0, 0.0]);

    let payload = gltf::decode("bomb.glb", &bytes).expect("decode");

    let mesh = &payload.meshes[0];
    assert_eq!(mesh.normals.len(), mesh.positions.len());
    // The triangle lies in the XY plane, wound towards +Z.
    for normal in &mesh.normals {
        assert_point_near(Point3::from(*normal), [0.0, 0.0, 1.0]);
    }
}

#[test]
fn should_bake_the_node_transform_into_mesh_placement() {
    let bytes = tiny_glb("zona_cables", [1.0, 2.0, 3.0]);

    let payload = gltf::decode("bomb.glb", &bytes).expect("decode");

    let mesh = &payload.meshes[0];
    assert_point_near(
        mesh.transform.transform_point(Point3::new(0.0, 0.0, 0.0)),
        [1.0, 2.0, 3.0],
    );
    let bounds = mesh.bounds();
    assert_point_near(bounds.min, [1.0, 2.0, 3.0]);
    assert_point_near(bounds.max, [2.0, 3.0, 3.0]);
}

#[test]
fn should_reject_garbage_bytes_as_a_decode_error() {
    let err = gltf::decode("bomb.glb", b"definitely not a model").unwrap_err();

    assert!(err.is_decode());
    assert!(err.to_string().contains("bomb.glb"));
}

#[test]
fn should_reject_a_model_with_external_buffers() {
    let err = gltf::decode("bomb.glb", &external_buffer_glb()).unwrap_err();

    assert!(err.is_decode());
    assert!(err.to_string().contains("geometry.bin"), "{err}");
}

#[test]
fn should_reject_a_model_without_any_triangle_mesh() {
    let err = gltf::decode("bomb.glb", &empty_scene_glb()).unwrap_err();

    assert!(err.is_decode());
    assert!(err.to_string().contains("no triangle meshes"), "{err}");
}
