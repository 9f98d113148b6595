mod common;

use crate::common::test_utils::{flat_quad, status_map, zone_map};
use fuseview::assets::gltf::ModelPayload;
use fuseview::scene::graph::SceneGraph;
use fuseview::scene::materials::{ZONE_DONE_COLOR, ZONE_PENDING_COLOR};

/// The casing and both zones reference the same source material, the way an
/// exported model reuses one plastic material across the whole body.
fn scene_sharing_one_material() -> SceneGraph {
    let mut casing = flat_quad("casing", 0.0, 0.0, 3.0);
    let mut left = flat_quad("zona_left", -2.0, 0.0, 0.5);
    let mut right = flat_quad("zona_right", 2.0, 0.0, 0.5);
    casing.material = Some(0);
    left.material = Some(0);
    right.material = Some(0);

    SceneGraph::assemble(
        ModelPayload { meshes: vec![casing, left, right] },
        &zone_map(&[("zona_left", "biseccion"), ("zona_right", "newton")]),
    )
}

#[test]
fn should_share_one_slot_until_the_first_status_write() {
    let scene = scene_sharing_one_material();

    assert_eq!(scene.materials().len(), 1);
    assert_eq!(scene.materials().clone_count(), 0);
    for mesh in scene.meshes() {
        assert_eq!(mesh.material, 0);
        assert!(!mesh.owns_material);
    }
}

#[test]
fn should_clone_only_the_zone_that_gets_a_status() {
    let mut scene = scene_sharing_one_material();

    let dirty = scene.sync_module_colors(&status_map(&[("biseccion", true)]));

    assert_eq!(dirty.len(), 1);
    assert_eq!(scene.materials().clone_count(), 1);
    assert_eq!(scene.materials().len(), 2);

    let left = scene.zone_mesh("zona_left").unwrap();
    assert!(left.owns_material);
    assert_eq!(scene.materials().color(left.material), ZONE_DONE_COLOR);

    // The other zone and the casing still sit on the untouched shared slot.
    let right = scene.zone_mesh("zona_right").unwrap();
    assert!(!right.owns_material);
    assert_eq!(scene.materials().color(0), [0.5, 0.5, 0.5, 1.0]);
    assert!(!scene.meshes()[0].owns_material);
}

#[test]
fn should_color_zones_by_module_status() {
    let mut scene = scene_sharing_one_material();

    scene.sync_module_colors(&status_map(&[("biseccion", true), ("newton", false)]));

    let left = scene.zone_mesh("zona_left").unwrap();
    let right = scene.zone_mesh("zona_right").unwrap();
    assert_eq!(scene.materials().color(left.material), ZONE_DONE_COLOR);
    assert_eq!(scene.materials().color(right.material), ZONE_PENDING_COLOR);
    assert_eq!(scene.materials().clone_count(), 2);
}

#[test]
fn should_be_idempotent_for_a_repeated_status() {
    let mut scene = scene_sharing_one_material();
    let status = status_map(&[("biseccion", true), ("newton", false)]);

    scene.sync_module_colors(&status);
    let clones = scene.materials().clone_count();
    let dirty = scene.sync_module_colors(&status);

    assert!(dirty.is_empty());
    assert_eq!(scene.materials().clone_count(), clones);
}

#[test]
fn should_recolor_without_a_new_clone_when_status_flips() {
    let mut scene = scene_sharing_one_material();
    scene.sync_module_colors(&status_map(&[("newton", false)]));
    let clones = scene.materials().clone_count();

    let dirty = scene.sync_module_colors(&status_map(&[("newton", true)]));

    assert_eq!(dirty.len(), 1);
    assert_eq!(scene.materials().clone_count(), clones);
    let right = scene.zone_mesh("zona_right").unwrap();
    assert_eq!(scene.materials().color(right.material), ZONE_DONE_COLOR);
}

#[test]
fn should_ignore_modules_without_a_zone() {
    let mut scene = scene_sharing_one_material();

    let dirty = scene.sync_module_colors(&status_map(&[("gauss", true)]));

    assert!(dirty.is_empty());
    assert_eq!(scene.materials().clone_count(), 0);
}
