mod common;

use cgmath::{Deg, EuclideanSpace, Point3, Rad};

use crate::common::test_utils::{flat_quad, zone_map};
use fuseview::assets::gltf::ModelPayload;
use fuseview::camera::{Camera, Projection};
use fuseview::ray::Ray;
use fuseview::scene::graph::SceneGraph;
use fuseview::PhysicalPosition;

/// Two clickable zones on the back face plus an unmapped cover panel that sits
/// in front of the right one. The union spans exactly six units along X, so
/// normalization keeps the authored coordinates at scale one.
fn bomb_scene() -> SceneGraph {
    let payload = ModelPayload {
        meshes: vec![
            flat_quad("zona_left", -2.75, 0.0, 0.25),
            flat_quad("zona_right", 2.75, 0.0, 0.25),
            flat_quad("cover", 2.75, -0.5, 0.25),
        ],
    };
    SceneGraph::assemble(
        payload,
        &zone_map(&[("zona_left", "biseccion"), ("zona_right", "newton")]),
    )
}

fn ray_towards(target: [f32; 3]) -> Ray {
    let origin = Point3::new(0.0, 0.0, 9.0);
    Ray::new(origin, Point3::from(target) - origin)
}

#[test]
fn should_pick_the_zone_under_the_ray() {
    let scene = bomb_scene();

    let pick = scene
        .raycast(&ray_towards([2.6, 0.1, -0.25]))
        .expect("the right zone is on this ray");

    assert_eq!(pick.zone, "zona_right");
    assert_eq!(pick.module, "newton");
    let expected = (2.6f32 * 2.6 + 0.1 * 0.1 + 9.25 * 9.25).sqrt();
    assert!(
        (pick.distance - expected).abs() < 1e-3,
        "distance {} vs {}",
        pick.distance,
        expected
    );
}

#[test]
fn should_scan_past_unmapped_meshes_in_front_of_a_zone() {
    let scene = bomb_scene();

    // This ray goes through the cover panel first and only then reaches the
    // zone behind it. The cover must not steal the pick.
    let pick = scene
        .raycast(&ray_towards([2.8, 0.1, -0.25]))
        .expect("the zone behind the cover is on this ray");

    assert_eq!(pick.zone, "zona_right");
}

#[test]
fn should_miss_when_no_zone_is_on_the_ray() {
    let scene = bomb_scene();

    assert!(scene.raycast(&ray_towards([0.0, 0.1, -0.25])).is_none());
    assert!(scene.raycast(&ray_towards([0.0, 8.0, 9.5])).is_none());
}

#[test]
fn should_pick_in_the_rotated_frame() {
    let mut scene = bomb_scene();
    scene.pivot.yaw = Rad(std::f32::consts::PI);

    // Half a turn brings the right zone around to the left, facing away.
    let pick = scene
        .raycast(&ray_towards([-2.6, 0.1, 0.25]))
        .expect("the rotated zone is on this ray");
    assert_eq!(pick.zone, "zona_right");

    scene.pivot.reset();
    let pick = scene
        .raycast(&ray_towards([-2.6, 0.1, -0.25]))
        .expect("reset puts the left zone back");
    assert_eq!(pick.zone, "zona_left");
}

#[test]
fn should_cast_the_center_ray_down_the_view_axis() {
    let camera = Camera::new((0.0, 0.0, 9.0), (0.0, 0.0, 0.0));
    let projection = Projection::new(800, 600, Deg(45.0), 0.1, 100.0);

    let ray = camera.cast_ray_from_screen(PhysicalPosition::new(400.0, 300.0), 800, 600, &projection);

    assert!(ray.direction.x.abs() < 1e-4);
    assert!(ray.direction.y.abs() < 1e-4);
    assert!((ray.direction.z + 1.0).abs() < 1e-4);
    // The origin sits on the near plane, between the eye and the scene.
    assert!(ray.origin.z < 9.0 && ray.origin.z > 8.0);
}

#[test]
fn should_pick_a_zone_from_screen_coordinates() {
    let scene = bomb_scene();
    let camera = Camera::new((0.0, 0.0, 9.0), (0.0, 0.0, 0.0));
    let projection = Projection::new(800, 600, Deg(45.0), 0.1, 100.0);

    let screen = project_to_screen(Point3::new(-2.6, 0.1, -0.25), &camera, &projection, 800, 600);
    let ray = camera.cast_ray_from_screen(screen, 800, 600, &projection);

    let pick = scene.raycast(&ray).expect("the projected point unprojects onto the zone");
    assert_eq!(pick.zone, "zona_left");
    assert_eq!(pick.module, "biseccion");
}

fn project_to_screen(
    world: Point3<f32>,
    camera: &Camera,
    projection: &Projection,
    width: u32,
    height: u32,
) -> PhysicalPosition<f64> {
    let clip = (projection.matrix() * camera.view_matrix()) * world.to_homogeneous();
    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    PhysicalPosition::new(
        (ndc_x as f64 + 1.0) / 2.0 * width as f64,
        (1.0 - ndc_y as f64) / 2.0 * height as f64,
    )
}
