mod common;

use std::time::Duration;

use tokio::runtime::Runtime;

use crate::common::test_utils::{pending_reader, poll_outcome, zone_map};
use fuseview::assets::loader::{LoadDriver, LoadOutcome};
use fuseview::assets::source::static_reader;
use fuseview::interaction::InteractionController;
use fuseview::scene::graph::SceneGraph;
use fuseview::MouseButton;

const LIMIT: Duration = Duration::from_secs(5);

#[test]
fn should_release_the_payload_exactly_once_on_unmount() {
    let runtime = Runtime::new().unwrap();
    let mut driver = LoadDriver::new();

    let reader = static_reader(vec![1, 2]);
    driver.begin(&runtime, &reader, "bomb.glb", LIMIT);
    assert!(matches!(
        poll_outcome(&mut driver, "bomb.glb"),
        LoadOutcome::Ready
    ));

    assert!(driver.unmount());
    assert!(!driver.slot().is_live());
    // The second unmount has nothing left to release.
    assert!(!driver.unmount());
}

#[test]
fn should_cancel_an_inflight_load_on_unmount() {
    let runtime = Runtime::new().unwrap();
    let mut driver = LoadDriver::new();

    let stuck = pending_reader();
    driver.begin(&runtime, &stuck, "bomb.glb", LIMIT);
    assert!(driver.is_loading());

    // Nothing was published yet, so there is no payload to release.
    assert!(!driver.unmount());

    assert!(!driver.is_loading());
    assert!(driver.poll("bomb.glb").is_none());
}

#[test]
fn should_dispose_a_scene_without_gpu_residency() {
    let mut scene = SceneGraph::placeholder(&zone_map(&[]));
    assert!(!scene.is_uploaded());

    scene.dispose();
    scene.dispose();

    assert!(!scene.is_uploaded());
    // The CPU side stays usable for a later rebuild.
    assert_eq!(scene.meshes().len(), 1);
}

#[test]
fn should_detach_input_during_teardown() {
    let mut input = InteractionController::new(0.01);
    input.on_button(MouseButton::Right, true);
    assert!(input.is_rotating());

    input.detach();

    assert!(!input.is_attached());
    assert!(!input.is_rotating());
}
