mod common;

use std::time::Duration;

use tokio::runtime::Runtime;

use crate::common::test_utils::{failing_reader, pending_reader, poll_outcome, slow_reader};
use fuseview::assets::loader::{LoadDriver, LoadOutcome};
use fuseview::assets::source::static_reader;

const LIMIT: Duration = Duration::from_secs(5);

#[test]
fn should_publish_fetched_bytes() {
    let runtime = Runtime::new().unwrap();
    let reader = static_reader(vec![1, 2, 3, 4]);
    let mut driver = LoadDriver::new();

    driver.begin(&runtime, &reader, "bomb.glb", LIMIT);
    assert!(driver.is_loading());

    match poll_outcome(&mut driver, "bomb.glb") {
        LoadOutcome::Ready => {}
        LoadOutcome::Failed(err) => panic!("unexpected failure: {err}"),
    }
    assert!(!driver.is_loading());
    assert_eq!(driver.bytes(), Some(&[1u8, 2, 3, 4][..]));
    assert_eq!(driver.slot().resource().unwrap().label(), "bomb.glb");
}

#[test]
fn should_report_a_fetch_failure_with_its_reason() {
    let runtime = Runtime::new().unwrap();
    let reader = failing_reader("file is gone");
    let mut driver = LoadDriver::new();

    driver.begin(&runtime, &reader, "bomb.glb", LIMIT);

    match poll_outcome(&mut driver, "bomb.glb") {
        LoadOutcome::Failed(err) => {
            let message = err.to_string();
            assert!(message.contains("bomb.glb"), "{message}");
            assert!(message.contains("file is gone"), "{message}");
            assert!(!err.is_decode());
        }
        LoadOutcome::Ready => panic!("expected the fetch to fail"),
    }
    assert!(driver.bytes().is_none());
}

#[test]
fn should_recover_when_retrying_after_a_failure() {
    let runtime = Runtime::new().unwrap();
    let mut driver = LoadDriver::new();

    let broken = failing_reader("disk on fire");
    driver.begin(&runtime, &broken, "bomb.glb", LIMIT);
    assert!(matches!(
        poll_outcome(&mut driver, "bomb.glb"),
        LoadOutcome::Failed(_)
    ));

    let fixed = static_reader(vec![9, 9]);
    driver.begin(&runtime, &fixed, "bomb.glb", LIMIT);
    assert!(matches!(
        poll_outcome(&mut driver, "bomb.glb"),
        LoadOutcome::Ready
    ));
    assert_eq!(driver.bytes(), Some(&[9u8, 9][..]));
}

#[test]
fn should_supersede_an_inflight_load() {
    let runtime = Runtime::new().unwrap();
    let mut driver = LoadDriver::new();

    let stuck = pending_reader();
    driver.begin(&runtime, &stuck, "bomb.glb", LIMIT);
    assert_eq!(driver.generation(), 1);

    let quick = static_reader(vec![7]);
    driver.begin(&runtime, &quick, "bomb.glb", LIMIT);
    assert_eq!(driver.generation(), 2);

    assert!(matches!(
        poll_outcome(&mut driver, "bomb.glb"),
        LoadOutcome::Ready
    ));
    assert_eq!(driver.bytes(), Some(&[7u8][..]));
    // Nothing further arrives from the superseded fetch.
    assert!(driver.poll("bomb.glb").is_none());
}

#[test]
fn should_release_the_payload_as_soon_as_a_reload_begins() {
    let runtime = Runtime::new().unwrap();
    let mut driver = LoadDriver::new();

    let first = static_reader(vec![1]);
    driver.begin(&runtime, &first, "bomb.glb", LIMIT);
    assert!(matches!(
        poll_outcome(&mut driver, "bomb.glb"),
        LoadOutcome::Ready
    ));
    assert!(driver.slot().is_live());

    let stuck = pending_reader();
    driver.begin(&runtime, &stuck, "bomb.glb", LIMIT);

    assert!(!driver.slot().is_live());
    assert!(driver.is_loading());
}

#[test]
fn should_time_out_a_stalled_fetch() {
    let runtime = Runtime::new().unwrap();
    let mut driver = LoadDriver::new();

    let stalled = slow_reader(vec![1], Duration::from_secs(30));
    driver.begin(&runtime, &stalled, "bomb.glb", Duration::from_millis(50));

    match poll_outcome(&mut driver, "bomb.glb") {
        LoadOutcome::Failed(err) => {
            assert!(err.to_string().contains("timed out"), "{err}");
        }
        LoadOutcome::Ready => panic!("a stalled fetch must not produce bytes"),
    }
    assert!(driver.bytes().is_none());
}

#[test]
fn should_wait_out_a_slow_fetch_inside_the_limit() {
    let runtime = Runtime::new().unwrap();
    let mut driver = LoadDriver::new();

    let slow = slow_reader(vec![3, 3], Duration::from_millis(30));
    driver.begin(&runtime, &slow, "bomb.glb", LIMIT);

    assert!(matches!(
        poll_outcome(&mut driver, "bomb.glb"),
        LoadOutcome::Ready
    ));
    assert_eq!(driver.bytes(), Some(&[3u8, 3][..]));
}
