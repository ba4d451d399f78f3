use super::*;

#[test]
fn starts_idle() {
    let mut accel = Accelerator::new();
    assert!(!accel.try_consume());
    assert_eq!(accel.remaining(), 0);
}

#[test]
fn drains_armed_count() {
    let mut accel = Accelerator::new();
    accel.arm(3);

    assert!(accel.try_consume());
    assert!(accel.try_consume());
    assert_eq!(accel.remaining(), 1);
    assert!(accel.try_consume());
    assert!(!accel.try_consume());
    assert_eq!(accel.remaining(), 0);
}

#[test]
fn rearming_replaces_pending_count() {
    let mut accel = Accelerator::new();
    accel.arm(10);
    accel.arm(2);
    assert_eq!(accel.remaining(), 2);
}
