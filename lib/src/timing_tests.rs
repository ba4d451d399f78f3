use super::*;

#[test]
fn builds_timestamp_from_timeval() {
    let ts = Timestamp::from_timeval(2, 500_000);
    assert_eq!(ts.as_duration(), Duration::from_millis(2500));
    assert_eq!(ts.to_string(), "2.500000");
}

#[test]
fn clamps_negative_timeval_components() {
    let ts = Timestamp::from_timeval(-1, -20);
    assert_eq!(ts, Timestamp::default());
}

#[test]
fn returns_none_when_earlier_timestamp_is_later() {
    let earlier = Timestamp::from_micros(10);
    let later = Timestamp::from_micros(20);

    assert_eq!(later.checked_since(earlier), Some(Duration::from_micros(10)));
    assert_eq!(earlier.checked_since(later), None);
}

#[test]
fn divides_nap_by_multiplier() {
    let nap = NapDuration::from_millis(1000);
    assert_eq!(nap.div_f64(2.0), NapDuration::from_millis(500));
    assert_eq!(nap.div_f64(0.5), NapDuration::from_millis(2000));
}

#[test]
fn divides_to_zero_for_invalid_factor() {
    let nap = NapDuration::from_millis(1000);
    assert!(nap.div_f64(0.0).is_zero());
    assert!(nap.div_f64(-3.0).is_zero());
    assert!(nap.div_f64(f64::NAN).is_zero());
}

#[test]
fn clamps_nap_above_ceiling() {
    let ceiling = NapDuration::from_millis(5);
    let nap = NapDuration::from_millis(50);
    assert_eq!(nap.clamp_to(Some(ceiling)), ceiling);
}

#[test]
fn leaves_nap_below_ceiling_unchanged() {
    let ceiling = NapDuration::from_millis(5);
    let nap = NapDuration::from_millis(2);
    assert_eq!(nap.clamp_to(Some(ceiling)), nap);
    assert_eq!(ceiling.clamp_to(Some(ceiling)), ceiling);
}

#[test]
fn leaves_nap_unchanged_without_ceiling() {
    let nap = NapDuration::from_millis(50_000);
    assert_eq!(nap.clamp_to(None), nap);
}

#[test]
fn formats_nap_as_seconds_and_nanos() {
    let nap = NapDuration::from_micros(1_000_250);
    assert_eq!(nap.to_string(), "1.000250000");
}

#[test]
fn monotonic_clock_never_goes_backwards() {
    let clock = MonotonicClock::new();
    let first = clock.now_us();
    std::thread::sleep(Duration::from_millis(2));
    let second = clock.now_us();
    assert!(second >= first + 1000);
}
