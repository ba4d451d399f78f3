use super::*;

#[test]
fn skips_nothing_on_schedule() {
    assert_eq!(skip_bytes(1000, 1000, 8_000_000), 0);
}

#[test]
fn saturates_when_ahead_of_schedule() {
    assert_eq!(skip_bytes(10, 5_000, 8_000_000), 0);
}

#[test]
fn skips_one_second_of_bytes_when_a_second_behind() {
    assert_eq!(skip_bytes(2_000_000, 1_000_000, 8_000_000), 1_000_000);
}

#[test]
fn does_not_overflow_for_large_rates() {
    let bytes = skip_bytes(u64::MAX, 0, 100_000_000_000);
    assert_eq!(bytes, u64::MAX);
}

#[test]
fn schedules_bytes_against_target_rate() {
    // 1000 bytes at 8 Mbps take one millisecond
    assert_eq!(next_tx_us(1000, 8_000_000), 1000);
    assert_eq!(next_tx_us(0, 8_000_000), 0);
    assert_eq!(next_tx_us(1000, 0), 0);
}
