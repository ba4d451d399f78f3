use mockall::predicate::eq;
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use super::*;

use crate::{
    config::{RateConfig, SpeedMode},
    error::ReplayLibError,
    packet::mocks::{MockPacketSender, MockSource},
    sleep::MockSleeper,
    timing::MockClock,
    trace::{TimestampTrace, TraceCollector},
};

fn packet(ts_us: u64, len: usize) -> CapturedPacket {
    CapturedPacket::new(Timestamp::from_micros(ts_us), vec![0u8; len])
}

fn source(packets: Vec<CapturedPacket>) -> MockSource {
    let mut queue = VecDeque::from(packets);
    let mut source = MockSource::new();
    source
        .expect_next_packet()
        .returning(move || Ok(queue.pop_front()));
    source
}

fn accepting_sender() -> Wire {
    let mut sender = MockPacketSender::new();
    sender.expect_send().returning(|_| Ok(()));
    Arc::new(Mutex::new(sender))
}

fn replayer(mode: SpeedMode, sleeper: MockSleeper, wire: Wire) -> Replayer {
    let config = RateConfig::new(mode).unwrap();
    Replayer::new(RateController::new(config, Box::new(sleeper)), wire)
}

#[test]
fn replays_capture_at_captured_pace() {
    let mut sleeper = MockSleeper::new();
    sleeper
        .expect_sleep_for()
        .with(eq(Duration::from_millis(1)))
        .times(1)
        .returning(|_| Ok(()));
    sleeper
        .expect_sleep_for()
        .with(eq(Duration::from_millis(2)))
        .times(1)
        .returning(|_| Ok(()));

    let mut replayer = replayer(
        SpeedMode::Multiplier { speed: 1.0 },
        sleeper,
        accepting_sender(),
    );
    let mut state = replayer.begin_session();
    let mut progress = ThroughputProgress::default();
    let mut capture =
        source(vec![packet(0, 60), packet(1000, 100), packet(3000, 40)]);

    let processed = replayer
        .replay(&mut capture, &mut state, &mut progress)
        .unwrap();

    assert_eq!(processed, 3);
    assert_eq!(progress.packets_sent, 3);
    assert_eq!(progress.bytes_sent, 200);
    assert_eq!(progress.failed, 0);
}

#[test]
fn top_speed_never_paces() {
    let mut sleeper = MockSleeper::new();
    sleeper.expect_sleep_for().times(0);

    let mut replayer =
        replayer(SpeedMode::TopSpeed, sleeper, accepting_sender());
    let mut state = replayer.begin_session();
    let mut progress = ThroughputProgress::default();
    let mut capture = source(vec![packet(0, 60), packet(5_000_000, 60)]);

    replayer
        .replay(&mut capture, &mut state, &mut progress)
        .unwrap();

    assert_eq!(progress.packets_sent, 2);
}

#[test]
fn sends_unpaced_while_catching_up() {
    let mut sleeper = MockSleeper::new();
    sleeper.expect_sleep_for().times(0);

    let mut clock = MockClock::new();
    clock.expect_now_us().return_const(10_000_000u64);

    let collector = Arc::new(Mutex::new(TraceCollector::default()));
    let trace: Arc<Mutex<dyn TimestampTrace>> = collector.clone();

    let config =
        RateConfig::new(SpeedMode::Throughput { bps: 8_000_000 }).unwrap();
    let controller = RateController::new(config, Box::new(sleeper))
        .with_clock(Box::new(clock))
        .with_trace(trace);

    let mut replayer = Replayer::new(controller, accepting_sender());
    let mut state = PacingState::with_start_time(0);
    let mut progress = ThroughputProgress::default();
    let mut capture = source(vec![
        packet(0, 1000),
        packet(0, 1000),
        packet(0, 1000),
        packet(0, 1000),
    ]);

    replayer
        .replay(&mut capture, &mut state, &mut progress)
        .unwrap();

    // only the first packet was paced, it left skip advice for the rest
    assert_eq!(collector.lock().unwrap().entries().len(), 1);
    assert_eq!(progress.packets_sent, 4);
}

#[test]
fn counts_failed_sends_and_continues() {
    let mut sleeper = MockSleeper::new();
    sleeper.expect_sleep_for().returning(|_| Ok(()));

    let mut sender = MockPacketSender::new();
    sender
        .expect_send()
        .withf(|p| p.len() == 99)
        .returning(|_| Err(ReplayLibError::Wire("no buffer space".into())));
    sender.expect_send().returning(|_| Ok(()));

    let mut replayer = replayer(
        SpeedMode::Multiplier { speed: 1.0 },
        sleeper,
        Arc::new(Mutex::new(sender)),
    );
    let mut state = replayer.begin_session();
    let mut progress = ThroughputProgress::default();
    let mut capture =
        source(vec![packet(0, 60), packet(10, 99), packet(20, 60)]);

    let processed = replayer
        .replay(&mut capture, &mut state, &mut progress)
        .unwrap();

    assert_eq!(processed, 3);
    assert_eq!(progress.packets_sent, 2);
    assert_eq!(progress.bytes_sent, 120);
    assert_eq!(progress.failed, 1);
}

#[test]
fn stops_at_packet_limit() {
    let mut sleeper = MockSleeper::new();
    sleeper.expect_sleep_for().times(0);

    let mut replayer =
        replayer(SpeedMode::TopSpeed, sleeper, accepting_sender())
            .with_limit(2);
    let mut state = replayer.begin_session();
    let mut progress = ThroughputProgress::default();
    let mut capture = source(vec![
        packet(0, 60),
        packet(0, 60),
        packet(0, 60),
        packet(0, 60),
    ]);

    let processed = replayer
        .replay(&mut capture, &mut state, &mut progress)
        .unwrap();

    assert_eq!(processed, 2);
    assert!(replayer.limit_reached(&progress));
}

#[test]
fn restarts_timing_for_each_capture() {
    let mut sleeper = MockSleeper::new();
    sleeper.expect_sleep_for().times(0);

    let mut replayer = replayer(
        SpeedMode::Multiplier { speed: 1.0 },
        sleeper,
        accepting_sender(),
    );
    let mut state = replayer.begin_session();
    let mut progress = ThroughputProgress::default();

    let mut first = source(vec![packet(0, 60)]);
    let mut second = source(vec![packet(9_000_000, 60)]);

    replayer.replay(&mut first, &mut state, &mut progress).unwrap();
    replayer
        .replay(&mut second, &mut state, &mut progress)
        .unwrap();

    assert_eq!(progress.packets_sent, 2);
}

#[test]
fn propagates_source_errors() {
    let mut sleeper = MockSleeper::new();
    sleeper.expect_sleep_for().times(0);

    let mut capture = MockSource::new();
    capture.expect_next_packet().returning(|| {
        Err(ReplayLibError::PacketSource("truncated record".into()))
    });

    let mut replayer = replayer(
        SpeedMode::Multiplier { speed: 1.0 },
        sleeper,
        accepting_sender(),
    );
    let mut state = replayer.begin_session();
    let mut progress = ThroughputProgress::default();

    let res = replayer.replay(&mut capture, &mut state, &mut progress);

    assert!(matches!(res, Err(ReplayLibError::PacketSource(_))));
}

#[test]
fn summarizes_session() {
    let progress = ThroughputProgress {
        bytes_sent: 1_250_000,
        packets_sent: 1000,
        failed: 3,
    };

    let stats = ReplayStats::new(&progress, Duration::from_secs(2));

    assert_eq!(stats.packets_sent, 1000);
    assert_eq!(stats.failed, 3);
    assert_eq!(stats.elapsed_us, 2_000_000);
    assert_eq!(stats.pps, 500.0);
    assert_eq!(stats.mbps, 5.0);
}

#[test]
fn summarizes_empty_session_without_dividing_by_zero() {
    let stats = ReplayStats::new(&ThroughputProgress::default(), Duration::ZERO);
    assert_eq!(stats.pps, 0.0);
    assert_eq!(stats.mbps, 0.0);
}
