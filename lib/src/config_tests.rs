use super::*;

#[test]
fn defaults_to_realtime_multiplier() {
    let config = RateConfig::builder().build().unwrap();
    assert_eq!(config.mode(), &SpeedMode::Multiplier { speed: 1.0 });
    assert_eq!(config.max_sleep(), None);
}

#[test]
fn builds_config_with_max_sleep() {
    let config = RateConfig::builder()
        .mode(SpeedMode::Throughput { bps: 8_000_000 })
        .max_sleep(NapDuration::from_millis(3))
        .build()
        .unwrap();

    assert_eq!(config.mode(), &SpeedMode::Throughput { bps: 8_000_000 });
    assert_eq!(config.max_sleep(), Some(NapDuration::from_millis(3)));
}

#[test]
fn rejects_non_positive_multiplier() {
    let res = RateConfig::new(SpeedMode::Multiplier { speed: 0.0 });
    assert!(matches!(res, Err(ReplayLibError::RateConfigBuild(_))));

    let res = RateConfig::new(SpeedMode::Multiplier { speed: f64::INFINITY });
    assert!(res.is_err());
}

#[test]
fn rejects_zero_throughput() {
    let res = RateConfig::new(SpeedMode::Throughput { bps: 0 });
    assert!(res.is_err());
}

#[test]
fn rejects_non_positive_packet_rate() {
    let res = RateConfig::new(SpeedMode::PacketRate {
        pps: -1.0,
        pps_multi: 0,
    });
    assert!(res.is_err());
}

#[test]
fn accepts_modes_without_values() {
    assert!(RateConfig::new(SpeedMode::OneAtATime).is_ok());
    assert!(RateConfig::new(SpeedMode::TopSpeed).is_ok());
}

#[test]
fn parses_packet_rate_json() {
    let config = RateConfig::from_json(
        r#"{"mode": "packet_rate", "pps": 500, "pps_multi": 10, "max_sleep_us": 2000}"#,
    )
    .unwrap();

    assert_eq!(
        config.mode(),
        &SpeedMode::PacketRate {
            pps: 500.0,
            pps_multi: 10
        }
    );
    assert_eq!(config.max_sleep(), Some(NapDuration::from_micros(2000)));
}

#[test]
fn parses_unit_mode_json() {
    let config = RateConfig::from_json(r#"{"mode": "one_at_a_time"}"#).unwrap();
    assert_eq!(config.mode(), &SpeedMode::OneAtATime);
    assert_eq!(config.max_sleep(), None);
}

#[test]
fn returns_error_for_unknown_mode() {
    let res = RateConfig::from_json(r#"{"mode": "warp", "speed": 9}"#);
    match res {
        Err(ReplayLibError::UnknownSpeedMode(name)) => assert_eq!(name, "warp"),
        other => panic!("expected unknown speed mode, got {other:?}"),
    }
}

#[test]
fn returns_error_for_non_string_mode() {
    let res = RateConfig::from_json(r#"{"mode": 3}"#);
    assert!(matches!(res, Err(ReplayLibError::UnknownSpeedMode(_))));
}

#[test]
fn returns_error_for_missing_mode() {
    let res = RateConfig::from_json(r#"{"speed": 2.0}"#);
    assert!(matches!(res, Err(ReplayLibError::InvalidRateConfig(_))));
}

#[test]
fn returns_error_for_invalid_json_values() {
    let res = RateConfig::from_json(r#"{"mode": "multiplier", "speed": 0}"#);
    assert!(matches!(res, Err(ReplayLibError::InvalidRateConfig(_))));

    let res = RateConfig::from_json(r#"{"mode": "throughput"}"#);
    assert!(matches!(res, Err(ReplayLibError::ConfigParse(_))));
}

#[test]
fn serializes_to_json() {
    let config = RateConfig::builder()
        .mode(SpeedMode::Multiplier { speed: 2.0 })
        .max_sleep(NapDuration::from_millis(1))
        .build()
        .unwrap();

    let json = serde_json::to_value(&config).unwrap();

    assert_eq!(json["mode"], "multiplier");
    assert_eq!(json["speed"], 2.0);
    assert_eq!(json["max_sleep_us"], 1000);
}

#[test]
fn displays_speed_modes() {
    assert_eq!(
        SpeedMode::Throughput { bps: 8_000_000 }.to_string(),
        "8.000 Mbps"
    );
    assert_eq!(
        SpeedMode::PacketRate {
            pps: 100.0,
            pps_multi: 4
        }
        .to_string(),
        "100 pps in bursts of 4"
    );
    assert_eq!(SpeedMode::TopSpeed.to_string(), "top speed");
}

#[test]
fn zero_max_sleep_means_no_ceiling() {
    let config = RateConfig::builder()
        .mode(SpeedMode::Multiplier { speed: 1.0 })
        .max_sleep(NapDuration::ZERO)
        .build()
        .unwrap();

    assert_eq!(config.max_sleep(), None);

    let config =
        RateConfig::from_json(r#"{"mode": "top_speed", "max_sleep_us": 0}"#)
            .unwrap();

    assert_eq!(config.max_sleep(), None);
}

#[test]
fn deserializing_validates_speed_values() {
    let res = serde_json::from_str::<RateConfig>(
        r#"{"mode": "packet_rate", "pps": -5.0}"#,
    );
    assert!(res.is_err());

    let config = serde_json::from_str::<RateConfig>(
        r#"{"mode": "throughput", "bps": 1000, "max_sleep_us": 250}"#,
    )
    .unwrap();
    assert_eq!(config.mode(), &SpeedMode::Throughput { bps: 1000 });
    assert_eq!(config.max_sleep(), Some(NapDuration::from_micros(250)));
}
