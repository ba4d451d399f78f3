use color_eyre::eyre::{Result, eyre};
use std::{env, time::Instant};

use r_replaylib::{
    config::{RateConfig, SpeedMode},
    network,
    pacing::{RateController, ThroughputProgress},
    packet::{CapturedPacket, PacketSource},
    replay::{ReplayStats, Replayer},
    sleep::{self, SleepMethod},
    timing::Timestamp,
    wire,
};

/// Generates broadcast frames with an empty payload
struct Generated {
    remaining: u64,
}

impl PacketSource for Generated {
    fn next_packet(
        &mut self,
    ) -> r_replaylib::error::Result<Option<CapturedPacket>> {
        if self.remaining == 0 {
            return Ok(None);
        }

        self.remaining -= 1;

        let mut frame = vec![0u8; 1000];
        frame[..6].copy_from_slice(&[0xff; 6]);
        frame[12..14].copy_from_slice(&[0x88, 0xb5]);

        Ok(Some(CapturedPacket::new(Timestamp::default(), frame)))
    }
}

fn is_root() -> bool {
    match env::var("USER") {
        Ok(val) => val == "root",
        Err(_e) => false,
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    if !is_root() {
        return Err(eyre!("permission denied: must run with root privileges"));
    }
    let interface = network::get_default_interface()?;
    let wire = wire::default(&interface)?;
    let config = RateConfig::new(SpeedMode::Throughput { bps: 1_000_000 })?;
    let sleeper = sleep::new(SleepMethod::AbsTime)?;

    let mut replayer =
        Replayer::new(RateController::new(config, sleeper), wire);
    let mut state = replayer.begin_session();
    let mut progress = ThroughputProgress::default();

    let start = Instant::now();

    replayer.replay(
        &mut Generated { remaining: 250 },
        &mut state,
        &mut progress,
    )?;

    let stats = ReplayStats::new(&progress, start.elapsed());

    println!("results: {:?}", stats);

    Ok(())
}
