use color_eyre::eyre::Result;
use std::time::Instant;

use r_replaylib::{
    config::{RateConfig, SpeedMode},
    pacing::{RateController, ThroughputProgress},
    sleep::{self, SleepMethod},
    timing::{PacketTiming, Timestamp},
};

fn main() -> Result<()> {
    color_eyre::install()?;

    let config = RateConfig::new(SpeedMode::PacketRate {
        pps: 200.0,
        pps_multi: 4,
    })?;
    let sleeper = sleep::new(SleepMethod::Nanosleep)?;
    let mut controller = RateController::new(config, sleeper);
    let mut state = controller.begin_session();
    let mut progress = ThroughputProgress::default();

    let start = Instant::now();

    for i in 0..40u64 {
        let timing = PacketTiming::new(Timestamp::from_micros(i), None);
        let pacing = controller.compute_and_apply_delay(
            &timing,
            64,
            &progress,
            &mut state,
        )?;

        progress.packets_sent += 1;
        progress.bytes_sent += 64;

        println!(
            "packet {:>2} at {:>8.3}ms slept {}",
            i + 1,
            start.elapsed().as_secs_f64() * 1000.0,
            pacing.nap
        );
    }

    println!("sent 40 packets in {:?}", start.elapsed());

    Ok(())
}
