//! CLI for replaying capture files onto a network interface
//!
//! Packets are sent in capture order, paced by a multiplier applied to the
//! captured timing, a fixed throughput or packet rate, an operator prompt, or
//! not at all.
//!
//! # Examples
//!
//! ```bash
//! # help menu
//! sudo r-replaycli --help
//!
//! # replay at the captured pace
//! sudo r-replaycli capture.pcap
//!
//! # replay at 10 Mbps, three times over
//! sudo r-replaycli --mbps 10 --loop 3 capture.pcap
//! ```
use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use log::*;
use r_replaylib::{
    config::{RateConfig, SpeedMode},
    error::{ReplayLibError, Result as LibResult},
    network::{self, NetworkInterface},
    pacing::{RateController, ThroughputProgress},
    packet::{CapturedPacket, PacketSource},
    prompt::LinePrompt,
    replay::{ReplayStats, Replayer},
    sleep::{self, SleepMethod},
    timing::{NapDuration, Timestamp},
    trace::TraceCollector,
    wire,
};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
/// CLI for replaying capture files onto a network interface
struct Args {
    /// Capture files to replay, in order
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Replay at the captured pace multiplied by this factor
    #[arg(short = 'x', long, group = "speed")]
    multiplier: Option<f64>,

    /// Replay at a fixed throughput in megabits per second
    #[arg(short = 'M', long, group = "speed")]
    mbps: Option<f64>,

    /// Replay at a fixed number of packets per second
    #[arg(short = 'p', long, group = "speed")]
    pps: Option<f64>,

    /// Send packets in bursts of this size at the --pps rate
    #[arg(long, default_value_t = 0, requires = "pps")]
    pps_multi: u32,

    /// Prompt before sending each packet
    #[arg(short = 'o', long, group = "speed")]
    oneatatime: bool,

    /// Replay as fast as possible
    #[arg(short = 't', long, group = "speed")]
    topspeed: bool,

    /// Read the speed mode from a JSON rate configuration file
    #[arg(long, group = "speed")]
    rate_config: Option<PathBuf>,

    /// Timing method used to wait between packets
    /// [nano, select, ioport, abstime, gtod]
    #[arg(long, default_value_t = SleepMethod::default())]
    timer: SleepMethod,

    /// Never sleep longer than this between packets, e.g. "500ms"
    #[arg(long, value_parser = humantime::parse_duration)]
    max_sleep: Option<Duration>,

    /// Number of times to replay the capture files, 0 loops forever
    #[arg(short = 'l', long = "loop", default_value_t = 1)]
    loops: u32,

    /// Stop after sending this many packets
    #[arg(short = 'L', long)]
    limit: Option<u64>,

    /// Choose a specific network interface to replay on
    #[arg(short, long)]
    interface: Option<String>,

    /// Write a JSON trace of throughput pacing decisions to this file
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Output final report in json instead of table text
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Only print final output nothing else
    #[arg(short, long, default_value_t = false)]
    quiet: bool,

    /// Prints debug logs including those from r-replaylib
    #[arg(long, default_value_t = false)]
    debug: bool,
}

#[doc(hidden)]
fn initialize_logger(args: &Args) -> Result<()> {
    let filter = if args.quiet {
        simplelog::LevelFilter::Error
    } else if args.debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    simplelog::TermLogger::init(
        filter,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

#[doc(hidden)]
fn print_args(args: &Args, interface: &str, config: &RateConfig) {
    info!("configuration:");
    info!("files:      {:?}", args.files);
    info!("speed:      {}", config.mode());
    info!(
        "max_sleep:  {}",
        config
            .max_sleep()
            .map(|m| humantime::format_duration(m.as_duration()).to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    info!("timer:      {}", args.timer);
    info!("loop:       {}", args.loops);
    info!(
        "limit:      {}",
        args.limit
            .map(|l| l.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    info!("interface:  {}", interface);
    info!("json:       {}", args.json);
    info!("quiet:      {}", args.quiet);
}

#[doc(hidden)]
fn speed_mode(args: &Args) -> SpeedMode {
    if let Some(speed) = args.multiplier {
        SpeedMode::Multiplier { speed }
    } else if let Some(mbps) = args.mbps {
        SpeedMode::Throughput {
            bps: (mbps * 1_000_000.0) as u64,
        }
    } else if let Some(pps) = args.pps {
        SpeedMode::PacketRate {
            pps,
            pps_multi: args.pps_multi,
        }
    } else if args.oneatatime {
        SpeedMode::OneAtATime
    } else if args.topspeed {
        SpeedMode::TopSpeed
    } else {
        SpeedMode::default()
    }
}

#[doc(hidden)]
fn resolve_rate_config(args: &Args) -> Result<RateConfig> {
    let from_file = match &args.rate_config {
        Some(path) => {
            let json = fs::read_to_string(path).map_err(|e| {
                eyre!("failed to read {}: {}", path.display(), e)
            })?;
            Some(RateConfig::from_json(&json)?)
        }
        None => None,
    };

    let mode = match &from_file {
        Some(config) => config.mode().clone(),
        None => speed_mode(args),
    };

    // --max-sleep wins over the file, 0s disables the ceiling
    let max_sleep = match args.max_sleep {
        Some(max) => Some(NapDuration::from(max)),
        None => from_file.and_then(|c| c.max_sleep()),
    };

    let config = RateConfig::builder()
        .mode(mode)
        .max_sleep(max_sleep)
        .build()
        .map_err(ReplayLibError::from)?;

    Ok(config)
}

/// Reads packets from a capture file on disk
#[doc(hidden)]
struct PcapSource {
    capture: pcap::Capture<pcap::Offline>,
}

impl PcapSource {
    fn open(path: &Path) -> LibResult<Self> {
        let capture = pcap::Capture::from_file(path).map_err(|e| {
            ReplayLibError::PacketSource(format!("{}: {}", path.display(), e))
        })?;

        Ok(Self { capture })
    }
}

impl PacketSource for PcapSource {
    fn next_packet(&mut self) -> LibResult<Option<CapturedPacket>> {
        match self.capture.next_packet() {
            Ok(packet) => {
                let ts = packet.header.ts;
                Ok(Some(CapturedPacket::new(
                    Timestamp::from_timeval(ts.tv_sec as i64, ts.tv_usec as i64),
                    packet.data.to_vec(),
                )))
            }
            Err(pcap::Error::NoMorePackets) => Ok(None),
            Err(e) => Err(ReplayLibError::PacketSource(e.to_string())),
        }
    }
}

#[doc(hidden)]
fn replay_files(args: &Args, replayer: &mut Replayer) -> Result<ReplayStats> {
    let mut state = replayer.begin_session();
    let mut progress = ThroughputProgress::default();
    let start = Instant::now();
    let mut iteration: u32 = 0;

    'session: loop {
        iteration += 1;

        for file in args.files.iter() {
            debug!("replaying {} (loop {})", file.display(), iteration);

            let mut source = PcapSource::open(file)?;
            let count =
                replayer.replay(&mut source, &mut state, &mut progress)?;

            debug!("replayed {} packets from {}", count, file.display());

            if replayer.limit_reached(&progress) {
                break 'session;
            }
        }

        if args.loops != 0 && iteration >= args.loops {
            break;
        }
    }

    if state.time_anomalies() > 0 {
        warn!(
            "{} packets were captured out of order and sent without delay",
            state.time_anomalies()
        );
    }

    Ok(ReplayStats::new(&progress, start.elapsed()))
}

#[doc(hidden)]
fn print_stats(args: &Args, stats: &ReplayStats) -> Result<()> {
    info!("replay results:");

    if args.json {
        let j: String = serde_json::to_string(stats)?;
        println!("{}", j);
    } else {
        let mut table = prettytable::Table::new();

        table.add_row(prettytable::row![
            "PACKETS", "BYTES", "FAILED", "ELAPSED", "PPS", "MBPS",
        ]);

        table.add_row(prettytable::row![
            stats.packets_sent,
            stats.bytes_sent,
            stats.failed,
            humantime::format_duration(Duration::from_micros(stats.elapsed_us)),
            format!("{:.2}", stats.pps),
            format!("{:.2}", stats.mbps),
        ]);

        table.printstd();
    }

    Ok(())
}

#[doc(hidden)]
fn write_trace(path: &Path, collector: &Mutex<TraceCollector>) -> Result<()> {
    let collector = collector
        .lock()
        .map_err(|e| ReplayLibError::TraceLock(e.to_string()))?;

    if collector.dropped() > 0 {
        warn!(
            "trace buffer full, {} entries were not recorded",
            collector.dropped()
        );
    }

    fs::write(path, collector.to_json()?)?;

    info!(
        "wrote {} trace entries to {}",
        collector.entries().len(),
        path.display()
    );

    Ok(())
}

#[doc(hidden)]
#[cfg(unix)]
fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

#[doc(hidden)]
#[cfg(not(unix))]
fn is_root() -> bool {
    true
}

#[doc(hidden)]
fn select_interface(args: &Args) -> Result<NetworkInterface> {
    let interface = match &args.interface {
        Some(name) => network::get_interface(name)?,
        None => network::get_default_interface()?,
    };

    Ok(interface)
}

#[doc(hidden)]
fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    initialize_logger(&args)?;

    let config = resolve_rate_config(&args)?;

    // unsupported or unprivileged timers fail here, before any packet is read
    let sleeper = sleep::new(args.timer)?;

    if !is_root() {
        return Err(eyre!("permission denied: must run with root privileges"));
    }

    let interface = select_interface(&args)?;

    print_args(&args, &interface.name, &config);

    let one_at_a_time = matches!(config.mode(), SpeedMode::OneAtATime);

    let mut controller = RateController::new(config, sleeper);

    if one_at_a_time {
        controller =
            controller.with_prompt(Box::new(LinePrompt::stdin(&interface.name)));
    }

    let collector = args
        .trace
        .as_ref()
        .map(|_| Arc::new(Mutex::new(TraceCollector::default())));

    if let Some(collector) = &collector {
        controller = controller.with_trace(collector.clone());
    }

    let mut replayer = Replayer::new(controller, wire::default(&interface)?);

    if let Some(limit) = args.limit {
        replayer = replayer.with_limit(limit);
    }

    let stats = replay_files(&args, &mut replayer)?;

    print_stats(&args, &stats)?;

    if let (Some(path), Some(collector)) = (&args.trace, &collector) {
        write_trace(path, collector)?;
    }

    Ok(())
}

#[cfg(test)]
#[path = "./main_tests.rs"]
mod tests;
