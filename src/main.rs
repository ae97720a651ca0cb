//! HomeLink: headless poller for the climate and shading boards.
//!
//! ```text
//! homelink [--config <path>] [--simulate] [--cycles <n>]
//!          [--set-temp <c>] [--set-position <pct>] [--auto]
//! homelink --list-ports
//! ```
//!
//! Opens a session per enabled board, applies the one-shot commands given
//! on the command line, then polls each board on its configured interval
//! and logs every snapshot.  `RUST_LOG` overrides the default `info` level.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  SerialTransport / SimulatedBoard   HostDelay   LogEventSink│
//! │  ─────────────────── Port trait boundary ─────────────────  │
//! │        ClimateSession            ShadingSession             │
//! │                 └──────── Poller ────────┘                  │
//! └──────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{info, warn};

use homelink::adapters::log_sink::LogEventSink;
use homelink::adapters::serial::{SerialTransport, available_ports};
use homelink::adapters::sim::{BoardKind, SimulatedBoard};
use homelink::adapters::time::{HostClock, HostDelay};
use homelink::app::ports::DeviceSession;
use homelink::config::{LinkConfig, PortConfig};
use homelink::device::{ClimateSession, ShadingSession};
use homelink::link::transport::Transport;
use homelink::poller::Poller;

// ── Command line ──────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "homelink", version, about, long_about = None)]
struct Options {
    /// JSON configuration file; defaults are used when omitted
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Poll in-process simulated boards instead of serial ports
    #[arg(long)]
    simulate: bool,

    /// Stop after this many poll cycles
    #[arg(long, value_name = "N")]
    cycles: Option<u64>,

    /// Desired climate temperature in degrees Celsius
    #[arg(long, value_name = "CELSIUS", allow_negative_numbers = true)]
    set_temp: Option<f32>,

    /// Shading position in percent (0-100)
    #[arg(long, value_name = "PERCENT", conflicts_with = "auto")]
    set_position: Option<f32>,

    /// Switch the shading board to automatic mode
    #[arg(long)]
    auto: bool,

    /// Print the serial ports found on this host and exit
    #[arg(long)]
    list_ports: bool,
}

// ── Entry point ───────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = Options::parse();

    if opts.list_ports {
        for port in available_ports() {
            println!("{port}");
        }
        return Ok(());
    }

    let config = match &opts.config {
        Some(path) => {
            LinkConfig::load(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => LinkConfig::default(),
    };
    info!(
        "HomeLink {} starting ({})",
        env!("CARGO_PKG_VERSION"),
        if opts.simulate { "simulated boards" } else { "serial" }
    );

    if opts.simulate {
        run(
            &config,
            &opts,
            |line| simulated(BoardKind::Climate, line),
            |line| simulated(BoardKind::Shading, line),
        )
    } else {
        run(&config, &opts, serial, serial)
    }
}

fn serial(line: &PortConfig) -> SerialTransport<HostDelay> {
    SerialTransport::new(&line.port, line.baud_rate, line.read_timing(), HostDelay)
}

fn simulated(kind: BoardKind, line: &PortConfig) -> SimulatedBoard {
    let mut board = SimulatedBoard::new(kind);
    board.configure(&format!("sim:{}", line.port), line.baud_rate);
    board
}

// ── Session wiring ────────────────────────────────────────────

fn run<C, S>(
    config: &LinkConfig,
    opts: &Options,
    climate_line: impl FnOnce(&PortConfig) -> C,
    shading_line: impl FnOnce(&PortConfig) -> S,
) -> Result<()>
where
    C: Transport + 'static,
    S: Transport + 'static,
{
    let mut poller = Poller::new();

    if config.climate.line.enabled {
        let mut climate = ClimateSession::new(
            climate_line(&config.climate.line),
            HostDelay,
            LogEventSink::new(),
            config.climate.timing(),
        );
        if climate.open().is_ok() {
            if let Some(celsius) = opts.set_temp {
                if let Err(e) = climate.set_desired_temperature(celsius) {
                    warn!("set-temp {celsius} not applied: {e}");
                }
            }
        }
        poller.add(
            Box::new(climate),
            Duration::from_millis(config.climate.line.poll_interval_ms.into()),
        );
    } else if opts.set_temp.is_some() {
        warn!("--set-temp ignored: climate board disabled");
    }

    if config.shading.line.enabled {
        let mut shading = ShadingSession::new(
            shading_line(&config.shading.line),
            HostDelay,
            LogEventSink::new(),
            config.shading.timing(),
        );
        if shading.open().is_ok() {
            if let Some(percent) = opts.set_position {
                if let Err(e) = shading.set_position(percent) {
                    warn!("set-position {percent} not applied: {e}");
                }
            }
            if opts.auto {
                if let Err(e) = shading.set_auto_mode() {
                    warn!("auto mode not applied: {e}");
                }
            }
        }
        poller.add(
            Box::new(shading),
            Duration::from_millis(config.shading.line.poll_interval_ms.into()),
        );
    } else if opts.set_position.is_some() || opts.auto {
        warn!("shading command ignored: shading board disabled");
    }

    if poller.is_empty() {
        bail!("no board enabled in configuration");
    }

    poll_loop(&mut poller, opts.cycles);
    poller.close_all();
    info!("HomeLink stopped");
    Ok(())
}

/// Tick until `cycles` ticks have updated at least one session, or forever.
fn poll_loop(poller: &mut Poller, cycles: Option<u64>) {
    let clock = HostClock::new();
    let mut done = 0u64;

    loop {
        if poller.tick(clock.uptime_ms()) > 0 {
            done += 1;
            if cycles.is_some_and(|n| done >= n) {
                break;
            }
        }
        let wait = poller
            .until_next_due(clock.uptime_ms())
            .unwrap_or(Duration::from_millis(100));
        std::thread::sleep(wait);
    }
}
