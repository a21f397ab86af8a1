use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use vmc_osc::{Assistant, AvailableStates, VmcConfig};

mod driver;
use driver::{Mode, PoseDriver};

#[derive(Parser, Debug, Clone)]
#[command(name = "vmc-driver")]
#[command(author, version, about = "Streams test poses to a VMC receiver over OSC")]
struct Args {
    /// JSON config file (host, port, name, delta_offset, precision)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Receiver host; overrides the config file
    #[arg(long)]
    host: Option<String>,

    /// Receiver port; overrides the config file
    #[arg(long)]
    port: Option<u16>,

    /// Client name used in logs; overrides the config file
    #[arg(long)]
    name: Option<String>,

    /// Mode: "tpose" or "sweep"
    #[arg(long, default_value = "tpose")]
    mode: String,

    /// Frames per second
    #[arg(long, default_value = "30")]
    fps: u32,

    /// Stop after this many frames (0 runs until Ctrl-C)
    #[arg(long, default_value = "0")]
    frames: u64,
}

fn init_tracing() {
    // Route `log` records from dependencies into tracing.
    let _ = tracing_log::LogTracer::init();
    let filter = EnvFilter::from_default_env()
        .add_directive("vmc_osc=info".parse().unwrap_or_default())
        .add_directive("vmc_driver=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

fn load_config(args: &Args) -> anyhow::Result<VmcConfig> {
    let mut cfg = match args.config.as_ref() {
        Some(path) => VmcConfig::load(path)?,
        None => VmcConfig::default(),
    };
    if let Some(host) = args.host.clone() {
        cfg.host = host;
    }
    if let Some(port) = args.port {
        cfg.port = port;
    }
    if let Some(name) = args.name.clone() {
        cfg.name = name;
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let cfg = load_config(&args)?;
    let mode: Mode = args.mode.parse()?;
    info!("VMC driver starting. mode={:?}, destination={}, fps={}, frames={}",
          mode, cfg.destination(), args.fps, args.frames);

    let vmc = Assistant::from_config(&cfg)?;
    let mut pose = PoseDriver::new(vmc, mode, &cfg);

    let result = run(&mut pose, args.fps, args.frames).await;
    if let Err(e) = &result {
        error!("Driver error: {:?}", e);
    }

    // Tell the receiver we are going away before the socket closes.
    let unloaded = AvailableStates::Minimal { loaded: 0 };
    if let Err(e) = pose.assistant_mut().send_available_states(unloaded) {
        warn!("Failed to send unloaded state: {:?}", e);
    }
    pose.close()?;
    info!("Main finished. Goodbye!");
    result
}

async fn run(pose: &mut PoseDriver, fps: u32, frames: u64) -> anyhow::Result<()> {
    let period = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
    let mut ticker = time::interval(period);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                pose.step()?;
                if frames != 0 && pose.frames_sent() >= frames {
                    info!("Sent {} frames; stopping.", pose.frames_sent());
                    break;
                }
            }
            res = &mut ctrl_c => {
                if let Err(e) = res {
                    error!("Failed to listen for Ctrl-C: {:?}", e);
                }
                info!("Ctrl-C detected; stopping after {} frames.", pose.frames_sent());
                break;
            }
        }
    }
    Ok(())
}
