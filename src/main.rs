//! Pose streamer: smooths head orientation samples and streams them to a remote consumer.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use pose_streamer::app::{AppConfig, InputSource, StreamerApp};
use pose_streamer::config::Config;
use pose_streamer::receiver::{LoggingSink, UpdateReceiver};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host of the remote consumer
    #[arg(long)]
    host: Option<String>,

    /// Port of the remote consumer
    #[arg(short, long)]
    port: Option<u16>,

    /// WebSocket request path
    #[arg(long)]
    path: Option<String>,

    /// Number of samples averaged
    #[arg(short, long)]
    window: Option<usize>,

    /// Factor applied to the mean angle
    #[arg(short, long)]
    scale: Option<f64>,

    /// Read angles from a file instead of stdin ("-" for stdin)
    #[arg(short, long)]
    input: Option<String>,

    /// Generate a synthetic head sweep instead of reading input
    #[arg(long, conflicts_with = "input")]
    simulate: bool,

    /// Stop the simulation after this many frames
    #[arg(long, requires = "simulate")]
    frames: Option<u64>,

    /// Frame rate for file replay and simulation
    #[arg(long)]
    fps: Option<u32>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Act as the consumer: accept updates on this address and log them
    #[arg(long, value_name = "ADDR", conflicts_with_all = ["input", "simulate"])]
    listen: Option<String>,
}

impl Args {
    /// Command line flags override the file
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.endpoint.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.endpoint.port = port;
        }
        if let Some(path) = &self.path {
            config.endpoint.path.clone_from(path);
        }
        if let Some(window) = self.window {
            config.smoothing.window_size = window;
        }
        if let Some(scale) = self.scale {
            config.smoothing.scale_factor = scale;
        }
        if let Some(fps) = self.fps {
            config.source.fps = fps;
        }
    }

    fn input_source(&self) -> InputSource {
        if self.simulate {
            return InputSource::Simulated { frames: self.frames };
        }
        match self.input.as_deref() {
            None | Some("-") => InputSource::Stdin,
            Some(path) => InputSource::File(PathBuf::from(path)),
        }
    }

    fn load_config(&self) -> Result<Config> {
        let mut config = if let Some(config_path) = &self.config {
            info!("Loading configuration from: {}", config_path);
            Config::from_file(config_path).with_context(|| format!("Failed to load {config_path}"))?
        } else {
            Config::default()
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Pose Streamer");

    if let Some(addr) = &args.listen {
        let receiver = UpdateReceiver::bind(addr.as_str())?;
        receiver.run(&mut LoggingSink::default())?;
        return Ok(());
    }

    let config = args.load_config()?;
    let input = args.input_source();

    // Create and run application
    let mut app = StreamerApp::new(AppConfig { config, input })?;
    let summary = app.run().context("Streaming session failed")?;
    info!("Sent {} frames", summary.frames_sent);

    Ok(())
}
