//! Main application module: wires a sample source to a stream session.

use crate::{
    channel::{sample_channel, SampleProducer},
    config::Config,
    error::Result,
    session::StreamSession,
    source::{LineSource, SampleSource, SweepSource},
    transport::{Connector, WebSocketConnector},
    utils::{frame_interval, safe_cast::usize_to_f64},
};
use log::{info, warn};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

/// Where samples come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Live angles piped on stdin, consumed as fast as they arrive
    Stdin,
    /// Recorded angles replayed at the configured frame rate
    File(PathBuf),
    /// Synthetic sweep at the configured frame rate
    Simulated {
        /// Stop after this many frames
        frames: Option<u64>,
    },
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Endpoint, smoothing and source settings
    pub config: Config,
    /// Sample input
    pub input: InputSource,
}

/// Counters gathered over one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames read from the source
    pub frames: usize,
    /// Frames that carried at least one angle
    pub detections: usize,
    /// Detections the session accepted
    pub handed_off: usize,
    /// Frames written to the consumer
    pub frames_sent: usize,
}

impl RunSummary {
    /// Detections dropped because the session was busy
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.detections - self.handed_off
    }
}

/// Main application struct
pub struct StreamerApp<C: Connector = WebSocketConnector> {
    config: AppConfig,
    connector: Option<C>,
}

impl StreamerApp<WebSocketConnector> {
    /// Create an application streaming over WebSocket
    pub fn new(config: AppConfig) -> Result<Self> {
        Self::with_connector(config, WebSocketConnector::new())
    }
}

impl<C: Connector> StreamerApp<C> {
    /// Create an application using a custom connector
    pub fn with_connector(config: AppConfig, connector: C) -> Result<Self> {
        info!("Initializing pose streamer");
        config.config.validate()?;
        Ok(Self {
            config,
            connector: Some(connector),
        })
    }

    /// Run until the input ends or the session fails
    pub fn run(&mut self) -> Result<RunSummary> {
        let fps = self.config.config.source.fps;
        match self.config.input.clone() {
            InputSource::Stdin => {
                info!("Reading angles from stdin");
                let mut source = LineSource::new(BufReader::new(io::stdin()));
                self.run_with_source(&mut source, None)
            }
            InputSource::File(path) => {
                info!("Replaying angles from {} at {} fps", path.display(), fps);
                let file = File::open(&path)?;
                let mut source = LineSource::new(BufReader::new(file));
                self.run_with_source(&mut source, Some(frame_interval(fps)))
            }
            InputSource::Simulated { frames } => {
                info!("Simulating head sweep at {} fps", fps);
                let mut source = SweepSource::new(fps);
                if let Some(limit) = frames {
                    source = source.with_limit(limit);
                }
                self.run_with_source(&mut source, Some(frame_interval(fps)))
            }
        }
    }

    /// Stream every frame of `source`, optionally paced at `interval`
    pub fn run_with_source(
        &mut self,
        source: &mut dyn SampleSource,
        interval: Option<Duration>,
    ) -> Result<RunSummary> {
        let Some(connector) = self.connector.take() else {
            return Err(crate::Error::Session("Application already ran".to_string()));
        };

        let mut session = StreamSession::new(&self.config.config, connector)?;
        let (producer, consumer) = sample_channel();
        session.start(consumer)?;
        info!("Streaming {} samples to {}", source.name(), session.endpoint_url());

        let mut summary = pump(source, &producer, &session, interval)?;

        drop(producer);
        let outcome = session.shutdown();
        summary.frames_sent = session.frames_sent();
        info!(
            "Run finished: {} frames, {} detections, {} handed off, {} dropped, {} sent",
            summary.frames,
            summary.detections,
            summary.handed_off,
            summary.dropped(),
            summary.frames_sent
        );

        outcome.map(|()| summary)
    }
}

/// Feed frames into the channel until the source ends or the session stops
fn pump(
    source: &mut dyn SampleSource,
    producer: &SampleProducer,
    session: &StreamSession,
    interval: Option<Duration>,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();
    let mut next_frame = Instant::now();
    let mut last_report = Instant::now();
    let mut last_report_frames = 0;

    loop {
        if session.state().is_terminal() {
            warn!("Session is {}, no longer reading input", session.state());
            break;
        }
        let Some(angles) = source.next_frame()? else {
            info!("End of input reached");
            break;
        };

        summary.frames += 1;
        if !angles.is_empty() {
            summary.detections += 1;
            if producer.offer_detection(angles) {
                summary.handed_off += 1;
            }
        }

        // Report throughput once per second
        if last_report.elapsed() >= Duration::from_secs(1) {
            let fps = usize_to_f64(summary.frames - last_report_frames) / last_report.elapsed().as_secs_f64();
            info!(
                "{:.1} fps, {} sent, {} dropped",
                fps,
                session.frames_sent(),
                summary.dropped()
            );
            last_report = Instant::now();
            last_report_frames = summary.frames;
        }

        if let Some(interval) = interval {
            next_frame += interval;
            let now = Instant::now();
            if next_frame > now {
                thread::sleep(next_frame - now);
            } else {
                next_frame = now;
            }
        }
    }

    Ok(summary)
}
