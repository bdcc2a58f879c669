//! Stand-ins for the external detector that feed the sample channel.
//!
//! Each call to [`SampleSource::next_frame`] represents one camera frame: the
//! returned vector holds the orientation values detected in that frame and
//! is empty when nothing was detected.

use std::io::BufRead;

use log::warn;

use crate::constants::{SIMULATED_SWEEP_AMPLITUDE, SIMULATED_SWEEP_PERIOD_SECS};
use crate::{Error, Result};

/// Producer of per-frame detection results
pub trait SampleSource {
    /// Detections for the next frame, or `None` once the source is exhausted
    fn next_frame(&mut self) -> Result<Option<Vec<f64>>>;

    /// Get source name
    fn name(&self) -> &str;
}

/// Reads one frame per line
///
/// A line holds zero or more angles separated by whitespace or commas. Blank
/// lines are frames without a detection. Lines that do not parse are logged
/// and treated as empty frames.
pub struct LineSource<R> {
    reader: R,
    line: String,
    line_number: usize,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> SampleSource for LineSource<R> {
    fn next_frame(&mut self) -> Result<Option<Vec<f64>>> {
        self.line.clear();
        let read = self
            .reader
            .read_line(&mut self.line)
            .map_err(|e| Error::IoError(format!("Failed to read samples: {e}")))?;
        if read == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        match parse_angles(&self.line) {
            Ok(angles) => Ok(Some(angles)),
            Err(e) => {
                warn!("Ignoring line {}: {}", self.line_number, e);
                Ok(Some(Vec::new()))
            }
        }
    }

    fn name(&self) -> &str {
        "lines"
    }
}

/// Parse the angles of one frame
///
/// # Errors
///
/// Returns an invalid input error for tokens that are not finite numbers.
pub fn parse_angles(line: &str) -> Result<Vec<f64>> {
    line.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| Error::InvalidInput(format!("Not a finite angle: {token}")))
        })
        .collect()
}

/// Synthetic head sweeping left and right with a little tremor
#[derive(Debug, Clone)]
pub struct SweepSource {
    fps: u32,
    frame: u64,
    limit: Option<u64>,
}

impl SweepSource {
    /// Endless sweep sampled at `fps`
    pub fn new(fps: u32) -> Self {
        Self {
            fps: fps.max(1),
            frame: 0,
            limit: None,
        }
    }

    /// Stop after `frames` frames
    #[must_use]
    pub const fn with_limit(mut self, frames: u64) -> Self {
        self.limit = Some(frames);
        self
    }

    /// Yaw angle at a given time in seconds
    #[must_use]
    pub fn angle_at(seconds: f64) -> f64 {
        let phase = std::f64::consts::TAU * seconds / SIMULATED_SWEEP_PERIOD_SECS;
        let tremor = 0.8 * (phase * 23.0).sin();
        SIMULATED_SWEEP_AMPLITUDE * phase.sin() + tremor
    }
}

impl SampleSource for SweepSource {
    #[allow(clippy::cast_precision_loss)] // Frame counts stay far below 2^52
    fn next_frame(&mut self) -> Result<Option<Vec<f64>>> {
        if self.limit.is_some_and(|limit| self.frame >= limit) {
            return Ok(None);
        }
        let seconds = self.frame as f64 / f64::from(self.fps);
        self.frame += 1;
        Ok(Some(vec![Self::angle_at(seconds)]))
    }

    fn name(&self) -> &str {
        "sweep"
    }
}
