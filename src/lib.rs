//! Orientation streaming library for head-pose driven control.
//!
//! An external detector reports one yaw angle per camera frame. This crate
//! turns that noisy stream into a steady control signal and forwards it to a
//! remote consumer over a persistent WebSocket connection:
//!
//! 1. The detector callback offers each angle to a rendezvous channel. The
//!    offer never blocks; if the sender is busy the angle is dropped.
//! 2. A dedicated session worker takes angles, averages the last eight and
//!    scales the mean into an integer position.
//! 3. Each position is written as a `{"type":"update","x":<x>,"y":0}` text frame.
//!
//! # Examples
//!
//! ## Smoothing
//!
//! ```
//! use pose_streamer::smoothing::SmoothingWindow;
//!
//! let mut window = SmoothingWindow::default();
//! window.append(1.0);
//! window.append(-3.0);
//! assert_eq!(window.mean(), -1.0);
//! assert_eq!(window.scaled_int(), -50);
//! ```
//!
//! ## Streaming
//!
//! ```no_run
//! use pose_streamer::{
//!     channel::sample_channel, config::Config, session::StreamSession,
//!     transport::WebSocketConnector,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let mut session = StreamSession::new(&config, WebSocketConnector::new())?;
//! let (producer, consumer) = sample_channel();
//! session.start(consumer)?;
//!
//! // Called from the detector's completion callback
//! producer.offer(-12.5);
//!
//! session.shutdown()?;
//! # Ok(())
//! # }
//! ```

/// Non-blocking sample handoff between detector and session
pub mod channel;

/// Sliding-window smoothing of orientation samples
pub mod smoothing;

/// Update message encoding and decoding
pub mod codec;

/// Connection lifecycle and send loop
pub mod session;

/// Network transports used by the session
pub mod transport;

/// Consumer side: decodes updates and applies them to a sink
pub mod receiver;

/// Detector stand-ins feeding the channel
pub mod source;

/// Utility functions for casting and timing
pub mod utils;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
