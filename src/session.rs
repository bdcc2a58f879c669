//! Stream session: one outbound connection plus the loop that feeds it.
//!
//! A session owns a dedicated worker thread. The worker connects through a
//! [`Connector`], then repeatedly takes a sample from the [`SampleConsumer`],
//! folds it into the [`SmoothingWindow`], encodes the control value and
//! writes one text frame. Any transport error ends the session for good;
//! there is no reconnect.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use log::{debug, error, info, warn};

use crate::channel::{ChannelCloser, SampleConsumer};
use crate::codec;
use crate::config::{Config, EndpointConfig};
use crate::constants::SESSION_THREAD_NAME;
use crate::smoothing::SmoothingWindow;
use crate::transport::{Connector, Transport};
use crate::{Error, Result};

/// Lifecycle of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Created, not started
    Disconnected,
    /// Worker is opening the connection
    Connecting,
    /// Handshake done, frames are flowing
    Streaming,
    /// Shut down on request
    Closed,
    /// Stopped by a transport error
    Failed(String),
}

impl SessionState {
    /// Whether the session can no longer stream
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Failed(_))
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Streaming => write!(f, "streaming"),
            Self::Closed => write!(f, "closed"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// State visible to both the owner and the worker
#[derive(Debug)]
struct Shared {
    state: Mutex<SessionState>,
    failure: Mutex<Option<Error>>,
    frames_sent: AtomicUsize,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, next: SessionState) -> bool {
        let mut state = self.lock();
        // Terminal states are final
        if state.is_terminal() {
            return false;
        }
        info!("Session {} -> {}", *state, next);
        *state = next;
        true
    }

    fn fail(&self, err: Error) {
        error!("Stream session failed: {}", err);
        let mut failure = self.failure.lock().unwrap_or_else(PoisonError::into_inner);
        if self.set(SessionState::Failed(err.to_string())) {
            *failure = Some(err);
        }
    }

    fn failure(&self) -> Option<Error> {
        self.failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Owner-side handle of a streaming session
pub struct StreamSession {
    endpoint: EndpointConfig,
    window: Option<SmoothingWindow>,
    connector: Option<Box<dyn Connector>>,
    shared: Arc<Shared>,
    closer: Option<ChannelCloser>,
    worker: Option<JoinHandle<()>>,
}

impl StreamSession {
    /// Create a session in the `Disconnected` state
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the smoothing settings are invalid.
    pub fn new<C: Connector>(config: &Config, connector: C) -> Result<Self> {
        let window = config.create_window()?;
        Ok(Self {
            endpoint: config.endpoint.clone(),
            window: Some(window),
            connector: Some(Box::new(connector)),
            shared: Arc::new(Shared {
                state: Mutex::new(SessionState::Disconnected),
                failure: Mutex::new(None),
                frames_sent: AtomicUsize::new(0),
            }),
            closer: None,
            worker: None,
        })
    }

    /// Spawn the worker that connects and streams samples from `consumer`
    ///
    /// # Errors
    ///
    /// Returns a session error if the session was already started or shut
    /// down, or if the worker thread cannot be spawned.
    pub fn start(&mut self, consumer: SampleConsumer) -> Result<()> {
        if self.state() != SessionState::Disconnected {
            return Err(Error::Session(format!("Cannot start a {} session", self.state())));
        }
        let (Some(connector), Some(window)) = (self.connector.take(), self.window.take()) else {
            return Err(Error::Session("Session can only be started once".to_string()));
        };

        self.closer = Some(consumer.closer());
        self.shared.set(SessionState::Connecting);

        let endpoint = self.endpoint.clone();
        let shared = Arc::clone(&self.shared);
        let worker = thread::Builder::new()
            .name(SESSION_THREAD_NAME.to_string())
            .spawn(move || run_worker(connector, &endpoint, window, &consumer, &shared))
            .map_err(|e| {
                let err = Error::Session(format!("Failed to spawn session worker: {e}"));
                self.shared.fail(err.clone());
                err
            })?;

        self.worker = Some(worker);
        Ok(())
    }

    /// Snapshot of the current state
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.shared.lock().clone()
    }

    /// Number of frames written so far
    #[must_use]
    pub fn frames_sent(&self) -> usize {
        self.shared.frames_sent.load(Ordering::Acquire)
    }

    /// Whether the worker has exited
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Endpoint this session streams to
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        self.endpoint.url()
    }

    /// Block until the worker exits on its own (after a failure or once every
    /// producer is gone) and report the outcome
    ///
    /// # Errors
    ///
    /// Returns the error that ended the session, if any.
    pub fn wait(&mut self) -> Result<()> {
        self.join_worker()?;
        self.outcome()
    }

    /// Close the channel, stop the worker and close the connection
    ///
    /// Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the session, if any.
    pub fn shutdown(&mut self) -> Result<()> {
        if let Some(closer) = &self.closer {
            closer.close();
        }
        self.join_worker()?;
        // Never started
        self.shared.set(SessionState::Closed);
        self.outcome()
    }

    fn join_worker(&mut self) -> Result<()> {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                let err = Error::Session("Session worker panicked".to_string());
                self.shared.fail(err.clone());
                return Err(err);
            }
        }
        Ok(())
    }

    fn outcome(&self) -> Result<()> {
        self.shared.failure().map_or(Ok(()), Err)
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        if self.worker.is_some() {
            if let Err(e) = self.shutdown() {
                debug!("Session dropped after failure: {}", e);
            }
        }
    }
}

fn run_worker(
    mut connector: Box<dyn Connector>,
    endpoint: &EndpointConfig,
    mut window: SmoothingWindow,
    consumer: &SampleConsumer,
    shared: &Shared,
) {
    info!("Connecting to {}", endpoint.url());
    let mut transport = match connector.connect(endpoint) {
        Ok(transport) => transport,
        Err(e) => {
            shared.fail(e);
            return;
        }
    };
    shared.set(SessionState::Streaming);

    let result = stream_samples(transport.as_mut(), &mut window, consumer, shared);

    if let Err(e) = transport.close() {
        warn!("Error closing connection: {}", e);
    }

    match result {
        Ok(()) => {
            shared.set(SessionState::Closed);
        }
        Err(e) => shared.fail(e),
    }
}

fn stream_samples(
    transport: &mut dyn Transport,
    window: &mut SmoothingWindow,
    consumer: &SampleConsumer,
    shared: &Shared,
) -> Result<()> {
    loop {
        let sample = match consumer.take() {
            Ok(sample) => sample,
            Err(Error::ChannelClosed) => {
                debug!("Sample channel closed, leaving send loop");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let x = window.push(sample);
        let frame = codec::encode(x)?;
        transport.send_text(&frame)?;

        let sent = shared.frames_sent.fetch_add(1, Ordering::AcqRel) + 1;
        debug!("Frame {}: sample {:.2} -> x={}", sent, sample, x);
    }
}
