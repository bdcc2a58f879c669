//! Single-slot handoff between the detector thread and the session worker.
//!
//! The channel is a rendezvous: an offer only succeeds when the consumer is
//! already parked in [`SampleConsumer::take`]. Otherwise the sample is dropped
//! on the spot, so the detector callback never waits on the network and stale
//! samples never pile up.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crossbeam_channel::{bounded, select, Receiver, Sender};

use crate::{Error, Result};

/// Create a connected producer/consumer pair
#[must_use]
pub fn sample_channel() -> (SampleProducer, SampleConsumer) {
    let (sample_tx, sample_rx) = bounded(0);
    let (shutdown_tx, shutdown_rx) = bounded(0);
    let closed = Arc::new(AtomicBool::new(false));

    let producer = SampleProducer {
        tx: sample_tx,
        closed: Arc::clone(&closed),
    };
    let consumer = SampleConsumer {
        rx: sample_rx,
        shutdown_rx,
        closer: ChannelCloser {
            closed,
            shutdown_tx: Arc::new(Mutex::new(Some(shutdown_tx))),
        },
    };
    (producer, consumer)
}

/// Sending side, safe to call from any thread that must not block
#[derive(Debug, Clone)]
pub struct SampleProducer {
    tx: Sender<f64>,
    closed: Arc<AtomicBool>,
}

impl SampleProducer {
    /// Hand a sample to the consumer if it is waiting, drop it otherwise
    ///
    /// Returns whether the sample was handed off. Never blocks.
    pub fn offer(&self, sample: f64) -> bool {
        if self.closed.load(Ordering::Acquire) {
            return false;
        }
        self.tx.try_send(sample).is_ok()
    }

    /// Offer the first orientation value of a detection result, if any
    ///
    /// Frames without a detection offer nothing.
    pub fn offer_detection<I>(&self, angles: I) -> bool
    where
        I: IntoIterator<Item = f64>,
    {
        angles.into_iter().next().is_some_and(|angle| self.offer(angle))
    }

    /// Whether the channel has been closed for shutdown
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Receiving side, owned by exactly one consumer thread
#[derive(Debug)]
pub struct SampleConsumer {
    rx: Receiver<f64>,
    shutdown_rx: Receiver<()>,
    closer: ChannelCloser,
}

impl SampleConsumer {
    /// Block until a sample is handed off
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] once the channel is closed or every
    /// producer has been dropped.
    pub fn take(&self) -> Result<f64> {
        if self.closer.is_closed() {
            return Err(Error::ChannelClosed);
        }
        let sample = select! {
            recv(self.rx) -> sample => sample.map_err(|_| Error::ChannelClosed)?,
            recv(self.shutdown_rx) -> _ => return Err(Error::ChannelClosed),
        };
        // An offer racing with close can still land; discard it
        if self.closer.is_closed() {
            return Err(Error::ChannelClosed);
        }
        Ok(sample)
    }

    /// Handle that can close this channel from another thread
    #[must_use]
    pub fn closer(&self) -> ChannelCloser {
        self.closer.clone()
    }
}

/// Closes the channel, waking a consumer blocked in `take`
#[derive(Debug, Clone)]
pub struct ChannelCloser {
    closed: Arc<AtomicBool>,
    shutdown_tx: Arc<Mutex<Option<Sender<()>>>>,
}

impl ChannelCloser {
    /// Close the channel; later calls are no-ops
    ///
    /// A sample handed off concurrently with the close is discarded by
    /// `take`, so nothing reaches the consumer once this returns.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        // Dropping the only shutdown sender disconnects the consumer's select
        self.shutdown_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
