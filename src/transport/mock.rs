//! In-memory transport for exercising sessions without a network

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{Connector, Transport};
use crate::config::EndpointConfig;
use crate::{Error, Result};

/// Recording transport with injectable failures
///
/// Clones share state, so a test can keep one handle while the session owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    frames: Vec<String>,
    write_attempts: usize,
    fail_on_write: Option<usize>,
    close_count: usize,
}

impl MockTransport {
    /// Create a new mock transport
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `n`th write (1-based) and every write after it
    #[must_use]
    pub fn failing_on_write(self, n: usize) -> Self {
        self.lock().fail_on_write = Some(n);
        self
    }

    /// Frames written successfully, in order
    #[must_use]
    pub fn frames(&self) -> Vec<String> {
        self.lock().frames.clone()
    }

    /// Number of write calls, including failed ones
    #[must_use]
    pub fn write_attempts(&self) -> usize {
        self.lock().write_attempts
    }

    /// Number of times `close` was called
    #[must_use]
    pub fn close_count(&self) -> usize {
        self.lock().close_count
    }

    fn lock(&self) -> MutexGuard<'_, MockTransportInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for MockTransport {
    fn send_text(&mut self, text: &str) -> Result<()> {
        let mut inner = self.lock();
        inner.write_attempts += 1;
        if inner.close_count > 0 {
            return Err(Error::Transport("write after close".to_string()));
        }
        let attempts = inner.write_attempts;
        if inner.fail_on_write.is_some_and(|n| attempts >= n) {
            return Err(Error::Transport("connection reset by peer".to_string()));
        }
        inner.frames.push(text.to_string());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.lock().close_count += 1;
        Ok(())
    }
}

/// Connector handing out a shared [`MockTransport`]
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    transport: MockTransport,
    refuse: bool,
    endpoints: Arc<Mutex<Vec<String>>>,
}

impl MockConnector {
    /// Connector that always succeeds with `transport`
    #[must_use]
    pub fn new(transport: MockTransport) -> Self {
        Self {
            transport,
            refuse: false,
            endpoints: Arc::default(),
        }
    }

    /// Connector whose handshake always fails
    #[must_use]
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    /// URLs of every connection attempt
    #[must_use]
    pub fn attempts(&self) -> Vec<String> {
        self.endpoints
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Connector for MockConnector {
    fn connect(&mut self, endpoint: &EndpointConfig) -> Result<Box<dyn Transport>> {
        let url = endpoint.url();
        self.endpoints
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.clone());
        if self.refuse {
            return Err(Error::Transport(format!("Connection to {url} refused")));
        }
        Ok(Box::new(self.transport.clone()))
    }
}
