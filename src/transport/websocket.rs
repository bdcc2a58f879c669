//! WebSocket client transport over a blocking TCP stream.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use log::{debug, info};
use tungstenite::{Message, WebSocket};

use super::{Connector, Transport};
use crate::config::EndpointConfig;
use crate::utils::timeout_from_millis;
use crate::{Error, Result};

/// Upper bound on waiting for the peer's close frame
const CLOSE_DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Connector producing [`WebSocketTransport`]s
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Connector for WebSocketConnector {
    fn connect(&mut self, endpoint: &EndpointConfig) -> Result<Box<dyn Transport>> {
        WebSocketTransport::connect(endpoint).map(|t| Box::new(t) as Box<dyn Transport>)
    }
}

/// Text-frame WebSocket connection to the consumer
pub struct WebSocketTransport {
    socket: WebSocket<TcpStream>,
    url: String,
    closed: bool,
}

impl WebSocketTransport {
    /// Open a TCP connection and perform the client handshake
    pub fn connect(endpoint: &EndpointConfig) -> Result<Self> {
        let url = endpoint.url();
        let addrs = (endpoint.host.as_str(), endpoint.port)
            .to_socket_addrs()
            .map_err(|e| Error::Transport(format!("Failed to resolve {}: {e}", endpoint.host)))?;
        let stream = connect_any(addrs, timeout_from_millis(endpoint.connect_timeout_ms), &url)?;

        stream
            .set_nodelay(true)
            .map_err(|e| Error::Transport(format!("Failed to configure socket: {e}")))?;
        stream
            .set_write_timeout(timeout_from_millis(endpoint.write_timeout_ms))
            .map_err(|e| Error::Transport(format!("Failed to set write timeout: {e}")))?;

        let (socket, response) = tungstenite::client(url.as_str(), stream)
            .map_err(|e| Error::Transport(format!("WebSocket handshake with {url} failed: {e}")))?;

        info!("WebSocket connected to {} (status {})", url, response.status());

        Ok(Self {
            socket,
            url,
            closed: false,
        })
    }
}

impl Transport for WebSocketTransport {
    fn send_text(&mut self, text: &str) -> Result<()> {
        if self.closed {
            return Err(Error::Transport(format!("Connection to {} already closed", self.url)));
        }
        self.socket
            .send(Message::text(text.to_owned()))
            .map_err(|e| Error::Transport(format!("Failed to send frame to {}: {e}", self.url)))
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        match self.socket.close(None) {
            Ok(()) | Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {}
            Err(e) => return Err(Error::Transport(format!("Failed to close {}: {e}", self.url))),
        }

        // Drain until the peer acknowledges the close frame
        if let Err(e) = self.socket.get_ref().set_read_timeout(Some(CLOSE_DRAIN_TIMEOUT)) {
            debug!("Skipping close handshake: {}", e);
            return Ok(());
        }
        let deadline = Instant::now() + CLOSE_DRAIN_TIMEOUT;
        while Instant::now() < deadline {
            match self.socket.read() {
                Ok(_) => continue,
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => break,
                Err(e) => {
                    debug!("Close handshake with {} incomplete: {}", self.url, e);
                    break;
                }
            }
        }

        info!("WebSocket to {} closed", self.url);
        Ok(())
    }
}

/// Try every resolved address in order, keeping the last error
fn connect_any<I>(addrs: I, timeout: Option<Duration>, url: &str) -> Result<TcpStream>
where
    I: IntoIterator<Item = SocketAddr>,
{
    let mut last_error = None;
    for addr in addrs {
        debug!("Connecting to {} ({})", url, addr);
        let attempt = match timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        };
        match attempt {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                debug!("Connection to {} failed: {}", addr, e);
                last_error = Some(e);
            }
        }
    }
    Err(match last_error {
        Some(e) => Error::Transport(format!("Failed to connect to {url}: {e}")),
        None => Error::Transport(format!("No address found for {url}")),
    })
}
