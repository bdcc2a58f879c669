//! Transport layer between the stream session and the remote consumer

use crate::config::EndpointConfig;
use crate::Result;

pub mod mock;
mod websocket;

pub use mock::{MockConnector, MockTransport};
pub use websocket::{WebSocketConnector, WebSocketTransport};

/// Outbound connection carrying text frames
pub trait Transport: Send {
    /// Write one complete text frame
    fn send_text(&mut self, text: &str) -> Result<()>;

    /// Close the connection
    ///
    /// The session calls this at most once per transport.
    fn close(&mut self) -> Result<()>;
}

/// Opens transports to a configured endpoint
pub trait Connector: Send + 'static {
    /// Connect and complete the protocol handshake
    fn connect(&mut self, endpoint: &EndpointConfig) -> Result<Box<dyn Transport>>;
}
