//! Receiving end of the update stream.
//!
//! Accepts WebSocket clients one at a time, decodes each text frame as an
//! update and hands the offset to an [`UpdateSink`]. Non-text frames are
//! ignored; text frames that do not decode are logged and skipped.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use log::{debug, info, warn};
use tungstenite::error::ProtocolError;
use tungstenite::{Message, WebSocket};

use crate::codec::{self, OutboundMessage, UpdatePayload};
use crate::{Error, Result};

/// Consumer of decoded updates
pub trait UpdateSink {
    /// Apply one update
    fn apply(&mut self, update: UpdatePayload) -> Result<()>;
}

impl UpdateSink for Vec<UpdatePayload> {
    fn apply(&mut self, update: UpdatePayload) -> Result<()> {
        self.push(update);
        Ok(())
    }
}

/// Sink that treats each update as an offset from a fixed origin and logs
/// the resulting position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoggingSink {
    origin: (i32, i32),
    position: (i32, i32),
    applied: usize,
}

impl LoggingSink {
    /// Sink anchored at the position captured when it was created
    #[must_use]
    pub const fn new(origin_x: i32, origin_y: i32) -> Self {
        Self {
            origin: (origin_x, origin_y),
            position: (origin_x, origin_y),
            applied: 0,
        }
    }

    /// Last computed position
    #[must_use]
    pub const fn position(&self) -> (i32, i32) {
        self.position
    }

    /// Number of updates applied
    #[must_use]
    pub const fn applied(&self) -> usize {
        self.applied
    }
}

impl UpdateSink for LoggingSink {
    fn apply(&mut self, update: UpdatePayload) -> Result<()> {
        self.position = (
            self.origin.0.saturating_add(update.x),
            self.origin.1.saturating_add(update.y),
        );
        self.applied += 1;
        debug!(
            "Update {}: offset ({}, {}) -> position ({}, {})",
            self.applied, update.x, update.y, self.position.0, self.position.1
        );
        Ok(())
    }
}

/// Read frames until the peer goes away, returning the number of updates applied
///
/// # Errors
///
/// Returns a transport error if reading fails for a reason other than the
/// peer closing, or whatever error the sink reports.
pub fn serve_connection<S, K>(socket: &mut WebSocket<S>, sink: &mut K) -> Result<usize>
where
    S: Read + Write,
    K: UpdateSink + ?Sized,
{
    let mut applied = 0;
    loop {
        match socket.read() {
            Ok(Message::Text(text)) => match codec::decode(text.as_str()) {
                Ok(OutboundMessage::Update(update)) => {
                    sink.apply(update)?;
                    applied += 1;
                }
                Err(e) => warn!("Ignoring undecodable frame: {}", e),
            },
            Ok(_) => {}
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => break,
            Err(tungstenite::Error::Protocol(ProtocolError::ResetWithoutClosingHandshake)) => {
                debug!("Peer left without a close handshake");
                break;
            }
            Err(e) => return Err(Error::Transport(format!("Failed to read frame: {e}"))),
        }
    }
    Ok(applied)
}

/// Listening socket serving one client at a time
#[derive(Debug)]
pub struct UpdateReceiver {
    listener: TcpListener,
}

impl UpdateReceiver {
    /// Bind the listening socket
    ///
    /// # Errors
    ///
    /// Returns a transport error if the address cannot be bound.
    pub fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .map_err(|e| Error::Transport(format!("Failed to listen: {e}")))?;
        Ok(Self { listener })
    }

    /// Address actually bound (useful with port 0)
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the socket has no local address.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept a single client and serve it until it disconnects
    ///
    /// # Errors
    ///
    /// Returns an error if accepting, the handshake or reading fails.
    pub fn accept_one<K: UpdateSink + ?Sized>(&self, sink: &mut K) -> Result<usize> {
        let (stream, peer) = self.listener.accept()?;
        serve_client(stream, peer, sink)
    }

    /// Serve clients forever, logging per-connection failures
    ///
    /// # Errors
    ///
    /// Returns an I/O error only if the listener itself fails.
    pub fn run<K: UpdateSink + ?Sized>(&self, sink: &mut K) -> Result<()> {
        info!("Listening for updates on {}", self.local_addr()?);
        loop {
            let (stream, peer) = self.listener.accept()?;
            if let Err(e) = serve_client(stream, peer, sink) {
                warn!("Connection from {} ended: {}", peer, e);
            }
        }
    }
}

fn serve_client<K: UpdateSink + ?Sized>(stream: TcpStream, peer: SocketAddr, sink: &mut K) -> Result<usize> {
    let mut socket = tungstenite::accept(stream)
        .map_err(|e| Error::Transport(format!("WebSocket handshake with {peer} failed: {e}")))?;
    info!("Client connected: {}", peer);
    let applied = serve_connection(&mut socket, sink)?;
    info!("Client {} disconnected after {} updates", peer, applied);
    Ok(applied)
}
