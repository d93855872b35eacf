//! Transport seam
//!
//! The session only needs to read inbound text messages and send outbound
//! ones. [`WsSource`]/[`WsSink`] carry text frames over a WebSocket, the
//! game server's native transport. [`TcpSource`]/[`TcpSink`] carry
//! newline-delimited messages over a plain TCP stream, and
//! [`ChannelSource`]/[`ChannelSink`] connect a session to an in-process
//! peer.

use crate::serialization::{frame_line, unframe_line};
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

/// Transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Connection closed")]
    Closed,
}

/// Inbound half of a connection
#[async_trait]
pub trait MessageSource: Send {
    /// Wait for the next message; `None` once the peer has closed
    async fn recv(&mut self) -> Result<Option<String>, TransportError>;
}

/// Outbound half of a connection
#[async_trait]
pub trait MessageSink: Send {
    async fn send(&mut self, text: String) -> Result<(), TransportError>;
}

/// Where a session connects to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `ws://` or `wss://` URL
    WebSocket(String),
    /// `host:port`, optionally written as `tcp://host:port`
    Tcp(String),
}

impl Endpoint {
    pub fn parse(target: &str) -> Result<Self, TransportError> {
        let target = target.trim();
        if target.starts_with("ws://") || target.starts_with("wss://") {
            return Ok(Self::WebSocket(target.to_string()));
        }

        let address = target.strip_prefix("tcp://").unwrap_or(target);
        if address.contains("://") || !address.contains(':') {
            return Err(TransportError::InvalidAddress(target.to_string()));
        }
        Ok(Self::Tcp(address.to_string()))
    }
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Text frames over a WebSocket
pub struct WsTransport;

impl WsTransport {
    /// Perform the handshake and split the socket into its two halves
    pub async fn connect(url: &str) -> Result<(WsSource, WsSink), TransportError> {
        let (stream, response) = tokio_tungstenite::connect_async(url).await?;
        info!(url, status = %response.status(), "connected");

        let (write, read) = stream.split();
        Ok((WsSource { read }, WsSink { write }))
    }
}

pub struct WsSource {
    read: SplitStream<WsStream>,
}

#[async_trait]
impl MessageSource for WsSource {
    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        while let Some(message) = self.read.next().await {
            match message? {
                Message::Text(text) => return Ok(Some(text.to_string())),
                Message::Close(frame) => {
                    debug!(?frame, "close frame");
                    return Ok(None);
                }
                // pings are answered by tungstenite itself
                other => debug!(kind = frame_kind(&other), "skipping non-text frame"),
            }
        }
        Ok(None)
    }
}

fn frame_kind(message: &Message) -> &'static str {
    match message {
        Message::Text(_) => "text",
        Message::Binary(_) => "binary",
        Message::Ping(_) => "ping",
        Message::Pong(_) => "pong",
        Message::Close(_) => "close",
        Message::Frame(_) => "frame",
    }
}

pub struct WsSink {
    write: SplitSink<WsStream, Message>,
}

#[async_trait]
impl MessageSink for WsSink {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        self.write.send(Message::text(text)).await?;
        Ok(())
    }
}

/// Newline-delimited messages over TCP
pub struct TcpTransport;

impl TcpTransport {
    /// Connect and split the stream into its two halves
    pub async fn connect(address: &str) -> Result<(TcpSource, TcpSink), TransportError> {
        let stream = TcpStream::connect(address).await?;
        stream.set_nodelay(true)?;
        info!(address, "connected");

        let (read, write) = stream.into_split();
        Ok((
            TcpSource {
                reader: BufReader::new(read),
                buf: Vec::new(),
            },
            TcpSink { writer: write },
        ))
    }
}

pub struct TcpSource {
    reader: BufReader<OwnedReadHalf>,
    buf: Vec<u8>,
}

#[async_trait]
impl MessageSource for TcpSource {
    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf).await? == 0 {
                return Ok(None);
            }

            let line = match std::str::from_utf8(&self.buf) {
                Ok(line) => unframe_line(line),
                Err(err) => {
                    warn!(error = %err, bytes = self.buf.len(), "skipping line that is not UTF-8");
                    continue;
                }
            };
            if !line.is_empty() {
                return Ok(Some(line.to_string()));
            }
        }
    }
}

pub struct TcpSink {
    writer: OwnedWriteHalf,
}

#[async_trait]
impl MessageSink for TcpSink {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        self.writer.write_all(frame_line(text).as_bytes()).await?;
        Ok(())
    }
}

/// Receives messages from an in-process peer
pub struct ChannelSource(pub mpsc::Receiver<String>);

#[async_trait]
impl MessageSource for ChannelSource {
    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        Ok(self.0.recv().await)
    }
}

/// Sends messages to an in-process peer
pub struct ChannelSink(pub mpsc::Sender<String>);

#[async_trait]
impl MessageSink for ChannelSink {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        self.0.send(text).await.map_err(|_| TransportError::Closed)
    }
}
