//! Gloam API - client session and wire protocol
//!
//! # Architecture
//!
//! ```text
//! Game Server                          Gloam Client
//! ┌─────────────┐                     ┌──────────────────────┐
//! │             │   init / update     │  receive task        │
//! │  produces   │ ──────────────────► │    │ mpsc            │
//! │  world      │   remove_*          │    ▼                 │
//! │  packets    │                     │  session: apply,     │
//! │             │   action            │  tick, draw, input   │
//! │             │ ◄────────────────── │    │ mpsc            │
//! │             │                     │  send task           │
//! └─────────────┘                     └──────────────────────┘
//! ```

pub mod client;
pub mod messages;
pub mod serialization;
pub mod transport;

// Re-export commonly used types
pub use client::{ClientConfig, ClientError, Frontend, GameClient, Input};
pub use messages::{Action, ClientMessage};
pub use serialization::{CodecError, encode};
pub use transport::{
    ChannelSink, ChannelSource, Endpoint, MessageSink, MessageSource, TcpSink, TcpSource,
    TcpTransport, TransportError, WsSink, WsSource, WsTransport,
};
