//! Game client session
//!
//! One session task owns the [`WorldSynchronizer`]. Inbound messages are
//! read by a receive task and handed over through a bounded channel; key
//! actions are queued for a send task that flushes them at a fixed
//! interval. Every inbound message is applied in full before the session
//! reaches its next await point, so the frontend always draws a consistent
//! world.

use crate::messages::{Action, ClientMessage};
use crate::serialization::{self, CodecError};
use crate::transport::{MessageSink, MessageSource, TransportError};
use gloam_world::{WorldError, WorldState, WorldSynchronizer};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// How long queued actions may take to flush on quit
const FLUSH_TIMEOUT: Duration = Duration::from_millis(500);

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server URL (`ws://...`) or `host:port`
    pub address: String,
    /// Interval between animation ticks and redraws
    pub tick_interval: Duration,
    /// Pause between outbound flushes
    pub send_interval: Duration,
    /// Inbound message buffer size
    pub inbound_buffer: usize,
    /// Outbound action buffer size
    pub outbound_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: "ws://127.0.0.1:8080".to_string(),
            tick_interval: Duration::from_millis(100),
            send_interval: Duration::from_millis(50),
            inbound_buffer: 64,
            outbound_buffer: 64,
        }
    }
}

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Disconnected from server")]
    Disconnected,

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("World error: {0}")]
    World(#[from] WorldError),

    #[error("Frontend error: {0}")]
    Frontend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Local input relevant to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Action(Action),
    Quit,
}

/// Where the world is drawn and input comes from
pub trait Frontend {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Draw the current world
    fn draw(&mut self, world: &WorldState) -> Result<(), Self::Error>;

    /// Collect pending input without blocking
    fn poll_input(&mut self) -> Result<Vec<Input>, Self::Error>;
}

/// Game client
pub struct GameClient {
    config: ClientConfig,
    sync: WorldSynchronizer,
}

impl GameClient {
    /// Create a new client
    pub fn new(config: ClientConfig, sync: WorldSynchronizer) -> Self {
        Self { config, sync }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn world(&self) -> &WorldState {
        self.sync.state()
    }

    /// Run the session until the player quits or the server disconnects
    pub async fn run<S, K, F>(
        &mut self,
        source: S,
        sink: K,
        frontend: &mut F,
    ) -> Result<(), ClientError>
    where
        S: MessageSource + 'static,
        K: MessageSink + 'static,
        F: Frontend,
    {
        let (inbound_tx, mut inbound) = mpsc::channel(self.config.inbound_buffer);
        let (outbound, outbound_rx) = mpsc::channel(self.config.outbound_buffer);

        let receiver = tokio::spawn(receive_loop(source, inbound_tx));
        let sender = tokio::spawn(send_loop(sink, outbound_rx, self.config.send_interval));

        let mut ticker = tokio::time::interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_tick = Instant::now();

        let result = loop {
            tokio::select! {
                message = inbound.recv() => match message {
                    Some(text) => {
                        // errors are logged by the synchronizer
                        let _ = self.sync.handle_message(&text);
                    }
                    None => break Err(ClientError::Disconnected),
                },
                _ = ticker.tick() => {
                    let now = Instant::now();
                    self.sync.tick(now.duration_since(last_tick).as_secs_f64());
                    last_tick = now;

                    match self.frame(frontend, &outbound) {
                        Ok(true) => {}
                        Ok(false) => break Ok(()),
                        Err(err) => break Err(err),
                    }
                }
            }
        };

        receiver.abort();
        drop(outbound);
        flush(sender).await;

        if result.is_ok() {
            info!("session ended by player");
        }
        result
    }

    /// Draw and handle input; `false` once the player quits
    fn frame<F: Frontend>(
        &self,
        frontend: &mut F,
        outbound: &mpsc::Sender<String>,
    ) -> Result<bool, ClientError> {
        frontend
            .draw(self.sync.state())
            .map_err(|e| ClientError::Frontend(Box::new(e)))?;

        let inputs = frontend
            .poll_input()
            .map_err(|e| ClientError::Frontend(Box::new(e)))?;

        for input in inputs {
            match input {
                Input::Quit => return Ok(false),
                Input::Action(action) => {
                    let text = serialization::encode(&ClientMessage::Action(action))?;
                    if outbound.try_send(text).is_err() {
                        warn!(%action, "outbound queue full, dropping action");
                    }
                }
            }
        }

        Ok(true)
    }
}

async fn receive_loop<S: MessageSource>(mut source: S, inbound: mpsc::Sender<String>) {
    loop {
        match source.recv().await {
            Ok(Some(text)) => {
                if inbound.send(text).await.is_err() {
                    return;
                }
            }
            Ok(None) => {
                info!("server closed the connection");
                return;
            }
            Err(err) => {
                warn!(error = %err, "receive failed");
                return;
            }
        }
    }
}

async fn send_loop<K: MessageSink>(
    mut sink: K,
    mut queue: mpsc::Receiver<String>,
    interval: Duration,
) {
    while let Some(first) = queue.recv().await {
        let mut batch = vec![first];
        while let Ok(text) = queue.try_recv() {
            batch.push(text);
        }

        for text in batch {
            debug!(message = %text, "sending");
            if let Err(err) = sink.send(text).await {
                warn!(error = %err, "send failed");
                return;
            }
        }

        tokio::time::sleep(interval).await;
    }
}

async fn flush(mut sender: JoinHandle<()>) {
    if tokio::time::timeout(FLUSH_TIMEOUT, &mut sender).await.is_err() {
        warn!("outbound queue not flushed");
        sender.abort();
    }
}
