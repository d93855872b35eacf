//! Connect command

use gloam_api::{
    ClientConfig, ClientError, Endpoint, GameClient, MessageSink, MessageSource, TcpTransport,
    TransportError, WsTransport,
};
use gloam_backend_terminal::{ColorDepth, TerminalFrontend, TerminalOutput, WorldRenderer};
use gloam_world::{SpriteLibrary, WorldSynchronizer};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub async fn run(
    url: &str,
    sprites: &Path,
    tick_ms: u64,
    depth: ColorDepth,
) -> Result<(), Box<dyn std::error::Error>> {
    let library = SpriteLibrary::load_dir(sprites)?;
    info!(sprites = library.len(), dir = %sprites.display(), "sprites loaded");

    let config = ClientConfig {
        address: url.to_string(),
        tick_interval: Duration::from_millis(tick_ms),
        ..Default::default()
    };
    let failed = |e: TransportError| ClientError::ConnectionFailed(format!("{url}: {e}"));

    let client = GameClient::new(config, WorldSynchronizer::new(library)?);
    match Endpoint::parse(url).map_err(failed)? {
        Endpoint::WebSocket(url) => {
            let (source, sink) = WsTransport::connect(&url).await.map_err(failed)?;
            play(client, source, sink, depth).await
        }
        Endpoint::Tcp(address) => {
            let (source, sink) = TcpTransport::connect(&address).await.map_err(failed)?;
            play(client, source, sink, depth).await
        }
    }
}

async fn play<S, K>(
    mut client: GameClient,
    source: S,
    sink: K,
    depth: ColorDepth,
) -> Result<(), Box<dyn std::error::Error>>
where
    S: MessageSource + 'static,
    K: MessageSink + 'static,
{
    let mut frontend = TerminalFrontend::new(
        TerminalOutput::new(depth),
        WorldRenderer::new().with_status(true),
    )?;

    let result = client.run(source, sink, &mut frontend).await;

    // restore the terminal before any error is printed
    drop(frontend);
    result?;
    Ok(())
}
