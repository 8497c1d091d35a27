//! TCP session with a controller

use crate::commands::{write_commands, CommandIssuer};
use crate::config::ClientConfig;
use crate::engine::StateEngine;
use crate::error::ClientResult;
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tracing::info;

/// One connection to a controller.
///
/// The read half feeds the engine; the write half is owned by a writer task
/// that drains the command queue, so commands can be issued from any task
/// while the read loop runs. Reconnecting means building a new `Client`.
pub struct Client {
    engine: StateEngine,
    reader: OwnedReadHalf,
    writer: JoinHandle<()>,
}

impl Client {
    pub async fn connect(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;

        let stream = TcpStream::connect((config.host.as_str(), config.port)).await?;
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr()?;
        info!(peer = %peer, "Connected to controller");

        let (reader, writer) = stream.into_split();
        let (commands, rx) = CommandIssuer::channel();
        let writer = tokio::spawn(write_commands(writer, rx));
        let engine = StateEngine::new(commands).with_max_frame_len(config.max_frame_len);

        Ok(Self {
            engine,
            reader,
            writer,
        })
    }

    /// Register handlers here before calling [`Client::run`]
    pub fn engine_mut(&mut self) -> &mut StateEngine {
        &mut self.engine
    }

    pub fn commands(&self) -> CommandIssuer {
        self.engine.commands().clone()
    }

    /// Run the handshake and the read loop until the connection fails.
    ///
    /// Returns the engine so the caller can inspect the final mirror.
    pub async fn run(self) -> (StateEngine, ClientResult<()>) {
        let Client {
            mut engine,
            reader,
            writer,
        } = self;

        let result = engine.run(reader).await;
        writer.abort();
        (engine, result)
    }
}
