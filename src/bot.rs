//! The per-connection receive loop.
//!
//! One [`Bot`] drives one configured server connection through its whole
//! lifecycle: connect, handshake, receive/dispatch, teardown, reconnect.
//! Bots for different servers run as independent tokio tasks; lines from
//! one connection are always dispatched strictly in order, one at a time.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::connection::Connection;
use crate::dispatch::{Flow, Handlers};
use crate::error::{ProtocolError, Result};
use crate::message::Line;

/// The connection loop for one server.
pub struct Bot {
    connection: Connection,
    handlers: Arc<Handlers>,
}

impl Bot {
    /// Create a bot from validated config and a shared dispatch table.
    pub fn new(config: ServerConfig, handlers: Arc<Handlers>) -> Bot {
        Bot {
            connection: Connection::new(config),
            handlers,
        }
    }

    /// Run the connection forever.
    ///
    /// Each failed or finished [`cycle`](Bot::cycle) is logged, the
    /// transport is closed unconditionally, and a fresh cycle starts.
    /// No failure escapes this loop; a dead server stalls only this task.
    pub async fn run(&mut self) {
        loop {
            match self.cycle().await {
                Ok(()) => info!(host = %self.connection.config().host, "connection closed"),
                Err(e) => {
                    warn!(host = %self.connection.config().host, error = %e, "connection cycle failed")
                }
            }
            // Teardown is guaranteed on every exit path.
            self.connection.close().await;
            // Restart immediately. There is no backoff, jitter, or retry
            // cap; changing that is a policy decision, not a bug fix.
        }
    }

    /// Run one connect → handshake → receive cycle.
    ///
    /// Returns `Ok(())` when the connection ends gracefully: end of
    /// stream, an `ERROR` frame from the server, or a handler returning
    /// [`Flow::Stop`]. Any transport, parse, or handler failure is
    /// returned as an error; [`run`](Bot::run) treats both the same way.
    pub async fn cycle(&mut self) -> Result<()> {
        self.connection.connect().await?;
        self.connection.handshake().await?;

        loop {
            let Some(raw) = self.connection.read_line().await? else {
                return Ok(());
            };

            // PING and ERROR frames are matched textually on the raw
            // line, before parsing; a prefixed PING would fall through
            // to dispatch. Kept as-is pending review.
            if let Some(rest) = raw.strip_prefix("PING ") {
                let token = rest.strip_prefix(':').unwrap_or(rest);
                self.connection.pong(token).await?;
                continue;
            }
            if raw.starts_with("ERROR ") {
                return Ok(());
            }

            let line = Line::parse(&raw).map_err(|cause| ProtocolError::InvalidMessage {
                string: raw.clone(),
                cause,
            })?;

            if self.handlers.dispatch(&mut self.connection, &line).await? == Flow::Stop {
                return Ok(());
            }
        }
    }
}

/// Spawn one [`Bot::run`] task per connection entry.
///
/// Registration on `handlers` must be complete before this is called;
/// the table is shared read-only between all connections. The returned
/// set's tasks never finish on their own.
pub fn spawn_all(configs: Vec<ServerConfig>, handlers: Arc<Handlers>) -> JoinSet<()> {
    let mut set = JoinSet::new();
    for config in configs {
        let handlers = Arc::clone(&handlers);
        set.spawn(async move { Bot::new(config, handlers).run().await });
    }
    set
}
