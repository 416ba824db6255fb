//! # slirc-bot
//!
//! A minimal asynchronous IRC bot engine: the connection lifecycle state
//! machine, received-line parsing, composite `MODE` building, and the
//! dispatch contract between incoming lines and handler callbacks.
//!
//! ## Features
//!
//! - Line parsing into command, parameters, trailing text, and origin
//! - Mode change composition with cancellation of contradictory flags
//! - Fire-and-forget command sending over TCP or TLS
//! - Uppercase-command dispatch table with ordered handler chains
//! - A reconnect loop that survives any single connection's failure
//!
//! ## Quick Start
//!
//! Handlers are registered once, before any connection starts; each
//! configured server then runs as its own tokio task:
//!
//! ```no_run
//! use std::sync::Arc;
//! use slirc_bot::{spawn_all, BotConfig, Connection, Flow, HandlerFuture, Handlers, Line};
//!
//! fn echo<'a>(conn: &'a mut Connection, line: &'a Line) -> HandlerFuture<'a> {
//!     Box::pin(async move {
//!         if let (Some(target), Some(text)) = (line.params.first(), line.message.as_deref()) {
//!             conn.send("PRIVMSG", &[target], Some(text)).await?;
//!         }
//!         Ok(Flow::Continue)
//!     })
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BotConfig::from_path("bot.toml")?;
//!
//!     let mut handlers = Handlers::new();
//!     handlers.register("PRIVMSG", echo);
//!
//!     let mut tasks = spawn_all(config.connections, Arc::new(handlers));
//!     while tasks.join_next().await.is_some() {}
//!     Ok(())
//! }
//! ```

#![deny(clippy::all)]

pub mod bot;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod encode;
pub mod error;
pub mod line;
pub mod message;
pub mod mode;
pub mod transport;

pub use self::bot::{spawn_all, Bot};
pub use self::config::{BotConfig, ConfigError, ServerConfig};
pub use self::connection::Connection;
pub use self::dispatch::{Flow, Handler, HandlerFuture, Handlers};
pub use self::error::{MessageParseError, ProtocolError, Result};
pub use self::line::LineCodec;
pub use self::message::{Line, Source};
pub use self::mode::ModeChange;
pub use self::transport::Transport;
