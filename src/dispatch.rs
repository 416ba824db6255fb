//! Handler registration and dispatch.
//!
//! A [`Handlers`] table maps uppercase command names to ordered handler
//! lists. Registration happens once, at setup time, before any receive
//! loop starts; the table is shared read-only afterwards (typically as an
//! `Arc<Handlers>`), so dispatch needs no locking.

use std::collections::HashMap;

use futures_util::future::BoxFuture;

use crate::connection::Connection;
use crate::error::{ProtocolError, Result};
use crate::message::Line;

/// What a handler wants the receive loop to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading lines.
    Continue,
    /// Stop the receive loop and tear the connection down.
    Stop,
}

/// The future a handler returns.
///
/// Handlers may suspend, e.g. to send a reply through the connection.
/// The receive loop does not read the next line until the returned
/// future completes.
pub type HandlerFuture<'a> = BoxFuture<'a, anyhow::Result<Flow>>;

/// A registered handler callback.
///
/// Handlers are plain functions over the connection and the parsed line:
///
/// ```
/// use slirc_bot::{Connection, Flow, HandlerFuture, Line};
///
/// fn greet<'a>(conn: &'a mut Connection, line: &'a Line) -> HandlerFuture<'a> {
///     Box::pin(async move {
///         if let Some(text) = &line.message {
///             if text.contains("hello") {
///                 conn.send("PRIVMSG", &[&line.params[0]], Some("hi!")).await?;
///             }
///         }
///         Ok(Flow::Continue)
///     })
/// }
/// ```
pub type Handler =
    Box<dyn for<'a> Fn(&'a mut Connection, &'a Line) -> HandlerFuture<'a> + Send + Sync>;

/// Dispatch table from command name to registered handlers.
#[derive(Default)]
pub struct Handlers {
    table: HashMap<String, Vec<Handler>>,
}

impl Handlers {
    /// Create an empty table.
    pub fn new() -> Handlers {
        Handlers::default()
    }

    /// Register a handler for `command`.
    ///
    /// The command is normalized to uppercase. Handlers for the same
    /// command run in registration order. All registration must complete
    /// before any connection starts reading.
    pub fn register<F>(&mut self, command: &str, handler: F)
    where
        F: for<'a> Fn(&'a mut Connection, &'a Line) -> HandlerFuture<'a> + Send + Sync + 'static,
    {
        self.table
            .entry(command.to_uppercase())
            .or_default()
            .push(Box::new(handler));
    }

    /// Number of commands with at least one handler.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Invoke the handlers registered for `line.command`, in order.
    ///
    /// An unknown command is a no-op returning [`Flow::Continue`]. The
    /// first handler returning [`Flow::Stop`] short-circuits: remaining
    /// handlers are not invoked. A handler error aborts the chain and
    /// becomes [`ProtocolError::Handler`].
    pub async fn dispatch(&self, conn: &mut Connection, line: &Line) -> Result<Flow> {
        let Some(handlers) = self.table.get(&line.command) else {
            return Ok(Flow::Continue);
        };

        for handler in handlers {
            let flow = handler(conn, line)
                .await
                .map_err(|source| ProtocolError::Handler {
                    command: line.command.clone(),
                    source,
                })?;
            if flow == Flow::Stop {
                return Ok(Flow::Stop);
            }
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    fn test_connection() -> Connection {
        Connection::new(ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 6667,
            use_tls: false,
            nick: "bot".to_string(),
            username: "bot".to_string(),
            realname: "bot".to_string(),
        })
    }

    fn privmsg_line() -> Line {
        Line::parse(":alice!ident@host PRIVMSG #chan :hello").unwrap()
    }

    #[tokio::test]
    async fn test_unknown_command_continues() {
        let handlers = Handlers::new();
        let mut conn = test_connection();

        let flow = handlers.dispatch(&mut conn, &privmsg_line()).await.unwrap();
        assert_eq!(flow, Flow::Continue);
    }

    static ORDER: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());

    fn push_first<'a>(_conn: &'a mut Connection, _line: &'a Line) -> HandlerFuture<'a> {
        Box::pin(async move {
            ORDER.lock().unwrap().push("first");
            Ok(Flow::Continue)
        })
    }

    fn push_second<'a>(_conn: &'a mut Connection, _line: &'a Line) -> HandlerFuture<'a> {
        Box::pin(async move {
            ORDER.lock().unwrap().push("second");
            Ok(Flow::Continue)
        })
    }

    #[tokio::test]
    async fn test_handlers_run_in_registration_order() {
        let mut handlers = Handlers::new();
        handlers.register("PRIVMSG", push_first);
        handlers.register("PRIVMSG", push_second);

        let mut conn = test_connection();
        let flow = handlers.dispatch(&mut conn, &privmsg_line()).await.unwrap();

        assert_eq!(flow, Flow::Continue);
        assert_eq!(*ORDER.lock().unwrap(), vec!["first", "second"]);
    }

    static AFTER_STOP: AtomicBool = AtomicBool::new(false);

    fn stop<'a>(_conn: &'a mut Connection, _line: &'a Line) -> HandlerFuture<'a> {
        Box::pin(async move { Ok(Flow::Stop) })
    }

    fn mark_after_stop<'a>(_conn: &'a mut Connection, _line: &'a Line) -> HandlerFuture<'a> {
        Box::pin(async move {
            AFTER_STOP.store(true, Ordering::SeqCst);
            Ok(Flow::Continue)
        })
    }

    #[tokio::test]
    async fn test_stop_short_circuits_remaining_handlers() {
        let mut handlers = Handlers::new();
        handlers.register("PRIVMSG", stop);
        handlers.register("PRIVMSG", mark_after_stop);

        let mut conn = test_connection();
        let flow = handlers.dispatch(&mut conn, &privmsg_line()).await.unwrap();

        assert_eq!(flow, Flow::Stop);
        assert!(!AFTER_STOP.load(Ordering::SeqCst));
    }

    fn noop<'a>(_conn: &'a mut Connection, _line: &'a Line) -> HandlerFuture<'a> {
        Box::pin(async move { Ok(Flow::Continue) })
    }

    #[tokio::test]
    async fn test_registration_normalizes_case() {
        let mut handlers = Handlers::new();
        handlers.register("privmsg", noop);

        assert_eq!(handlers.len(), 1);
        let mut conn = test_connection();
        // Dispatch looks up the command as received; registration
        // under any case lands in the uppercase slot.
        let flow = handlers.dispatch(&mut conn, &privmsg_line()).await.unwrap();
        assert_eq!(flow, Flow::Continue);
    }

    fn fail<'a>(_conn: &'a mut Connection, _line: &'a Line) -> HandlerFuture<'a> {
        Box::pin(async move { Err(anyhow::anyhow!("boom")) })
    }

    #[tokio::test]
    async fn test_handler_error_names_the_command() {
        let mut handlers = Handlers::new();
        handlers.register("PRIVMSG", fail);

        let mut conn = test_connection();
        let err = handlers
            .dispatch(&mut conn, &privmsg_line())
            .await
            .unwrap_err();

        match err {
            ProtocolError::Handler { command, .. } => assert_eq!(command, "PRIVMSG"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
