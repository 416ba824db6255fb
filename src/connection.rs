//! One server connection and its command sender.
//!
//! A [`Connection`] owns the transport for exactly one configured server.
//! The transport is absent until connected and replaced on every
//! reconnect; no other component touches it. All outgoing traffic goes
//! through [`Connection::send`] and its convenience wrappers, which are
//! fire-and-forget.

use crate::config::ServerConfig;
use crate::encode;
use crate::error::Result;
use crate::mode::ModeChange;
use crate::transport::Transport;

/// A connection to one IRC server.
pub struct Connection {
    config: ServerConfig,
    transport: Option<Transport>,
}

impl Connection {
    /// Create a disconnected connection from validated config.
    pub fn new(config: ServerConfig) -> Connection {
        Connection {
            config,
            transport: None,
        }
    }

    /// The configuration this connection was created from.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// True while a transport is open.
    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Open a fresh transport to the configured server.
    pub async fn connect(&mut self) -> Result<()> {
        let transport =
            Transport::connect(&self.config.host, self.config.port, self.config.use_tls).await?;
        self.transport = Some(transport);
        Ok(())
    }

    /// Close the transport, if open. Infallible and idempotent.
    pub async fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close().await;
        }
    }

    /// Read the next line. `None` means end-of-stream.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        self.transport_mut()?.read_line().await
    }

    fn transport_mut(&mut self) -> Result<&mut Transport> {
        self.transport.as_mut().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotConnected, "not connected").into()
        })
    }

    /// Build and transmit one line from command, params, and trailing.
    pub async fn send(
        &mut self,
        command: &str,
        params: &[&str],
        message: Option<&str>,
    ) -> Result<()> {
        let line = encode::line(command, params, message);
        self.transport_mut()?.send_line(line).await
    }

    /// Transmit a pre-built line, appending the terminator if missing.
    pub async fn send_raw(&mut self, line: &str) -> Result<()> {
        let mut line = line.to_string();
        if !line.ends_with('\n') {
            line.push('\n');
        }
        self.transport_mut()?.send_line(line).await
    }

    /// Send `NICK <name>`.
    pub async fn nick(&mut self, name: &str) -> Result<()> {
        self.send("NICK", &[name], None).await
    }

    /// Send `USER <username> 0 * :<realname>`.
    pub async fn user(&mut self, username: &str, realname: &str) -> Result<()> {
        self.send("USER", &[username, "0", "*"], Some(realname)).await
    }

    /// Send `PONG :<token>`.
    pub async fn pong(&mut self, token: &str) -> Result<()> {
        self.send("PONG", &[], Some(token)).await
    }

    /// Serialize a mode change and send it as one `MODE` command.
    ///
    /// An empty change fails with [`crate::error::ProtocolError::EmptyMode`]
    /// before anything is written.
    pub async fn mode(&mut self, change: &ModeChange) -> Result<()> {
        let params = change.serialize()?;
        self.send("MODE", &[&params], None).await
    }

    /// Perform the registration handshake: `NICK` then `USER`.
    ///
    /// Fire-and-forget; no confirmation is awaited. Registration failures
    /// surface later as ordinary protocol lines for handlers to act on.
    pub async fn handshake(&mut self) -> Result<()> {
        let nick = self.config.nick.clone();
        self.nick(&nick).await?;

        let username = self.config.username.clone();
        let realname = self.config.realname.clone();
        self.user(&username, &realname).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn test_config(port: u16) -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port,
            use_tls: false,
            nick: "slircbot".to_string(),
            username: "slirc".to_string(),
            realname: "slircbot".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_while_disconnected() {
        let mut conn = Connection::new(test_config(6667));
        let err = conn.send("PING", &[], Some("x")).await.unwrap_err();

        match err {
            crate::error::ProtocolError::Io(e) => {
                assert_eq!(e.kind(), std::io::ErrorKind::NotConnected);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_handshake_sends_nick_then_user() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = String::new();
            sock.read_to_string(&mut buf).await.unwrap();
            buf
        });

        let mut conn = Connection::new(test_config(port));
        conn.connect().await.unwrap();
        assert!(conn.is_connected());

        conn.handshake().await.unwrap();
        conn.close().await;
        assert!(!conn.is_connected());

        let sent = server.await.unwrap();
        assert_eq!(sent, "NICK slircbot\nUSER slirc 0 * :slircbot\n");
    }

    #[tokio::test]
    async fn test_mode_sends_composed_params() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = String::new();
            sock.read_to_string(&mut buf).await.unwrap();
            buf
        });

        let mut conn = Connection::new(test_config(port));
        conn.connect().await.unwrap();

        let mut change = ModeChange::new('o', "alice");
        change.compose(ModeChange::new('b', "bob"));
        conn.mode(&change).await.unwrap();
        conn.close().await;

        assert_eq!(server.await.unwrap(), "MODE alice bob +o+b\n");
    }

    #[tokio::test]
    async fn test_empty_mode_rejected_before_send() {
        let mut conn = Connection::new(test_config(6667));

        let mut change = ModeChange::new('o', "alice");
        change.compose(ModeChange::new('o', "alice").negated());

        // Fails synchronously even though the connection is closed:
        // serialization happens before any transport access.
        let err = conn.mode(&change).await.unwrap_err();
        assert!(matches!(err, crate::error::ProtocolError::EmptyMode));
    }
}
