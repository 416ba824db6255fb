//! Connection transport.
//!
//! Wraps a TCP stream, optionally upgraded to TLS, behind the line codec.
//! The transport is owned by one connection, replaced wholesale on every
//! reconnect, and never shared.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use socket2::{SockRef, TcpKeepalive};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls;
use tokio_rustls::TlsConnector;
use tokio_util::codec::Framed;
use tracing::{debug, warn};

use crate::error::Result;
use crate::line::LineCodec;

/// A line-framed transport to one server.
#[allow(clippy::large_enum_variant)]
pub enum Transport {
    /// Plain TCP.
    Tcp {
        framed: Framed<TcpStream, LineCodec>,
    },
    /// TLS over TCP.
    Tls {
        framed: Framed<TlsStream<TcpStream>, LineCodec>,
    },
}

impl Transport {
    /// Open a transport to `host:port`, upgrading to TLS first when asked.
    pub async fn connect(host: &str, port: u16, use_tls: bool) -> Result<Self> {
        let stream = TcpStream::connect((host, port)).await?;
        if let Err(e) = Self::enable_keepalive(&stream) {
            warn!("failed to enable TCP keepalive: {}", e);
        }

        if use_tls {
            let connector = TlsConnector::from(Arc::new(client_config()));
            let name = rustls::pki_types::ServerName::try_from(host.to_string())
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
            let stream = connector.connect(name, stream).await?;
            Ok(Self::Tls {
                framed: Framed::new(stream, LineCodec::new()),
            })
        } else {
            Ok(Self::Tcp {
                framed: Framed::new(stream, LineCodec::new()),
            })
        }
    }

    fn enable_keepalive(stream: &TcpStream) -> std::io::Result<()> {
        let sock = SockRef::from(stream);
        let keepalive = TcpKeepalive::new()
            .with_time(Duration::from_secs(120))
            .with_interval(Duration::from_secs(30));

        sock.set_tcp_keepalive(&keepalive)
    }

    /// True when the transport carries TLS.
    pub fn is_tls(&self) -> bool {
        matches!(self, Self::Tls { .. })
    }

    /// Read the next line. `None` means end-of-stream.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        let line = match self {
            Transport::Tcp { framed } => framed.next().await.transpose()?,
            Transport::Tls { framed } => framed.next().await.transpose()?,
        };

        if let Some(line) = &line {
            debug!("<<< {}", line);
        }
        Ok(line)
    }

    /// Write one raw line. Fire-and-forget: no acknowledgment is awaited.
    pub async fn send_line(&mut self, line: String) -> Result<()> {
        debug!(">>> {}", line.trim_end_matches('\n'));
        match self {
            Transport::Tcp { framed } => framed.send(line).await,
            Transport::Tls { framed } => framed.send(line).await,
        }
    }

    /// Flush and close, best-effort.
    pub async fn close(&mut self) {
        let _ = match self {
            Transport::Tcp { framed } => framed.close().await,
            Transport::Tls { framed } => framed.close().await,
        };
    }
}

fn client_config() -> rustls::ClientConfig {
    let roots =
        rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    rustls::ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth()
}
