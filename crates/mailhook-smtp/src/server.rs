//! Async SMTP server loop.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use crate::delivery::MessageDelivery;
use crate::error::Result;
use crate::session::Session;
use crate::types::{Reply, ReplyCode};

/// SMTP server accepting connections and running one [`Session`] per
/// connection on its own task.
#[derive(Clone)]
pub struct Server {
    hostname: String,
    delivery: Arc<dyn MessageDelivery>,
}

impl Server {
    /// Creates a server announcing `hostname` and delivering accepted
    /// messages through `delivery`.
    pub fn new(hostname: impl Into<String>, delivery: Arc<dyn MessageDelivery>) -> Self {
        Self {
            hostname: hostname.into(),
            delivery,
        }
    }

    /// Accepts connections on the listener until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns an error if accepting a connection fails fatally.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        loop {
            let (stream, addr) = listener.accept().await?;
            tracing::debug!(%addr, "accepted connection");

            let hostname = self.hostname.clone();
            let delivery = Arc::clone(&self.delivery);
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, hostname, delivery).await {
                    // Dropped connections are routine, not errors
                    tracing::debug!("session ended: {e}");
                }
            });
        }
    }
}

/// Drives one SMTP session over one connection.
///
/// Any transport failure aborts the session: buffered lines are
/// discarded and nothing is forwarded.
async fn handle_connection<S>(
    stream: S,
    hostname: String,
    delivery: Arc<dyn MessageDelivery>,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite,
{
    let mut session = Session::new(hostname, delivery);
    let (read_half, mut write_half) = tokio::io::split(stream);
    let mut reader = BufReader::new(read_half);

    if let Err(e) = write_reply(&mut write_half, &session.greeting()).await {
        session.abort();
        return Err(e);
    }

    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                session.abort();
                break;
            }
            Ok(_) => {}
            Err(e) => {
                session.abort();
                return Err(e.into());
            }
        }

        let stripped = line.trim_end_matches(['\r', '\n']);

        let reply = if session.in_data_mode() {
            match session.handle_data_line(stripped) {
                Some(reply) => reply,
                None => continue,
            }
        } else {
            tracing::trace!("C: {stripped}");
            session.handle_command(stripped)
        };

        tracing::trace!("S: {reply}");
        if let Err(e) = write_reply(&mut write_half, &reply).await {
            session.abort();
            return Err(e);
        }

        if reply.code == ReplyCode::CLOSING {
            break;
        }
    }

    Ok(())
}

async fn write_reply<W>(writer: &mut W, reply: &Reply) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(reply.to_wire().as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
