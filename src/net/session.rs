//! Per-connection request loop

use super::codec::ServerCodec;
use crate::core::Bank;
use crate::types::{LedgerError, Outcome, Request};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// One client connection
///
/// Requests on a connection are handled strictly one after another; a failed
/// request only produces an error response, it never ends the session.
pub struct Session {
    framed: Framed<TcpStream, ServerCodec>,
    bank: Arc<Bank>,
    peer: SocketAddr,
}

impl Session {
    pub fn new(stream: TcpStream, bank: Arc<Bank>, peer: SocketAddr) -> Self {
        Self {
            framed: Framed::new(stream, ServerCodec),
            bank,
            peer,
        }
    }

    /// Serve requests until the peer disconnects or `shutdown` fires
    ///
    /// # Errors
    ///
    /// Transport failures on this connection.
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<(), LedgerError> {
        loop {
            let text = tokio::select! {
                _ = shutdown.cancelled() => break,
                frame = self.framed.next() => match frame {
                    Some(frame) => frame?,
                    None => break,
                },
            };

            let outcome = self.handle(&text).await;
            self.framed.send(outcome.message).await?;
        }
        Ok(())
    }

    async fn handle(&self, text: &str) -> Outcome {
        let request = match Request::parse(text) {
            Ok(request) => request,
            Err(error) => {
                warn!(peer = %self.peer, %error, "could not decode request");
                return error.into();
            }
        };

        info!(
            peer = %self.peer,
            user = %request.user,
            command = %request.command,
            account = request.account,
            amount = request.amount,
            "request received"
        );
        let outcome = self.bank.execute(&request).await;
        info!(
            peer = %self.peer,
            command = %request.command,
            kind = ?outcome.kind,
            "request handled"
        );
        outcome
    }
}
