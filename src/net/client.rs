//! Async client for the ledger protocol

use super::codec::ClientCodec;
use crate::types::{LedgerError, Request};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio_util::codec::Framed;
use tracing::warn;

/// Connection attempts made by `connect_with_retry` callers that have no preference
pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 3;

/// Pause between connection attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// A persistent connection to a ledger server
pub struct LedgerClient {
    framed: Framed<TcpStream, ClientCodec>,
}

impl LedgerClient {
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, LedgerError> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self {
            framed: Framed::new(stream, ClientCodec),
        })
    }

    /// Connect, retrying up to `attempts` times with `delay` between tries
    ///
    /// Returns the error of the last attempt when all of them fail.
    pub async fn connect_with_retry<A>(
        addr: A,
        attempts: u32,
        delay: Duration,
    ) -> Result<Self, LedgerError>
    where
        A: ToSocketAddrs + Copy,
    {
        let attempts = attempts.max(1);
        let mut attempt = 1;
        loop {
            match Self::connect(addr).await {
                Ok(client) => return Ok(client),
                Err(error) if attempt < attempts => {
                    warn!(attempt, attempts, %error, "connection failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Send raw request text and wait for the full response
    ///
    /// The caller must not send again before the response arrives; the
    /// server treats every read as one request.
    pub async fn send_raw(&mut self, text: &str) -> Result<String, LedgerError> {
        self.framed.send(text.to_string()).await?;
        self.framed
            .next()
            .await
            .unwrap_or(Err(LedgerError::ConnectionClosed))
    }

    pub async fn send(&mut self, request: &Request) -> Result<String, LedgerError> {
        self.send_raw(&request.to_wire()).await
    }
}
