//! TCP front end
//!
//! The `LedgerServer` owns the listening socket and the shared `Bank`. It
//! spawns one task per accepted connection plus the interest scheduler, and
//! stops all of them when its shutdown token is cancelled.
//!
//! ```text
//! LedgerServer::run
//!     ├── InterestScheduler          (one task)
//!     └── JoinSet<Session>           (one task per connection)
//!             └── Arc<Bank> ── Arc<LedgerStore>
//! ```

use super::session::Session;
use crate::config::Config;
use crate::core::{Bank, InterestScheduler};
use crate::types::LedgerError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub struct LedgerServer {
    listener: TcpListener,
    bank: Arc<Bank>,
    interest_period: Duration,
}

impl LedgerServer {
    /// Build the bank from `config` and bind its listen address
    pub async fn bind(config: &Config) -> Result<Self, LedgerError> {
        let bank = Arc::new(Bank::from_config(config)?);
        Self::bind_with(&config.listen_addr(), bank, config.interest_period()).await
    }

    /// Bind `addr` serving an existing bank
    pub async fn bind_with(
        addr: &str,
        bank: Arc<Bank>,
        interest_period: Duration,
    ) -> Result<Self, LedgerError> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            bank,
            interest_period,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, LedgerError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn bank(&self) -> Arc<Bank> {
        Arc::clone(&self.bank)
    }

    /// Accept connections until `shutdown` is cancelled, then wait for the
    /// scheduler and every open session to finish
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), LedgerError> {
        let addr = self.local_addr()?;
        info!(%addr, "server listening");

        let scheduler = InterestScheduler::new(Arc::clone(&self.bank), self.interest_period)
            .spawn(shutdown.child_token());
        let mut sessions = JoinSet::new();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        info!(%peer, "client connected");
                        let session = Session::new(stream, Arc::clone(&self.bank), peer);
                        let token = shutdown.child_token();
                        sessions.spawn(async move {
                            match session.run(token).await {
                                Ok(()) => info!(%peer, "client disconnected"),
                                Err(error) => warn!(%peer, %error, "session ended with error"),
                            }
                        });
                        debug!(active = sessions.len(), "sessions running");
                    }
                    Err(error) => error!(%error, "failed to accept connection"),
                },
                Some(joined) = sessions.join_next(), if !sessions.is_empty() => {
                    if let Err(error) = joined {
                        error!(%error, "session task failed");
                    }
                }
            }
        }

        info!("server shutting down");
        while let Some(joined) = sessions.join_next().await {
            if let Err(error) = joined {
                error!(%error, "session task failed");
            }
        }
        if let Err(error) = scheduler.await {
            error!(%error, "interest scheduler failed");
        }
        Ok(())
    }
}
