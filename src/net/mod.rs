//! Network layer
//!
//! - `codec` - request/response framing with the `END` sentinel
//! - `session` - per-connection request loop
//! - `server` - listener, session tasks and scheduler lifecycle
//! - `client` - async client with connection retry

pub mod client;
pub mod codec;
pub mod server;
pub mod session;

pub use client::{LedgerClient, DEFAULT_CONNECT_ATTEMPTS, DEFAULT_RETRY_DELAY};
pub use codec::{ClientCodec, ServerCodec, END_MARKER};
pub use server::LedgerServer;
pub use session::Session;
