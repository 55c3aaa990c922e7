//! Wire framing
//!
//! Requests are not delimited: every chunk of bytes the server reads is
//! treated as one request. Responses are the message text followed by the
//! `END` sentinel, and a client buffers until its bytes end with the sentinel.
//! A client has at most one response outstanding, so `END` inside the message
//! text is not a terminator.
//!
//! ```text
//! client ──  user=Alice command=deposit acct_num=1001 amount=500  ──▶ server
//! client ◀── Successfully deposited ... 2600 dollarsEND           ─── server
//! ```

use crate::types::LedgerError;
use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Sentinel terminating every response
pub const END_MARKER: &[u8] = b"END";

/// Server side: read whole chunks as requests, write sentinel-terminated responses
#[derive(Debug, Default, Clone, Copy)]
pub struct ServerCodec;

impl Decoder for ServerCodec {
    type Item = String;
    type Error = LedgerError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }
        let chunk = src.split();
        Ok(Some(String::from_utf8_lossy(&chunk).into_owned()))
    }
}

impl Encoder<String> for ServerCodec {
    type Error = LedgerError;

    fn encode(&mut self, message: String, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(message.len() + END_MARKER.len());
        dst.put_slice(message.as_bytes());
        dst.put_slice(END_MARKER);
        Ok(())
    }
}

/// Client side: write raw request text, read until the sentinel
#[derive(Debug, Default, Clone, Copy)]
pub struct ClientCodec;

impl Decoder for ClientCodec {
    type Item = String;
    type Error = LedgerError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if !src.ends_with(END_MARKER) {
            return Ok(None);
        }

        let message = src.split_to(src.len() - END_MARKER.len());
        src.clear();
        Ok(Some(String::from_utf8_lossy(&message).into_owned()))
    }
}

impl Encoder<String> for ClientCodec {
    type Error = LedgerError;

    fn encode(&mut self, request: String, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.put_slice(request.as_bytes());
        Ok(())
    }
}
