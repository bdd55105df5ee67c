//! Transport capability for delivering signed commands.
//!
//! - `Transport`: one async request per operation, positional arguments
//! - `HttpTransport`: JSON-RPC 2.0 over HTTP
//! - `RecordingTransport`: in-memory double that records calls

use async_trait::async_trait;
use serde::{Serialize, Serializer};
use std::sync::Arc;
use swap_types::{bytes_to_hex, Result};

pub mod http;
pub mod memory;

pub use http::{HttpTransport, HttpTransportConfig};
pub use memory::{RecordedCall, RecordingTransport};

/// A single positional argument of a transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportArg {
    /// Binary value (signature, public key).
    Bytes(Vec<u8>),
    /// Base-10 rendering of an integer.
    Decimal(String),
}

impl TransportArg {
    pub fn decimal(value: impl ToString) -> Self {
        TransportArg::Decimal(value.to_string())
    }

    pub fn as_decimal(&self) -> Option<&str> {
        match self {
            TransportArg::Decimal(s) => Some(s),
            TransportArg::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            TransportArg::Bytes(b) => Some(b),
            TransportArg::Decimal(_) => None,
        }
    }
}

// Binary values travel as 0x-hex strings, decimals as plain strings.
impl Serialize for TransportArg {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            TransportArg::Bytes(b) => serializer.serialize_str(&bytes_to_hex(b)),
            TransportArg::Decimal(s) => serializer.serialize_str(s),
        }
    }
}

/// Asynchronous request/response capability.
///
/// Implementations decide ordering, retries and timeouts; callers issue
/// exactly one `send` per operation and return its result unchanged.
#[async_trait]
pub trait Transport: Send + Sync {
    type Output: Send;

    async fn send(&self, method: &str, args: Vec<TransportArg>) -> Result<Self::Output>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    type Output = T::Output;

    async fn send(&self, method: &str, args: Vec<TransportArg>) -> Result<Self::Output> {
        (**self).send(method, args).await
    }
}
