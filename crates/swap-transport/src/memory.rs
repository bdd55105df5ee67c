//! In-memory transport for testing.

use async_trait::async_trait;
use std::sync::Mutex;
use swap_types::{Result, SwapError};

use crate::{Transport, TransportArg};

/// One recorded `send` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: String,
    pub args: Vec<TransportArg>,
}

/// Transport that records calls and echoes them back as the result.
pub struct RecordingTransport {
    calls: Mutex<Vec<RecordedCall>>,
    failure: Mutex<Option<String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    /// Make every subsequent call fail with a transport error.
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls.lock().unwrap().last().cloned()
    }
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    type Output = RecordedCall;

    async fn send(&self, method: &str, args: Vec<TransportArg>) -> Result<RecordedCall> {
        let call = RecordedCall {
            method: method.to_string(),
            args,
        };
        self.calls.lock().unwrap().push(call.clone());

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(SwapError::Transport(message));
        }
        Ok(call)
    }
}
