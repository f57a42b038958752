//! Mock implementations for testing

use super::traits::{DialError, Dialer};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

/// A recorded dial request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialCall {
    pub conversation_id: String,
    pub number: String,
}

/// Mock dialer that records every call
pub struct MockDialer {
    calls_tx: mpsc::UnboundedSender<DialCall>,
    calls_rx: Mutex<mpsc::UnboundedReceiver<DialCall>>,
    fail: bool,
}

#[allow(dead_code)]
impl MockDialer {
    pub fn new() -> Self {
        let (calls_tx, calls_rx) = mpsc::unbounded_channel();
        Self {
            calls_tx,
            calls_rx: Mutex::new(calls_rx),
            fail: false,
        }
    }

    /// Records calls but reports every one as rejected
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Wait for the next recorded call; `None` if nothing arrives in time
    pub async fn next_call(&self, wait: Duration) -> Option<DialCall> {
        let mut rx = self.calls_rx.lock().await;
        tokio::time::timeout(wait, rx.recv()).await.ok().flatten()
    }
}

impl Default for MockDialer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Dialer for MockDialer {
    async fn dial(&self, conversation_id: &str, number: &str) -> Result<(), DialError> {
        let _ = self.calls_tx.send(DialCall {
            conversation_id: conversation_id.to_string(),
            number: number.to_string(),
        });
        if self.fail {
            return Err(DialError::Rejected { status: 503 });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_dialer_records_calls() {
        let dialer = MockDialer::new();

        dialer.dial("conv-1", "188").await.unwrap();

        let call = dialer.next_call(Duration::from_secs(1)).await.unwrap();
        assert_eq!(call.number, "188");
        assert!(dialer.next_call(Duration::from_millis(10)).await.is_none());
    }

    #[tokio::test]
    async fn test_failing_mock_dialer() {
        let dialer = MockDialer::failing();

        let result = dialer.dial("conv-1", "188").await;

        assert!(matches!(result, Err(DialError::Rejected { status: 503 })));
        assert!(dialer.next_call(Duration::from_secs(1)).await.is_some());
    }
}
