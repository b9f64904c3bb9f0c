//! Seam between subscription logic and the network

use async_trait::async_trait;
use soap_client::{SoapError, Transport};

/// Delivers a fully framed request to the TV's control port and returns
/// whatever the TV sent back before closing.
#[async_trait]
pub trait RequestSender: Send + Sync {
    async fn send(&self, request: &str) -> Result<Vec<u8>, SoapError>;
}

#[async_trait]
impl RequestSender for Transport {
    async fn send(&self, request: &str) -> Result<Vec<u8>, SoapError> {
        self.send_and_drain(self.device().port(), None, request).await
    }
}
