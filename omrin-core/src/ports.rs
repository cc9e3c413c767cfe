//! Trait describing the provider capability and its error type.

use async_trait::async_trait;
use chrono::ParseError as ChronoParseError;
use reqwest::Error as ReqwestError;

use crate::model::{Address, ClientId, CollectionEvent, PublicKey};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to the provider backend.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Provider answered with a non-success status.
    #[error("Request failed with status code {status} and reason {reason}")]
    Protocol {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase, empty when unknown.
        reason: String,
    },
    /// Failed to parse a date from the provider response.
    #[error("Parse error: {0}")]
    Parse(#[from] ChronoParseError),
    /// Public key could not be decoded or loaded.
    #[error("Invalid public key: {0}")]
    InvalidKey(String),
    /// Request payload could not be encrypted.
    #[error("Encryption error: {0}")]
    Encryption(String),
    /// Internal provider error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[async_trait]
/// Trait for the provider backend serving keys and calendars.
pub trait CalendarPort: Send + Sync {
    /// Exchange the client identifier for the provider's public key.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Protocol`] on a non-success status, or another
    /// [`PortError`] when the request or key decoding fails.
    async fn fetch_public_key(&self, client_id: &ClientId) -> Result<PublicKey, PortError>;

    /// Fetch the collection calendar for an address, in provider order.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Protocol`] on a non-success status, or another
    /// [`PortError`] when encryption, the request, or decoding fails.
    async fn fetch_calendar(
        &self,
        client_id: &ClientId,
        public_key: &PublicKey,
        address: &Address,
    ) -> Result<Vec<CollectionEvent>, PortError>;
}
