use std::time::Duration;

use thiserror::Error;

/// A single attempt against one ledger endpoint failed.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("RPC error {code}: {}", .message.as_deref().unwrap_or("no message"))]
    Rpc { code: String, message: Option<String> },
    #[error("malformed payload: {0}")]
    Payload(String),
    #[error("account address rejected as malformed")]
    AccountMalformed,
}

impl RpcError {
    /// Errors that reflect the request itself rather than the endpoint. Trying
    /// another endpoint would not change the answer.
    pub fn is_definitive(&self) -> bool {
        matches!(self, RpcError::AccountMalformed)
    }
}

/// A ledger operation failed as a whole.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("no ledger endpoints configured")]
    NoEndpoints,
    #[error("all {attempts} ledger endpoints failed for {method}: {last}")]
    Exhausted {
        method: String,
        attempts: usize,
        last: RpcError,
    },
    #[error("{method} rejected: {source}")]
    Rejected { method: String, source: RpcError },
}

/// An HTTP request failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Request-level failure of a scan. Everything else degrades to missing facts.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid or missing XRP address: {0:?}")]
    InvalidAddress(String),
    #[error("Invalid or missing domain: {0:?}")]
    InvalidDomain(String),
    #[error("Ledger service unavailable: {0}")]
    Unavailable(LedgerError),
}

impl ScanError {
    pub fn code(&self) -> &'static str {
        match self {
            ScanError::InvalidAddress(_) => "invalid_address",
            ScanError::InvalidDomain(_) => "invalid_domain",
            ScanError::Unavailable(_) => "service_unavailable",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ScanError::Unavailable(_))
    }
}

impl From<LedgerError> for ScanError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Rejected {
                source: RpcError::AccountMalformed,
                ..
            } => ScanError::InvalidAddress("rejected by ledger".into()),
            other => ScanError::Unavailable(other),
        }
    }
}
