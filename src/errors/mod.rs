//! Error taxonomy of the verification flow.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a failed credential exchange, as reported by the
/// auth provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeFailureKind {
    /// The submitted code did not match; the user may correct it
    InvalidCredential,
    /// The provider rejected the attempt for rate reasons
    TooManyRequests,
    /// Network failure reaching the provider
    Network,
    /// Any other provider-side failure
    ProviderInternal,
}

impl ExchangeFailureKind {
    /// True when the user can fix the failure by re-entering the code
    /// without restarting from the phone-entry screen.
    pub fn keeps_code_entry(&self) -> bool {
        matches!(self, ExchangeFailureKind::InvalidCredential)
    }
}

impl std::fmt::Display for ExchangeFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            ExchangeFailureKind::InvalidCredential => "invalid credential",
            ExchangeFailureKind::TooManyRequests => "too many requests",
            ExchangeFailureKind::Network => "network failure",
            ExchangeFailureKind::ProviderInternal => "provider internal error",
        };
        f.write_str(text)
    }
}

/// Failures surfaced by the verification flow.
///
/// Every collaborator failure is converted into one of these at the
/// coordinator boundary; nothing panics across the UI seam.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// Rejected before any external call was made
    #[error("Invalid input: {message}")]
    InputInvalid { message: String },

    /// The provider failed while dispatching the SMS; retryable
    #[error("Verification provider failure: {reason}")]
    ProviderFailure { reason: String },

    /// The submitted code was wrong; the user stays on code entry
    #[error("Invalid verification code")]
    InvalidCredential,

    /// Credential exchange failed for a non-code reason; the user must
    /// restart from the phone-entry screen
    #[error("Authentication failed: {reason}")]
    FatalAuthFailure { reason: String },
}

impl FlowError {
    /// True when the user can retry without losing entered data.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FlowError::FatalAuthFailure { .. })
    }

    /// A message safe to show in the UI.
    pub fn display_message(&self) -> String {
        self.to_string()
    }
}

pub type FlowResult<T> = Result<T, FlowError>;
