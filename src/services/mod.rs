//! Services containing the verification flow logic.

pub mod verification;

// Re-export commonly used types
pub use verification::{
    AuthCredential, AuthGateway, CountryDirectory, Effect, FlowState, ProviderEvent, SessionEvent,
    SessionHandle, UiEvent, VerificationAttempt, VerificationCoordinator, VerificationFlowConfig,
    VerificationSession,
};
