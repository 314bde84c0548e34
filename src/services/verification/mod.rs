//! Phone verification flow: coordinator state machine, session loop,
//! and the trait boundaries to the auth provider.
//!
//! The flow is `Idle → SendingCode → AwaitingCode → Verifying →
//! {Verified | Failed}`. UI events and asynchronous provider events are
//! applied on a single timeline; effects (navigation, error surfacing)
//! leave through a one-shot effect channel.

mod config;
mod coordinator;
mod events;
mod session;
mod traits;

#[cfg(test)]
mod tests;

pub use config::VerificationFlowConfig;
pub use coordinator::{FlowState, VerificationAttempt, VerificationCoordinator};
pub use events::{AuthCredential, Effect, ProviderEvent, SessionEvent, UiEvent};
pub use session::{SessionHandle, VerificationSession};
pub use traits::{AuthGateway, CountryDirectory};
