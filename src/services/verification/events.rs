//! Event and effect types crossing the coordinator boundary.
//!
//! The auth provider's callback interface is translated into explicit
//! [`ProviderEvent`] values so everything is consumed on one timeline;
//! no raw callback objects leave this module.

use uuid::Uuid;

use crate::domain::phone_challenge::NavigationTarget;
use crate::errors::ExchangeFailureKind;

/// Events dispatched by the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// A country was picked by name on the phone-entry screen
    CountrySelected { name: String },
    /// A calling code was typed; resolved through the country directory
    CallingCodeEntered { calling_code: u16 },
    /// The national number field changed
    PhoneNumberEdited { value: String },
    /// One OTP slot changed, positions 1..=6
    CodeSlotEdited { position: usize, value: String },
    /// The user pressed the send-code button
    SubmitPhoneNumber,
    /// The user pressed the verify button
    SubmitCode,
}

/// Asynchronous events emitted by the auth provider.
///
/// Every variant carries the id of the attempt it belongs to; events
/// bearing a stale id are discarded by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The SMS was dispatched and a verification id assigned
    CodeSent {
        attempt_id: Uuid,
        verification_id: String,
    },
    /// The provider verified the number without a manual code
    InstantCompleted {
        attempt_id: Uuid,
        credential: AuthCredential,
    },
    /// Dispatching the SMS failed
    SendFailed { attempt_id: Uuid, reason: String },
    /// Credential exchange succeeded; the user is signed in
    ExchangeSucceeded { attempt_id: Uuid, user_id: String },
    /// Credential exchange failed
    ExchangeFailed {
        attempt_id: Uuid,
        kind: ExchangeFailureKind,
    },
}

impl ProviderEvent {
    /// The attempt this event belongs to.
    pub fn attempt_id(&self) -> Uuid {
        match self {
            ProviderEvent::CodeSent { attempt_id, .. }
            | ProviderEvent::InstantCompleted { attempt_id, .. }
            | ProviderEvent::SendFailed { attempt_id, .. }
            | ProviderEvent::ExchangeSucceeded { attempt_id, .. }
            | ProviderEvent::ExchangeFailed { attempt_id, .. } => *attempt_id,
        }
    }
}

/// A credential ready for exchange with the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCredential {
    /// Built from the verification id and the manually entered code
    SmsCode {
        verification_id: String,
        code: String,
    },
    /// Handed over whole by the provider on instant verification
    Instant { token: String },
}

/// Everything the session loop consumes, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Ui(UiEvent),
    Provider(ProviderEvent),
    /// The settle delay after code-sent elapsed; navigation is due
    NavigationDue { attempt_id: Uuid },
    /// The hosting screen is going away; stop the session
    Teardown,
}

/// One-shot effects delivered to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Move to another screen; emitted exactly once per intent
    Navigate(NavigationTarget),
    /// Surface a display-safe error message
    ShowError { message: String },
}
