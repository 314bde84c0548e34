//! Domain layer containing the value types of the verification flow.

pub mod code_entry;
pub mod country;
pub mod phone_challenge;

// Re-export commonly used domain types
pub use code_entry::{CodeEntryState, CODE_LENGTH};
pub use country::CountryProfile;
pub use phone_challenge::{NavigationTarget, PhoneChallengeState};
