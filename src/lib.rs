//! # CoupleChat Core
//!
//! Phone-number verification flow for the CoupleChat pairing app.
//! This crate contains the domain entities, the verification state machine,
//! and the trait boundaries to the auth provider and country directory.
//! Rendering, persistence, and the provider wire protocol live elsewhere.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
