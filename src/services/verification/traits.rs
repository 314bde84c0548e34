//! Traits for auth provider and country directory integration.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::country::CountryProfile;

use super::events::AuthCredential;

/// Boundary to the external auth provider.
///
/// Both operations are dispatch-only: they return once the request is
/// handed to the provider, and outcomes arrive later as
/// [`ProviderEvent`](super::ProviderEvent)s tagged with `attempt_id` on
/// the session channel.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Start a verification challenge for an E.164 phone number.
    async fn begin_verification(
        &self,
        phone_e164: &str,
        attempt_id: Uuid,
        timeout_seconds: u64,
    ) -> Result<(), String>;

    /// Exchange a completed credential for a signed-in identity.
    async fn exchange_credential(
        &self,
        attempt_id: Uuid,
        credential: AuthCredential,
    ) -> Result<(), String>;
}

/// Boundary to the country directory, possibly network-backed.
#[async_trait]
pub trait CountryDirectory: Send + Sync {
    /// Look up a country by calling code; `None` means no match.
    async fn lookup(&self, calling_code: u16) -> Result<Option<CountryProfile>, String>;
}
