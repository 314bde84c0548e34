//! Configuration for the verification flow

/// Configuration for the verification flow
#[derive(Debug, Clone)]
pub struct VerificationFlowConfig {
    /// Seconds the provider waits for SMS delivery before timing out
    pub sms_timeout_seconds: u64,
    /// Milliseconds to let the loading indicator settle before the
    /// navigation effect to the code-entry screen fires
    pub navigation_settle_ms: u64,
}

impl Default for VerificationFlowConfig {
    fn default() -> Self {
        Self {
            sms_timeout_seconds: 60,
            navigation_settle_ms: 300,
        }
    }
}
