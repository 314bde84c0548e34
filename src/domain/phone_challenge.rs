//! In-progress phone verification attempt state.

use serde::{Deserialize, Serialize};

use super::country::CountryProfile;

/// Screens the flow can navigate to once a step completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationTarget {
    /// The six-slot code entry screen
    CodeEntry,
    /// The profile editing screen shown after sign-in
    Profile,
}

/// State of the in-progress phone verification challenge.
///
/// Created empty when the phone-entry screen opens, mutated only by the
/// [`VerificationCoordinator`](crate::services::verification::VerificationCoordinator),
/// and dropped on teardown or once verification succeeds. The UI layer
/// only reads snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneChallengeState {
    /// Country chosen in the picker; the empty sentinel when none is
    pub selected_country: CountryProfile,
    /// National number exactly as typed, without the calling code
    pub raw_phone_number: String,
    /// True while a send-code request is outstanding
    pub is_loading: bool,
    /// True once the provider confirmed the SMS was dispatched
    pub code_sent: bool,
    /// Provider handle for the dispatched code, set by the code-sent event
    pub verification_id: Option<String>,
    /// One-shot navigation intent; set only after `code_sent`, cleared on delivery
    pub pending_navigation: Option<NavigationTarget>,
}

impl Default for PhoneChallengeState {
    fn default() -> Self {
        Self {
            selected_country: CountryProfile::empty(),
            raw_phone_number: String::new(),
            is_loading: false,
            code_sent: false,
            verification_id: None,
            pending_navigation: None,
        }
    }
}

impl PhoneChallengeState {
    /// Creates the empty state for a fresh screen session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Composes the full number as `+{calling_code}{national_number}`.
    ///
    /// `None` when the number is empty or no country is selected; callers
    /// must not start a verification without one.
    pub fn full_number(&self) -> Option<String> {
        if self.raw_phone_number.is_empty() || self.selected_country.is_empty() {
            return None;
        }
        Some(format!(
            "+{}{}",
            self.selected_country.calling_code, self.raw_phone_number
        ))
    }

    /// Takes the pending navigation intent, leaving `None` behind.
    ///
    /// Delivery is exactly-once: a second call returns `None` until the
    /// coordinator schedules a new intent.
    pub fn take_pending_navigation(&mut self) -> Option<NavigationTarget> {
        self.pending_navigation.take()
    }
}
