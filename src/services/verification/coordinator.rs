//! The verification coordinator state machine.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::domain::code_entry::CodeEntryState;
use crate::domain::country;
use crate::domain::phone_challenge::{NavigationTarget, PhoneChallengeState};
use crate::errors::{ExchangeFailureKind, FlowError};

use super::config::VerificationFlowConfig;
use super::events::{AuthCredential, Effect, ProviderEvent, SessionEvent, UiEvent};
use super::traits::{AuthGateway, CountryDirectory};

/// Position of the flow in the verification protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    /// Nothing submitted yet
    Idle,
    /// A send-code request is outstanding at the provider
    SendingCode,
    /// The SMS was dispatched; waiting on the user to enter the code
    AwaitingCode,
    /// A credential exchange is outstanding at the provider
    Verifying,
    /// Signed in; terminal for this flow instance
    Verified,
    /// A step failed; `retryable` tells whether entered data survives
    Failed { retryable: bool, reason: String },
}

/// One credential exchange in flight at the provider.
///
/// Created when the coordinator dispatches an exchange, dropped when the
/// provider resolves it. At most one exists at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationAttempt {
    /// Full E.164 number being verified
    pub phone_number: String,
    /// Provider handle for the dispatched SMS; absent on the instant path
    pub verification_id: Option<String>,
    /// The code the user entered; absent on the instant path
    pub submitted_code: Option<String>,
    /// When the exchange was dispatched
    pub started_at: DateTime<Utc>,
}

/// State machine driving the phone verification flow.
///
/// One coordinator belongs to one screen session. It exclusively owns
/// the challenge and code-entry state; the UI layer reads snapshots and
/// dispatches events, and asynchronous provider outcomes arrive as
/// [`ProviderEvent`]s on the same timeline. Effects leave through the
/// one-shot effect channel.
pub struct VerificationCoordinator<G: AuthGateway, D: CountryDirectory> {
    gateway: Arc<G>,
    directory: Arc<D>,
    config: VerificationFlowConfig,
    challenge: PhoneChallengeState,
    code_entry: CodeEntryState,
    flow: FlowState,
    /// Identity of the current challenge; provider events not bearing it
    /// are stale and dropped
    attempt_id: Option<Uuid>,
    in_flight: Option<VerificationAttempt>,
    effects_tx: mpsc::UnboundedSender<Effect>,
    /// Loops scheduled events (the settle delay) back onto the session
    /// timeline so all mutation stays sequential
    loopback_tx: mpsc::UnboundedSender<SessionEvent>,
    settle_task: Option<JoinHandle<()>>,
    torn_down: bool,
}

impl<G: AuthGateway, D: CountryDirectory> VerificationCoordinator<G, D> {
    /// Create a coordinator for a fresh screen session.
    pub fn new(
        gateway: Arc<G>,
        directory: Arc<D>,
        config: VerificationFlowConfig,
        effects_tx: mpsc::UnboundedSender<Effect>,
        loopback_tx: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            gateway,
            directory,
            config,
            challenge: PhoneChallengeState::new(),
            code_entry: CodeEntryState::new(),
            flow: FlowState::Idle,
            attempt_id: None,
            in_flight: None,
            effects_tx,
            loopback_tx,
            settle_task: None,
            torn_down: false,
        }
    }

    /// Snapshot of the challenge state for rendering.
    pub fn challenge(&self) -> &PhoneChallengeState {
        &self.challenge
    }

    /// Snapshot of the code-entry slots for rendering.
    pub fn code_entry(&self) -> &CodeEntryState {
        &self.code_entry
    }

    /// Current position in the flow.
    pub fn flow(&self) -> &FlowState {
        &self.flow
    }

    /// The exchange currently in flight, if any.
    pub fn in_flight(&self) -> Option<&VerificationAttempt> {
        self.in_flight.as_ref()
    }

    /// Apply one session event in arrival order.
    pub async fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Ui(event) => self.handle_ui_event(event).await,
            SessionEvent::Provider(event) => self.handle_provider_event(event).await,
            SessionEvent::NavigationDue { attempt_id } => self.handle_navigation_due(attempt_id),
            SessionEvent::Teardown => self.teardown(),
        }
    }

    /// Apply one UI event.
    pub async fn handle_ui_event(&mut self, event: UiEvent) {
        if self.torn_down {
            return;
        }
        match event {
            UiEvent::CountrySelected { name } => self.country_selected(&name),
            UiEvent::CallingCodeEntered { calling_code } => {
                self.calling_code_entered(calling_code).await
            }
            UiEvent::PhoneNumberEdited { value } => self.challenge.raw_phone_number = value,
            UiEvent::CodeSlotEdited { position, value } => {
                self.code_slot_edited(position, &value).await
            }
            UiEvent::SubmitPhoneNumber => self.submit_phone_number().await,
            UiEvent::SubmitCode => self.submit_code().await,
        }
    }

    /// Apply one provider event; stale events are dropped.
    pub async fn handle_provider_event(&mut self, event: ProviderEvent) {
        if self.torn_down {
            return;
        }
        if self.attempt_id != Some(event.attempt_id()) {
            tracing::warn!(
                event_attempt_id = %event.attempt_id(),
                event = "stale_event_dropped",
                "Dropping provider event from a superseded attempt"
            );
            return;
        }
        match event {
            ProviderEvent::CodeSent {
                verification_id, ..
            } => self.on_code_sent(verification_id),
            ProviderEvent::InstantCompleted { credential, .. } => {
                self.on_instant_completed(credential).await
            }
            ProviderEvent::SendFailed { reason, .. } => self.on_send_failed(reason),
            ProviderEvent::ExchangeSucceeded { user_id, .. } => self.on_exchange_succeeded(user_id),
            ProviderEvent::ExchangeFailed { kind, .. } => self.on_exchange_failed(kind),
        }
    }

    /// Deliver the navigation intent scheduled after code-sent.
    ///
    /// Guarded by the attempt id so a delay scheduled for a superseded
    /// attempt cannot navigate.
    pub fn handle_navigation_due(&mut self, attempt_id: Uuid) {
        if self.torn_down || self.attempt_id != Some(attempt_id) {
            return;
        }
        if let Some(target) = self.challenge.take_pending_navigation() {
            tracing::debug!(
                destination = ?target,
                event = "navigation_delivered",
                "Delivering navigation effect"
            );
            self.emit(Effect::Navigate(target));
        }
    }

    /// Stop the session: cancel the pending settle delay and ignore all
    /// further events so nothing mutates state after the screen is gone.
    pub fn teardown(&mut self) {
        if let Some(task) = self.settle_task.take() {
            task.abort();
        }
        self.torn_down = true;
        tracing::debug!(event = "session_teardown", "Verification session torn down");
    }

    fn country_selected(&mut self, name: &str) {
        // A miss assigns the empty sentinel, deselecting the calling code
        self.challenge.selected_country = country::find_by_name(name);
    }

    async fn calling_code_entered(&mut self, calling_code: u16) {
        match self.directory.lookup(calling_code).await {
            Ok(Some(profile)) => {
                tracing::debug!(
                    calling_code = calling_code,
                    country = %profile.name,
                    "Resolved country from calling code"
                );
                self.challenge.selected_country = profile;
            }
            // Absence leaves the selection unchanged
            Ok(None) => {
                tracing::debug!(calling_code = calling_code, "No country for calling code");
            }
            Err(e) => {
                tracing::warn!(
                    calling_code = calling_code,
                    error = %e,
                    "Country directory lookup failed"
                );
            }
        }
    }

    async fn submit_phone_number(&mut self) {
        // At most one attempt per session may be active; repeat submits
        // while one is in progress are ignored
        if matches!(
            self.flow,
            FlowState::SendingCode | FlowState::AwaitingCode | FlowState::Verifying
        ) {
            tracing::debug!(
                state = ?self.flow,
                event = "submit_ignored",
                "Phone submit ignored while a verification is in progress"
            );
            return;
        }

        let Some(full_number) = self.challenge.full_number() else {
            let err = FlowError::InputInvalid {
                message: "phone number and country are required".to_string(),
            };
            self.emit(Effect::ShowError {
                message: err.display_message(),
            });
            return;
        };

        if let Some(task) = self.settle_task.take() {
            task.abort();
        }

        let attempt_id = Uuid::new_v4();
        self.attempt_id = Some(attempt_id);
        self.in_flight = None;
        self.flow = FlowState::SendingCode;
        self.challenge.is_loading = true;
        self.challenge.code_sent = false;
        self.challenge.verification_id = None;
        self.challenge.pending_navigation = None;
        // Any lingering digits belong to a previous challenge's code
        self.code_entry.clear();

        tracing::info!(
            phone = %full_number,
            attempt_id = %attempt_id,
            event = "begin_verification",
            "Starting phone verification"
        );

        if let Err(e) = self
            .gateway
            .begin_verification(&full_number, attempt_id, self.config.sms_timeout_seconds)
            .await
        {
            tracing::error!(
                attempt_id = %attempt_id,
                error = %e,
                event = "begin_verification_failed",
                "Failed to dispatch verification request"
            );
            self.challenge.is_loading = false;
            let err = FlowError::ProviderFailure { reason: e };
            self.flow = FlowState::Failed {
                retryable: true,
                reason: err.display_message(),
            };
            self.emit(Effect::ShowError {
                message: err.display_message(),
            });
        }
    }

    async fn code_slot_edited(&mut self, position: usize, value: &str) {
        self.code_entry.set_slot(position, value);
        // Completing the sixth slot submits without a button press.
        // While Verifying the flow is not AwaitingCode, so slot edits
        // cannot re-trigger submission.
        if self.flow == FlowState::AwaitingCode && self.code_entry.is_complete() {
            self.submit_code().await;
        }
    }

    async fn submit_code(&mut self) {
        if self.flow == FlowState::Verifying {
            tracing::debug!(
                event = "duplicate_submit_dropped",
                "Credential exchange already in flight"
            );
            return;
        }
        if self.flow != FlowState::AwaitingCode {
            tracing::debug!(state = ?self.flow, "Code submit outside AwaitingCode ignored");
            return;
        }
        // A partial code is never submittable
        let Some(code) = self.code_entry.as_code() else {
            return;
        };
        let (Some(attempt_id), Some(verification_id)) =
            (self.attempt_id, self.challenge.verification_id.clone())
        else {
            tracing::warn!("Code submitted without an active challenge");
            return;
        };

        self.in_flight = Some(VerificationAttempt {
            phone_number: self.challenge.full_number().unwrap_or_default(),
            verification_id: Some(verification_id.clone()),
            submitted_code: Some(code.clone()),
            started_at: Utc::now(),
        });
        self.flow = FlowState::Verifying;

        tracing::info!(
            attempt_id = %attempt_id,
            verification_id = %verification_id,
            event = "exchange_credential",
            "Submitting verification code for credential exchange"
        );

        let credential = AuthCredential::SmsCode {
            verification_id,
            code,
        };
        if let Err(e) = self.gateway.exchange_credential(attempt_id, credential).await {
            self.exchange_dispatch_failed(e);
        }
    }

    fn on_code_sent(&mut self, verification_id: String) {
        if self.flow != FlowState::SendingCode {
            tracing::debug!(state = ?self.flow, "Code-sent event ignored outside SendingCode");
            return;
        }
        tracing::info!(
            verification_id = %verification_id,
            event = "code_sent",
            "SMS dispatched by provider"
        );
        self.challenge.verification_id = Some(verification_id);
        self.challenge.code_sent = true;
        self.challenge.is_loading = false;
        self.challenge.pending_navigation = Some(NavigationTarget::CodeEntry);
        self.flow = FlowState::AwaitingCode;
        self.schedule_navigation();
    }

    /// Let the loading indicator settle, then loop a navigation-due
    /// event back onto the session timeline. Abortable so teardown can
    /// cancel it.
    fn schedule_navigation(&mut self) {
        let Some(attempt_id) = self.attempt_id else {
            return;
        };
        let tx = self.loopback_tx.clone();
        let settle = Duration::from_millis(self.config.navigation_settle_ms);
        self.settle_task = Some(tokio::spawn(async move {
            tokio::time::sleep(settle).await;
            let _ = tx.send(SessionEvent::NavigationDue { attempt_id });
        }));
    }

    fn on_send_failed(&mut self, reason: String) {
        if self.flow != FlowState::SendingCode {
            tracing::debug!(state = ?self.flow, "Send-failed event ignored outside SendingCode");
            return;
        }
        tracing::warn!(
            reason = %reason,
            event = "verification_send_failed",
            "Provider failed to dispatch the verification SMS"
        );
        self.challenge.is_loading = false;
        let err = FlowError::ProviderFailure { reason };
        self.flow = FlowState::Failed {
            retryable: true,
            reason: err.display_message(),
        };
        self.emit(Effect::ShowError {
            message: err.display_message(),
        });
    }

    async fn on_instant_completed(&mut self, credential: AuthCredential) {
        // A manual submit and an instant completion describe the same
        // underlying attempt; whichever reaches Verifying first wins
        if self.flow == FlowState::Verifying {
            tracing::debug!(
                event = "instant_completed_dropped",
                "Credential exchange already in flight"
            );
            return;
        }
        if !matches!(self.flow, FlowState::SendingCode | FlowState::AwaitingCode) {
            return;
        }
        let Some(attempt_id) = self.attempt_id else {
            return;
        };

        tracing::info!(
            attempt_id = %attempt_id,
            event = "instant_verification",
            "Provider verified the number without a manual code"
        );

        self.challenge.is_loading = false;
        self.in_flight = Some(VerificationAttempt {
            phone_number: self.challenge.full_number().unwrap_or_default(),
            verification_id: self.challenge.verification_id.clone(),
            submitted_code: None,
            started_at: Utc::now(),
        });
        self.flow = FlowState::Verifying;

        if let Err(e) = self.gateway.exchange_credential(attempt_id, credential).await {
            self.exchange_dispatch_failed(e);
        }
    }

    fn on_exchange_succeeded(&mut self, user_id: String) {
        if self.flow != FlowState::Verifying {
            tracing::debug!(state = ?self.flow, "Exchange-succeeded event ignored outside Verifying");
            return;
        }
        tracing::info!(
            user_id = %user_id,
            event = "exchange_succeeded",
            "Credential exchange succeeded, user signed in"
        );
        self.in_flight = None;
        self.attempt_id = None;
        self.challenge.is_loading = false;
        self.flow = FlowState::Verified;
        self.emit(Effect::Navigate(NavigationTarget::Profile));
    }

    fn on_exchange_failed(&mut self, kind: ExchangeFailureKind) {
        if self.flow != FlowState::Verifying {
            tracing::debug!(state = ?self.flow, "Exchange-failed event ignored outside Verifying");
            return;
        }
        self.in_flight = None;

        if kind.keeps_code_entry() {
            // Wrong code: stay on code entry with the slots untouched so
            // the user can correct a single digit
            tracing::warn!(
                event = "invalid_code",
                "Credential exchange rejected the verification code"
            );
            self.flow = FlowState::AwaitingCode;
            self.emit(Effect::ShowError {
                message: FlowError::InvalidCredential.display_message(),
            });
            return;
        }

        tracing::error!(
            kind = %kind,
            event = "exchange_failed",
            "Credential exchange failed fatally"
        );
        self.attempt_id = None;
        self.challenge.is_loading = false;
        let err = FlowError::FatalAuthFailure {
            reason: kind.to_string(),
        };
        self.flow = FlowState::Failed {
            retryable: false,
            reason: err.display_message(),
        };
        self.emit(Effect::ShowError {
            message: err.display_message(),
        });
    }

    /// The exchange never reached the provider; keep the entered code
    /// and let the user resubmit from the code-entry screen.
    fn exchange_dispatch_failed(&mut self, reason: String) {
        tracing::error!(
            error = %reason,
            event = "exchange_dispatch_failed",
            "Failed to dispatch credential exchange"
        );
        self.in_flight = None;
        self.flow = FlowState::AwaitingCode;
        let err = FlowError::ProviderFailure { reason };
        self.emit(Effect::ShowError {
            message: err.display_message(),
        });
    }

    fn emit(&self, effect: Effect) {
        // The receiver disappearing just means the screen is gone
        let _ = self.effects_tx.send(effect);
    }
}

impl<G: AuthGateway, D: CountryDirectory> Drop for VerificationCoordinator<G, D> {
    fn drop(&mut self) {
        if let Some(task) = self.settle_task.take() {
            task.abort();
        }
    }
}
