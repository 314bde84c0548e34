//! End-to-end tests for the verification session against a scripted
//! auth provider.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use couplechat_core::domain::country::{CountryProfile, COUNTRIES};
use couplechat_core::{
    AuthCredential, AuthGateway, CountryDirectory, Effect, FlowState, NavigationTarget,
    ProviderEvent, SessionHandle, UiEvent, VerificationFlowConfig, VerificationSession,
};

/// Scripted provider: acknowledges every begin request and judges the
/// submitted code against a fixed expected value, replying through the
/// session handle like the real callback-based provider would.
struct FakeProvider {
    expected_code: String,
    instant: bool,
    handle: Mutex<Option<SessionHandle>>,
    begin_phones: Mutex<Vec<String>>,
}

impl FakeProvider {
    fn new(expected_code: &str) -> Self {
        Self {
            expected_code: expected_code.to_string(),
            instant: false,
            handle: Mutex::new(None),
            begin_phones: Mutex::new(Vec::new()),
        }
    }

    fn instant(expected_code: &str) -> Self {
        Self {
            instant: true,
            ..Self::new(expected_code)
        }
    }

    fn set_handle(&self, handle: SessionHandle) {
        *self.handle.lock().unwrap() = Some(handle);
    }

    fn reply(&self, event: ProviderEvent) {
        if let Some(handle) = self.handle.lock().unwrap().as_ref() {
            handle.dispatch_provider(event);
        }
    }
}

#[async_trait]
impl AuthGateway for FakeProvider {
    async fn begin_verification(
        &self,
        phone_e164: &str,
        attempt_id: Uuid,
        _timeout_seconds: u64,
    ) -> Result<(), String> {
        self.begin_phones.lock().unwrap().push(phone_e164.to_string());
        if self.instant {
            self.reply(ProviderEvent::InstantCompleted {
                attempt_id,
                credential: AuthCredential::Instant {
                    token: "instant-token".to_string(),
                },
            });
        } else {
            self.reply(ProviderEvent::CodeSent {
                attempt_id,
                verification_id: "vid-1".to_string(),
            });
        }
        Ok(())
    }

    async fn exchange_credential(
        &self,
        attempt_id: Uuid,
        credential: AuthCredential,
    ) -> Result<(), String> {
        let accepted = match credential {
            AuthCredential::SmsCode {
                verification_id,
                code,
            } => verification_id == "vid-1" && code == self.expected_code,
            AuthCredential::Instant { .. } => true,
        };
        if accepted {
            self.reply(ProviderEvent::ExchangeSucceeded {
                attempt_id,
                user_id: "user-1".to_string(),
            });
        } else {
            self.reply(ProviderEvent::ExchangeFailed {
                attempt_id,
                kind: couplechat_core::ExchangeFailureKind::InvalidCredential,
            });
        }
        Ok(())
    }
}

/// Directory backed by the static table, as the app uses in tests.
struct TableDirectory;

#[async_trait]
impl CountryDirectory for TableDirectory {
    async fn lookup(&self, calling_code: u16) -> Result<Option<CountryProfile>, String> {
        Ok(COUNTRIES
            .iter()
            .find(|c| c.calling_code == calling_code)
            .cloned())
    }
}

fn start_session(
    provider: Arc<FakeProvider>,
) -> (
    tokio::task::JoinHandle<FlowState>,
    SessionHandle,
    tokio::sync::mpsc::UnboundedReceiver<Effect>,
) {
    let (session, handle, effects_rx) = VerificationSession::new(
        provider.clone(),
        Arc::new(TableDirectory),
        VerificationFlowConfig::default(),
    );
    provider.set_handle(handle.clone());
    (tokio::spawn(session.run()), handle, effects_rx)
}

fn enter_phone(handle: &SessionHandle) {
    handle.dispatch_ui(UiEvent::CountrySelected {
        name: "United States".to_string(),
    });
    handle.dispatch_ui(UiEvent::PhoneNumberEdited {
        value: "5551234567".to_string(),
    });
    handle.dispatch_ui(UiEvent::SubmitPhoneNumber);
}

fn enter_code(handle: &SessionHandle, digits: &str) {
    for (i, digit) in digits.chars().enumerate() {
        handle.dispatch_ui(UiEvent::CodeSlotEdited {
            position: i + 1,
            value: digit.to_string(),
        });
    }
}

#[tokio::test(start_paused = true)]
async fn test_full_flow_reaches_profile_after_correcting_code() {
    let provider = Arc::new(FakeProvider::new("424242"));
    let (run, handle, mut effects_rx) = start_session(provider.clone());

    enter_phone(&handle);

    // The settle delay elapses on the paused clock, then the flow moves
    // to the code-entry screen
    assert_eq!(
        effects_rx.recv().await.unwrap(),
        Effect::Navigate(NavigationTarget::CodeEntry)
    );
    assert_eq!(
        provider.begin_phones.lock().unwrap().clone(),
        vec!["+15551234567".to_string()]
    );

    // Wrong last digit: rejected, flow stays on code entry
    enter_code(&handle, "424241");
    match effects_rx.recv().await.unwrap() {
        Effect::ShowError { message } => assert!(message.contains("Invalid verification code")),
        other => panic!("expected error effect, got {:?}", other),
    }

    // Correct the sixth slot in place; completion auto-submits again
    handle.dispatch_ui(UiEvent::CodeSlotEdited {
        position: 6,
        value: "2".to_string(),
    });
    assert_eq!(
        effects_rx.recv().await.unwrap(),
        Effect::Navigate(NavigationTarget::Profile)
    );

    assert_eq!(run.await.unwrap(), FlowState::Verified);
}

#[tokio::test(start_paused = true)]
async fn test_instant_verification_skips_code_entry() {
    let provider = Arc::new(FakeProvider::instant("424242"));
    let (run, handle, mut effects_rx) = start_session(provider);

    enter_phone(&handle);

    // Straight to the profile screen, no code-entry navigation
    assert_eq!(
        effects_rx.recv().await.unwrap(),
        Effect::Navigate(NavigationTarget::Profile)
    );
    assert_eq!(run.await.unwrap(), FlowState::Verified);
}

#[tokio::test(start_paused = true)]
async fn test_teardown_mid_flow_never_navigates() {
    let provider = Arc::new(FakeProvider::new("424242"));
    let (run, handle, mut effects_rx) = start_session(provider.clone());

    enter_phone(&handle);
    // Let the loop absorb the code-sent reply, then tear down before
    // the settle delay elapses
    while provider.begin_phones.lock().unwrap().is_empty() {
        tokio::task::yield_now().await;
    }
    handle.teardown();

    let final_state = run.await.unwrap();
    assert_eq!(final_state, FlowState::AwaitingCode);

    // No effect was delivered after the screen went away
    assert!(effects_rx.try_recv().is_err());
}
