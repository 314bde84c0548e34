//! Unit tests for the session event loop

use std::sync::Arc;

use crate::domain::phone_challenge::NavigationTarget;
use crate::services::verification::{
    Effect, FlowState, ProviderEvent, UiEvent, VerificationFlowConfig, VerificationSession,
};

use super::mocks::{MockAuthGateway, MockCountryDirectory};

fn session_harness(
    gateway: Arc<MockAuthGateway>,
) -> (
    VerificationSession<MockAuthGateway, MockCountryDirectory>,
    crate::services::verification::SessionHandle,
    tokio::sync::mpsc::UnboundedReceiver<Effect>,
) {
    VerificationSession::new(
        gateway,
        Arc::new(MockCountryDirectory::new()),
        VerificationFlowConfig::default(),
    )
}

#[tokio::test]
async fn test_session_stops_on_teardown() {
    let gateway = Arc::new(MockAuthGateway::new());
    let (session, handle, _effects_rx) = session_harness(gateway);

    let run = tokio::spawn(session.run());
    handle.dispatch_ui(UiEvent::PhoneNumberEdited {
        value: "5551234567".to_string(),
    });
    handle.teardown();

    let final_state = run.await.unwrap();
    assert_eq!(final_state, FlowState::Idle);
}

#[tokio::test]
async fn test_dispatch_fails_after_session_stops() {
    let gateway = Arc::new(MockAuthGateway::new());
    let (session, handle, _effects_rx) = session_harness(gateway);

    let run = tokio::spawn(session.run());
    handle.teardown();
    run.await.unwrap();

    assert!(!handle.dispatch_ui(UiEvent::SubmitPhoneNumber));
}

#[tokio::test(start_paused = true)]
async fn test_session_delivers_navigation_through_the_loop() {
    let gateway = Arc::new(MockAuthGateway::new());
    let (session, handle, mut effects_rx) = session_harness(gateway.clone());

    let run = tokio::spawn(session.run());
    handle.dispatch_ui(UiEvent::CountrySelected {
        name: "United States".to_string(),
    });
    handle.dispatch_ui(UiEvent::PhoneNumberEdited {
        value: "5551234567".to_string(),
    });
    handle.dispatch_ui(UiEvent::SubmitPhoneNumber);

    // Wait for the loop to record the begin dispatch
    while gateway.last_begin().is_none() {
        tokio::task::yield_now().await;
    }
    let (_, attempt_id, _) = gateway.last_begin().unwrap();

    handle.dispatch_provider(ProviderEvent::CodeSent {
        attempt_id,
        verification_id: "vid-9".to_string(),
    });

    // The settle delay elapses on the paused clock, the navigation-due
    // event loops back, and the effect comes out the other side
    let effect = effects_rx.recv().await.unwrap();
    assert_eq!(effect, Effect::Navigate(NavigationTarget::CodeEntry));

    handle.teardown();
    assert_eq!(run.await.unwrap(), FlowState::AwaitingCode);
}
