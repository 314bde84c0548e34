//! Single-owner event loop for one verification screen session.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::config::VerificationFlowConfig;
use super::coordinator::{FlowState, VerificationCoordinator};
use super::events::{Effect, ProviderEvent, SessionEvent, UiEvent};
use super::traits::{AuthGateway, CountryDirectory};

/// Sender half handed to the UI layer and the gateway implementation.
///
/// UI events and provider callbacks all funnel into the same channel,
/// so the coordinator applies them strictly in arrival order.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionHandle {
    /// Dispatch a UI event; false once the session has stopped.
    pub fn dispatch_ui(&self, event: UiEvent) -> bool {
        self.tx.send(SessionEvent::Ui(event)).is_ok()
    }

    /// Deliver a provider outcome; false once the session has stopped.
    pub fn dispatch_provider(&self, event: ProviderEvent) -> bool {
        self.tx.send(SessionEvent::Provider(event)).is_ok()
    }

    /// Ask the session to tear down (screen going away).
    pub fn teardown(&self) {
        let _ = self.tx.send(SessionEvent::Teardown);
    }
}

/// Owns the coordinator and drains the session channel.
///
/// All state mutation happens inside [`run`](Self::run) on one task, so
/// no locks are needed anywhere in the flow.
pub struct VerificationSession<G: AuthGateway, D: CountryDirectory> {
    coordinator: VerificationCoordinator<G, D>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl<G: AuthGateway, D: CountryDirectory> VerificationSession<G, D> {
    /// Wire up a session: returns the session itself, the handle for
    /// dispatching events into it, and the receiver of one-shot effects.
    pub fn new(
        gateway: Arc<G>,
        directory: Arc<D>,
        config: VerificationFlowConfig,
    ) -> (Self, SessionHandle, mpsc::UnboundedReceiver<Effect>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (effects_tx, effects_rx) = mpsc::unbounded_channel();
        let coordinator = VerificationCoordinator::new(
            gateway,
            directory,
            config,
            effects_tx,
            events_tx.clone(),
        );
        (
            Self {
                coordinator,
                events_rx,
            },
            SessionHandle { tx: events_tx },
            effects_rx,
        )
    }

    /// Read access to the coordinator, for snapshot assertions.
    pub fn coordinator(&self) -> &VerificationCoordinator<G, D> {
        &self.coordinator
    }

    /// Consume events until verification succeeds or teardown arrives.
    ///
    /// Returns the flow state the session ended in.
    pub async fn run(mut self) -> FlowState {
        while let Some(event) = self.events_rx.recv().await {
            let tearing_down = matches!(&event, SessionEvent::Teardown);
            self.coordinator.handle_session_event(event).await;
            if tearing_down || matches!(self.coordinator.flow(), FlowState::Verified) {
                break;
            }
        }
        self.coordinator.teardown();
        self.coordinator.flow().clone()
    }
}
