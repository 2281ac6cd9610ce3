//! In-process auth event fan-out.
//!
//! The HTTP backend publishes sign-in and sign-out echoes here; the shell
//! subscribes through [`AuthEventStreamPort`].

use std::sync::{Arc, Mutex};

use lp_core::ports::{AuthEventStreamPort, AuthSubscription};
use lp_core::session::{AuthEvent, AuthEventEnvelope, AuthSession};
use tokio::sync::mpsc;
use tracing::debug;

type Subscribers = Vec<(u64, mpsc::UnboundedSender<AuthEventEnvelope>)>;

#[derive(Default)]
struct HubState {
    next_id: u64,
    subscribers: Subscribers,
}

#[derive(Clone, Default)]
pub struct AuthEventHub {
    state: Arc<Mutex<HubState>>,
}

impl AuthEventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every live subscriber.
    pub fn publish(&self, event: AuthEvent, session: Option<AuthSession>) {
        let envelope = AuthEventEnvelope::new(event, session);
        let mut state = self.lock();
        state
            .subscribers
            .retain(|(_, tx)| tx.send(envelope.clone()).is_ok());
        debug!(?event, subscribers = state.subscribers.len(), "auth event published");
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AuthEventStreamPort for AuthEventHub {
    fn subscribe(&self) -> AuthSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = {
            let mut state = self.lock();
            let id = state.next_id;
            state.next_id += 1;
            state.subscribers.push((id, tx));
            id
        };

        let state = Arc::downgrade(&self.state);
        AuthSubscription::new(rx, move || {
            if let Some(state) = state.upgrade() {
                let mut state = state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                state.subscribers.retain(|(existing, _)| *existing != id);
                debug!(subscription = id, "auth event subscription released");
            }
        })
    }
}
