//! Auth-event stream port
//!
//! The stream is owned by a third party. Subscribers receive events on an
//! unbounded channel and must release the subscription on teardown.

use tokio::sync::mpsc;

use crate::session::AuthEventEnvelope;

pub type AuthEventReceiver = mpsc::UnboundedReceiver<AuthEventEnvelope>;

pub trait AuthEventStreamPort: Send + Sync {
    fn subscribe(&self) -> AuthSubscription;
}

/// Live subscription: the event receiver plus its unsubscribe handle.
pub struct AuthSubscription {
    events: AuthEventReceiver,
    handle: UnsubscribeHandle,
}

impl AuthSubscription {
    pub fn new(events: AuthEventReceiver, unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            events,
            handle: UnsubscribeHandle::new(unsubscribe),
        }
    }

    pub async fn recv(&mut self) -> Option<AuthEventEnvelope> {
        self.events.recv().await
    }

    pub fn into_parts(self) -> (AuthEventReceiver, UnsubscribeHandle) {
        (self.events, self.handle)
    }
}

/// Releases a subscription exactly once, explicitly or on drop.
pub struct UnsubscribeHandle {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl UnsubscribeHandle {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for UnsubscribeHandle {
    fn drop(&mut self) {
        self.release_now();
    }
}
