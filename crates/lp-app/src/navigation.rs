//! Navigation controller.
//!
//! Drives [`TransitionStateMachine`] with real timers. The state lives in a
//! watch channel so that readers always see the page and stage together and
//! a navigation request is accepted or rejected atomically.

use std::collections::VecDeque;
use std::sync::Arc;

use futures::future::BoxFuture;
use lp_core::navigation::{
    resolve_render, RenderTarget, TransitionAction, TransitionEvent, TransitionStage,
    TransitionState, TransitionStateMachine, TransitionTimings,
};
use lp_core::ports::ViewportPort;
use lp_core::{Page, User};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info_span, Instrument};

/// Work that runs while the overlay is opaque, before the page swap.
pub type TransitionHook = BoxFuture<'static, ()>;

#[derive(Debug)]
pub enum NavigateOutcome {
    Started(TransitionHandle),
    /// A transition was already in progress.
    Rejected,
}

impl NavigateOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started(_))
    }

    pub fn into_handle(self) -> Option<TransitionHandle> {
        match self {
            Self::Started(handle) => Some(handle),
            Self::Rejected => None,
        }
    }
}

/// Completion handle for one accepted transition.
#[derive(Debug)]
pub struct TransitionHandle {
    task: JoinHandle<()>,
}

impl TransitionHandle {
    /// Wait until the overlay has fully left.
    pub async fn finished(self) {
        if let Err(err) = self.task.await {
            tracing::warn!(error = %err, "transition driver ended abnormally");
        }
    }
}

pub struct NavigationController {
    state_tx: Arc<watch::Sender<TransitionState>>,
    timings: TransitionTimings,
    viewport: Arc<dyn ViewportPort>,
}

impl NavigationController {
    pub fn new(initial: Page, timings: TransitionTimings, viewport: Arc<dyn ViewportPort>) -> Self {
        let (state_tx, _rx) = watch::channel(TransitionState::new(initial));
        Self {
            state_tx: Arc::new(state_tx),
            timings,
            viewport,
        }
    }

    pub fn state(&self) -> TransitionState {
        self.state_tx.borrow().clone()
    }

    pub fn current_page(&self) -> Page {
        self.state_tx.borrow().page
    }

    pub fn stage(&self) -> TransitionStage {
        self.state_tx.borrow().stage
    }

    pub fn timings(&self) -> TransitionTimings {
        self.timings
    }

    pub fn subscribe(&self) -> watch::Receiver<TransitionState> {
        self.state_tx.subscribe()
    }

    /// What should be rendered for the current page given `user`.
    pub fn render_target(&self, user: Option<&User>) -> RenderTarget {
        resolve_render(self.current_page(), user)
    }

    pub fn navigate(&self, target: Page) -> NavigateOutcome {
        self.start(target, &mut None)
    }

    /// Navigate and run `hook` concurrently with the enter hold. The page
    /// swap waits for both.
    pub fn navigate_with(&self, target: Page, hook: TransitionHook) -> NavigateOutcome {
        self.start(target, &mut Some(hook))
    }

    /// Wait for any running transition to settle, then navigate.
    ///
    /// Used for navigations triggered by auth flows, which must not be lost
    /// to a transition the user started a moment earlier.
    pub async fn navigate_when_idle(
        &self,
        target: Page,
        mut hook: Option<TransitionHook>,
    ) -> TransitionHandle {
        let mut rx = self.state_tx.subscribe();
        loop {
            if rx.wait_for(TransitionState::is_idle).await.is_err() {
                debug!("navigation state closed while waiting for idle");
            }
            match self.start(target, &mut hook) {
                NavigateOutcome::Started(handle) => return handle,
                NavigateOutcome::Rejected => {
                    debug!(%target, "lost race for idle navigation slot, retrying");
                }
            }
        }
    }

    /// The hook is only taken when the navigation is accepted.
    fn start(&self, target: Page, hook: &mut Option<TransitionHook>) -> NavigateOutcome {
        let mut actions = Vec::new();
        self.state_tx.send_if_modified(|state| {
            let (next, requested) = TransitionStateMachine::advance(
                state.clone(),
                TransitionEvent::Navigate { target },
            );
            if requested.is_empty() {
                return false;
            }
            *state = next;
            actions = requested;
            true
        });

        if actions.is_empty() {
            debug!(%target, stage = ?self.stage(), "navigation rejected, transition in progress");
            return NavigateOutcome::Rejected;
        }

        let driver = TransitionDriver {
            state_tx: self.state_tx.clone(),
            timings: self.timings,
            viewport: self.viewport.clone(),
        };
        let span = info_span!("transition", %target);
        let task = tokio::spawn(driver.run(actions, hook.take()).instrument(span));
        NavigateOutcome::Started(TransitionHandle { task })
    }
}

struct TransitionDriver {
    state_tx: Arc<watch::Sender<TransitionState>>,
    timings: TransitionTimings,
    viewport: Arc<dyn ViewportPort>,
}

impl TransitionDriver {
    async fn run(self, initial: Vec<TransitionAction>, mut hook: Option<TransitionHook>) {
        let mut pending: VecDeque<TransitionAction> = initial.into();
        while let Some(action) = pending.pop_front() {
            match action {
                TransitionAction::ScheduleEnterHold => {
                    let hold = tokio::time::sleep(self.timings.enter_hold);
                    match hook.take() {
                        Some(hook) => {
                            tokio::join!(hold, hook);
                        }
                        None => hold.await,
                    }
                    pending.extend(self.apply(TransitionEvent::EnterHoldElapsed));
                }
                TransitionAction::SwapPage { page } => {
                    debug!(%page, "page swapped under overlay");
                }
                TransitionAction::ResetScroll => self.viewport.reset_scroll(),
                TransitionAction::ScheduleLeaveHold => {
                    tokio::time::sleep(self.timings.leave_hold).await;
                    pending.extend(self.apply(TransitionEvent::LeaveHoldElapsed));
                }
                TransitionAction::Settled => debug!("transition settled"),
            }
        }
    }

    fn apply(&self, event: TransitionEvent) -> Vec<TransitionAction> {
        let mut actions = Vec::new();
        self.state_tx.send_modify(|state| {
            let (next, requested) = TransitionStateMachine::advance(state.clone(), event);
            *state = next;
            actions = requested;
        });
        actions
    }
}
