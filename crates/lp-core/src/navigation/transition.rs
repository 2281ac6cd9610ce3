//! Page transition state machine.
//!
//! Defines a pure transition function for the full-screen overlay that plays
//! between two pages. Timing is owned by the caller: the machine only asks for
//! holds to be scheduled and is told when they have elapsed.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::page::Page;

/// Overlay phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionStage {
    #[default]
    Idle,
    /// Overlay fully opaque, old page still mounted underneath.
    Entering,
    /// New page mounted, overlay animating away.
    Leaving,
}

/// Active page together with the overlay phase.
///
/// The two fields only ever change together through
/// [`TransitionStateMachine::advance`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionState {
    pub stage: TransitionStage,
    pub page: Page,
    /// Target captured by `Navigate`, consumed when the enter hold elapses.
    pub pending: Option<Page>,
}

impl TransitionState {
    pub fn new(page: Page) -> Self {
        Self {
            stage: TransitionStage::Idle,
            page,
            pending: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.stage == TransitionStage::Idle
    }
}

impl Default for TransitionState {
    fn default() -> Self {
        Self::new(Page::Home)
    }
}

/// Events that drive the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    Navigate { target: Page },
    EnterHoldElapsed,
    LeaveHoldElapsed,
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAction {
    /// Start the enter hold timer.
    ScheduleEnterHold,
    /// Mount the new page.
    SwapPage { page: Page },
    /// Scroll the viewport back to the top.
    ResetScroll,
    /// Start the leave hold timer.
    ScheduleLeaveHold,
    /// Overlay is gone, navigation accepted again.
    Settled,
}

/// Hold durations for the two timed phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionTimings {
    pub enter_hold: Duration,
    pub leave_hold: Duration,
}

impl TransitionTimings {
    pub fn total(&self) -> Duration {
        self.enter_hold + self.leave_hold
    }
}

impl Default for TransitionTimings {
    fn default() -> Self {
        Self {
            enter_hold: Duration::from_millis(800),
            leave_hold: Duration::from_millis(900),
        }
    }
}

/// Pure overlay state machine.
pub struct TransitionStateMachine;

impl TransitionStateMachine {
    /// Apply one event.
    ///
    /// Events that do not fit the current stage leave the state untouched and
    /// return no actions. In particular `Navigate` outside `Idle` is rejected.
    pub fn advance(
        state: TransitionState,
        event: TransitionEvent,
    ) -> (TransitionState, Vec<TransitionAction>) {
        match (state.stage, event) {
            (TransitionStage::Idle, TransitionEvent::Navigate { target }) => (
                TransitionState {
                    stage: TransitionStage::Entering,
                    page: state.page,
                    pending: Some(target),
                },
                vec![TransitionAction::ScheduleEnterHold],
            ),
            (TransitionStage::Entering, TransitionEvent::EnterHoldElapsed) => {
                let page = state.pending.unwrap_or(state.page);
                (
                    TransitionState {
                        stage: TransitionStage::Leaving,
                        page,
                        pending: None,
                    },
                    vec![
                        TransitionAction::SwapPage { page },
                        TransitionAction::ResetScroll,
                        TransitionAction::ScheduleLeaveHold,
                    ],
                )
            }
            (TransitionStage::Leaving, TransitionEvent::LeaveHoldElapsed) => (
                TransitionState {
                    stage: TransitionStage::Idle,
                    page: state.page,
                    pending: None,
                },
                vec![TransitionAction::Settled],
            ),
            _ => (state, Vec::new()),
        }
    }
}
