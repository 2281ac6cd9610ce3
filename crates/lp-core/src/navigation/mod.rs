//! Navigation domain: overlay state machine and render guard.

pub mod guard;
pub mod transition;

pub use guard::{resolve_render, RenderTarget};
pub use transition::{
    TransitionAction, TransitionEvent, TransitionStage, TransitionState, TransitionStateMachine,
    TransitionTimings,
};
