//! Assembled/dispersed state machine.
//!
//! Level-triggered with two dominant inputs: an open palm disperses, a closed
//! fist assembles, every other reported gesture (including none) holds the
//! current state. There is no terminal state.

use tinsel_hand_model::{Gesture, HandState, MacroState};

/// A state change produced by [`MacroStateController::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroTransition {
    pub from: MacroState,
    pub to: MacroState,
    pub trigger: Gesture,
}

#[derive(Debug, Clone, Default)]
pub struct MacroStateController {
    state: MacroState,
}

impl MacroStateController {
    /// Starts assembled.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_in(state: MacroState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> MacroState {
        self.state
    }

    /// Evaluate one stabilized hand state. Returns the transition, if any.
    pub fn apply(&mut self, hand: &HandState) -> Option<MacroTransition> {
        let next = match hand.gesture {
            Gesture::OpenPalm => MacroState::Dispersed,
            Gesture::ClosedFist => MacroState::Assembled,
            _ => return None,
        };
        if next == self.state {
            return None;
        }

        let transition = MacroTransition {
            from: self.state,
            to: next,
            trigger: hand.gesture,
        };
        self.state = next;
        tracing::info!(
            from = ?transition.from,
            to = ?transition.to,
            trigger = %transition.trigger,
            "Macro state transition"
        );
        Some(transition)
    }
}
