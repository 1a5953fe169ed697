//! Scan session state machine.
//!
//! # States
//!
//! - `Idle`: no scan in progress
//! - `Armed`: scanner is being powered up for a scan
//! - `Waiting`: scanner is live and a caller is waiting for a code
//! - `Completed`, `TimedOut`, `Errored`, `Cancelled`: terminal outcomes,
//!   each followed by a return to `Idle`
//!
//! # Valid Transitions
//!
//! - Idle → Armed → Waiting → Completed/TimedOut/Errored/Cancelled → Idle
//! - Armed → Errored/Cancelled → Idle
//!
//! # Examples
//!
//! ```
//! use posbridge_session::{ScanState, ScanStateMachine};
//!
//! let mut machine = ScanStateMachine::new();
//! machine.transition_to(ScanState::Armed).unwrap();
//! machine.transition_to(ScanState::Waiting).unwrap();
//! assert!(machine.is_active());
//!
//! // A scan cannot be re-armed while one is waiting
//! assert!(machine.transition_to(ScanState::Armed).is_err());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

/// Maximum number of transitions kept for diagnostics.
const MAX_HISTORY_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanState {
    Idle,
    Armed,
    Waiting,
    Completed,
    TimedOut,
    Errored,
    Cancelled,
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            ScanState::Idle => "Idle",
            ScanState::Armed => "Armed",
            ScanState::Waiting => "Waiting",
            ScanState::Completed => "Completed",
            ScanState::TimedOut => "TimedOut",
            ScanState::Errored => "Errored",
            ScanState::Cancelled => "Cancelled",
        };
        f.write_str(state_str)
    }
}

impl ScanState {
    pub fn can_transition_to(&self, target: &ScanState) -> bool {
        use ScanState::*;

        matches!(
            (self, target),
            (Idle, Armed)
                | (Armed, Waiting | Errored | Cancelled)
                | (Waiting, Completed | TimedOut | Errored | Cancelled)
                | (Completed | TimedOut | Errored | Cancelled, Idle)
        )
    }

    /// Returns `true` while the scanner is powered for a scan.
    pub fn is_active(&self) -> bool {
        matches!(self, ScanState::Armed | ScanState::Waiting)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScanState::Completed | ScanState::TimedOut | ScanState::Errored | ScanState::Cancelled
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid scan state transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: ScanState,
    pub to: ScanState,
}

/// One recorded state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: ScanState,
    pub to: ScanState,
    pub timestamp: DateTime<Utc>,
}

impl StateTransition {
    pub fn new(from: ScanState, to: ScanState) -> Self {
        Self {
            from,
            to,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug)]
pub struct ScanStateMachine {
    current_state: ScanState,
    history: VecDeque<StateTransition>,
}

impl ScanStateMachine {
    pub fn new() -> Self {
        Self {
            current_state: ScanState::Idle,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn current_state(&self) -> ScanState {
        self.current_state
    }

    pub fn is_active(&self) -> bool {
        self.current_state.is_active()
    }

    pub fn is_waiting(&self) -> bool {
        self.current_state == ScanState::Waiting
    }

    /// Transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    pub fn last_transitions(&self, count: usize) -> Vec<StateTransition> {
        let skip = self.history.len().saturating_sub(count);
        self.history.iter().skip(skip).cloned().collect()
    }

    pub fn transition_to(&mut self, new_state: ScanState) -> Result<StateTransition, InvalidTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(InvalidTransition {
                from: self.current_state,
                to: new_state,
            });
        }

        let transition = StateTransition::new(self.current_state, new_state);
        self.perform_state_change(new_state, transition.clone());
        Ok(transition)
    }

    /// Return to `Idle` from any state.
    ///
    /// Used after terminal states and when the session is torn down mid-scan.
    pub fn reset(&mut self) -> StateTransition {
        let transition = StateTransition::new(self.current_state, ScanState::Idle);
        self.perform_state_change(ScanState::Idle, transition.clone());
        transition
    }

    fn perform_state_change(&mut self, new_state: ScanState, transition: StateTransition) {
        self.current_state = new_state;

        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }
}

impl Default for ScanStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_new_machine_starts_idle() {
        let machine = ScanStateMachine::new();
        assert_eq!(machine.current_state(), ScanState::Idle);
        assert!(machine.history().is_empty());
        assert!(!machine.is_active());
    }

    #[rstest]
    #[case(ScanState::Completed)]
    #[case(ScanState::TimedOut)]
    #[case(ScanState::Errored)]
    #[case(ScanState::Cancelled)]
    fn test_waiting_reaches_every_outcome(#[case] outcome: ScanState) {
        let mut machine = ScanStateMachine::new();
        machine.transition_to(ScanState::Armed).unwrap();
        machine.transition_to(ScanState::Waiting).unwrap();
        machine.transition_to(outcome).unwrap();

        assert!(!machine.is_active());
        assert!(outcome.is_terminal());
        machine.transition_to(ScanState::Idle).unwrap();
    }

    #[rstest]
    #[case(ScanState::Idle, ScanState::Waiting)]
    #[case(ScanState::Idle, ScanState::Completed)]
    #[case(ScanState::Armed, ScanState::Completed)]
    #[case(ScanState::Armed, ScanState::TimedOut)]
    #[case(ScanState::Waiting, ScanState::Armed)]
    #[case(ScanState::Completed, ScanState::Waiting)]
    #[case(ScanState::TimedOut, ScanState::Completed)]
    fn test_invalid_transitions(#[case] from: ScanState, #[case] to: ScanState) {
        assert!(!from.can_transition_to(&to));
    }

    #[test]
    fn test_invalid_transition_leaves_state() {
        let mut machine = ScanStateMachine::new();
        let err = machine.transition_to(ScanState::Completed).unwrap_err();

        assert_eq!(err.from, ScanState::Idle);
        assert_eq!(err.to, ScanState::Completed);
        assert_eq!(err.to_string(), "Invalid scan state transition: Idle -> Completed");
        assert_eq!(machine.current_state(), ScanState::Idle);
        assert!(machine.history().is_empty());
    }

    #[test]
    fn test_reset_from_waiting() {
        let mut machine = ScanStateMachine::new();
        machine.transition_to(ScanState::Armed).unwrap();
        machine.transition_to(ScanState::Waiting).unwrap();

        let transition = machine.reset();
        assert_eq!(transition.from, ScanState::Waiting);
        assert_eq!(machine.current_state(), ScanState::Idle);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut machine = ScanStateMachine::new();
        for _ in 0..40 {
            machine.transition_to(ScanState::Armed).unwrap();
            machine.transition_to(ScanState::Errored).unwrap();
            machine.transition_to(ScanState::Idle).unwrap();
        }

        assert_eq!(machine.history().len(), MAX_HISTORY_SIZE);
        let last = machine.last_transitions(2);
        assert_eq!(last[0].to, ScanState::Errored);
        assert_eq!(last[1].to, ScanState::Idle);
    }

    #[test]
    fn test_active_states() {
        assert!(ScanState::Armed.is_active());
        assert!(ScanState::Waiting.is_active());
        assert!(!ScanState::Idle.is_active());
        assert!(!ScanState::Cancelled.is_active());
    }
}
