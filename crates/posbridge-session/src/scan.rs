//! The scan in progress: state, held caller and deadline.

use crate::dispatcher::ResponseSlot;
use crate::state_machine::{InvalidTransition, ScanState, ScanStateMachine, StateTransition};
use std::collections::VecDeque;
use tokio::time::Instant;
use tracing::debug;

/// Single-shot scan bookkeeping.
///
/// While `Waiting`, the session holds the `scanQRCode` caller's slot and the
/// deadline. Every exit path goes through [`settle`](Self::settle), which
/// hands the slot back exactly once and returns the machine to `Idle`.
#[derive(Debug, Default)]
pub struct ScanSession {
    machine: ScanStateMachine,
    pending: Option<ResponseSlot>,
    deadline: Option<Instant>,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ScanState {
        self.machine.current_state()
    }

    pub fn is_active(&self) -> bool {
        self.machine.is_active()
    }

    pub fn is_waiting(&self) -> bool {
        self.machine.is_waiting()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn history(&self) -> &VecDeque<StateTransition> {
        self.machine.history()
    }

    /// Idle → Armed.
    pub fn arm(&mut self) -> Result<(), InvalidTransition> {
        self.machine.transition_to(ScanState::Armed).map(drop)
    }

    /// Armed → Waiting, holding `slot` until `deadline`.
    pub fn wait(&mut self, slot: ResponseSlot, deadline: Instant) -> Result<(), InvalidTransition> {
        self.machine.transition_to(ScanState::Waiting)?;
        self.pending = Some(slot);
        self.deadline = Some(deadline);
        Ok(())
    }

    /// Move to a terminal `outcome`, then back to Idle.
    ///
    /// Returns the held slot, if any. An outcome that is not reachable from
    /// the current state (for example a timeout after completion) leaves
    /// the session untouched and returns `None`.
    pub fn settle(&mut self, outcome: ScanState) -> Option<ResponseSlot> {
        if let Err(e) = self.machine.transition_to(outcome) {
            debug!(error = %e, "Ignoring scan outcome");
            return None;
        }
        self.machine.reset();
        self.deadline = None;
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::response_slot;
    use posbridge_protocol::{Method, Response, ScanOutcome};
    use std::time::Duration;

    fn waiting() -> (ScanSession, crate::dispatcher::PendingResponse) {
        let mut session = ScanSession::new();
        let (slot, pending) = response_slot(Method::ScanQrCode);
        session.arm().unwrap();
        session
            .wait(slot, Instant::now() + Duration::from_secs(10))
            .unwrap();
        (session, pending)
    }

    #[tokio::test]
    async fn test_settle_returns_slot_once() {
        let (mut session, pending) = waiting();
        assert!(session.is_waiting());
        assert!(session.deadline().is_some());

        let slot = session.settle(ScanState::Completed).unwrap();
        slot.resolve(Response::success(&ScanOutcome::scanned("abc")));

        assert_eq!(session.state(), ScanState::Idle);
        assert!(session.deadline().is_none());
        assert!(session.settle(ScanState::TimedOut).is_none());
        assert_eq!(pending.wait().await.field("data").unwrap(), "abc");
    }

    #[test]
    fn test_second_arm_rejected() {
        let (mut session, _pending) = waiting();
        assert!(session.arm().is_err());
        assert!(session.is_waiting());
    }

    #[test]
    fn test_history_records_full_cycle() {
        let (mut session, _pending) = waiting();
        let _ = session.settle(ScanState::Cancelled);

        let states: Vec<_> = session.history().iter().map(|t| t.to).collect();
        assert_eq!(
            states,
            vec![
                ScanState::Armed,
                ScanState::Waiting,
                ScanState::Cancelled,
                ScanState::Idle
            ]
        );
    }
}
