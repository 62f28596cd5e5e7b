//! Compiler loop phases and their legal transitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPhase {
    Plan,
    Execute,
    Synthesize,
    Replan,
    Finish,
}

#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("invalid transition from {from:?} to {to:?}")]
    InvalidTransition { from: LoopPhase, to: LoopPhase },
    #[error("cannot transition from terminal phase {phase:?}")]
    FromTerminalPhase { phase: LoopPhase },
}

pub struct PhaseTransition;

impl PhaseTransition {
    pub fn validate(from: LoopPhase, to: LoopPhase) -> Result<(), TransitionError> {
        if Self::is_terminal(from) {
            return Err(TransitionError::FromTerminalPhase { phase: from });
        }

        let is_valid = matches!(
            (from, to),
            (LoopPhase::Plan, LoopPhase::Execute)
                | (LoopPhase::Execute, LoopPhase::Synthesize)
                | (LoopPhase::Synthesize, LoopPhase::Finish)
                | (LoopPhase::Synthesize, LoopPhase::Replan)
                | (LoopPhase::Replan, LoopPhase::Plan)
        );

        if is_valid {
            Ok(())
        } else {
            Err(TransitionError::InvalidTransition { from, to })
        }
    }

    pub fn is_terminal(phase: LoopPhase) -> bool {
        matches!(phase, LoopPhase::Finish)
    }
}

/// Current phase of one compiler run; every move is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTracker {
    current: LoopPhase,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self {
            current: LoopPhase::Plan,
        }
    }

    pub fn current(&self) -> LoopPhase {
        self.current
    }

    pub fn advance(&mut self, to: LoopPhase) -> Result<(), TransitionError> {
        PhaseTransition::validate(self.current, to)?;
        self.current = to;
        Ok(())
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_cycle() {
        let mut tracker = PhaseTracker::new();
        for phase in [
            LoopPhase::Execute,
            LoopPhase::Synthesize,
            LoopPhase::Replan,
            LoopPhase::Plan,
            LoopPhase::Execute,
            LoopPhase::Synthesize,
            LoopPhase::Finish,
        ] {
            tracker.advance(phase).unwrap();
        }
        assert_eq!(tracker.current(), LoopPhase::Finish);
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(PhaseTransition::validate(LoopPhase::Plan, LoopPhase::Synthesize).is_err());
        assert!(PhaseTransition::validate(LoopPhase::Execute, LoopPhase::Replan).is_err());
        assert!(matches!(
            PhaseTransition::validate(LoopPhase::Finish, LoopPhase::Plan),
            Err(TransitionError::FromTerminalPhase { .. })
        ));
    }
}
