//! Plan → Execute → Synthesize → Finish | Replan loop.

pub mod context;
mod joiner;
mod phase;
mod planner;
pub mod prompt;
mod run;

pub use joiner::{extract_answer, parse_joiner_output, Joiner, JoinerOutput};
pub use phase::{LoopPhase, PhaseTracker, PhaseTransition, TransitionError};
pub use planner::{Planner, PlannerConfig};
pub use run::{Compiler, CompilerBuilder, CompilerOutput, DEFAULT_MAX_REPLANS};
