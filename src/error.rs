use thiserror::Error;

use crate::session::SessionStatus;

/// Crate-wide error taxonomy. Every failure that can leave the engine
/// carries enough payload for the host to render it against a trace.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CombatError {
    #[error("ap amount {amount} is not a multiple of 0.1")]
    PrecisionViolation { amount: f64 },

    #[error("insufficient ap: need {needed:.1}, have {available:.1}")]
    InsufficientAp { needed: f64, available: f64 },

    #[error("target {target} is out of range: {distance}m exceeds weapon reach of {max_range}m")]
    OutOfRange {
        target: String,
        distance: i32,
        max_range: i32,
    },

    #[error("unknown actor: {0}")]
    UnknownActor(String),

    #[error("ambiguous target '{query}': matches {matches:?}")]
    AmbiguousTarget { query: String, matches: Vec<String> },

    #[error("could not parse intent: {0}")]
    IntentParse(String),

    #[error("illegal transition: cannot {event} while {from:?}")]
    IllegalTransition {
        from: SessionStatus,
        event: &'static str,
    },

    #[error("combatant {0} is already in the session")]
    DuplicateCombatant(String),

    #[error("session needs at least two opposing teams")]
    NoOpposingTeams,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("internal invariant broken: {0}")]
    InternalInvariantBroken(String),
}

impl CombatError {
    /// Stable machine-readable tag for logs and error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            CombatError::PrecisionViolation { .. } => "precision_violation",
            CombatError::InsufficientAp { .. } => "insufficient_ap",
            CombatError::OutOfRange { .. } => "out_of_range",
            CombatError::UnknownActor(_) => "unknown_actor",
            CombatError::AmbiguousTarget { .. } => "ambiguous_target",
            CombatError::IntentParse(_) => "intent_parse_error",
            CombatError::IllegalTransition { .. } => "illegal_transition",
            CombatError::DuplicateCombatant(_) => "duplicate_combatant",
            CombatError::NoOpposingTeams => "no_opposing_teams",
            CombatError::Validation(_) => "validation_failure",
            CombatError::InternalInvariantBroken(_) => "internal_invariant_broken",
        }
    }
}
