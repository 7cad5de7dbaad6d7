//! The action union dispatched by the executor.
//!
//! Actions are data, not behavior: the parser and planner both emit them,
//! the executor matches on `command` and calls into the combat API. A
//! primitive strike travels as `attack` with `args.primitive = true`, which
//! keeps the command vocabulary stable on the wire.

use serde::{Deserialize, Serialize};

use crate::ap::ALL_REMAINING_AP;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    Target,
    Advance,
    Retreat,
    Attack,
    Defend,
    Cleave,
    Done,
}

/// How a movement amount is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoveMode {
    Ap,
    Distance,
    Max,
}

/// Cost attached to an action at build time so consumers never re-derive
/// it. AP in seconds (0.1 grid), energy in joules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ActionCost {
    pub ap: f64,
    pub energy: i64,
}

/// Validated argument payload. Only resolved actor urns, enumerated
/// literals, and bounded numbers ever land here; raw intent text does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ActionArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<MoveMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Marks a primitive strike carried under the `attack` command.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub primitive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub command: CommandType,
    #[serde(default)]
    pub args: ActionArgs,
    #[serde(default)]
    pub cost: ActionCost,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

impl Action {
    pub fn new(command: CommandType) -> Self {
        Action {
            command,
            args: ActionArgs::default(),
            cost: ActionCost::default(),
            trace: None,
        }
    }

    pub fn target(target: &str) -> Self {
        let mut action = Action::new(CommandType::Target);
        action.args.target = Some(target.to_string());
        action
    }

    pub fn movement(command: CommandType, mode: MoveMode, value: f64) -> Self {
        let mut action = Action::new(command);
        action.args.mode = Some(mode);
        action.args.value = Some(value);
        action
    }

    /// Movement spending whatever is left, the parse of a bare
    /// `advance`/`retreat`.
    pub fn movement_all_remaining(command: CommandType) -> Self {
        Action::movement(command, MoveMode::Ap, ALL_REMAINING_AP)
    }

    pub fn strike(target: Option<&str>) -> Self {
        let mut action = Action::new(CommandType::Attack);
        action.args.primitive = true;
        action.args.target = target.map(str::to_string);
        action
    }

    pub fn attack(target: Option<&str>) -> Self {
        let mut action = Action::new(CommandType::Attack);
        action.args.target = target.map(str::to_string);
        action
    }

    pub fn defend() -> Self {
        Action::new(CommandType::Defend)
    }

    pub fn cleave() -> Self {
        Action::new(CommandType::Cleave)
    }

    pub fn done() -> Self {
        Action::new(CommandType::Done)
    }

    pub fn with_cost(mut self, ap: f64, energy: i64) -> Self {
        self.cost = ActionCost { ap, energy };
        self
    }

    pub fn with_trace(mut self, trace: &str) -> Self {
        self.trace = Some(trace.to_string());
        self
    }
}
