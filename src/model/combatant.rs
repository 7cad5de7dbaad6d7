//! Per-actor combat state.
//!
//! A `Combatant` is the session-owned slice of an actor: where it stands,
//! what it has left to spend this turn, and who it is squared up against.
//! The world keeps everything else.

use serde::{Deserialize, Serialize};

use crate::ap::{self, TURN_AP};
use crate::dice::RollResult;
use crate::error::CombatError;
use crate::model::actor::{Gauge, LayeredGauge};
use crate::model::battlefield::CombatPosition;

/// Balance bonus granted while defending, cleared at the defender's next
/// turn.
pub const DEFEND_BALANCE_BONUS: f64 = 4.0;

const DEFEND_MOD_LABEL: &str = "defend";

/// A labeled adjustment layered onto a gauge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub label: String,
    pub amount: f64,
}

/// Action Point gauge: natural and effective layers plus modifiers.
/// `eff.cur` is the spendable balance and is always a cleaned multiple of
/// 0.1 within `[0, eff.max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApPool {
    pub nat: Gauge,
    pub eff: Gauge,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mods: Vec<Modifier>,
}

impl ApPool {
    pub fn full() -> Self {
        ApPool {
            nat: Gauge::full(TURN_AP),
            eff: Gauge::full(TURN_AP),
            mods: Vec::new(),
        }
    }

    /// Cleaned spendable balance.
    pub fn remaining(&self) -> f64 {
        ap::clean(self.eff.cur)
    }

    /// Deduct through the fixed-point guards; the stored value is always
    /// the cleaned difference.
    pub fn deduct(&mut self, amount: f64) -> Result<f64, CombatError> {
        let after = ap::deduct(self.eff.cur, amount)?;
        self.eff.cur = after;
        Ok(after)
    }

    /// Refill at the start of the owner's turn.
    pub fn refresh(&mut self) {
        self.eff.cur = self.eff.max;
    }
}

/// Energy reservoir in joules. `position` is the current level within
/// `[0, eff.max]`; `nat`/`eff` are the natural and effective maxima.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyPool {
    pub position: i64,
    pub nat: Gauge,
    pub eff: Gauge,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mods: Vec<Modifier>,
}

impl EnergyPool {
    pub fn full(max: i64) -> Self {
        EnergyPool {
            position: max,
            nat: Gauge::full(max as f64),
            eff: Gauge::full(max as f64),
            mods: Vec::new(),
        }
    }

    /// Exertion drains toward zero and stops there; running dry is fatigue,
    /// not an error.
    pub fn drain(&mut self, joules: i64) {
        self.position = (self.position - joules).max(0);
    }
}

/// Poise gauge. Strikes resolve against the target's effective balance;
/// defending raises it until the defender acts again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalancePool {
    pub nat: f64,
    pub eff: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mods: Vec<Modifier>,
}

impl BalancePool {
    pub fn new(nat: f64) -> Self {
        BalancePool {
            nat,
            eff: nat,
            mods: Vec::new(),
        }
    }

    fn recompute(&mut self) {
        self.eff = self.nat + self.mods.iter().map(|m| m.amount).sum::<f64>();
    }

    /// Install the defend bonus. Re-defending refreshes rather than stacks.
    pub fn install_defend(&mut self) {
        self.mods.retain(|m| m.label != DEFEND_MOD_LABEL);
        self.mods.push(Modifier {
            label: DEFEND_MOD_LABEL.to_string(),
            amount: DEFEND_BALANCE_BONUS,
        });
        self.recompute();
    }

    /// Drop the defend bonus at the owner's next turn.
    pub fn clear_defend(&mut self) {
        self.mods.retain(|m| m.label != DEFEND_MOD_LABEL);
        self.recompute();
    }

    pub fn is_defending(&self) -> bool {
        self.mods.iter().any(|m| m.label == DEFEND_MOD_LABEL)
    }
}

/// Session-owned combat state for one actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combatant {
    /// Owning actor's urn.
    pub actor: String,
    /// Opaque team label; the partition drives victory detection.
    pub team: String,
    pub position: CombatPosition,
    pub ap: ApPool,
    pub energy: EnergyPool,
    pub balance: BalancePool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiative: Option<RollResult>,
    /// Set on exactly one combatant per session.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub did_initiate_combat: bool,
}

impl Combatant {
    pub fn can_act(&self) -> bool {
        self.ap.remaining() > 0.0
    }

    /// Start-of-turn bookkeeping: AP refills, the previous turn's defend
    /// posture lapses.
    pub fn begin_turn(&mut self) {
        self.ap.refresh();
        self.balance.clear_defend();
    }
}
