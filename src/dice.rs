//! Dice-spec parsing and rolling behind a pluggable roller.
//!
//! Specs are strings of the shape `NdS+B` / `NdS-B` (`1d20+3`, `2d6`).
//! Rolling goes through the [`Roller`] trait so hosts seed the RNG and tests
//! script exact die faces instead of reaching for globals.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::CombatError;

/// Parsed form of a dice spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceSpec {
    pub count: u32,
    pub sides: u32,
    pub bonus: i32,
}

impl DiceSpec {
    pub fn parse(spec: &str) -> Result<Self, CombatError> {
        let s: String = spec.chars().filter(|c| !c.is_whitespace()).collect();
        let d = s
            .find(['d', 'D'])
            .ok_or_else(|| CombatError::Validation(format!("bad dice spec '{spec}'")))?;
        let count: u32 = if d == 0 {
            1
        } else {
            s[..d]
                .parse()
                .map_err(|_| CombatError::Validation(format!("bad dice spec '{spec}'")))?
        };
        let rest = &s[d + 1..];
        let split = rest.find(['+', '-']);
        let (sides_str, bonus) = match split {
            Some(i) => {
                let bonus: i32 = rest[i..]
                    .parse()
                    .map_err(|_| CombatError::Validation(format!("bad dice spec '{spec}'")))?;
                (&rest[..i], bonus)
            }
            None => (rest, 0),
        };
        let sides: u32 = sides_str
            .parse()
            .map_err(|_| CombatError::Validation(format!("bad dice spec '{spec}'")))?;
        if count == 0 || sides == 0 {
            return Err(CombatError::Validation(format!("bad dice spec '{spec}'")));
        }
        Ok(DiceSpec { count, sides, bonus })
    }

    /// Statistical expectation of the spec.
    pub fn average(&self) -> f64 {
        self.count as f64 * (self.sides as f64 + 1.0) / 2.0 + self.bonus as f64
    }
}

impl std::fmt::Display for DiceSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        if self.bonus > 0 {
            write!(f, "+{}", self.bonus)?;
        } else if self.bonus < 0 {
            write!(f, "{}", self.bonus)?;
        }
        Ok(())
    }
}

/// Outcome of rolling a spec: the individual die faces, their sum
/// (`natural`), the flat bonus, and `result = natural + bonus`. `mods`
/// records labeled adjustments layered on top of the spec's own bonus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollResult {
    pub spec: String,
    pub values: Vec<u32>,
    pub natural: i32,
    pub bonus: i32,
    pub result: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mods: Vec<(String, i32)>,
}

impl RollResult {
    /// Build a result from known faces, used when a host supplies explicit
    /// initiative rolls.
    pub fn from_values(spec: &str, values: Vec<u32>, bonus: i32) -> Self {
        let natural: i32 = values.iter().map(|v| *v as i32).sum();
        RollResult {
            spec: spec.to_string(),
            values,
            natural,
            bonus,
            result: natural + bonus,
            mods: Vec::new(),
        }
    }

    /// Attach a labeled modifier, folding it into the final result.
    pub fn with_mod(mut self, label: &str, amount: i32) -> Self {
        self.mods.push((label.to_string(), amount));
        self.result += amount;
        self
    }
}

/// Source of raw die faces. One method keeps scripted implementations
/// trivial; composition into [`RollResult`]s happens in [`roll`].
pub trait Roller {
    fn roll_face(&mut self, sides: u32) -> u32;
}

/// Roll a spec against a roller.
pub fn roll(roller: &mut dyn Roller, spec: &str) -> Result<RollResult, CombatError> {
    let parsed = DiceSpec::parse(spec)?;
    let values: Vec<u32> = (0..parsed.count)
        .map(|_| roller.roll_face(parsed.sides))
        .collect();
    Ok(RollResult::from_values(spec, values, parsed.bonus))
}

/// Expectation of a spec string; scoring heuristics use this instead of
/// sampling.
pub fn average(spec: &str) -> f64 {
    DiceSpec::parse(spec).map(|s| s.average()).unwrap_or(0.0)
}

/// Default roller backed by a small fast RNG. Seedable for reproducible
/// sessions.
#[derive(Debug, Clone)]
pub struct RngRoller {
    rng: SmallRng,
}

impl RngRoller {
    pub fn seeded(seed: u64) -> Self {
        RngRoller {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        RngRoller {
            rng: SmallRng::from_entropy(),
        }
    }
}

impl Roller for RngRoller {
    fn roll_face(&mut self, sides: u32) -> u32 {
        self.rng.gen_range(1..=sides.max(1))
    }
}

/// Scripted roller for tests: replays queued faces in order, then falls
/// back to the midpoint face so an exhausted script cannot wedge a test.
#[derive(Debug, Clone, Default)]
pub struct SequenceRoller {
    queue: VecDeque<u32>,
}

impl SequenceRoller {
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        SequenceRoller {
            queue: faces.into_iter().collect(),
        }
    }

    pub fn push(&mut self, face: u32) {
        self.queue.push_back(face);
    }
}

impl Roller for SequenceRoller {
    fn roll_face(&mut self, sides: u32) -> u32 {
        match self.queue.pop_front() {
            Some(face) => face.clamp(1, sides.max(1)),
            None => (sides / 2).max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_specs() {
        assert_eq!(
            DiceSpec::parse("1d20+3").unwrap(),
            DiceSpec {
                count: 1,
                sides: 20,
                bonus: 3
            }
        );
        assert_eq!(
            DiceSpec::parse("2d6").unwrap(),
            DiceSpec {
                count: 2,
                sides: 6,
                bonus: 0
            }
        );
        assert_eq!(
            DiceSpec::parse("d8-1").unwrap(),
            DiceSpec {
                count: 1,
                sides: 8,
                bonus: -1
            }
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(DiceSpec::parse("banana").is_err());
        assert!(DiceSpec::parse("0d6").is_err());
        assert!(DiceSpec::parse("1d0").is_err());
    }

    #[test]
    fn averages() {
        assert_eq!(average("1d20"), 10.5);
        assert_eq!(average("2d6+3"), 10.0);
    }

    #[test]
    fn seeded_rolls_are_reproducible() {
        let mut a = RngRoller::seeded(99);
        let mut b = RngRoller::seeded(99);
        for _ in 0..32 {
            assert_eq!(a.roll_face(20), b.roll_face(20));
        }
    }

    #[test]
    fn sequence_roller_replays_and_decomposes() {
        let mut roller = SequenceRoller::new([5, 3]);
        let result = roll(&mut roller, "2d6+2").unwrap();
        assert_eq!(result.values, vec![5, 3]);
        assert_eq!(result.natural, 8);
        assert_eq!(result.bonus, 2);
        assert_eq!(result.result, 10);
    }

    #[test]
    fn modifier_ledger_folds_into_result() {
        let result = RollResult::from_values("1d20", vec![12], 0).with_mod("per", 2);
        assert_eq!(result.result, 14);
        assert_eq!(result.mods, vec![("per".to_string(), 2)]);
    }
}
