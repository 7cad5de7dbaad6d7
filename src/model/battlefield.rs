//! The one-dimensional battlefield and per-combatant positioning.

use serde::{Deserialize, Serialize};

/// Default battlefield length, meters.
pub const DEFAULT_LENGTH: i32 = 300;

/// Default deployment margin from each end, meters.
pub const DEFAULT_MARGIN: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// Unit direction along the coordinate axis.
    pub fn sign(self) -> i32 {
        match self {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }

    pub fn reversed(self) -> Facing {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// Opaque terrain feature occupying a coordinate span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub position: i32,
    pub width: i32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Battlefield {
    pub length: i32,
    pub margin: i32,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
}

impl Default for Battlefield {
    fn default() -> Self {
        Battlefield {
            length: DEFAULT_LENGTH,
            margin: DEFAULT_MARGIN,
            obstacles: Vec::new(),
        }
    }
}

impl Battlefield {
    pub fn with_length(length: i32) -> Self {
        Battlefield {
            length,
            ..Default::default()
        }
    }

    /// Movement never fails at the edges; coordinates saturate instead.
    pub fn clamp(&self, coordinate: i32) -> i32 {
        coordinate.clamp(0, self.length)
    }

    /// Number of obstacles whose span intersects the open interval between
    /// two coordinates.
    pub fn obstacles_between(&self, a: i32, b: i32) -> usize {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        self.obstacles
            .iter()
            .filter(|o| o.position + o.width > lo && o.position < hi)
            .count()
    }
}

/// Where a combatant stands, which way it faces, and how fast it strides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatPosition {
    pub coordinate: i32,
    pub facing: Facing,
    /// Stride speed in meters per second, fixed at session build.
    pub speed: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_saturates_at_bounds() {
        let field = Battlefield::default();
        assert_eq!(field.clamp(-5), 0);
        assert_eq!(field.clamp(42), 42);
        assert_eq!(field.clamp(9999), DEFAULT_LENGTH);
    }

    #[test]
    fn obstacles_between_is_symmetric() {
        let field = Battlefield {
            obstacles: vec![Obstacle {
                position: 50,
                width: 4,
                label: "wall".into(),
            }],
            ..Default::default()
        };
        assert_eq!(field.obstacles_between(40, 60), 1);
        assert_eq!(field.obstacles_between(60, 40), 1);
        assert_eq!(field.obstacles_between(0, 40), 0);
        assert_eq!(field.obstacles_between(54, 60), 0);
    }
}
