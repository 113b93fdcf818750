use serde::{Deserialize, Serialize};

use super::{InvalidSnapshot, CELL_COUNT, VISIT_SUM_TOLERANCE};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn other(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }
}

/// The eventual winner, from the perspective of the player to move at a snapshot.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Winner {
    #[serde(rename = "SELF")]
    Myself,
    #[serde(rename = "OPPONENT")]
    Opponent,
}

impl Winner {
    pub fn value(self) -> f32 {
        match self {
            Winner::Myself => 1.0,
            Winner::Opponent => -1.0,
        }
    }
}

/// A single decision point of a self-play game.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoveSnapshot {
    pub occupied_by_self: Vec<f32>,
    pub occupied_by_opponent: Vec<f32>,
    pub visit_distribution: Vec<f32>,
    pub winner: Winner,
}

impl MoveSnapshot {
    pub fn validate(&self) -> Result<(), InvalidSnapshot> {
        for (field, values) in [
            ("occupiedBySelf", &self.occupied_by_self),
            ("occupiedByOpponent", &self.occupied_by_opponent),
            ("visitDistribution", &self.visit_distribution),
        ] {
            if values.len() != CELL_COUNT {
                return Err(InvalidSnapshot::WrongLength {
                    field,
                    expected: CELL_COUNT,
                    actual: values.len(),
                });
            }
        }

        if let Some(cell) = self
            .occupied_by_self
            .iter()
            .zip(&self.occupied_by_opponent)
            .position(|(&mine, &theirs)| mine != 0.0 && theirs != 0.0)
        {
            return Err(InvalidSnapshot::DoublyOccupied(cell));
        }

        if let Some(cell) = self.visit_distribution.iter().position(|&p| p < 0.0) {
            return Err(InvalidSnapshot::NegativeVisits(cell));
        }

        let sum = self.visit_distribution.iter().sum::<f32>();
        if (sum - 1.0).abs() > VISIT_SUM_TOLERANCE {
            return Err(InvalidSnapshot::UnnormalizedVisits(sum));
        }

        Ok(())
    }
}

/// A complete recorded self-play game.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    move_snapshots: Vec<MoveSnapshot>,
    winner: Player,
    #[serde(default)]
    switched_sides: bool,
}

impl GameRecord {
    pub fn new(move_snapshots: Vec<MoveSnapshot>, winner: Player, switched_sides: bool) -> Self {
        Self {
            move_snapshots,
            winner,
            switched_sides,
        }
    }

    pub fn move_snapshots(&self) -> &[MoveSnapshot] {
        &self.move_snapshots
    }

    pub fn winner(&self) -> Player {
        self.winner
    }

    pub fn switched_sides(&self) -> bool {
        self.switched_sides
    }

    pub fn len(&self) -> usize {
        self.move_snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.move_snapshots.is_empty()
    }

    /// Checks every snapshot, reporting the index of the first invalid one.
    pub fn validate(&self) -> Result<(), (usize, InvalidSnapshot)> {
        self.move_snapshots
            .iter()
            .enumerate()
            .try_for_each(|(i, s)| s.validate().map_err(|e| (i, e)))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn snapshot() -> MoveSnapshot {
        let mut occupied_by_self = vec![0.0; CELL_COUNT];
        let mut occupied_by_opponent = vec![0.0; CELL_COUNT];
        occupied_by_self[0] = 1.0;
        occupied_by_opponent[24] = 1.0;

        let mut visit_distribution = vec![0.0; CELL_COUNT];
        visit_distribution[12] = 0.75;
        visit_distribution[13] = 0.25;

        MoveSnapshot {
            occupied_by_self,
            occupied_by_opponent,
            visit_distribution,
            winner: Winner::Myself,
        }
    }

    #[test]
    fn test_valid_snapshot() {
        let snapshot = snapshot();

        assert_eq!(snapshot.validate(), Ok(()));
        assert_eq!(snapshot.occupied_by_self.len(), CELL_COUNT);
        assert_eq!(snapshot.occupied_by_opponent.len(), CELL_COUNT);
        assert_approx_eq!(snapshot.visit_distribution.iter().sum::<f32>(), 1.0, 1e-6);
    }

    #[test]
    fn test_wrong_length() {
        let mut snapshot = snapshot();
        snapshot.occupied_by_opponent.pop();

        assert_eq!(
            snapshot.validate(),
            Err(InvalidSnapshot::WrongLength {
                field: "occupiedByOpponent",
                expected: CELL_COUNT,
                actual: CELL_COUNT - 1
            })
        );
    }

    #[test]
    fn test_doubly_occupied() {
        let mut snapshot = snapshot();
        snapshot.occupied_by_opponent[0] = 1.0;

        assert_eq!(snapshot.validate(), Err(InvalidSnapshot::DoublyOccupied(0)));
    }

    #[test]
    fn test_unnormalized_visits() {
        let mut snapshot = snapshot();
        snapshot.visit_distribution[13] = 0.5;

        assert!(matches!(
            snapshot.validate(),
            Err(InvalidSnapshot::UnnormalizedVisits(_))
        ));
    }

    #[test]
    fn test_negative_visits() {
        let mut snapshot = snapshot();
        snapshot.visit_distribution[12] = 1.25;
        snapshot.visit_distribution[13] = -0.25;

        assert_eq!(snapshot.validate(), Err(InvalidSnapshot::NegativeVisits(13)));
    }

    #[test]
    fn test_record_reports_invalid_snapshot_index() {
        let mut bad = snapshot();
        bad.visit_distribution = vec![0.0; CELL_COUNT];
        let record = GameRecord::new(vec![snapshot(), bad], Player::One, false);

        assert!(matches!(record.validate(), Err((1, _))));
    }

    #[test]
    fn test_winner_serializes_from_players_perspective() {
        let json = serde_json::to_string(&snapshot()).unwrap();

        assert!(json.contains(r#""winner":"SELF""#));
        assert!(json.contains("occupiedBySelf"));
        assert!(json.contains("visitDistribution"));
    }

    #[test]
    fn test_switched_sides_defaults_to_false() {
        let json = r#"{"moveSnapshots":[],"winner":"Two"}"#;
        let record: GameRecord = serde_json::from_str(json).unwrap();

        assert!(!record.switched_sides());
        assert!(record.is_empty());
        assert_eq!(record.winner(), Player::Two);
    }
}
