use super::{GameRecord, MoveSnapshot, Player, Winner};

struct MoveSnapshotWithoutWinner {
    occupied_by_self: Vec<f32>,
    occupied_by_opponent: Vec<f32>,
    visit_distribution: Vec<f32>,
}

/// Accumulates the snapshots of a game as it is played. The winner of each snapshot is only known
/// once the game ends, so it is assigned in `build`.
#[derive(Default)]
pub struct GameRecordBuilder {
    move_snapshots: Vec<MoveSnapshotWithoutWinner>,
    switched_sides: bool,
}

impl GameRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_move(
        &mut self,
        occupied_by_self: Vec<f32>,
        occupied_by_opponent: Vec<f32>,
        visit_distribution: Vec<f32>,
    ) {
        self.move_snapshots.push(MoveSnapshotWithoutWinner {
            occupied_by_self,
            occupied_by_opponent,
            visit_distribution,
        });
    }

    /// The second player took over the opening move (pie rule).
    pub fn record_switched_sides(&mut self) {
        self.switched_sides = true;
    }

    pub fn build(self, winner: Player) -> GameRecord {
        let switched_sides = self.switched_sides;
        let mut player = Player::One;
        let mut move_snapshots = Vec::with_capacity(self.move_snapshots.len());

        for (i, snapshot) in self.move_snapshots.into_iter().enumerate() {
            // After a switch the opening stone belongs to the second player.
            let owner = if i == 0 && switched_sides {
                player.other()
            } else {
                player
            };

            let winner = if owner == winner {
                Winner::Myself
            } else {
                Winner::Opponent
            };

            move_snapshots.push(MoveSnapshot {
                occupied_by_self: snapshot.occupied_by_self,
                occupied_by_opponent: snapshot.occupied_by_opponent,
                visit_distribution: snapshot.visit_distribution,
                winner,
            });

            player = player.other();
        }

        GameRecord::new(move_snapshots, winner, switched_sides)
    }
}
