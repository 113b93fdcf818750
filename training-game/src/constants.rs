pub const BOARD_SIZE: usize = 5;
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

// One plane for the player to move, one for the other player.
pub const INPUT_SIZE: usize = CELL_COUNT * 2;
pub const OUTPUT_SIZE: usize = CELL_COUNT;

pub const VISIT_SUM_TOLERANCE: f32 = 1e-4;
