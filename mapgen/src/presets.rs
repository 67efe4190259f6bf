//! Canonical step assemblies for common map styles.

use rand::{Rng, SeedableRng};
use util::GameRng;

use crate::steps::{
    AreaFinder, CellularAutomataSmoothing, ClosestMapAreaConnection,
    MazeGeneration, RandomViewFill, RoomDoorConnection,
    RoomsGeneration, TunnelDeadEndTrimming,
};
use crate::GenerationStep;

fn fork(rng: &mut GameRng) -> GameRng {
    GameRng::seed_from_u64(rng.gen())
}

/// Classic dungeon: rooms on an odd lattice, mazes threading between
/// them, doors opened into each room, dead ends trimmed back.
pub fn dungeon_maze_steps(
    rng: &mut GameRng,
) -> Vec<Box<dyn GenerationStep>> {
    vec![
        Box::new(RoomsGeneration::new().with_rng(fork(rng))),
        Box::new(MazeGeneration::new().with_rng(fork(rng))),
        Box::new(RoomDoorConnection::new().with_rng(fork(rng))),
        Box::new(TunnelDeadEndTrimming::new().with_rng(fork(rng))),
    ]
}

/// Organic cave: random noise smoothed by cellular automata, the
/// resulting chambers found and connected.
pub fn cellular_cave_steps(
    rng: &mut GameRng,
) -> Vec<Box<dyn GenerationStep>> {
    vec![
        Box::new(
            RandomViewFill::new()
                .with_rng(fork(rng))
                .with_fill_probability(40),
        ),
        Box::new(CellularAutomataSmoothing::new()),
        Box::new(AreaFinder::new()),
        Box::new(ClosestMapAreaConnection::new().with_rng(fork(rng))),
    ]
}
