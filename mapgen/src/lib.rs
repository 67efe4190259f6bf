//! Composable staged map generation.
//!
//! A `Generator` owns a `GenerationContext`, a typed and tagged bag of
//! map components, and drives a list of `GenerationStep`s over it.
//! Steps communicate only through the context; the canonical component
//! tags are in `tags`.

mod context;
pub use context::{GenerationContext, Handle, StageObserver};

mod error;
pub use error::{GenerationError, StepError};

mod generator;
pub use generator::Generator;

mod items;
pub use items::{DoorList, ItemList, RoomDoors};

pub mod presets;

mod step;
pub use step::{ComponentRequirement, GenerationStep};

pub mod steps;

/// Canonical component tags shared between the bundled steps.
pub mod tags {
    /// Boolean passability grid, true is floor.
    pub const WALL_FLOOR: &str = "WallFloor";
    /// `ItemList<Rect>` of carved room interiors.
    pub const ROOMS: &str = "Rooms";
    /// `ItemList<Area>` of general walkable areas.
    pub const AREAS: &str = "Areas";
    /// `ItemList<Area>` of corridors.
    pub const TUNNELS: &str = "Tunnels";
    /// `ItemList<Area>` staging list for connector output.
    pub const MAZE_CONNECTIONS: &str = "MazeConnections";
    /// `DoorList` of recorded room openings.
    pub const DOORS: &str = "Doors";
}
