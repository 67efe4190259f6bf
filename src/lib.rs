//! Algorithmic toolkit for 2D grid roguelikes.
//!
//! The work happens in the member crates, re-exported here:
//!
//! - [`util`]: geometry primitives, grid views, areas and polygons,
//!   flood fill and union-find.
//! - [`mapgen`]: the composable staged dungeon generator.
//! - [`sense`]: light/sound/heat propagation from point sources
//!   through resistance grids.

pub use {mapgen, sense, util};
