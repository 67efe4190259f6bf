//! Sense propagation: light, sound, heat and other scalar fields
//! spreading from point sources through a resistance grid.
//!
//! `SenseSource`s compute their spread into private local buffers;
//! a `SenseMap` aggregates every source into one result view and
//! tracks which cells entered or left the sensed field between
//! calculations.

mod map;
pub use map::SenseMap;

mod ripple;
mod shadowcast;

mod source;
pub use source::{
    ResistanceView, RippleType, SenseSource, SpreadAlgorithm,
};
