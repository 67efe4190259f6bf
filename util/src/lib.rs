//! Geometry, grid and container support for the roguekit crates.

mod area;
pub use area::Area;

mod area_finder;
pub use area_finder::{map_areas, MapAreaFinder};

mod disjoint_set;
pub use disjoint_set::{DisjointSet, DisjointSetMapped};

mod geom;
pub use geom::{
    bresenham_line, line, orthogonal_line, s4, s8, AdjacencyRule, Distance,
    LineAlgorithm, VecExt,
};

mod grid;
pub use grid::{GridView, GridViewMut, VecGrid};

pub mod mathx;

mod multi_area;
pub use multi_area::MultiArea;

mod polygon;
pub use polygon::PolygonArea;

mod rect;
pub use rect::Rect;

mod rng;
pub use rng::RngExt;

/// Map with an efficient hash function.
pub use rustc_hash::FxHashMap as HashMap;

/// Set with an efficient hash function.
pub use rustc_hash::FxHashSet as HashSet;

type DefaultHashBuilder = std::hash::BuildHasherDefault<rustc_hash::FxHasher>;

/// Insertion order preserving map with an efficient hash function.
pub type IndexMap<K, V> = indexmap::IndexMap<K, V, DefaultHashBuilder>;

/// Insertion order preserving set with an efficient hash function.
pub type IndexSet<V> = indexmap::IndexSet<V, DefaultHashBuilder>;

/// Good default concrete rng.
pub type GameRng = rand_xorshift::XorShiftRng;
