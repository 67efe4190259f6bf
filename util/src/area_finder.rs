use glam::{ivec2, IVec2};

use crate::{AdjacencyRule, Area, GridView, GridViewMut, VecGrid};

/// Partitions a boolean grid view into maximal connected components.
///
/// True cells are members. The visited bitmap persists between
/// `fill_from` calls when requested, so several seeds can be flooded
/// without re-walking earlier components.
pub struct MapAreaFinder {
    adjacency: AdjacencyRule,
    visited: VecGrid<bool>,
}

impl MapAreaFinder {
    pub fn new(adjacency: AdjacencyRule) -> Self {
        MapAreaFinder {
            adjacency,
            visited: VecGrid::new([0, 0]),
        }
    }

    /// Enumerate every connected component of true cells in row-major
    /// seed order.
    pub fn areas(&mut self, view: &impl GridView<bool>) -> Vec<Area> {
        self.visited = VecGrid::new(view.dim());

        let mut ret = Vec::new();
        for y in 0..view.height() {
            for x in 0..view.width() {
                if let Some(area) =
                    self.fill_from(view, ivec2(x, y), false)
                {
                    ret.push(area);
                }
            }
        }
        ret
    }

    /// Flood the component containing `origin`.
    ///
    /// Returns `None` when the origin is not a member cell or has
    /// already been visited. With `clear_visited` false the visit state
    /// is retained from earlier calls; the view must keep its size
    /// between such calls.
    pub fn fill_from(
        &mut self,
        view: &impl GridView<bool>,
        origin: IVec2,
        clear_visited: bool,
    ) -> Option<Area> {
        if clear_visited || self.visited.dim() == ivec2(0, 0) {
            self.visited = VecGrid::new(view.dim());
        } else {
            assert!(
                self.visited.dim() == view.dim(),
                "MapAreaFinder: view resized while retaining visit state"
            );
        }

        if !view.contains(origin)
            || !view.get(origin)
            || self.visited[origin]
        {
            return None;
        }

        // Iterative depth-first flood.
        let mut area = Area::new();
        let mut stack = vec![origin];
        self.visited.set(origin, true);
        while let Some(p) = stack.pop() {
            area.insert(p);
            for n in self.adjacency.neighbors(p) {
                if view.contains(n) && view.get(n) && !self.visited[n] {
                    self.visited.set(n, true);
                    stack.push(n);
                }
            }
        }
        Some(area)
    }
}

/// One-shot component sweep.
pub fn map_areas(
    view: &impl GridView<bool>,
    adjacency: AdjacencyRule,
) -> Vec<Area> {
    MapAreaFinder::new(adjacency).areas(view)
}
