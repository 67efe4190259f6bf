use std::fmt;
use std::ops::{Index, IndexMut};

use glam::{ivec2, IVec2};
use serde::{Deserialize, Serialize};

/// Read access to a 2D grid of copyable cells.
pub trait GridView<T: Copy> {
    fn dim(&self) -> IVec2;

    /// Value at `pos`. Panics when `pos` is out of bounds.
    fn get(&self, pos: IVec2) -> T;

    fn width(&self) -> i32 {
        self.dim().x
    }

    fn height(&self) -> i32 {
        self.dim().y
    }

    fn contains(&self, pos: IVec2) -> bool {
        let d = self.dim();
        pos.x >= 0 && pos.y >= 0 && pos.x < d.x && pos.y < d.y
    }
}

/// Write access to a 2D grid of copyable cells.
pub trait GridViewMut<T: Copy>: GridView<T> {
    /// Set the value at `pos`. Panics when `pos` is out of bounds.
    fn set(&mut self, pos: IVec2, value: T);

    fn fill(&mut self, value: T) {
        let d = self.dim();
        for y in 0..d.y {
            for x in 0..d.x {
                self.set(ivec2(x, y), value);
            }
        }
    }
}

impl<T: Copy, G: GridView<T> + ?Sized> GridView<T> for &G {
    fn dim(&self) -> IVec2 {
        (**self).dim()
    }

    fn get(&self, pos: IVec2) -> T {
        (**self).get(pos)
    }
}

impl<T: Copy, G: GridView<T> + ?Sized> GridView<T> for &mut G {
    fn dim(&self) -> IVec2 {
        (**self).dim()
    }

    fn get(&self, pos: IVec2) -> T {
        (**self).get(pos)
    }
}

/// Dense row-major grid storage.
#[derive(
    Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize,
)]
pub struct VecGrid<T> {
    dim: IVec2,
    cells: Vec<T>,
}

impl<T: Copy + Default> VecGrid<T> {
    /// Create a grid of default-valued cells.
    pub fn new(dim: impl Into<IVec2>) -> Self {
        let dim = dim.into();
        assert!(dim.x >= 0 && dim.y >= 0, "VecGrid: negative dimensions");
        VecGrid {
            dim,
            cells: vec![T::default(); (dim.x * dim.y) as usize],
        }
    }
}

impl<T: Copy> VecGrid<T> {
    pub fn from_fn(
        dim: impl Into<IVec2>,
        mut f: impl FnMut(IVec2) -> T,
    ) -> Self {
        let dim = dim.into();
        let cells = (0..dim.y)
            .flat_map(|y| (0..dim.x).map(move |x| ivec2(x, y)))
            .map(&mut f)
            .collect();
        VecGrid { dim, cells }
    }

    fn idx(&self, pos: IVec2) -> usize {
        assert!(
            GridView::contains(self, pos),
            "VecGrid: position {pos} outside {} grid",
            self.dim
        );
        (pos.y * self.dim.x + pos.x) as usize
    }

    /// Iterate `(position, value)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, T)> + '_ {
        let w = self.dim.x.max(1);
        self.cells.iter().enumerate().map(move |(i, &c)| {
            (ivec2(i as i32 % w, i as i32 / w), c)
        })
    }
}

impl<T: Copy> GridView<T> for VecGrid<T> {
    fn dim(&self) -> IVec2 {
        self.dim
    }

    fn get(&self, pos: IVec2) -> T {
        self.cells[self.idx(pos)]
    }
}

impl<T: Copy> GridViewMut<T> for VecGrid<T> {
    fn set(&mut self, pos: IVec2, value: T) {
        let i = self.idx(pos);
        self.cells[i] = value;
    }

    fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }
}

impl<T: Copy> Index<IVec2> for VecGrid<T> {
    type Output = T;

    fn index(&self, pos: IVec2) -> &T {
        &self.cells[self.idx(pos)]
    }
}

impl<T: Copy> IndexMut<IVec2> for VecGrid<T> {
    fn index_mut(&mut self, pos: IVec2) -> &mut T {
        let i = self.idx(pos);
        &mut self.cells[i]
    }
}

/// Text dump with `.` for open and `#` for closed cells, for test
/// diagnostics.
impl fmt::Display for VecGrid<bool> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.dim.y {
            for x in 0..self.dim.x {
                write!(f, "{}", if self[ivec2(x, y)] { '.' } else { '#' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set() {
        let mut g: VecGrid<bool> = VecGrid::new([4, 3]);
        assert_eq!(g.dim(), ivec2(4, 3));
        assert!(!g[ivec2(2, 1)]);
        g.set(ivec2(2, 1), true);
        assert!(g.get(ivec2(2, 1)));
        assert!(GridView::contains(&g, ivec2(3, 2)));
        assert!(!GridView::contains(&g, ivec2(4, 0)));

        g.fill(true);
        assert!(g.iter().all(|(_, c)| c));
        assert_eq!(g.iter().count(), 12);
    }

    #[test]
    fn from_fn_layout() {
        let g = VecGrid::from_fn([3, 2], |p| p.x + 10 * p.y);
        assert_eq!(g[ivec2(2, 0)], 2);
        assert_eq!(g[ivec2(1, 1)], 11);
    }

    #[test]
    #[should_panic]
    fn out_of_bounds() {
        let g: VecGrid<i32> = VecGrid::new([2, 2]);
        let _ = g.get(ivec2(2, 0));
    }
}
