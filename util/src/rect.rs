use glam::{ivec2, IVec2};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle over grid cells with inclusive extents.
///
/// Both `min` and `max` corner cells are part of the rectangle, so the
/// smallest well-formed rectangle is a single cell with `min == max`.
#[derive(
    Copy, Clone, Default, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
pub struct Rect {
    pub min: IVec2,
    pub max: IVec2,
}

impl Rect {
    /// Create a rectangle from inclusive corner cells.
    pub fn new(min: impl Into<IVec2>, max: impl Into<IVec2>) -> Self {
        let (min, max) = (min.into(), max.into());
        Rect { min, max }
    }

    /// Create a rectangle from a corner cell and cell dimensions.
    pub fn with_size(
        min: impl Into<IVec2>,
        width: i32,
        height: i32,
    ) -> Self {
        let min = min.into();
        Rect {
            min,
            max: min + ivec2(width - 1, height - 1),
        }
    }

    /// The smallest rectangle containing every point in the cloud.
    ///
    /// Returns `None` for an empty cloud.
    pub fn from_points(
        it: impl IntoIterator<Item = IVec2>,
    ) -> Option<Self> {
        let mut it = it.into_iter();
        let p = it.next()?;
        let mut ret = Rect { min: p, max: p };
        for p in it {
            ret = ret.grow_to_contain(p);
        }
        Some(ret)
    }

    pub fn width(&self) -> i32 {
        self.max.x - self.min.x + 1
    }

    pub fn height(&self) -> i32 {
        self.max.y - self.min.y + 1
    }

    pub fn dim(&self) -> IVec2 {
        ivec2(self.width(), self.height())
    }

    /// Number of cells in the rectangle.
    pub fn area(&self) -> usize {
        (self.width().max(0) as usize) * (self.height().max(0) as usize)
    }

    /// Center cell, biased towards `max` on even dimensions.
    pub fn center(&self) -> IVec2 {
        self.min + ivec2(self.width() / 2, self.height() / 2)
    }

    pub fn contains(&self, p: impl Into<IVec2>) -> bool {
        let p = p.into();
        p.x >= self.min.x
            && p.y >= self.min.y
            && p.x <= self.max.x
            && p.y <= self.max.y
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Grow outward by `dx` cells on the left and right sides and `dy`
    /// cells on the top and bottom sides.
    pub fn expand(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            min: self.min - ivec2(dx, dy),
            max: self.max + ivec2(dx, dy),
        }
    }

    pub fn translate(&self, delta: IVec2) -> Rect {
        Rect {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// The smallest rectangle containing both `self` and `p`.
    pub fn grow_to_contain(&self, p: IVec2) -> Rect {
        Rect {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    /// The smallest rectangle containing both rectangles.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Iterate every cell in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = IVec2> {
        let (min, max) = (self.min, self.max);
        (min.y..=max.y)
            .flat_map(move |y| (min.x..=max.x).map(move |x| ivec2(x, y)))
    }

    /// Iterate the cells on the outer rim of the rectangle.
    pub fn perimeter_positions(&self) -> impl Iterator<Item = IVec2> {
        let (min, max) = (self.min, self.max);
        let top = (min.x..=max.x).map(move |x| ivec2(x, min.y));
        let bottom = (min.x..=max.x)
            .map(move |x| ivec2(x, max.y))
            .filter(move |_| max.y != min.y);
        let sides = ((min.y + 1)..max.y).flat_map(move |y| {
            [ivec2(min.x, y)]
                .into_iter()
                .chain((max.x != min.x).then_some(ivec2(max.x, y)))
        });
        top.chain(bottom).chain(sides)
    }

    /// Iterate the cells along the side facing the cardinal direction
    /// `dir`, corners included.
    pub fn edge_positions(&self, dir: IVec2) -> Vec<IVec2> {
        let (min, max) = (self.min, self.max);
        match <[i32; 2]>::from(dir) {
            [0, -1] => (min.x..=max.x).map(|x| ivec2(x, min.y)).collect(),
            [0, 1] => (min.x..=max.x).map(|x| ivec2(x, max.y)).collect(),
            [-1, 0] => (min.y..=max.y).map(|y| ivec2(min.x, y)).collect(),
            [1, 0] => (min.y..=max.y).map(|y| ivec2(max.x, y)).collect(),
            _ => panic!("edge_positions: {dir} is not a cardinal direction"),
        }
    }

    /// Does `p` lie on the rectangle's side facing the cardinal
    /// direction `dir`?
    pub fn is_on_side(&self, p: IVec2, dir: IVec2) -> bool {
        if !self.contains(p) {
            return false;
        }
        match <[i32; 2]>::from(dir) {
            [0, -1] => p.y == self.min.y,
            [0, 1] => p.y == self.max.y,
            [-1, 0] => p.x == self.min.x,
            [1, 0] => p.x == self.max.x,
            _ => panic!("is_on_side: {dir} is not a cardinal direction"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions() {
        let r = Rect::new([1, 2], [4, 4]);
        assert_eq!(r.width(), 4);
        assert_eq!(r.height(), 3);
        assert_eq!(r.area(), 12);
        assert_eq!(r.center(), ivec2(3, 3));
        assert_eq!(Rect::with_size([1, 2], 4, 3), r);
    }

    #[test]
    fn perimeter() {
        let r = Rect::new([0, 0], [4, 3]);
        let rim: Vec<IVec2> = r.perimeter_positions().collect();
        assert_eq!(rim.len() as i32, 2 * r.width() + 2 * r.height() - 4);
        for p in &rim {
            assert!(
                p.x == 0 || p.x == 4 || p.y == 0 || p.y == 3,
                "interior point {p} on perimeter"
            );
        }

        // Single cell has a one-cell perimeter.
        assert_eq!(
            Rect::new([2, 2], [2, 2]).perimeter_positions().count(),
            1
        );
    }

    #[test]
    fn sides() {
        let r = Rect::new([0, 0], [4, 3]);
        assert!(r.is_on_side(ivec2(2, 0), ivec2(0, -1)));
        assert!(!r.is_on_side(ivec2(2, 1), ivec2(0, -1)));
        assert!(r.is_on_side(ivec2(4, 2), ivec2(1, 0)));
        assert_eq!(r.edge_positions(ivec2(0, 1)).len(), 5);
        assert_eq!(r.edge_positions(ivec2(-1, 0)).len(), 4);
    }

    #[test]
    fn expansion_and_bounds() {
        let r = Rect::new([2, 2], [3, 3]);
        assert_eq!(r.expand(1, 2), Rect::new([1, 0], [4, 5]));
        assert_eq!(
            Rect::from_points([ivec2(3, 1), ivec2(-1, 4), ivec2(0, 0)]),
            Some(Rect::new([-1, 0], [3, 4]))
        );
        assert_eq!(Rect::from_points([]), None);
    }
}
