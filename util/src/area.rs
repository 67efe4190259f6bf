use std::cell::Cell;

use derive_more::Deref;
use glam::IVec2;

use crate::{IndexSet, Rect};

/// An insertion-ordered set of grid cells with a cached bounding
/// rectangle.
///
/// Dereferences to the inner point set for read access; mutation goes
/// through `Area`'s own methods so the bounds cache stays honest.
/// Removals leave the cache loose until the next `bounds` call.
#[derive(Clone, Default, Debug, Deref)]
pub struct Area {
    #[deref]
    points: IndexSet<IVec2>,
    bounds: Cell<Rect>,
    stale_bounds: Cell<bool>,
}

impl Area {
    pub fn new() -> Self {
        Default::default()
    }

    /// Add a point, growing the cached bounds. Returns false if the
    /// point was already present.
    pub fn insert(&mut self, p: impl Into<IVec2>) -> bool {
        let p = p.into();
        if self.points.is_empty() {
            self.bounds.set(Rect { min: p, max: p });
        } else {
            self.bounds.set(self.bounds.get().grow_to_contain(p));
        }
        self.points.insert(p)
    }

    /// Remove a point, preserving the insertion order of the rest.
    /// Returns false if the point was not present.
    pub fn remove(&mut self, p: impl Into<IVec2>) -> bool {
        if self.points.shift_remove(&p.into()) {
            self.stale_bounds.set(true);
            true
        } else {
            false
        }
    }

    /// Drop every point that fails the predicate.
    pub fn retain(&mut self, keep: impl FnMut(&IVec2) -> bool) {
        let before = self.points.len();
        self.points.retain(keep);
        if self.points.len() != before {
            self.stale_bounds.set(true);
        }
    }

    /// The smallest rectangle containing every point.
    ///
    /// Meaningless for an empty area (returns a default rectangle).
    pub fn bounds(&self) -> Rect {
        if self.stale_bounds.get() {
            self.bounds.set(
                Rect::from_points(self.points.iter().copied())
                    .unwrap_or_default(),
            );
            self.stale_bounds.set(false);
        }
        self.bounds.get()
    }

    /// Do any of this area's points fall inside the rectangle?
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        if !self.is_empty() && !self.bounds().intersects(rect) {
            return false;
        }
        self.points.iter().any(|p| rect.contains(*p))
    }

    /// Do the two areas share any point?
    pub fn intersects(&self, other: &Area) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        if !small.is_empty()
            && !large.is_empty()
            && !small.bounds().intersects(&large.bounds())
        {
            return false;
        }
        small.points.iter().any(|p| large.contains(p))
    }

    /// The set of points present in both areas, in `self`'s order.
    pub fn intersection(&self, other: &Area) -> Area {
        self.points
            .iter()
            .filter(|p| other.contains(*p))
            .copied()
            .collect()
    }
}

/// Equality is by point set, insertion order does not matter.
impl PartialEq for Area {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

impl Eq for Area {}

impl Extend<IVec2> for Area {
    fn extend<T: IntoIterator<Item = IVec2>>(&mut self, iter: T) {
        for p in iter {
            self.insert(p);
        }
    }
}

impl FromIterator<IVec2> for Area {
    fn from_iter<T: IntoIterator<Item = IVec2>>(iter: T) -> Self {
        let mut ret = Area::new();
        ret.extend(iter);
        ret
    }
}

impl<'a> IntoIterator for &'a Area {
    type Item = IVec2;
    type IntoIter = std::iter::Copied<indexmap::set::Iter<'a, IVec2>>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use glam::ivec2;

    use super::*;

    #[test]
    fn insertion_order_and_bounds() {
        let mut a = Area::new();
        assert!(a.insert(ivec2(3, 1)));
        assert!(a.insert(ivec2(0, 4)));
        assert!(!a.insert(ivec2(3, 1)));
        assert!(a.insert(ivec2(2, 2)));

        let order: Vec<IVec2> = (&a).into_iter().collect();
        assert_eq!(order, vec![ivec2(3, 1), ivec2(0, 4), ivec2(2, 2)]);
        assert_eq!(a.bounds(), Rect::new([0, 1], [3, 4]));
    }

    #[test]
    fn removal_tightens_bounds() {
        let mut a: Area =
            [ivec2(0, 0), ivec2(5, 5), ivec2(1, 1)].into_iter().collect();
        assert!(a.remove(ivec2(5, 5)));
        assert!(!a.remove(ivec2(5, 5)));
        assert_eq!(a.bounds(), Rect::new([0, 0], [1, 1]));

        a.retain(|p| p.x > 0);
        assert_eq!(a.len(), 1);
        assert_eq!(a.bounds(), Rect::new([1, 1], [1, 1]));
    }

    #[test]
    fn set_equality() {
        let a: Area = [ivec2(1, 1), ivec2(2, 2)].into_iter().collect();
        let b: Area = [ivec2(2, 2), ivec2(1, 1)].into_iter().collect();
        assert_eq!(a, b);
        let c: Area = [ivec2(1, 1)].into_iter().collect();
        assert_ne!(a, c);
    }

    #[test]
    fn intersections() {
        let a: Area = [ivec2(0, 0), ivec2(1, 0)].into_iter().collect();
        let b: Area = [ivec2(1, 0), ivec2(2, 0)].into_iter().collect();
        assert!(a.intersects(&b));
        assert_eq!(
            a.intersection(&b),
            [ivec2(1, 0)].into_iter().collect::<Area>()
        );
        assert!(a.intersects_rect(&Rect::new([1, 0], [4, 4])));
        assert!(!a.intersects_rect(&Rect::new([2, 0], [4, 4])));
    }
}
