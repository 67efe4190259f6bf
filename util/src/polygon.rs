use std::rc::Rc;

use anyhow::{ensure, Result};
use glam::{ivec2, IVec2};

use crate::{geom, Area, LineAlgorithm, MultiArea, Rect};

/// An immutable polygon rasterized onto the grid.
///
/// Holds the corner list, the rasterized outer edge (one sub-area per
/// side) and the even-odd interior fill. Transforms return new polygons
/// built from transformed corners.
#[derive(Clone, Debug)]
pub struct PolygonArea {
    corners: Vec<IVec2>,
    algorithm: LineAlgorithm,
    outer: MultiArea,
    inner: Rc<Area>,
    points: MultiArea,
}

impl PolygonArea {
    /// Build a polygon from at least three corners. Sides run between
    /// consecutive corners, last back to first.
    pub fn new(
        corners: impl IntoIterator<Item = IVec2>,
        algorithm: LineAlgorithm,
    ) -> Result<Self> {
        let corners: Vec<IVec2> = corners.into_iter().collect();
        ensure!(
            corners.len() >= 3,
            "polygon needs at least 3 corners, got {}",
            corners.len()
        );

        let n = corners.len();
        let outer: MultiArea = (0..n)
            .map(|i| {
                geom::line(corners[i], corners[(i + 1) % n], algorithm)
                    .into_iter()
                    .collect::<Area>()
            })
            .collect();

        let inner = Rc::new(Self::fill_interior(&corners, &outer));

        let mut points = outer.clone();
        points.push(inner.clone());

        Ok(PolygonArea {
            corners,
            algorithm,
            outer,
            inner,
            points,
        })
    }

    /// Scanline even-odd fill between the rasterized sides.
    fn fill_interior(corners: &[IVec2], outer: &MultiArea) -> Area {
        let n = corners.len();
        let bounds = Rect::from_points(corners.iter().copied())
            .expect("polygon corners missing");

        let mut inner = Area::new();
        // The top and bottom rows of the bounding box are all edge, so
        // only rows strictly between them can hold interior points.
        for y in (bounds.min.y + 1)..bounds.max.y {
            // Distinct side indices crossed so far on this row.
            let mut crossed: Vec<usize> = Vec::new();
            for x in bounds.min.x..bounds.max.x {
                let p = ivec2(x, y);
                if outer.contains(p) {
                    for (i, side) in outer.parts().iter().enumerate() {
                        if !side.contains(&p) {
                            continue;
                        }
                        // A side only counts as crossed when it
                        // continues above this scanline.
                        let above = corners[i].y < y
                            || corners[(i + 1) % n].y < y;
                        if above && !crossed.contains(&i) {
                            crossed.push(i);
                        }
                    }
                } else if crossed.len() % 2 == 1 {
                    inner.insert(p);
                }
            }
        }
        inner
    }

    /// Rebuild from transformed corners; infallible since the corner
    /// count is preserved.
    fn rebuilt(&self, corners: Vec<IVec2>) -> PolygonArea {
        PolygonArea::new(corners, self.algorithm)
            .expect("PolygonArea: corner count changed in transform")
    }

    pub fn corners(&self) -> &[IVec2] {
        &self.corners
    }

    pub fn algorithm(&self) -> LineAlgorithm {
        self.algorithm
    }

    /// The rasterized sides, one sub-area per side in declaration
    /// order.
    pub fn outer_points(&self) -> &MultiArea {
        &self.outer
    }

    /// The even-odd interior.
    pub fn inner_points(&self) -> &Area {
        &self.inner
    }

    /// Outer edge and interior combined.
    pub fn points(&self) -> &MultiArea {
        &self.points
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_points(self.corners.iter().copied())
            .expect("polygon corners missing")
    }

    pub fn contains(&self, p: IVec2) -> bool {
        self.points.contains(p)
    }

    /// Total point count, outer sides plus interior. Corner cells
    /// shared by two sides count once per side.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Cyclic equality: true when `other`'s corner list is a rotation
    /// of this polygon's. Reversed (mirror image) corner order does not
    /// match.
    pub fn matches(&self, other: &PolygonArea) -> bool {
        let n = self.corners.len();
        if n != other.corners.len() {
            return false;
        }
        let Some(start) =
            other.corners.iter().position(|&c| c == self.corners[0])
        else {
            return false;
        };
        (0..n).all(|i| self.corners[i] == other.corners[(start + i) % n])
    }

    // Transforms.

    pub fn translate(&self, delta: IVec2) -> PolygonArea {
        self.rebuilt(self.corners.iter().map(|&c| c + delta).collect())
    }

    /// Rotate clockwise (in screen coordinates) around the center of
    /// the bounding box.
    pub fn rotate(&self, degrees: f64) -> PolygonArea {
        self.rotate_around(degrees, self.bounds().center())
    }

    pub fn rotate_around(
        &self,
        degrees: f64,
        origin: IVec2,
    ) -> PolygonArea {
        let theta = degrees.rem_euclid(360.0).to_radians();
        let (sin, cos) = theta.sin_cos();
        self.rebuilt(
            self.corners
                .iter()
                .map(|&c| {
                    let dx = (c.x - origin.x) as f64;
                    let dy = (c.y - origin.y) as f64;
                    origin
                        + ivec2(
                            (dx * cos - dy * sin).round() as i32,
                            (dx * sin + dy * cos).round() as i32,
                        )
                })
                .collect(),
        )
    }

    /// Mirror across the vertical line `x = axis_x`.
    pub fn flip_horizontal(&self, axis_x: i32) -> PolygonArea {
        self.rebuilt(
            self.corners
                .iter()
                .map(|&c| ivec2(2 * axis_x - c.x, c.y))
                .collect(),
        )
    }

    /// Mirror across the horizontal line `y = axis_y`.
    pub fn flip_vertical(&self, axis_y: i32) -> PolygonArea {
        self.rebuilt(
            self.corners
                .iter()
                .map(|&c| ivec2(c.x, 2 * axis_y - c.y))
                .collect(),
        )
    }

    /// Swap x and y relative to `origin`.
    pub fn transpose(&self, origin: IVec2) -> PolygonArea {
        self.rebuilt(
            self.corners
                .iter()
                .map(|&c| {
                    let d = c - origin;
                    origin + ivec2(d.y, d.x)
                })
                .collect(),
        )
    }

    // Shape constructors.

    /// Polygon tracing the rectangle's perimeter, corners in clockwise
    /// screen order starting from `min`.
    pub fn rectangle(
        rect: Rect,
        algorithm: LineAlgorithm,
    ) -> Result<PolygonArea> {
        PolygonArea::new(
            [
                rect.min,
                ivec2(rect.max.x, rect.min.y),
                rect.max,
                ivec2(rect.min.x, rect.max.y),
            ],
            algorithm,
        )
    }

    /// Parallelogram with a horizontal top and bottom and a +x shear.
    /// Extends downward (+y) from `origin` when `from_top`, upward
    /// otherwise.
    pub fn parallelogram(
        origin: IVec2,
        width: i32,
        height: i32,
        from_top: bool,
        algorithm: LineAlgorithm,
    ) -> Result<PolygonArea> {
        let dy = if from_top { height } else { -height };
        PolygonArea::new(
            [
                origin,
                origin + ivec2(width, 0),
                origin + ivec2(width + height, dy),
                origin + ivec2(height, dy),
            ],
            algorithm,
        )
    }

    /// Regular polygon with corner 0 on the +x axis from `center`,
    /// corners proceeding clockwise in screen coordinates.
    pub fn regular_polygon(
        center: IVec2,
        corners: usize,
        radius: f64,
        algorithm: LineAlgorithm,
    ) -> Result<PolygonArea> {
        ensure!(corners >= 3, "regular polygon needs at least 3 corners");
        ensure!(radius > 0.0, "regular polygon radius must be positive");

        let step = std::f64::consts::TAU / corners as f64;
        PolygonArea::new(
            (0..corners).map(|i| {
                let theta = step * i as f64;
                center
                    + ivec2(
                        (radius * theta.cos()).round() as i32,
                        (radius * theta.sin()).round() as i32,
                    )
            }),
            algorithm,
        )
    }

    /// Star with `points` spikes, alternating between `outer_radius`
    /// and `inner_radius` corners.
    pub fn regular_star(
        center: IVec2,
        points: usize,
        outer_radius: f64,
        inner_radius: f64,
        algorithm: LineAlgorithm,
    ) -> Result<PolygonArea> {
        ensure!(points >= 3, "star needs at least 3 points");
        ensure!(
            outer_radius > 0.0 && inner_radius > 0.0,
            "star radii must be positive"
        );

        let step = std::f64::consts::TAU / (2 * points) as f64;
        PolygonArea::new(
            (0..2 * points).map(|i| {
                let r = if i % 2 == 0 { outer_radius } else { inner_radius };
                let theta = step * i as f64;
                center
                    + ivec2(
                        (r * theta.cos()).round() as i32,
                        (r * theta.sin()).round() as i32,
                    )
            }),
            algorithm,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_rasterization() {
        let p = PolygonArea::rectangle(
            Rect::with_size([0, 0], 5, 3),
            LineAlgorithm::Bresenham,
        )
        .unwrap();

        assert_eq!(
            p.corners(),
            &[ivec2(0, 0), ivec2(4, 0), ivec2(4, 2), ivec2(0, 2)]
        );
        assert_eq!(p.outer_points().part_count(), 4);
        assert_eq!(
            p.inner_points(),
            &[ivec2(1, 1), ivec2(2, 1), ivec2(3, 1)]
                .into_iter()
                .collect::<Area>()
        );
        assert_eq!(p.bounds(), Rect::with_size([0, 0], 5, 3));
    }

    #[test]
    fn outer_and_inner_disjoint() {
        let p = PolygonArea::regular_polygon(
            ivec2(10, 10),
            5,
            6.0,
            LineAlgorithm::Bresenham,
        )
        .unwrap();

        for q in p.inner_points() {
            assert!(!p.outer_points().contains(q));
        }
        assert_eq!(
            p.len(),
            p.outer_points().len() + p.inner_points().len()
        );

        // No interior on the bounding box's top and bottom rows.
        let bounds = p.bounds();
        for q in p.inner_points() {
            assert!(q.y > bounds.min.y && q.y < bounds.max.y);
        }
    }

    #[test]
    fn cyclic_matching() {
        let a = PolygonArea::new(
            [ivec2(0, 0), ivec2(4, 0), ivec2(4, 4), ivec2(0, 4)],
            LineAlgorithm::Bresenham,
        )
        .unwrap();
        let rotated = PolygonArea::new(
            [ivec2(4, 4), ivec2(0, 4), ivec2(0, 0), ivec2(4, 0)],
            LineAlgorithm::Bresenham,
        )
        .unwrap();
        let reversed = PolygonArea::new(
            [ivec2(0, 4), ivec2(4, 4), ivec2(4, 0), ivec2(0, 0)],
            LineAlgorithm::Bresenham,
        )
        .unwrap();

        assert!(a.matches(&rotated));
        assert!(rotated.matches(&a));
        assert!(!a.matches(&reversed));
    }

    #[test]
    fn transforms_return_new_polygons() {
        let p = PolygonArea::rectangle(
            Rect::with_size([0, 0], 3, 3),
            LineAlgorithm::Bresenham,
        )
        .unwrap();

        let moved = p.translate(ivec2(10, 0));
        assert_eq!(p.bounds(), Rect::with_size([0, 0], 3, 3));
        assert_eq!(moved.bounds(), Rect::with_size([10, 0], 3, 3));

        // A square rotated a quarter turn around its center maps onto
        // itself as a point set.
        let turned = p.rotate(90.0);
        assert_eq!(turned.bounds(), p.bounds());

        let flipped = p.flip_horizontal(0);
        assert_eq!(flipped.bounds(), Rect::with_size([-2, 0], 3, 3));
        let transposed = p.transpose(ivec2(0, 0));
        assert_eq!(transposed.bounds(), p.bounds());
    }

    #[test]
    fn degenerate_construction_fails() {
        assert!(PolygonArea::new(
            [ivec2(0, 0), ivec2(1, 1)],
            LineAlgorithm::Bresenham
        )
        .is_err());
        assert!(PolygonArea::regular_polygon(
            ivec2(0, 0),
            6,
            -2.0,
            LineAlgorithm::Bresenham
        )
        .is_err());
        assert!(PolygonArea::regular_star(
            ivec2(0, 0),
            5,
            5.0,
            -1.0,
            LineAlgorithm::Bresenham
        )
        .is_err());
    }

    #[test]
    fn star_has_expected_corner_count() {
        let star = PolygonArea::regular_star(
            ivec2(20, 20),
            5,
            8.0,
            3.0,
            LineAlgorithm::Bresenham,
        )
        .unwrap();
        assert_eq!(star.corners().len(), 10);
        assert_eq!(star.outer_points().part_count(), 10);
    }
}
