use glam::{ivec2, IVec2};
use serde::{Deserialize, Serialize};

/// 4-directional grid space using taxicab metric.
pub mod s4 {
    use glam::{ivec2, IVec2};

    /// 4-dirs in clock face order.
    pub const DIR: [IVec2; 4] =
        [ivec2(0, -1), ivec2(1, 0), ivec2(0, 1), ivec2(-1, 0)];

    /// Taxicab distance metric.
    pub fn d(a: &IVec2, b: &IVec2) -> i32 {
        let c = (*a - *b).abs();
        c.x + c.y
    }

    /// List the cardinal neighbors of a cell in clock face order.
    pub fn ns(p: IVec2) -> impl Iterator<Item = IVec2> {
        DIR.iter().map(move |&d| p + d)
    }
}

/// 8-directional grid space using chessboard metric.
pub mod s8 {
    use glam::{ivec2, IVec2};

    /// 8-dirs in clock face order.
    pub const DIR: [IVec2; 8] = [
        ivec2(0, -1),
        ivec2(1, -1),
        ivec2(1, 0),
        ivec2(1, 1),
        ivec2(0, 1),
        ivec2(-1, 1),
        ivec2(-1, 0),
        ivec2(-1, -1),
    ];

    pub const DIAGONALS: [IVec2; 4] =
        [ivec2(1, -1), ivec2(1, 1), ivec2(-1, 1), ivec2(-1, -1)];

    /// Chessboard distance metric.
    pub fn d(a: &IVec2, b: &IVec2) -> i32 {
        let c = (*a - *b).abs();
        c.x.max(c.y)
    }

    /// List the eight-way neighbors of a cell in clock face order.
    pub fn ns(p: IVec2) -> impl Iterator<Item = IVec2> {
        DIR.iter().map(move |&d| p + d)
    }
}

pub trait VecExt: Sized {
    /// Absolute size of vector in taxicab metric.
    fn taxi_len(&self) -> i32;

    /// Absolute size of vector in chessboard metric.
    fn chess_len(&self) -> i32;

    /// Vec points to an adjacent cell, left, right, up or down.
    fn is_adjacent(&self) -> bool {
        self.taxi_len() == 1
    }
}

impl VecExt for IVec2 {
    fn taxi_len(&self) -> i32 {
        self.x.abs() + self.y.abs()
    }

    fn chess_len(&self) -> i32 {
        self.x.abs().max(self.y.abs())
    }
}

/// Which cells count as neighbors of a given cell.
#[derive(
    Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
pub enum AdjacencyRule {
    Cardinals,
    Diagonals,
    EightWay,
}

impl AdjacencyRule {
    /// Directions to the neighbors of a cell, in clock face order.
    pub fn directions(self) -> &'static [IVec2] {
        match self {
            AdjacencyRule::Cardinals => &s4::DIR,
            AdjacencyRule::Diagonals => &s8::DIAGONALS,
            AdjacencyRule::EightWay => &s8::DIR,
        }
    }

    /// List the neighbors of a cell in clock face order.
    pub fn neighbors(self, p: IVec2) -> impl Iterator<Item = IVec2> {
        self.directions().iter().map(move |&d| p + d)
    }
}

/// Distance metric over the grid.
#[derive(
    Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
pub enum Distance {
    Manhattan,
    Chebyshev,
    Euclid,
}

impl Distance {
    pub fn measure(self, a: IVec2, b: IVec2) -> f64 {
        self.measure_delta(b - a)
    }

    pub fn measure_delta(self, delta: IVec2) -> f64 {
        self.measure_delta_f(delta.x as f64, delta.y as f64)
    }

    pub fn measure_delta_f(self, dx: f64, dy: f64) -> f64 {
        match self {
            Distance::Manhattan => dx.abs() + dy.abs(),
            Distance::Chebyshev => dx.abs().max(dy.abs()),
            Distance::Euclid => dx.hypot(dy),
        }
    }

    /// The adjacency rule under which distance-1 cells are the neighbors.
    pub fn adjacency(self) -> AdjacencyRule {
        match self {
            Distance::Manhattan => AdjacencyRule::Cardinals,
            _ => AdjacencyRule::EightWay,
        }
    }
}

/// Line rasterization flavor.
#[derive(
    Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
pub enum LineAlgorithm {
    /// 8-connected line.
    Bresenham,
    /// 4-connected line that only takes cardinal steps.
    Orthogonal,
}

/// Rasterize the line from `a` to `b` with the given algorithm.
pub fn line(a: IVec2, b: IVec2, algorithm: LineAlgorithm) -> Vec<IVec2> {
    match algorithm {
        LineAlgorithm::Bresenham => bresenham_line(a, b),
        LineAlgorithm::Orthogonal => orthogonal_line(a, b),
    }
}

/// Rasterize an 8-connected line from `a` to `b`, both endpoints
/// included.
pub fn bresenham_line(a: IVec2, b: IVec2) -> Vec<IVec2> {
    let d = (b - a).abs();
    let step = ivec2((b.x - a.x).signum(), (b.y - a.y).signum());

    let mut ret = Vec::with_capacity((d.x.max(d.y) + 1) as usize);
    let mut p = a;
    let mut err = d.x - d.y;
    loop {
        ret.push(p);
        if p == b {
            break;
        }
        let e2 = 2 * err;
        if e2 > -d.y {
            err -= d.y;
            p.x += step.x;
        }
        if e2 < d.x {
            err += d.x;
            p.y += step.y;
        }
    }
    ret
}

/// Rasterize a 4-connected line from `a` to `b`, both endpoints
/// included.
///
/// Steps are interleaved so the path hugs the ideal line, never moving
/// diagonally.
pub fn orthogonal_line(a: IVec2, b: IVec2) -> Vec<IVec2> {
    let (nx, ny) = ((b.x - a.x).abs(), (b.y - a.y).abs());
    let step = ivec2((b.x - a.x).signum(), (b.y - a.y).signum());

    let mut ret = Vec::with_capacity((nx + ny + 1) as usize);
    let mut p = a;
    ret.push(p);
    let (mut ix, mut iy) = (0, 0);
    while ix < nx || iy < ny {
        // Compare (0.5 + ix) / nx against (0.5 + iy) / ny without
        // dividing, so zero-length axes stay well defined.
        if (1 + 2 * ix) * ny < (1 + 2 * iy) * nx {
            p.x += step.x;
            ix += 1;
        } else {
            p.y += step.y;
            iy += 1;
        }
        ret.push(p);
    }
    ret
}
