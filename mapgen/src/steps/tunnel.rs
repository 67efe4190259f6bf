use glam::{ivec2, IVec2};
use rand::Rng;
use util::{
    bresenham_line, orthogonal_line, Area, Distance, GameRng, GridView,
    GridViewMut, VecGrid,
};

/// Policy for carving a corridor between two cells.
///
/// Creators set the carved cells to floor and return them as an area.
pub trait TunnelCreator {
    fn create_tunnel(
        &self,
        map: &mut VecGrid<bool>,
        rng: &mut GameRng,
        start: IVec2,
        end: IVec2,
    ) -> Area;
}

/// Carves an L-shaped corridor, choosing at random whether the
/// horizontal or the vertical leg comes first.
#[derive(Copy, Clone, Debug, Default)]
pub struct HorizontalVerticalTunnel;

fn carve(map: &mut VecGrid<bool>, area: &mut Area, p: IVec2) {
    map.set(p, true);
    area.insert(p);
}

fn carve_horizontal(
    map: &mut VecGrid<bool>,
    area: &mut Area,
    x1: i32,
    x2: i32,
    y: i32,
) {
    for x in x1.min(x2)..=x1.max(x2) {
        carve(map, area, ivec2(x, y));
    }
}

fn carve_vertical(
    map: &mut VecGrid<bool>,
    area: &mut Area,
    y1: i32,
    y2: i32,
    x: i32,
) {
    for y in y1.min(y2)..=y1.max(y2) {
        carve(map, area, ivec2(x, y));
    }
}

impl TunnelCreator for HorizontalVerticalTunnel {
    fn create_tunnel(
        &self,
        map: &mut VecGrid<bool>,
        rng: &mut GameRng,
        start: IVec2,
        end: IVec2,
    ) -> Area {
        let mut area = Area::new();
        if rng.gen_bool(0.5) {
            carve_horizontal(map, &mut area, start.x, end.x, start.y);
            carve_vertical(map, &mut area, start.y, end.y, end.x);
        } else {
            carve_vertical(map, &mut area, start.y, end.y, start.x);
            carve_horizontal(map, &mut area, start.x, end.x, end.y);
        }
        area
    }
}

/// Carves a rasterized straight line; orthogonal rasterization under
/// the Manhattan metric, Bresenham otherwise.
#[derive(Copy, Clone, Debug)]
pub struct DirectLineTunnel {
    pub distance: Distance,
    /// Also carve the cell right of every vertical step, producing
    /// passable corridors for wide-tile displays. Cells on the map's
    /// right edge are never widened into.
    pub double_wide_vertical: bool,
}

impl Default for DirectLineTunnel {
    fn default() -> Self {
        DirectLineTunnel {
            distance: Distance::Manhattan,
            double_wide_vertical: false,
        }
    }
}

impl TunnelCreator for DirectLineTunnel {
    fn create_tunnel(
        &self,
        map: &mut VecGrid<bool>,
        _rng: &mut GameRng,
        start: IVec2,
        end: IVec2,
    ) -> Area {
        let points = match self.distance {
            Distance::Manhattan => orthogonal_line(start, end),
            _ => bresenham_line(start, end),
        };

        let mut area = Area::new();
        let mut prev: Option<IVec2> = None;
        for p in points {
            carve(map, &mut area, p);
            if self.double_wide_vertical
                && prev.is_some_and(|prev| p.y != prev.y)
                && p.x + 1 < map.width() - 1
            {
                carve(map, &mut area, p + ivec2(1, 0));
            }
            prev = Some(p);
        }
        area
    }
}
