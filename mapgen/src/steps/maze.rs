use glam::IVec2;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use util::{
    s4, s8, Area, GameRng, GridView, GridViewMut, RngExt, VecGrid,
};

use crate::{
    tags, GenerationContext, GenerationStep, ItemList, StepError,
};

/// Fills wall regions with winding one-cell-wide mazes.
///
/// Backtracking crawlers are seeded on the odd-coordinate lattice and
/// carve corridors that stay surrounded by wall, so mazes thread
/// between rooms without ever breaking into them. Each crawler's
/// carved cells are recorded as one tunnel area.
pub struct MazeGeneration {
    name: String,
    wall_floor_tag: String,
    tunnels_tag: String,
    rng: GameRng,
    /// Added to a crawler's direction-change odds for every step it
    /// keeps its heading.
    pub crawler_change_direction_improvement: u32,
}

impl Default for MazeGeneration {
    fn default() -> Self {
        MazeGeneration {
            name: "MazeGeneration".to_owned(),
            wall_floor_tag: tags::WALL_FLOOR.to_owned(),
            tunnels_tag: tags::TUNNELS.to_owned(),
            rng: GameRng::from_entropy(),
            crawler_change_direction_improvement: 10,
        }
    }
}

impl MazeGeneration {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_rng(mut self, rng: GameRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_change_direction_improvement(
        mut self,
        improvement: u32,
    ) -> Self {
        self.crawler_change_direction_improvement = improvement;
        self
    }

    pub fn with_tunnels_tag(mut self, tag: &str) -> Self {
        self.tunnels_tag = tag.to_owned();
        self
    }

    /// A cell the crawler may step into: inside the map interior with
    /// every eight-way neighbor a wall, except the one the crawler
    /// comes from.
    fn walls_except_source(
        wf: &VecGrid<bool>,
        p: IVec2,
        source: Option<IVec2>,
    ) -> bool {
        if p.x < 1
            || p.y < 1
            || p.x >= wf.width() - 1
            || p.y >= wf.height() - 1
        {
            return false;
        }
        for dir in s8::DIR {
            if Some(dir) == source {
                continue;
            }
            let n = p + dir;
            if !wf.contains(n) || wf[n] {
                return false;
            }
        }
        true
    }

    /// Locate an odd-lattice wall cell fully surrounded by wall: 100
    /// random draws, then a deterministic scan.
    fn find_empty_square(
        &mut self,
        wf: &VecGrid<bool>,
    ) -> Option<IVec2> {
        let (w, h) = (wf.width(), wf.height());
        if w < 3 || h < 3 {
            return None;
        }

        for _ in 0..100 {
            let p = IVec2::new(
                1 + 2 * self.rng.gen_range(0..(w - 1) / 2),
                1 + 2 * self.rng.gen_range(0..(h - 1) / 2),
            );
            if !wf[p] && Self::walls_except_source(wf, p, None) {
                return Some(p);
            }
        }

        for y in (1..h - 1).step_by(2) {
            for x in (1..w - 1).step_by(2) {
                let p = IVec2::new(x, y);
                if !wf[p] && Self::walls_except_source(wf, p, None) {
                    return Some(p);
                }
            }
        }
        None
    }

    /// Run one backtracking crawler from `seed`, returning its carved
    /// cells.
    fn crawl(&mut self, wf: &mut VecGrid<bool>, seed: IVec2) -> Area {
        let mut area = Area::new();
        let mut stack = vec![seed];
        let mut facing: Option<IVec2> = None;
        let mut change_odds = 0u32;

        while let Some(&cur) = stack.last() {
            wf.set(cur, true);
            area.insert(cur);

            let valid: Vec<IVec2> = s4::DIR
                .iter()
                .copied()
                .filter(|&d| {
                    Self::walls_except_source(wf, cur + d, Some(-d))
                })
                .collect();

            if valid.is_empty() {
                stack.pop();
                continue;
            }

            let keep_facing =
                facing.is_some_and(|f| valid.contains(&f));
            if !keep_facing || self.rng.percent_chance(change_odds) {
                facing = valid.choose(&mut self.rng).copied();
                change_odds = 0;
            } else {
                change_odds = change_odds.saturating_add(
                    self.crawler_change_direction_improvement,
                );
            }

            stack.push(cur + facing.expect("crawler without heading"));
        }
        area
    }
}

impl GenerationStep for MazeGeneration {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_perform(
        &mut self,
        ctx: &mut GenerationContext,
    ) -> Result<(), StepError> {
        if self.crawler_change_direction_improvement > 100 {
            return Err(StepError::invalid_config(
                &self.name,
                "crawler_change_direction_improvement",
                "must be a percentage in [0, 100]",
            ));
        }

        let dim = ctx.dim();
        let wall_floor = ctx.get_or_new(
            || VecGrid::<bool>::new(dim),
            Some(&self.wall_floor_tag),
        );
        let tunnels = ctx.get_or_new(
            ItemList::<Area>::new,
            Some(&self.tunnels_tag),
        );

        let mut dbg_iter = 0u64;
        loop {
            dbg_iter += 1;
            if dbg_iter % 10 == 0 {
                eprintln!("DBGMAZE outer iter {dbg_iter}");
            }
            if dbg_iter > 10000 {
                eprintln!("DBGMAZE giving up");
                break;
            }
            // Borrows are scoped per crawler so stage observers may
            // inspect the map at the checkpoint.
            let crawled = {
                let mut wf = wall_floor.borrow_mut();
                match self.find_empty_square(&wf) {
                    None => false,
                    Some(seed) => {
                        eprintln!("DBGMAZE seed {seed}");
                        let area = self.crawl(&mut wf, seed);
                        eprintln!("DBGMAZE crawled area len {}", area.len());
                        if !area.is_empty() {
                            tunnels
                                .borrow_mut()
                                .add(area, &self.name);
                        }
                        true
                    }
                }
            };
            if !crawled {
                break;
            }
            ctx.checkpoint(&self.name, "crawler finished");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::ivec2;
    use util::Rect;

    use super::*;
    use crate::Generator;

    fn maze(seed: u64, w: i32, h: i32) -> (Vec<Area>, VecGrid<bool>) {
        let mut gen = Generator::new(w, h);
        gen.add_step(
            MazeGeneration::new()
                .with_rng(GameRng::seed_from_u64(seed)),
        );
        gen.generate().unwrap();
        let tunnels = gen
            .context
            .get::<ItemList<Area>>(Some(tags::TUNNELS))
            .unwrap()
            .borrow()
            .items()
            .to_vec();
        let wf = gen
            .context
            .get::<VecGrid<bool>>(Some(tags::WALL_FLOOR))
            .unwrap()
            .borrow()
            .clone();
        (tunnels, wf)
    }

    #[test]
    fn corridors_are_one_wide() {
        for seed in 0..4 {
            let (tunnels, wf) = maze(seed, 31, 21);
            assert!(!tunnels.is_empty());

            for p in wf.iter().filter(|&(_, c)| c).map(|(p, _)| p) {
                // Never on the outer perimeter.
                assert!(
                    p.x >= 1
                        && p.y >= 1
                        && p.x < wf.width() - 1
                        && p.y < wf.height() - 1,
                    "corridor on perimeter at {p}"
                );

                // Locally one cell wide: no 2x2 block is all floor.
                let block = [
                    p,
                    p + ivec2(1, 0),
                    p + ivec2(0, 1),
                    p + ivec2(1, 1),
                ];
                assert!(
                    !block
                        .iter()
                        .all(|&q| wf.contains(q) && wf[q]),
                    "2x2 open block at {p}"
                );
            }
        }
    }

    #[test]
    fn crawlers_avoid_rooms() {
        // Pre-carve a "room" and verify the maze never touches its
        // surrounding wall ring.
        let mut gen = Generator::new(25, 25);
        let mut seeded: VecGrid<bool> = VecGrid::new([25, 25]);
        let room = Rect::new([11, 11], [13, 13]);
        for p in room.positions() {
            seeded.set(p, true);
        }
        gen.add_component(seeded, Some(tags::WALL_FLOOR));
        gen.add_step(
            MazeGeneration::new()
                .with_rng(GameRng::seed_from_u64(3)),
        );
        gen.generate().unwrap();

        let wf = gen
            .context
            .get::<VecGrid<bool>>(Some(tags::WALL_FLOOR))
            .unwrap();
        let wf = wf.borrow();
        for p in room.expand(1, 1).perimeter_positions() {
            assert!(!wf[p], "maze broke into room wall at {p}");
        }
    }
}
