use glam::{ivec2, IVec2};
use rand::SeedableRng;
use util::{GameRng, GridView, GridViewMut, Rect, RngExt, VecGrid};

use crate::{
    tags, ComponentRequirement, GenerationContext, GenerationStep,
    StepError,
};

/// Fills the passability grid with random noise, the seed state for
/// cellular-automata cave smoothing.
pub struct RandomViewFill {
    name: String,
    wall_floor_tag: String,
    rng: GameRng,
    /// Chance in a hundred for a cell to become floor.
    pub fill_probability: u32,
    /// Leave the map's outer rim untouched.
    pub exclude_perimeter_points: bool,
    /// Report a pause point every this many filled cells; 0 reports
    /// only at the end.
    pub fills_between_checkpoints: u32,
}

impl Default for RandomViewFill {
    fn default() -> Self {
        RandomViewFill {
            name: "RandomViewFill".to_owned(),
            wall_floor_tag: tags::WALL_FLOOR.to_owned(),
            rng: GameRng::from_entropy(),
            fill_probability: 50,
            exclude_perimeter_points: false,
            fills_between_checkpoints: 0,
        }
    }
}

impl RandomViewFill {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_rng(mut self, rng: GameRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_fill_probability(mut self, percent: u32) -> Self {
        self.fill_probability = percent;
        self
    }

    pub fn with_wall_floor_tag(mut self, tag: &str) -> Self {
        self.wall_floor_tag = tag.to_owned();
        self
    }
}

impl GenerationStep for RandomViewFill {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_perform(
        &mut self,
        ctx: &mut GenerationContext,
    ) -> Result<(), StepError> {
        if self.fill_probability > 100 {
            return Err(StepError::invalid_config(
                &self.name,
                "fill_probability",
                "must be a percentage in [0, 100]",
            ));
        }

        let dim = ctx.dim();
        let wall_floor = ctx.get_or_new(
            || VecGrid::<bool>::new(dim),
            Some(&self.wall_floor_tag),
        );

        let bounds = Rect::with_size([0, 0], dim.x, dim.y);
        let fill_area = if self.exclude_perimeter_points {
            bounds.expand(-1, -1)
        } else {
            bounds
        };

        let mut filled = 0u32;
        for p in fill_area.positions() {
            let open = self.rng.percent_chance(self.fill_probability);
            wall_floor.borrow_mut().set(p, open);
            filled += 1;
            if self.fills_between_checkpoints > 0
                && filled % self.fills_between_checkpoints == 0
            {
                ctx.checkpoint(&self.name, "cells filled");
            }
        }

        ctx.checkpoint(&self.name, "fill complete");
        Ok(())
    }
}

/// Smooths random noise into cave shapes with the classic two-phase
/// cellular automata rule, then seals the outer perimeter.
pub struct CellularAutomataSmoothing {
    name: String,
    wall_floor_tag: String,
    /// Total smoothing passes.
    pub total_iterations: u32,
    /// Passes that also apply the big-area backfill term.
    pub cutoff_big_area_fill: u32,
}

impl Default for CellularAutomataSmoothing {
    fn default() -> Self {
        CellularAutomataSmoothing {
            name: "CellularAutomataSmoothing".to_owned(),
            wall_floor_tag: tags::WALL_FLOOR.to_owned(),
            total_iterations: 7,
            cutoff_big_area_fill: 4,
        }
    }
}

impl CellularAutomataSmoothing {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_iterations(mut self, total: u32, cutoff: u32) -> Self {
        self.total_iterations = total;
        self.cutoff_big_area_fill = cutoff;
        self
    }

    pub fn with_wall_floor_tag(mut self, tag: &str) -> Self {
        self.wall_floor_tag = tag.to_owned();
        self
    }
}

/// Walls within chessboard distance `r` of `p`, the cell itself
/// included and out-of-bounds cells counting as walls.
fn walls_within(wf: &VecGrid<bool>, p: IVec2, r: i32) -> i32 {
    let mut count = 0;
    for dy in -r..=r {
        for dx in -r..=r {
            let q = p + ivec2(dx, dy);
            if !wf.contains(q) || !wf[q] {
                count += 1;
            }
        }
    }
    count
}

impl GenerationStep for CellularAutomataSmoothing {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Vec<ComponentRequirement> {
        vec![ComponentRequirement::new::<VecGrid<bool>>(Some(
            &self.wall_floor_tag,
        ))]
    }

    fn on_perform(
        &mut self,
        ctx: &mut GenerationContext,
    ) -> Result<(), StepError> {
        if self.cutoff_big_area_fill > self.total_iterations {
            return Err(StepError::invalid_config(
                &self.name,
                "cutoff_big_area_fill",
                "cannot exceed total_iterations",
            ));
        }

        let wall_floor = ctx.require::<VecGrid<bool>>(
            &self.name,
            Some(&self.wall_floor_tag),
        )?;
        let interior =
            Rect::with_size([0, 0], ctx.width(), ctx.height())
                .expand(-1, -1);

        for i in 0..self.total_iterations {
            {
                let mut wf = wall_floor.borrow_mut();
                let snapshot = wf.clone();
                for p in interior.positions() {
                    let near = walls_within(&snapshot, p, 1);
                    let floor = if i < self.cutoff_big_area_fill {
                        near < 5 && walls_within(&snapshot, p, 2) > 2
                    } else {
                        near < 5
                    };
                    wf.set(p, floor);
                }
            }
            ctx.checkpoint(&self.name, "smoothing pass");
        }

        // Guarantee enclosure.
        let bounds =
            Rect::with_size([0, 0], ctx.width(), ctx.height());
        {
            let mut wf = wall_floor.borrow_mut();
            for p in bounds.perimeter_positions() {
                wf.set(p, false);
            }
        }
        ctx.checkpoint(&self.name, "perimeter sealed");
        Ok(())
    }
}
