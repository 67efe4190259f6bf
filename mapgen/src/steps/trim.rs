use glam::IVec2;
use rand::SeedableRng;
use util::{
    s4, Area, GameRng, GridView, GridViewMut, HashSet, RngExt, VecGrid,
};

use crate::{
    tags, ComponentRequirement, GenerationContext, GenerationStep,
    ItemList, StepError,
};

/// Fills in the dead ends of maze corridors, leaving a sparse tunnel
/// network.
///
/// A dead end is a floor cell with exactly one cardinal floor
/// neighbor. Each pass may randomly spare a dead end, which then stays
/// for all later passes, so trimmed mazes keep a few blind stubs.
pub struct TunnelDeadEndTrimming {
    name: String,
    wall_floor_tag: String,
    tunnels_tag: String,
    rng: GameRng,
    /// Chance in a hundred for a found dead end to be kept forever.
    pub save_dead_end_chance: u32,
    /// Trimming passes per tunnel; -1 runs until nothing changes.
    pub max_trim_iterations: i32,
}

impl Default for TunnelDeadEndTrimming {
    fn default() -> Self {
        TunnelDeadEndTrimming {
            name: "TunnelDeadEndTrimming".to_owned(),
            wall_floor_tag: tags::WALL_FLOOR.to_owned(),
            tunnels_tag: tags::TUNNELS.to_owned(),
            rng: GameRng::from_entropy(),
            save_dead_end_chance: 40,
            max_trim_iterations: -1,
        }
    }
}

impl TunnelDeadEndTrimming {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_rng(mut self, rng: GameRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_save_chance(mut self, percent: u32) -> Self {
        self.save_dead_end_chance = percent;
        self
    }

    pub fn with_tunnels_tag(mut self, tag: &str) -> Self {
        self.tunnels_tag = tag.to_owned();
        self
    }
}

fn is_dead_end(wf: &VecGrid<bool>, p: IVec2) -> bool {
    wf[p]
        && s4::ns(p)
            .filter(|&q| wf.contains(q) && wf[q])
            .count()
            == 1
}

impl GenerationStep for TunnelDeadEndTrimming {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Vec<ComponentRequirement> {
        vec![
            ComponentRequirement::new::<VecGrid<bool>>(Some(
                &self.wall_floor_tag,
            )),
            ComponentRequirement::new::<ItemList<Area>>(Some(
                &self.tunnels_tag,
            )),
        ]
    }

    fn on_perform(
        &mut self,
        ctx: &mut GenerationContext,
    ) -> Result<(), StepError> {
        if self.save_dead_end_chance > 100 {
            return Err(StepError::invalid_config(
                &self.name,
                "save_dead_end_chance",
                "must be a percentage in [0, 100]",
            ));
        }

        let wall_floor = ctx.require::<VecGrid<bool>>(
            &self.name,
            Some(&self.wall_floor_tag),
        )?;
        let tunnels = ctx.require::<ItemList<Area>>(
            &self.name,
            Some(&self.tunnels_tag),
        )?;

        let tunnel_count = tunnels.borrow().len();
        for index in 0..tunnel_count {
            // Borrows are scoped per tunnel so stage observers may
            // inspect the map at the checkpoint.
            {
                let mut wf = wall_floor.borrow_mut();
                let mut tunnels = tunnels.borrow_mut();
                let tunnel = &mut tunnels.items_mut()[index];

                let mut saved: HashSet<IVec2> = Default::default();
                let mut iteration = 0;
                loop {
                    if self.max_trim_iterations >= 0
                        && iteration >= self.max_trim_iterations
                    {
                        break;
                    }
                    iteration += 1;

                    let dead_ends: Vec<IVec2> = tunnel
                        .into_iter()
                        .filter(|&p| {
                            !saved.contains(&p) && is_dead_end(&wf, p)
                        })
                        .collect();
                    if dead_ends.is_empty() {
                        break;
                    }

                    for p in dead_ends {
                        if self
                            .rng
                            .percent_chance(self.save_dead_end_chance)
                        {
                            saved.insert(p);
                        } else {
                            wf.set(p, false);
                            tunnel.remove(p);
                        }
                    }
                }
            }
            ctx.checkpoint(&self.name, "tunnel trimmed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::ivec2;

    use super::*;
    use crate::steps::MazeGeneration;
    use crate::Generator;

    #[test]
    fn trims_straight_stub() {
        // A corridor stub hanging off an open chamber disappears
        // entirely when nothing is ever saved.
        let mut gen = Generator::new(12, 9);
        let mut wf: VecGrid<bool> = VecGrid::new([12, 9]);
        let mut stub = Area::new();
        for x in 1..=4 {
            wf.set(ivec2(x, 4), true);
            stub.insert(ivec2(x, 4));
        }
        // Chamber keeping the corridor's far end alive.
        for p in util::Rect::new([5, 3], [7, 5]).positions() {
            wf.set(p, true);
        }
        let mut tunnels = ItemList::new();
        tunnels.add(stub, "seed");

        gen.add_component(wf, Some(tags::WALL_FLOOR));
        gen.add_component(tunnels, Some(tags::TUNNELS));
        gen.add_step(
            TunnelDeadEndTrimming::new()
                .with_rng(GameRng::seed_from_u64(1))
                .with_save_chance(0),
        );
        gen.generate().unwrap();

        let wf = gen
            .context
            .get::<VecGrid<bool>>(Some(tags::WALL_FLOOR))
            .unwrap();
        let wf = wf.borrow();
        for x in 1..=4 {
            assert!(!wf[ivec2(x, 4)], "stub cell {x} survived");
        }
        let tunnels = gen
            .context
            .get::<ItemList<Area>>(Some(tags::TUNNELS))
            .unwrap();
        assert!(tunnels.borrow().items()[0].is_empty());
    }

    #[test]
    fn remaining_cells_are_saved_or_connected() {
        for seed in 0..4 {
            let mut gen = Generator::new(31, 21);
            gen.add_step(
                MazeGeneration::new()
                    .with_rng(GameRng::seed_from_u64(seed)),
            );
            gen.add_step(
                TunnelDeadEndTrimming::new()
                    .with_rng(GameRng::seed_from_u64(seed + 7))
                    .with_save_chance(0),
            );
            gen.generate().unwrap();

            let wf = gen
                .context
                .get::<VecGrid<bool>>(Some(tags::WALL_FLOOR))
                .unwrap();
            let wf = wf.borrow();
            let tunnels = gen
                .context
                .get::<ItemList<Area>>(Some(tags::TUNNELS))
                .unwrap();
            for tunnel in tunnels.borrow().iter() {
                for p in tunnel {
                    assert!(
                        !is_dead_end(&wf, p),
                        "unsaved dead end left at {p}"
                    );
                }
            }
        }
    }
}
