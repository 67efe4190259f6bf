use glam::IVec2;
use rand::{Rng, SeedableRng};
use util::{s4, GameRng, GridView, GridViewMut, Rect, RngExt, VecGrid};

use crate::{
    tags, ComponentRequirement, DoorList, GenerationContext,
    GenerationStep, ItemList, StepError,
};

/// Opens doorways between carved rooms and adjacent corridors.
///
/// For every room, wall cells of the room's surrounding ring that have
/// corridor floor directly behind them are door candidates. A random
/// subset of sides gets doors, each side placing one or more doors
/// until an escalating cancel roll stops it.
pub struct RoomDoorConnection {
    name: String,
    rooms_tag: String,
    wall_floor_tag: String,
    doors_tag: String,
    rng: GameRng,
    pub min_sides_to_connect: u32,
    pub max_sides_to_connect: u32,
    pub cancel_side_connection_select_chance: u32,
    pub cancel_connection_placement_chance: u32,
    pub cancel_connection_placement_chance_increase: u32,
}

impl Default for RoomDoorConnection {
    fn default() -> Self {
        RoomDoorConnection {
            name: "RoomDoorConnection".to_owned(),
            rooms_tag: tags::ROOMS.to_owned(),
            wall_floor_tag: tags::WALL_FLOOR.to_owned(),
            doors_tag: tags::DOORS.to_owned(),
            rng: GameRng::from_entropy(),
            min_sides_to_connect: 1,
            max_sides_to_connect: 4,
            cancel_side_connection_select_chance: 50,
            cancel_connection_placement_chance: 70,
            cancel_connection_placement_chance_increase: 10,
        }
    }
}

impl RoomDoorConnection {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_rng(mut self, rng: GameRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_sides_to_connect(mut self, min: u32, max: u32) -> Self {
        self.min_sides_to_connect = min;
        self.max_sides_to_connect = max;
        self
    }

    fn validate(&self) -> Result<(), StepError> {
        if !(1..=4).contains(&self.max_sides_to_connect) {
            return Err(StepError::invalid_config(
                &self.name,
                "max_sides_to_connect",
                "must be in [1, 4]",
            ));
        }
        if self.min_sides_to_connect > self.max_sides_to_connect {
            return Err(StepError::invalid_config(
                &self.name,
                "min_sides_to_connect",
                "cannot exceed max_sides_to_connect",
            ));
        }
        for (value, parameter) in [
            (
                self.cancel_side_connection_select_chance,
                "cancel_side_connection_select_chance",
            ),
            (
                self.cancel_connection_placement_chance,
                "cancel_connection_placement_chance",
            ),
            (
                self.cancel_connection_placement_chance_increase,
                "cancel_connection_placement_chance_increase",
            ),
        ] {
            if value > 100 {
                return Err(StepError::invalid_config(
                    &self.name,
                    parameter,
                    "must be a percentage in [0, 100]",
                ));
            }
        }
        Ok(())
    }
}

fn is_corner(rect: &Rect, p: IVec2) -> bool {
    (p.x == rect.min.x || p.x == rect.max.x)
        && (p.y == rect.min.y || p.y == rect.max.y)
}

fn cardinal_floor_count(wf: &VecGrid<bool>, p: IVec2) -> usize {
    s4::ns(p).filter(|&q| wf.contains(q) && wf[q]).count()
}

impl GenerationStep for RoomDoorConnection {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Vec<ComponentRequirement> {
        vec![
            ComponentRequirement::new::<ItemList<Rect>>(Some(
                &self.rooms_tag,
            )),
            ComponentRequirement::new::<VecGrid<bool>>(Some(
                &self.wall_floor_tag,
            )),
        ]
    }

    fn on_perform(
        &mut self,
        ctx: &mut GenerationContext,
    ) -> Result<(), StepError> {
        self.validate()?;

        let rooms = ctx.require::<ItemList<Rect>>(
            &self.name,
            Some(&self.rooms_tag),
        )?;
        let wall_floor = ctx.require::<VecGrid<bool>>(
            &self.name,
            Some(&self.wall_floor_tag),
        )?;
        let doors =
            ctx.get_or_new(DoorList::new, Some(&self.doors_tag));

        let rooms: Vec<Rect> =
            rooms.borrow().iter().copied().collect();

        // The rooms must still be sealed; a breached wall ring means an
        // earlier step carved into a room and the map is unsalvageable.
        {
            let wf = wall_floor.borrow();
            for room in &rooms {
                for p in room.expand(1, 1).perimeter_positions() {
                    if wf.contains(p) && wf[p] {
                        return Err(StepError::regenerate(
                            &self.name,
                            "room wall already breached",
                        ));
                    }
                }
            }
        }

        let map_interior =
            Rect::with_size([0, 0], ctx.width(), ctx.height())
                .expand(-1, -1);

        for room in &rooms {
            let ring = room.expand(1, 1);

            // Candidate wall cells per side: wall with corridor floor
            // directly beyond, inside the map's inner area.
            let mut sides: Vec<Vec<IVec2>> = {
                let wf = wall_floor.borrow();
                s4::DIR
                    .iter()
                    .filter_map(|&dir| {
                        let candidates: Vec<IVec2> = ring
                            .edge_positions(dir)
                            .into_iter()
                            .filter(|&w| !is_corner(&ring, w))
                            .filter(|&w| {
                                let t = w + dir;
                                wf.contains(w)
                                    && !wf[w]
                                    && map_interior.contains(t)
                                    && wf[t]
                            })
                            .collect();
                        (!candidates.is_empty()).then_some(candidates)
                    })
                    .collect()
            };

            // At most max sides, dropped at random.
            while sides.len() > self.max_sides_to_connect as usize {
                let k = self.rng.gen_range(0..sides.len());
                sides.remove(k);
            }

            // Randomly cancel sides while the minimum holds.
            let mut idx = 0;
            while idx < sides.len() {
                if sides.len() > self.min_sides_to_connect as usize
                    && self.rng.percent_chance(
                        self.cancel_side_connection_select_chance,
                    )
                {
                    sides.remove(idx);
                } else {
                    idx += 1;
                }
            }

            for mut candidates in sides {
                let mut cancel_chance =
                    self.cancel_connection_placement_chance;
                while !candidates.is_empty() {
                    let k =
                        self.rng.gen_range(0..candidates.len());
                    let w = candidates.swap_remove(k);

                    // An earlier carve next to this cell may have
                    // changed the local layout; require the doorway to
                    // still join two floors. Borrows are scoped so
                    // stage observers may inspect the map at the
                    // checkpoint.
                    let carved = {
                        let mut wf = wall_floor.borrow_mut();
                        if cardinal_floor_count(&wf, w) < 2 {
                            false
                        } else {
                            wf.set(w, true);
                            true
                        }
                    };
                    if !carved {
                        continue;
                    }
                    doors
                        .borrow_mut()
                        .add_door(&self.name, *room, w);
                    ctx.checkpoint(&self.name, "door placed");

                    if self.rng.percent_chance(cancel_chance) {
                        break;
                    }
                    cancel_chance = cancel_chance.saturating_add(
                        self.cancel_connection_placement_chance_increase,
                    );
                }
            }
        }
        Ok(())
    }
}

/// Records a door for every floor cell on a room's surrounding wall
/// ring, for maps whose openings were carved by other steps.
pub struct DoorFinder {
    name: String,
    rooms_tag: String,
    wall_floor_tag: String,
    doors_tag: String,
}

impl Default for DoorFinder {
    fn default() -> Self {
        DoorFinder {
            name: "DoorFinder".to_owned(),
            rooms_tag: tags::ROOMS.to_owned(),
            wall_floor_tag: tags::WALL_FLOOR.to_owned(),
            doors_tag: tags::DOORS.to_owned(),
        }
    }
}

impl DoorFinder {
    pub fn new() -> Self {
        Default::default()
    }
}

impl GenerationStep for DoorFinder {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Vec<ComponentRequirement> {
        vec![
            ComponentRequirement::new::<ItemList<Rect>>(Some(
                &self.rooms_tag,
            )),
            ComponentRequirement::new::<VecGrid<bool>>(Some(
                &self.wall_floor_tag,
            )),
        ]
    }

    fn on_perform(
        &mut self,
        ctx: &mut GenerationContext,
    ) -> Result<(), StepError> {
        let rooms = ctx.require::<ItemList<Rect>>(
            &self.name,
            Some(&self.rooms_tag),
        )?;
        let wall_floor = ctx.require::<VecGrid<bool>>(
            &self.name,
            Some(&self.wall_floor_tag),
        )?;
        let doors =
            ctx.get_or_new(DoorList::new, Some(&self.doors_tag));

        let rooms: Vec<Rect> =
            rooms.borrow().iter().copied().collect();
        for room in rooms {
            {
                let wf = wall_floor.borrow();
                let mut doors = doors.borrow_mut();
                for p in room.expand(1, 1).perimeter_positions() {
                    if wf.contains(p) && wf[p] {
                        doors.add_door(&self.name, room, p);
                    }
                }
            }
            ctx.checkpoint(&self.name, "room scanned");
        }
        Ok(())
    }
}
