use rand::{Rng, SeedableRng};
use util::{GameRng, GridViewMut, Rect, VecGrid};

use crate::{
    tags, GenerationContext, GenerationStep, ItemList, StepError,
};

/// Carves non-overlapping odd-sized rectangular rooms into the
/// passability grid and records their interiors.
///
/// Rooms are placed on odd coordinates with at least a three-cell
/// margin to the map edge and to any previously carved floor, which
/// keeps them compatible with the maze crawler's lattice.
pub struct RoomsGeneration {
    name: String,
    wall_floor_tag: String,
    rooms_tag: String,
    rng: GameRng,
    pub min_rooms: u32,
    pub max_rooms: u32,
    pub room_min_size: i32,
    pub room_max_size: i32,
    pub room_size_ratio_x: f64,
    pub room_size_ratio_y: f64,
    pub max_creation_attempts: u32,
    pub max_placement_attempts: u32,
}

impl Default for RoomsGeneration {
    fn default() -> Self {
        RoomsGeneration {
            name: "RoomsGeneration".to_owned(),
            wall_floor_tag: tags::WALL_FLOOR.to_owned(),
            rooms_tag: tags::ROOMS.to_owned(),
            rng: GameRng::from_entropy(),
            min_rooms: 4,
            max_rooms: 10,
            room_min_size: 3,
            room_max_size: 7,
            room_size_ratio_x: 1.0,
            room_size_ratio_y: 1.0,
            max_creation_attempts: 10,
            max_placement_attempts: 10,
        }
    }
}

impl RoomsGeneration {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_rng(mut self, rng: GameRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_rooms(mut self, min: u32, max: u32) -> Self {
        self.min_rooms = min;
        self.max_rooms = max;
        self
    }

    pub fn with_room_size(mut self, min: i32, max: i32) -> Self {
        self.room_min_size = min;
        self.room_max_size = max;
        self
    }

    fn validate(&self) -> Result<(), StepError> {
        if self.min_rooms > self.max_rooms {
            return Err(StepError::invalid_config(
                &self.name,
                "min_rooms",
                "cannot exceed max_rooms",
            ));
        }
        if self.room_min_size > self.room_max_size {
            return Err(StepError::invalid_config(
                &self.name,
                "room_min_size",
                "cannot exceed room_max_size",
            ));
        }
        if self.room_size_ratio_x <= 0.0 {
            return Err(StepError::invalid_config(
                &self.name,
                "room_size_ratio_x",
                "must be positive",
            ));
        }
        if self.room_size_ratio_y <= 0.0 {
            return Err(StepError::invalid_config(
                &self.name,
                "room_size_ratio_y",
                "must be positive",
            ));
        }
        Ok(())
    }

    /// Draw room dimensions: scaled by the axis ratios, jittered, then
    /// clamped to the minimum and forced odd.
    fn draw_room_dims(&mut self) -> (i32, i32) {
        let size = self
            .rng
            .gen_range(self.room_min_size..=self.room_max_size);
        let mut width =
            (size as f64 * self.room_size_ratio_x).round() as i32;
        let mut height =
            (size as f64 * self.room_size_ratio_y).round() as i32;

        let adjustment_base = size / 4;
        if adjustment_base > 0 {
            let adjustment = self
                .rng
                .gen_range(-adjustment_base..=adjustment_base);
            if self.rng.gen_bool(0.5) {
                width += (adjustment as f64 * self.room_size_ratio_x)
                    .round() as i32;
            } else {
                height += (adjustment as f64 * self.room_size_ratio_y)
                    .round() as i32;
            }
        }

        width = width.max(self.room_min_size);
        height = height.max(self.room_min_size);
        if width % 2 == 0 {
            width += 1;
        }
        if height % 2 == 0 {
            height += 1;
        }
        (width, height)
    }

    /// Try to place one room; true when a room was carved.
    fn place_room(
        &mut self,
        dim: glam::IVec2,
        wf: &mut VecGrid<bool>,
        rooms: &mut ItemList<Rect>,
    ) -> bool {
        for _ in 0..self.max_creation_attempts {
            let (width, height) = self.draw_room_dims();

            // Placement lattice: odd position with a 3-cell margin
            // all around.
            let max_x = dim.x - width - 3;
            let max_y = dim.y - height - 3;
            if max_x <= 3 || max_y <= 3 {
                continue;
            }

            for _ in 0..self.max_placement_attempts {
                let mut x = self.rng.gen_range(3..max_x);
                let mut y = self.rng.gen_range(3..max_y);
                if x % 2 == 0 {
                    x += 1;
                }
                if y % 2 == 0 {
                    y += 1;
                }

                let room = Rect::with_size([x, y], width, height);
                let check = room.expand(3, 3);
                if check.positions().any(|p| wf[p]) {
                    continue;
                }

                for p in room.positions() {
                    wf.set(p, true);
                }
                rooms.add(room, &self.name);
                return true;
            }
        }
        false
    }
}

impl GenerationStep for RoomsGeneration {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_perform(
        &mut self,
        ctx: &mut GenerationContext,
    ) -> Result<(), StepError> {
        self.validate()?;

        let dim = ctx.dim();
        let wall_floor = ctx.get_or_new(
            || VecGrid::<bool>::new(dim),
            Some(&self.wall_floor_tag),
        );
        let rooms = ctx.get_or_new(
            ItemList::<Rect>::new,
            Some(&self.rooms_tag),
        );

        let room_count =
            self.rng.gen_range(self.min_rooms..=self.max_rooms);

        for _ in 0..room_count {
            // Component borrows are scoped per room so stage observers
            // may inspect the map at the checkpoint.
            let placed = {
                let mut wf = wall_floor.borrow_mut();
                let mut rooms = rooms.borrow_mut();
                self.place_room(dim, &mut wf, &mut rooms)
            };
            if placed {
                ctx.checkpoint(&self.name, "room placed");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Generator;

    fn generate(
        step: RoomsGeneration,
        w: i32,
        h: i32,
    ) -> (Vec<Rect>, VecGrid<bool>) {
        let mut gen = Generator::new(w, h);
        gen.add_step(step);
        gen.generate().unwrap();
        let rooms = gen
            .context
            .get::<ItemList<Rect>>(Some(tags::ROOMS))
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
        (rooms, wf)
    }

    #[test]
    fn single_fixed_room() {
        let step = RoomsGeneration::new()
            .with_rng(GameRng::seed_from_u64(5))
            .with_rooms(1, 1)
            .with_room_size(3, 3);
        let (rooms, wf) = generate(step, 40, 30);

        assert_eq!(rooms.len(), 1);
        let room = rooms[0];
        assert_eq!(room.dim(), glam::ivec2(3, 3));
        assert_eq!(room.min.x % 2, 1);
        assert_eq!(room.min.y % 2, 1);
        assert!(room.min.x >= 3 && room.max.x <= 40 - 1 - 3);
        assert!(room.min.y >= 3 && room.max.y <= 30 - 1 - 3);
        for p in room.positions() {
            assert!(wf[p]);
        }
    }

    #[test]
    fn rooms_keep_their_distance() {
        for seed in 0..8 {
            let step = RoomsGeneration::new()
                .with_rng(GameRng::seed_from_u64(seed))
                .with_rooms(4, 8);
            let (rooms, wf) = generate(step, 60, 40);

            for (i, a) in rooms.iter().enumerate() {
                // Odd dimensions, minimum size respected.
                assert_eq!(a.width() % 2, 1);
                assert_eq!(a.height() % 2, 1);
                assert!(a.width() >= 3 && a.height() >= 3);

                // A room's 3-cell margin never touches another room.
                for b in &rooms[i + 1..] {
                    assert!(
                        !a.expand(3, 3).intersects(b)
                            && !b.expand(3, 3).intersects(a),
                        "rooms {a:?} and {b:?} too close"
                    );
                }

                // Interior is carved.
                assert!(a.positions().all(|p| wf[p]));
            }
        }
    }

    #[test]
    fn bad_parameters() {
        let mut gen = Generator::new(20, 20);
        gen.add_step(RoomsGeneration::new().with_rooms(5, 2));
        assert!(matches!(
            gen.generate().unwrap_err(),
            StepError::InvalidConfiguration { .. }
        ));
    }
}
