use util::{GridViewMut, Rect, VecGrid};

use crate::{tags, GenerationContext, GenerationStep, StepError};

/// Fills the whole map with a walled rectangle: floor everywhere except
/// the outer perimeter.
pub struct RectangleGenerator {
    name: String,
    wall_floor_tag: String,
}

impl Default for RectangleGenerator {
    fn default() -> Self {
        RectangleGenerator {
            name: "RectangleGenerator".to_owned(),
            wall_floor_tag: tags::WALL_FLOOR.to_owned(),
        }
    }
}

impl RectangleGenerator {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_wall_floor_tag(mut self, tag: &str) -> Self {
        self.wall_floor_tag = tag.to_owned();
        self
    }
}

impl GenerationStep for RectangleGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_perform(
        &mut self,
        ctx: &mut GenerationContext,
    ) -> Result<(), StepError> {
        let dim = ctx.dim();
        let wall_floor = ctx.get_or_new(
            || VecGrid::<bool>::new(dim),
            Some(&self.wall_floor_tag),
        );

        let bounds = Rect::with_size([0, 0], dim.x, dim.y);
        let inner = bounds.expand(-1, -1);
        let mut wf = wall_floor.borrow_mut();
        for p in bounds.positions() {
            wf.set(p, inner.contains(p));
        }
        drop(wf);

        ctx.checkpoint(&self.name, "rectangle filled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::ivec2;
    use util::GridView;

    use super::*;
    use crate::Generator;

    #[test]
    fn walled_rectangle() {
        let mut gen = Generator::new(10, 6);
        gen.add_step(RectangleGenerator::new());
        gen.generate().unwrap();

        let wf = gen
            .context
            .get::<VecGrid<bool>>(Some(tags::WALL_FLOOR))
            .unwrap();
        let wf = wf.borrow();
        for (p, floor) in wf.iter() {
            let interior =
                (1..=8).contains(&p.x) && (1..=4).contains(&p.y);
            assert_eq!(floor, interior, "wrong cell at {p}");
        }
        assert_eq!(wf.dim(), ivec2(10, 6));
    }
}
