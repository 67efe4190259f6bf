use std::marker::PhantomData;

use util::{AdjacencyRule, Area, MapAreaFinder, Rect, VecGrid};

use crate::{
    tags, ComponentRequirement, GenerationContext, GenerationStep,
    ItemList, StepError,
};

/// Translates recorded room rectangles into areas.
pub struct RectanglesToAreas {
    name: String,
    rectangles_tag: String,
    areas_tag: String,
}

impl Default for RectanglesToAreas {
    fn default() -> Self {
        RectanglesToAreas {
            name: "RectanglesToAreas".to_owned(),
            rectangles_tag: tags::ROOMS.to_owned(),
            areas_tag: tags::AREAS.to_owned(),
        }
    }
}

impl RectanglesToAreas {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_tags(
        mut self,
        rectangles_tag: &str,
        areas_tag: &str,
    ) -> Self {
        self.rectangles_tag = rectangles_tag.to_owned();
        self.areas_tag = areas_tag.to_owned();
        self
    }
}

impl GenerationStep for RectanglesToAreas {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Vec<ComponentRequirement> {
        vec![ComponentRequirement::new::<ItemList<Rect>>(Some(
            &self.rectangles_tag,
        ))]
    }

    fn on_perform(
        &mut self,
        ctx: &mut GenerationContext,
    ) -> Result<(), StepError> {
        let rects = ctx.require::<ItemList<Rect>>(
            &self.name,
            Some(&self.rectangles_tag),
        )?;
        let areas = ctx.get_or_new(
            ItemList::<Area>::new,
            Some(&self.areas_tag),
        );

        let rects = rects.borrow();
        let mut areas = areas.borrow_mut();
        for rect in rects.iter() {
            areas.add(rect.positions().collect(), &self.name);
        }
        drop((rects, areas));

        ctx.checkpoint(&self.name, "rectangles translated");
        Ok(())
    }
}

/// Finds the connected open areas of the passability grid and records
/// them in the area list.
pub struct AreaFinder {
    name: String,
    wall_floor_tag: String,
    areas_tag: String,
    pub adjacency: AdjacencyRule,
}

impl Default for AreaFinder {
    fn default() -> Self {
        AreaFinder {
            name: "AreaFinder".to_owned(),
            wall_floor_tag: tags::WALL_FLOOR.to_owned(),
            areas_tag: tags::AREAS.to_owned(),
            adjacency: AdjacencyRule::Cardinals,
        }
    }
}

impl AreaFinder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_adjacency(mut self, adjacency: AdjacencyRule) -> Self {
        self.adjacency = adjacency;
        self
    }
}

impl GenerationStep for AreaFinder {
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
        let wall_floor = ctx.require::<VecGrid<bool>>(
            &self.name,
            Some(&self.wall_floor_tag),
        )?;
        let areas = ctx.get_or_new(
            ItemList::<Area>::new,
            Some(&self.areas_tag),
        );

        let found = MapAreaFinder::new(self.adjacency)
            .areas(&*wall_floor.borrow());
        areas.borrow_mut().add_all(found, &self.name);

        ctx.checkpoint(&self.name, "areas found");
        Ok(())
    }
}

/// Removes from one area list's areas every point that also occurs in
/// another list's areas.
pub struct RemoveDuplicatePoints {
    name: String,
    unmodified_tag: String,
    modified_tag: String,
}

impl RemoveDuplicatePoints {
    pub fn new(unmodified_tag: &str, modified_tag: &str) -> Self {
        RemoveDuplicatePoints {
            name: "RemoveDuplicatePoints".to_owned(),
            unmodified_tag: unmodified_tag.to_owned(),
            modified_tag: modified_tag.to_owned(),
        }
    }
}

impl GenerationStep for RemoveDuplicatePoints {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Vec<ComponentRequirement> {
        vec![
            ComponentRequirement::new::<ItemList<Area>>(Some(
                &self.unmodified_tag,
            )),
            ComponentRequirement::new::<ItemList<Area>>(Some(
                &self.modified_tag,
            )),
        ]
    }

    fn on_perform(
        &mut self,
        ctx: &mut GenerationContext,
    ) -> Result<(), StepError> {
        if self.unmodified_tag == self.modified_tag {
            return Err(StepError::invalid_config(
                &self.name,
                "modified_tag",
                "must differ from unmodified_tag",
            ));
        }

        let unmodified = ctx.require::<ItemList<Area>>(
            &self.name,
            Some(&self.unmodified_tag),
        )?;
        let modified = ctx.require::<ItemList<Area>>(
            &self.name,
            Some(&self.modified_tag),
        )?;

        let unmodified = unmodified.borrow();
        let mut modified = modified.borrow_mut();
        for area in modified.items_mut() {
            for keeper in unmodified.iter() {
                area.retain(|p| !keeper.contains(p));
            }
        }
        drop((unmodified, modified));

        ctx.checkpoint(&self.name, "duplicates removed");
        Ok(())
    }
}

/// Drains one item list into another, preserving recorded source
/// steps; optionally removes the drained component afterwards.
pub struct AppendItemLists<T> {
    name: String,
    base_tag: String,
    append_tag: String,
    pub remove_appended_component: bool,
    marker: PhantomData<fn() -> T>,
}

impl<T: 'static> AppendItemLists<T> {
    pub fn new(base_tag: &str, append_tag: &str) -> Self {
        AppendItemLists {
            name: "AppendItemLists".to_owned(),
            base_tag: base_tag.to_owned(),
            append_tag: append_tag.to_owned(),
            remove_appended_component: false,
            marker: PhantomData,
        }
    }

    pub fn removing_appended(mut self) -> Self {
        self.remove_appended_component = true;
        self
    }
}

impl<T: 'static> GenerationStep for AppendItemLists<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Vec<ComponentRequirement> {
        vec![
            ComponentRequirement::new::<ItemList<T>>(Some(
                &self.base_tag,
            )),
            ComponentRequirement::new::<ItemList<T>>(Some(
                &self.append_tag,
            )),
        ]
    }

    fn on_perform(
        &mut self,
        ctx: &mut GenerationContext,
    ) -> Result<(), StepError> {
        if self.base_tag == self.append_tag {
            return Err(StepError::invalid_config(
                &self.name,
                "append_tag",
                "must differ from base_tag",
            ));
        }

        let base = ctx.require::<ItemList<T>>(
            &self.name,
            Some(&self.base_tag),
        )?;
        let appended = ctx.require::<ItemList<T>>(
            &self.name,
            Some(&self.append_tag),
        )?;

        base.borrow_mut().append(&mut appended.borrow_mut());
        if self.remove_appended_component {
            ctx.remove::<ItemList<T>>(Some(&self.append_tag));
        }

        ctx.checkpoint(&self.name, "lists appended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::ivec2;
    use util::GridViewMut;

    use super::*;
    use crate::Generator;

    #[test]
    fn rectangles_become_areas() {
        let mut gen = Generator::new(20, 20);
        let mut rects = ItemList::new();
        rects.add(Rect::new([2, 2], [4, 3]), "seed");
        gen.add_component(rects, Some(tags::ROOMS));
        gen.add_step(RectanglesToAreas::new());
        gen.generate().unwrap();

        let areas = gen
            .context
            .get::<ItemList<Area>>(Some(tags::AREAS))
            .unwrap();
        let areas = areas.borrow();
        assert_eq!(areas.len(), 1);
        assert_eq!(areas.items()[0].len(), 6);
        assert!(areas.items()[0].contains(&ivec2(4, 3)));
    }

    #[test]
    fn area_finder_records_components() {
        let mut gen = Generator::new(10, 10);
        let mut wf: VecGrid<bool> = VecGrid::new([10, 10]);
        wf.set(ivec2(1, 1), true);
        wf.set(ivec2(1, 2), true);
        wf.set(ivec2(5, 5), true);
        gen.add_component(wf, Some(tags::WALL_FLOOR));
        gen.add_step(AreaFinder::new());
        gen.generate().unwrap();

        let areas = gen
            .context
            .get::<ItemList<Area>>(Some(tags::AREAS))
            .unwrap();
        assert_eq!(areas.borrow().len(), 2);
        assert_eq!(areas.borrow().source_of(0), Some("AreaFinder"));
    }

    #[test]
    fn duplicate_points_removed() {
        let mut gen = Generator::new(10, 10);
        let mut keep = ItemList::new();
        keep.add(
            [ivec2(1, 1), ivec2(2, 2)].into_iter().collect::<Area>(),
            "seed",
        );
        let mut edit = ItemList::new();
        edit.add(
            [ivec2(2, 2), ivec2(3, 3)].into_iter().collect::<Area>(),
            "seed",
        );
        gen.add_component(keep, Some("Keep"));
        gen.add_component(edit, Some("Edit"));
        gen.add_step(RemoveDuplicatePoints::new("Keep", "Edit"));
        gen.generate().unwrap();

        let edit = gen
            .context
            .get::<ItemList<Area>>(Some("Edit"))
            .unwrap();
        assert_eq!(
            edit.borrow().items()[0],
            [ivec2(3, 3)].into_iter().collect::<Area>()
        );
    }

    #[test]
    fn appending_lists() {
        let mut gen = Generator::new(10, 10);
        let mut base = ItemList::new();
        base.add(
            [ivec2(1, 1)].into_iter().collect::<Area>(),
            "one",
        );
        let mut extra = ItemList::new();
        extra.add(
            [ivec2(9, 9)].into_iter().collect::<Area>(),
            "two",
        );
        gen.add_component(base, Some(tags::TUNNELS));
        gen.add_component(extra, Some(tags::MAZE_CONNECTIONS));
        gen.add_step(
            AppendItemLists::<Area>::new(
                tags::TUNNELS,
                tags::MAZE_CONNECTIONS,
            )
            .removing_appended(),
        );
        gen.generate().unwrap();

        let base = gen
            .context
            .get::<ItemList<Area>>(Some(tags::TUNNELS))
            .unwrap();
        assert_eq!(base.borrow().len(), 2);
        assert_eq!(base.borrow().source_of(1), Some("two"));
        assert!(gen
            .context
            .get::<ItemList<Area>>(Some(tags::MAZE_CONNECTIONS))
            .is_none());
    }

    #[test]
    fn append_tag_must_differ() {
        let mut gen = Generator::new(10, 10);
        gen.add_component(
            ItemList::<Area>::new(),
            Some(tags::TUNNELS),
        );
        gen.add_step(AppendItemLists::<Area>::new(
            tags::TUNNELS,
            tags::TUNNELS,
        ));
        assert!(matches!(
            gen.generate().unwrap_err(),
            StepError::InvalidConfiguration { .. }
        ));
    }
}
