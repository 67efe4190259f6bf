use glam::IVec2;
use itertools::Itertools;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use util::{Area, DisjointSet, Distance, GameRng, VecGrid};

use crate::steps::{DirectLineTunnel, TunnelCreator};
use crate::{
    tags, ComponentRequirement, GenerationContext, GenerationStep,
    ItemList, StepError,
};

/// Policy choosing the pair of cells a corridor should run between.
///
/// Each side of the connection is handed as the parts of a merged
/// area group.
pub trait ConnectionPointSelector {
    fn select_points(
        &self,
        rng: &mut GameRng,
        a: &[&Area],
        b: &[&Area],
    ) -> (IVec2, IVec2);
}

fn point_at(parts: &[&Area], mut index: usize) -> IVec2 {
    for part in parts {
        if index < part.len() {
            return *part
                .get_index(index)
                .expect("area index out of sync");
        }
        index -= part.len();
    }
    panic!("point index beyond area group");
}

fn group_len(parts: &[&Area]) -> usize {
    parts.iter().map(|a| a.len()).sum()
}

/// Picks a uniformly random cell from each side.
#[derive(Copy, Clone, Debug, Default)]
pub struct RandomPointSelector;

impl ConnectionPointSelector for RandomPointSelector {
    fn select_points(
        &self,
        rng: &mut GameRng,
        a: &[&Area],
        b: &[&Area],
    ) -> (IVec2, IVec2) {
        let (la, lb) = (group_len(a), group_len(b));
        assert!(la > 0 && lb > 0, "cannot connect an empty area");
        (
            point_at(a, rng.gen_range(0..la)),
            point_at(b, rng.gen_range(0..lb)),
        )
    }
}

/// Connects the centers of the two sides' bounding boxes.
#[derive(Copy, Clone, Debug, Default)]
pub struct CenterPointSelector;

impl ConnectionPointSelector for CenterPointSelector {
    fn select_points(
        &self,
        _rng: &mut GameRng,
        a: &[&Area],
        b: &[&Area],
    ) -> (IVec2, IVec2) {
        let center = |parts: &[&Area]| {
            parts
                .iter()
                .filter(|p| !p.is_empty())
                .map(|p| p.bounds())
                .reduce(|x, y| x.union(&y))
                .unwrap_or_default()
                .center()
        };
        (center(a), center(b))
    }
}

/// Scans for the closest pair of cells under a metric; the first
/// minimum found wins.
#[derive(Copy, Clone, Debug)]
pub struct ClosestPointSelector {
    pub distance: Distance,
}

impl Default for ClosestPointSelector {
    fn default() -> Self {
        ClosestPointSelector {
            distance: Distance::Manhattan,
        }
    }
}

impl ConnectionPointSelector for ClosestPointSelector {
    fn select_points(
        &self,
        _rng: &mut GameRng,
        a: &[&Area],
        b: &[&Area],
    ) -> (IVec2, IVec2) {
        let mut best: Option<(IVec2, IVec2, f64)> = None;
        let pairs = a
            .iter()
            .flat_map(|part| part.into_iter())
            .cartesian_product(
                b.iter().flat_map(|part| part.into_iter()),
            );
        for (pa, pb) in pairs {
            let d = self.distance.measure(pa, pb);
            if best.map_or(true, |(_, _, bd)| d < bd) {
                best = Some((pa, pb, d));
            }
        }
        let (pa, pb, _) =
            best.expect("cannot connect an empty area");
        (pa, pb)
    }
}

/// Carves corridors until every area in the list belongs to one
/// connected whole.
///
/// Union-find tracks merged groups; on every pass each group root is
/// connected to its nearest group in another set, the join folding the
/// smaller group's area indices into the larger's.
pub struct ClosestMapAreaConnection {
    name: String,
    areas_tag: String,
    wall_floor_tag: String,
    tunnels_tag: String,
    rng: GameRng,
    pub distance: Distance,
    pub point_selector: Box<dyn ConnectionPointSelector>,
    pub tunnel_creator: Box<dyn TunnelCreator>,
}

impl Default for ClosestMapAreaConnection {
    fn default() -> Self {
        ClosestMapAreaConnection {
            name: "ClosestMapAreaConnection".to_owned(),
            areas_tag: tags::AREAS.to_owned(),
            wall_floor_tag: tags::WALL_FLOOR.to_owned(),
            tunnels_tag: tags::TUNNELS.to_owned(),
            rng: GameRng::from_entropy(),
            distance: Distance::Manhattan,
            point_selector: Box::new(ClosestPointSelector::default()),
            tunnel_creator: Box::new(DirectLineTunnel::default()),
        }
    }
}

impl ClosestMapAreaConnection {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_rng(mut self, rng: GameRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_point_selector(
        mut self,
        selector: impl ConnectionPointSelector + 'static,
    ) -> Self {
        self.point_selector = Box::new(selector);
        self
    }

    pub fn with_tunnel_creator(
        mut self,
        creator: impl TunnelCreator + 'static,
    ) -> Self {
        self.tunnel_creator = Box::new(creator);
        self
    }

    pub fn with_tunnels_tag(mut self, tag: &str) -> Self {
        self.tunnels_tag = tag.to_owned();
        self
    }
}

impl GenerationStep for ClosestMapAreaConnection {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Vec<ComponentRequirement> {
        vec![
            ComponentRequirement::new::<ItemList<Area>>(Some(
                &self.areas_tag,
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
        let areas = ctx.require::<ItemList<Area>>(
            &self.name,
            Some(&self.areas_tag),
        )?;
        let wall_floor = ctx.require::<VecGrid<bool>>(
            &self.name,
            Some(&self.wall_floor_tag),
        )?;
        let tunnels = ctx.get_or_new(
            ItemList::<Area>::new,
            Some(&self.tunnels_tag),
        );

        let n = areas.borrow().len();
        if n < 2 {
            return Ok(());
        }

        // Arena of merged groups: `groups[root]` holds the indices of
        // every original area in the root's set.
        let mut groups: Vec<Vec<usize>> =
            (0..n).map(|i| vec![i]).collect();
        let mut ds = DisjointSet::new(n);

        while ds.count() > 1 {
            for i in 0..n {
                if ds.count() <= 1 || ds.find(i) != i {
                    continue;
                }

                // Borrows are scoped per connection so stage observers
                // may inspect the map at the checkpoint.
                let connected = {
                    let areas = areas.borrow();
                    let parts_i: Vec<&Area> = groups[i]
                        .iter()
                        .map(|&k| &areas.items()[k])
                        .collect();

                    // Nearest group under another root.
                    let mut best: Option<(usize, IVec2, IVec2, f64)> =
                        None;
                    for j in 0..n {
                        if j == i
                            || ds.find(j) != j
                            || ds.in_same_set(i, j)
                        {
                            continue;
                        }
                        let parts_j: Vec<&Area> = groups[j]
                            .iter()
                            .map(|&k| &areas.items()[k])
                            .collect();
                        let (p1, p2) =
                            self.point_selector.select_points(
                                &mut self.rng,
                                &parts_i,
                                &parts_j,
                            );
                        let d = self.distance.measure(p1, p2);
                        if best.map_or(true, |(_, _, _, bd)| d < bd) {
                            best = Some((j, p1, p2, d));
                        }
                    }

                    match best {
                        None => false,
                        Some((j, p1, p2, _)) => {
                            let tunnel =
                                self.tunnel_creator.create_tunnel(
                                    &mut wall_floor.borrow_mut(),
                                    &mut self.rng,
                                    p1,
                                    p2,
                                );
                            ds.union_with(i, j, |larger, smaller| {
                                let moved = std::mem::take(
                                    &mut groups[smaller],
                                );
                                groups[larger].extend(moved);
                            });
                            tunnels
                                .borrow_mut()
                                .add(tunnel, &self.name);
                            true
                        }
                    }
                };
                if connected {
                    ctx.checkpoint(&self.name, "connection carved");
                }
            }
        }
        Ok(())
    }
}

/// Connects the listed areas pairwise in order, optionally shuffling
/// the order first.
pub struct OrderedMapAreaConnection {
    name: String,
    areas_tag: String,
    wall_floor_tag: String,
    tunnels_tag: String,
    rng: GameRng,
    pub randomize_order: bool,
    pub point_selector: Box<dyn ConnectionPointSelector>,
    pub tunnel_creator: Box<dyn TunnelCreator>,
}

impl Default for OrderedMapAreaConnection {
    fn default() -> Self {
        OrderedMapAreaConnection {
            name: "OrderedMapAreaConnection".to_owned(),
            areas_tag: tags::AREAS.to_owned(),
            wall_floor_tag: tags::WALL_FLOOR.to_owned(),
            tunnels_tag: tags::TUNNELS.to_owned(),
            rng: GameRng::from_entropy(),
            randomize_order: true,
            point_selector: Box::new(RandomPointSelector),
            tunnel_creator: Box::new(DirectLineTunnel::default()),
        }
    }
}

impl OrderedMapAreaConnection {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_rng(mut self, rng: GameRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_fixed_order(mut self) -> Self {
        self.randomize_order = false;
        self
    }

    pub fn with_point_selector(
        mut self,
        selector: impl ConnectionPointSelector + 'static,
    ) -> Self {
        self.point_selector = Box::new(selector);
        self
    }
}

impl GenerationStep for OrderedMapAreaConnection {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Vec<ComponentRequirement> {
        vec![
            ComponentRequirement::new::<ItemList<Area>>(Some(
                &self.areas_tag,
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
        let areas = ctx.require::<ItemList<Area>>(
            &self.name,
            Some(&self.areas_tag),
        )?;
        let wall_floor = ctx.require::<VecGrid<bool>>(
            &self.name,
            Some(&self.wall_floor_tag),
        )?;
        let tunnels = ctx.get_or_new(
            ItemList::<Area>::new,
            Some(&self.tunnels_tag),
        );

        let mut order: Vec<usize> = (0..areas.borrow().len()).collect();
        if self.randomize_order {
            order.shuffle(&mut self.rng);
        }

        for pair in order.windows(2) {
            {
                let areas = areas.borrow();
                let (p1, p2) = self.point_selector.select_points(
                    &mut self.rng,
                    &[&areas.items()[pair[1]]],
                    &[&areas.items()[pair[0]]],
                );
                let tunnel = self.tunnel_creator.create_tunnel(
                    &mut wall_floor.borrow_mut(),
                    &mut self.rng,
                    p1,
                    p2,
                );
                tunnels.borrow_mut().add(tunnel, &self.name);
            }
            ctx.checkpoint(&self.name, "connection carved");
        }
        Ok(())
    }
}
