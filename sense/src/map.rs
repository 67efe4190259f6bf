use glam::{ivec2, IVec2};
use log::trace;
use rayon::prelude::*;
use util::{GridView, GridViewMut, HashSet, VecGrid};

use crate::source::{ResistanceView, SenseSource};

/// Aggregates any number of sense sources over a shared resistance
/// grid into one additive result view.
///
/// Two hash sets track the sensed cells of the current and the
/// previous calculation; the sets are swapped rather than reallocated,
/// and their differences give the newly-entered and newly-exited
/// cells.
pub struct SenseMap {
    resistance: ResistanceView,
    result: VecGrid<f64>,
    sources: Vec<SenseSource>,
    current: HashSet<IVec2>,
    previous: HashSet<IVec2>,
    parallel_calculate: bool,
    resizer: Box<dyn FnMut(IVec2) -> VecGrid<f64>>,
    on_recalculated: Option<Box<dyn FnMut()>>,
    on_reset: Option<Box<dyn FnMut()>>,
}

impl SenseMap {
    pub fn new(resistance: ResistanceView) -> Self {
        let dim = resistance.dim();
        SenseMap {
            resistance,
            result: VecGrid::new(dim),
            sources: Vec::new(),
            current: Default::default(),
            previous: Default::default(),
            parallel_calculate: true,
            resizer: Box::new(|dim| VecGrid::new(dim)),
            on_recalculated: None,
            on_reset: None,
        }
    }

    /// Replace the owned result view. The view is zeroed on the next
    /// reset.
    pub fn with_result_view(mut self, result: VecGrid<f64>) -> Self {
        self.result = result;
        self
    }

    /// Toggle concurrent per-source calculation. The aggregation pass
    /// is sequential either way.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel_calculate = parallel;
        self
    }

    /// Function producing a fresh zeroed result view when the
    /// resistance view's dimensions change between calculations.
    pub fn with_resizer(
        mut self,
        resizer: impl FnMut(IVec2) -> VecGrid<f64> + 'static,
    ) -> Self {
        self.resizer = Box::new(resizer);
        self
    }

    pub fn on_recalculated(
        &mut self,
        callback: impl FnMut() + 'static,
    ) {
        self.on_recalculated = Some(Box::new(callback));
    }

    pub fn on_reset(&mut self, callback: impl FnMut() + 'static) {
        self.on_reset = Some(Box::new(callback));
    }

    /// Add a source, binding the map's resistance view into it.
    /// Returns the source's index.
    pub fn add_sense_source(&mut self, mut source: SenseSource) -> usize {
        source.set_resistance_view(Some(self.resistance.clone()));
        self.sources.push(source);
        self.sources.len() - 1
    }

    /// Detach and return the source at `index`; later indices shift
    /// down. Panics on an out-of-range index.
    pub fn remove_sense_source(&mut self, index: usize) -> SenseSource {
        let mut source = self.sources.remove(index);
        source.set_resistance_view(None);
        source
    }

    pub fn sources(&self) -> &[SenseSource] {
        &self.sources
    }

    pub fn source_mut(&mut self, index: usize) -> &mut SenseSource {
        &mut self.sources[index]
    }

    /// The aggregated scalar field of the last calculation.
    pub fn result_view(&self) -> &VecGrid<f64> {
        &self.result
    }

    /// Is the cell inside the sensed field?
    pub fn contains(&self, p: IVec2) -> bool {
        self.current.contains(&p)
    }

    /// Cells sensed by the last calculation.
    pub fn current_sense_map(
        &self,
    ) -> impl Iterator<Item = IVec2> + '_ {
        self.current.iter().copied()
    }

    pub fn current_count(&self) -> usize {
        self.current.len()
    }

    /// Cells that entered the field in the last calculation.
    pub fn newly_in_sense_map(
        &self,
    ) -> impl Iterator<Item = IVec2> + '_ {
        self.current.difference(&self.previous).copied()
    }

    /// Cells that left the field in the last calculation.
    pub fn newly_out_of_sense_map(
        &self,
    ) -> impl Iterator<Item = IVec2> + '_ {
        self.previous.difference(&self.current).copied()
    }

    /// Roll the current sensed set into the previous one and zero the
    /// result view, resizing it if the resistance view changed size.
    pub fn reset(&mut self) {
        std::mem::swap(&mut self.current, &mut self.previous);
        self.current.clear();

        if self.result.dim() != self.resistance.dim() {
            self.result = (self.resizer)(self.resistance.dim());
        } else {
            self.result.fill(0.0);
        }

        if let Some(callback) = self.on_reset.as_mut() {
            callback();
        }
    }

    /// Recalculate the whole field: reset, spread every enabled
    /// source into its local buffer, then stamp the buffers into the
    /// result view in source insertion order.
    pub fn calculate(&mut self) {
        self.reset();

        let enabled =
            self.sources.iter().filter(|s| s.enabled()).count();
        trace!("sense map: calculating {enabled} sources");
        if self.parallel_calculate && enabled > 1 {
            self.sources
                .par_iter_mut()
                .for_each(|source| source.calculate_light());
        } else {
            for source in &mut self.sources {
                source.calculate_light();
            }
        }

        // Sequential aggregation; addition commutes but the delta
        // sets must be filled from one thread.
        let SenseMap {
            sources,
            result,
            current,
            ..
        } = self;
        for source in sources.iter() {
            if !source.enabled() || !source.has_resistance() {
                continue;
            }
            let r = source.local_center();
            let pos = source.position();
            for dy in -r..=r {
                for dx in -r..=r {
                    let g = pos + ivec2(dx, dy);
                    if !result.contains(g) {
                        continue;
                    }
                    let v = source.buffer()[ivec2(r + dx, r + dy)];
                    if v > 0.0 {
                        result[g] += v;
                        current.insert(g);
                    }
                }
            }
        }

        if let Some(callback) = self.on_recalculated.as_mut() {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_approx_eq::assert_approx_eq;
    use util::Distance;

    use super::*;
    use crate::{SpreadAlgorithm, SenseSource};

    fn shadow_source(pos: impl Into<IVec2>, radius: f64) -> SenseSource {
        SenseSource::new(
            SpreadAlgorithm::Shadowcast,
            pos,
            radius,
            Distance::Chebyshev,
        )
    }

    fn open_map(dim: i32) -> SenseMap {
        SenseMap::new(Arc::new(VecGrid::<f64>::new([dim, dim])))
    }

    #[test]
    fn single_source_field() {
        let mut map = open_map(20);
        map.add_sense_source(shadow_source([10, 10], 3.0));
        map.calculate();

        assert_approx_eq!(map.result_view()[ivec2(10, 10)], 1.0);
        assert_approx_eq!(map.result_view()[ivec2(12, 10)], 0.5);
        assert_eq!(map.current_count(), 49);
        assert_eq!(map.newly_in_sense_map().count(), 49);
        assert_eq!(map.newly_out_of_sense_map().count(), 0);

        // The sensed set matches the positive cells of the result.
        let positive = map
            .result_view()
            .iter()
            .filter(|&(_, v)| v > 0.0)
            .count();
        assert_eq!(positive, map.current_count());
    }

    #[test]
    fn deltas_track_source_movement() {
        let mut map = open_map(20);
        let id = map.add_sense_source(shadow_source([5, 5], 2.0));
        map.calculate();
        assert_eq!(map.newly_in_sense_map().count(), 25);

        map.source_mut(id).set_position([6, 5]);
        map.calculate();

        let newly_in: Vec<IVec2> = map.newly_in_sense_map().collect();
        let newly_out: Vec<IVec2> =
            map.newly_out_of_sense_map().collect();
        assert_eq!(newly_in.len(), 5);
        assert_eq!(newly_out.len(), 5);
        for p in &newly_in {
            assert!(map.newly_out_of_sense_map().all(|q| q != *p));
        }
    }

    #[test]
    fn sources_aggregate_additively() {
        let mut map = open_map(20).with_parallel(false);
        map.add_sense_source(shadow_source([8, 8], 2.0));
        map.add_sense_source(shadow_source([10, 8], 2.0));
        map.calculate();

        // Between the two sources both fields contribute.
        let v = map.result_view()[ivec2(9, 8)];
        let expected = (1.0 - 1.0 / 3.0) * 2.0;
        assert_approx_eq!(v, expected);
    }

    #[test]
    fn parallel_matches_sequential() {
        let build = |parallel| {
            let mut map = open_map(30).with_parallel(parallel);
            map.add_sense_source(shadow_source([5, 5], 3.0));
            map.add_sense_source(shadow_source([20, 20], 4.0));
            map.add_sense_source(shadow_source([12, 18], 2.0));
            map.calculate();
            map
        };
        let a = build(false);
        let b = build(true);
        for (p, v) in a.result_view().iter() {
            assert_approx_eq!(v, b.result_view()[p]);
        }
        assert_eq!(a.current_count(), b.current_count());
    }

    #[test]
    fn disabled_sources_do_not_stamp() {
        let mut map = open_map(20);
        let id = map.add_sense_source(shadow_source([10, 10], 3.0));
        map.source_mut(id).set_enabled(false);
        map.calculate();
        assert_eq!(map.current_count(), 0);

        map.source_mut(id).set_enabled(true);
        map.calculate();
        assert!(map.current_count() > 0);
    }

    #[test]
    fn removal_detaches_resistance() {
        let mut map = open_map(20);
        let id = map.add_sense_source(shadow_source([10, 10], 3.0));
        let source = map.remove_sense_source(id);
        assert!(!source.has_resistance());
        map.calculate();
        assert_eq!(map.current_count(), 0);
    }

    #[test]
    fn reset_event_fires() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut map = open_map(10);
        map.add_sense_source(shadow_source([5, 5], 2.0));
        let resets = Rc::new(Cell::new(0));
        let recalcs = Rc::new(Cell::new(0));
        let (r1, r2) = (resets.clone(), recalcs.clone());
        map.on_reset(move || r1.set(r1.get() + 1));
        map.on_recalculated(move || r2.set(r2.get() + 1));

        map.calculate();
        map.calculate();
        assert_eq!(resets.get(), 2);
        assert_eq!(recalcs.get(), 2);
    }
}
