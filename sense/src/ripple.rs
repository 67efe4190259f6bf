//! Ripple flood spread.

use std::cmp::Ordering;
use std::collections::VecDeque;

use glam::{ivec2, IVec2};
use util::{s8, GridView, GridViewMut, VecGrid};

use crate::source::{RippleType, SenseSource};

pub(crate) fn calculate(src: &mut SenseSource, flavor: RippleType) {
    let Some(resistance) = src.resistance.clone() else {
        return;
    };
    let resistance = &*resistance;
    let spread_count = flavor.spread_neighbors();
    let c = src.local_center();
    let center = ivec2(c, c);

    // Cells that sit against an occluder stop re-propagating; the
    // light they carry is direct only.
    let mut near_light: VecGrid<bool> =
        VecGrid::new(src.buffer.dim());
    let mut queue: VecDeque<IVec2> = VecDeque::new();
    queue.push_back(center);

    while let Some(p) = queue.pop_front() {
        if src.buffer[p] <= 0.0 || near_light[p] {
            continue;
        }
        for n in s8::ns(p) {
            if !src.buffer.contains(n) {
                continue;
            }
            let global = src.position + n - center;
            if !resistance.contains(global) {
                continue;
            }
            let delta = n - center;
            if src.distance.measure_delta(delta) > src.radius
                || !src.in_arc(delta)
            {
                continue;
            }

            let light = near_ripple_light(
                src,
                resistance,
                &mut near_light,
                n,
                center,
                spread_count,
            );
            if light > src.buffer[n] {
                src.buffer.set(n, light);
                // A brightened open cell gets its neighbors
                // re-examined.
                if resistance.get(global) < src.intensity {
                    queue.push_back(n);
                }
            }
        }
    }
}

/// Light reaching `n` from its already-lit neighbors.
///
/// Only the `spread_count` neighbors closest to the source
/// contribute; each gives its own light minus travel decay and its
/// cell resistance. Marks `n` near-light when it is itself an
/// occluder or when every contributing lit neighbor is near-light.
fn near_ripple_light(
    src: &SenseSource,
    resistance: &(dyn GridView<f64> + Send + Sync),
    near_light: &mut VecGrid<bool>,
    n: IVec2,
    center: IVec2,
    spread_count: usize,
) -> f64 {
    if n == center {
        return src.intensity;
    }

    let mut neighbors: Vec<IVec2> =
        s8::ns(n).filter(|&m| src.buffer.contains(m)).collect();
    // Stable sort; equidistant neighbors keep clock face order.
    neighbors.sort_by(|a, b| {
        let da = src.distance.measure_delta(*a - center);
        let db = src.distance.measure_delta(*b - center);
        da.partial_cmp(&db).unwrap_or(Ordering::Equal)
    });
    neighbors.truncate(spread_count);

    let mut light = 0.0f64;
    let mut lit = 0usize;
    let mut lit_near = 0usize;
    for m in neighbors {
        if src.buffer[m] <= 0.0 {
            continue;
        }
        lit += 1;
        if near_light[m] {
            lit_near += 1;
        }
        // The source's own cell passes light unresisted.
        let neighbor_resistance = if m == center {
            0.0
        } else {
            resistance.get(src.position + m - center)
        };
        let candidate = src.buffer[m]
            - src.distance.measure(n, m) * src.decay
            - neighbor_resistance;
        light = light.max(candidate);
    }

    let occluder =
        resistance.get(src.position + n - center) >= src.intensity;
    if occluder || (lit > 0 && lit_near >= lit) {
        near_light.set(n, true);
    }
    light
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use util::Distance;

    use super::*;
    use crate::SpreadAlgorithm;

    fn ripple_source(
        flavor: RippleType,
        resistance: Arc<VecGrid<f64>>,
    ) -> SenseSource {
        let mut src = SenseSource::new(
            SpreadAlgorithm::Ripple(flavor),
            [10, 10],
            4.0,
            Distance::Chebyshev,
        );
        src.set_resistance_view(Some(resistance));
        src
    }

    #[test]
    fn center_holds_full_intensity() {
        let resistance = Arc::new(VecGrid::new([21, 21]));
        for flavor in [
            RippleType::Tight,
            RippleType::Regular,
            RippleType::Loose,
            RippleType::VeryLoose,
        ] {
            let mut src = ripple_source(flavor, resistance.clone());
            src.calculate_light();
            let c = src.local_center();
            assert_eq!(src.buffer()[ivec2(c, c)], 1.0);

            // Nothing outshines the source and nothing leaks past the
            // radius.
            for (p, v) in src.buffer().iter() {
                assert!(v <= 1.0);
                if (p - ivec2(c, c)).abs().max_element() > 4 {
                    assert_eq!(v, 0.0);
                }
            }
        }
    }

    #[test]
    fn light_decreases_away_from_source() {
        let resistance = Arc::new(VecGrid::new([21, 21]));
        let mut src =
            ripple_source(RippleType::Regular, resistance);
        src.calculate_light();

        let c = src.local_center();
        for step in 1..=4 {
            let outer = src.buffer()[ivec2(c + step, c)];
            let inner = src.buffer()[ivec2(c + step - 1, c)];
            assert!(
                outer <= inner,
                "light grew outward at step {step}"
            );
        }
        assert!(src.buffer()[ivec2(c + 1, c)] > 0.0);
    }

    #[test]
    fn wall_blocks_repropagation() {
        let mut resistance: VecGrid<f64> = VecGrid::new([21, 21]);
        // Wall segment right of the source.
        for y in 8..=12 {
            resistance.set(ivec2(12, y), 1.0);
        }
        let mut src = ripple_source(
            RippleType::Regular,
            Arc::new(resistance),
        );
        src.calculate_light();

        let c = src.local_center();
        // Cells well behind the wall stay dark.
        assert_eq!(src.buffer()[ivec2(c + 4, c)], 0.0);
        // Open directions still lit.
        assert!(src.buffer()[ivec2(c - 2, c)] > 0.0);
    }
}
