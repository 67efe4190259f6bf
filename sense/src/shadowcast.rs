//! Recursive shadowcasting spread.

use glam::ivec2;
use util::{GridView, GridViewMut};

use crate::source::SenseSource;

// Octant transforms: (xx, xy, yx, yy) per octant maps sweep
// coordinates onto buffer offsets.
const XX: [i32; 8] = [1, 0, 0, -1, -1, 0, 0, 1];
const XY: [i32; 8] = [0, 1, -1, 0, 0, -1, 1, 0];
const YX: [i32; 8] = [0, 1, 1, 0, 0, -1, -1, 0];
const YY: [i32; 8] = [1, 0, 0, 1, -1, 0, 0, -1];

pub(crate) fn calculate(src: &mut SenseSource) {
    let Some(resistance) = src.resistance.clone() else {
        return;
    };
    for octant in 0..8 {
        cast(
            src,
            &*resistance,
            1,
            1.0,
            0.0,
            [XX[octant], XY[octant], YX[octant], YY[octant]],
        );
    }
}

/// One octant sweep between the `start` and `end` slopes, rows `row`
/// out to the radius.
fn cast(
    src: &mut SenseSource,
    resistance: &(dyn GridView<f64> + Send + Sync),
    row: i32,
    mut start: f64,
    end: f64,
    octant: [i32; 4],
) {
    if start < end {
        return;
    }
    let [xx, xy, yx, yy] = octant;
    let radius = src.radius;
    let max_row = radius.floor() as i32;
    let center = src.local_center();

    let mut new_start = 0.0;
    let mut blocked = false;
    let mut distance = row;
    while distance <= max_row && !blocked {
        let delta_y = -distance;
        for delta_x in -distance..=0 {
            let left_slope =
                (delta_x as f64 - 0.5) / (delta_y as f64 + 0.5);
            let right_slope =
                (delta_x as f64 + 0.5) / (delta_y as f64 - 0.5);
            if start < right_slope {
                continue;
            }
            if end > left_slope {
                break;
            }

            let local = ivec2(
                center + delta_x * xx + delta_y * xy,
                center + delta_x * yx + delta_y * yy,
            );
            let global =
                src.position + local - ivec2(center, center);
            if !src.buffer.contains(local)
                || !resistance.contains(global)
            {
                continue;
            }

            let delta = local - ivec2(center, center);
            let delta_radius = src.distance.measure_delta(delta);
            if delta_radius <= radius && src.in_arc(delta) {
                src.buffer.set(
                    local,
                    src.intensity - src.decay * delta_radius,
                );
            }

            // Resistance below the intensity is fully transparent.
            let blocks = resistance.get(global) >= src.intensity;
            if blocked {
                if blocks {
                    new_start = right_slope;
                } else {
                    blocked = false;
                    start = new_start;
                }
            } else if blocks && distance < max_row {
                // Occluder: sweep the remaining open wedge, then
                // resume past the shadow.
                blocked = true;
                cast(
                    src,
                    resistance,
                    distance + 1,
                    start,
                    left_slope,
                    octant,
                );
                new_start = right_slope;
            }
        }
        distance += 1;
    }
}
