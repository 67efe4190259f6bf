use std::sync::Arc;

use glam::{ivec2, IVec2};
use util::mathx::{scaled_atan2_approx, wrap_around_f64};
use util::{Distance, GridView, GridViewMut, VecGrid};

use crate::{ripple, shadowcast};

/// Shared read handle to the grid of per-cell resistance values.
///
/// `0.0` is fully transparent; values at or above a source's intensity
/// block it completely.
pub type ResistanceView = Arc<dyn GridView<f64> + Send + Sync>;

/// How a source's intensity spreads through the resistance grid.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SpreadAlgorithm {
    /// Recursive shadowcasting; hard-edged occlusion.
    Shadowcast,
    /// Flood fill with occluder-aware falloff; soft diffuse edges.
    Ripple(RippleType),
}

/// Ripple flavors, by how many neighbors feed a cell's light level.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum RippleType {
    Regular,
    Loose,
    Tight,
    VeryLoose,
}

impl RippleType {
    /// Number of closest-to-source neighbors contributing to a cell.
    /// Low counts give tight beams, high counts loose diffuse glow.
    pub fn spread_neighbors(self) -> usize {
        match self {
            RippleType::Tight => 1,
            RippleType::Regular => 2,
            RippleType::Loose => 3,
            RippleType::VeryLoose => 6,
        }
    }
}

/// A point source of sense intensity.
///
/// Owns a square local result buffer of side `2·floor(radius) + 1`
/// that its spread algorithm fills during calculation; a `SenseMap`
/// stamps the buffers of all its sources into the shared result.
pub struct SenseSource {
    pub(crate) position: IVec2,
    pub(crate) radius: f64,
    pub(crate) intensity: f64,
    pub(crate) decay: f64,
    pub(crate) distance: Distance,
    algorithm: SpreadAlgorithm,
    enabled: bool,
    /// Internal angle in degrees: compass angle rotated by -90 so 0
    /// points along +x.
    angle: f64,
    span: f64,
    pub(crate) resistance: Option<ResistanceView>,
    pub(crate) buffer: VecGrid<f64>,
    on_radius_changed: Option<Box<dyn FnMut(f64) + Send>>,
}

impl SenseSource {
    pub fn new(
        algorithm: SpreadAlgorithm,
        position: impl Into<IVec2>,
        radius: f64,
        distance: Distance,
    ) -> Self {
        let mut ret = SenseSource {
            position: position.into(),
            radius: 0.0,
            intensity: 1.0,
            decay: 0.0,
            distance,
            algorithm,
            enabled: true,
            angle: 0.0,
            span: 360.0,
            resistance: None,
            buffer: VecGrid::new([0, 0]),
            on_radius_changed: None,
        };
        ret.set_radius(radius);
        ret
    }

    /// Restrict the spread to a cone: compass `angle` degrees (0 is
    /// up, clockwise), `span` degrees centered on it.
    pub fn with_angle(mut self, angle: f64, span: f64) -> Self {
        self.set_angle(angle);
        self.set_span(span);
        self
    }

    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.set_intensity(intensity);
        self
    }

    pub fn position(&self) -> IVec2 {
        self.position
    }

    pub fn set_position(&mut self, position: impl Into<IVec2>) {
        self.position = position.into();
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Set the spread radius, reallocating and clearing the local
    /// buffer and recomputing decay. Fires the radius-changed
    /// callback.
    pub fn set_radius(&mut self, radius: f64) {
        assert!(radius > 0.0, "SenseSource: radius must be positive");
        self.radius = radius;
        let size = 2 * radius.floor() as i32 + 1;
        self.buffer = VecGrid::new([size, size]);
        self.decay = self.intensity / (radius + 1.0);
        if let Some(callback) = self.on_radius_changed.as_mut() {
            callback(radius);
        }
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn set_intensity(&mut self, intensity: f64) {
        assert!(
            intensity >= 0.0,
            "SenseSource: intensity cannot be negative"
        );
        self.intensity = intensity;
        self.decay = intensity / (self.radius + 1.0);
    }

    pub fn distance(&self) -> Distance {
        self.distance
    }

    pub fn set_distance(&mut self, distance: Distance) {
        self.distance = distance;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Compass direction of the restriction cone: 0 is up, 90 right.
    pub fn angle(&self) -> f64 {
        wrap_around_f64(self.angle + 90.0, 360.0)
    }

    pub fn set_angle(&mut self, angle: f64) {
        self.angle = wrap_around_f64(angle - 90.0, 360.0);
    }

    /// Arc width of the restriction cone in degrees; 360 disables the
    /// restriction.
    pub fn span(&self) -> f64 {
        self.span
    }

    pub fn set_span(&mut self, span: f64) {
        assert!(
            (0.0..=360.0).contains(&span),
            "SenseSource: span must be within [0, 360]"
        );
        self.span = span;
    }

    pub fn is_angle_restricted(&self) -> bool {
        self.span != 360.0
    }

    pub fn on_radius_changed(
        &mut self,
        callback: impl FnMut(f64) + Send + 'static,
    ) {
        self.on_radius_changed = Some(Box::new(callback));
    }

    /// The local spread buffer, a square of side `2·floor(radius)+1`
    /// centered on the source.
    pub fn buffer(&self) -> &VecGrid<f64> {
        &self.buffer
    }

    /// Offset of the source cell inside the local buffer along each
    /// axis.
    pub fn local_center(&self) -> i32 {
        self.buffer.width() / 2
    }

    pub(crate) fn has_resistance(&self) -> bool {
        self.resistance.is_some()
    }

    /// Bind or clear the resistance view. Called by the owning sense
    /// map on add and remove.
    pub(crate) fn set_resistance_view(
        &mut self,
        view: Option<ResistanceView>,
    ) {
        self.resistance = view;
    }

    /// Is the local offset from the source within the restriction
    /// cone? Inclusive at the cone's boundary.
    pub(crate) fn in_arc(&self, delta: IVec2) -> bool {
        if !self.is_angle_restricted() {
            return true;
        }
        let at = scaled_atan2_approx(delta.y as f64, delta.x as f64);
        let offset =
            wrap_around_f64(at - self.angle / 360.0, 1.0);
        offset.min(1.0 - offset) <= self.span / 720.0
    }

    /// Recompute the local buffer: clear, stamp the full intensity on
    /// the center, run the spread algorithm. A disabled or unbound
    /// source leaves its buffer untouched.
    pub fn calculate_light(&mut self) {
        if !self.enabled || self.resistance.is_none() {
            return;
        }
        self.buffer.fill(0.0);
        let c = self.local_center();
        self.buffer.set(ivec2(c, c), self.intensity);

        match self.algorithm {
            SpreadAlgorithm::Shadowcast => shadowcast::calculate(self),
            SpreadAlgorithm::Ripple(flavor) => {
                ripple::calculate(self, flavor)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> SenseSource {
        SenseSource::new(
            SpreadAlgorithm::Shadowcast,
            [5, 5],
            3.0,
            Distance::Chebyshev,
        )
    }

    #[test]
    fn radius_drives_buffer_and_decay() {
        let mut s = source();
        assert_eq!(s.buffer().dim(), ivec2(7, 7));
        assert_eq!(s.local_center(), 3);
        assert_eq!(s.decay, 0.25);

        let announced = std::sync::Arc::new(
            std::sync::atomic::AtomicU32::new(0),
        );
        let sink = announced.clone();
        s.on_radius_changed(move |_| {
            sink.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });
        s.set_radius(5.5);
        assert_eq!(s.buffer().dim(), ivec2(11, 11));
        assert_eq!(
            announced
                .load(std::sync::atomic::Ordering::SeqCst),
            1
        );

        s.set_intensity(2.0);
        assert!((s.decay - 2.0 / 6.5).abs() < 1e-12);
    }

    #[test]
    fn compass_angle_round_trip() {
        let mut s = source();
        s.set_angle(0.0);
        assert_eq!(s.angle(), 0.0);
        s.set_angle(450.0);
        assert_eq!(s.angle(), 90.0);

        assert!(!s.is_angle_restricted());
        s.set_span(90.0);
        assert!(s.is_angle_restricted());

        // Compass 90 is +x; the arc test runs on internal offsets.
        s.set_angle(90.0);
        assert!(s.in_arc(ivec2(3, 0)));
        assert!(s.in_arc(ivec2(3, 1)));
        assert!(!s.in_arc(ivec2(-3, 0)));
        assert!(!s.in_arc(ivec2(0, 3)));
    }

    #[test]
    #[should_panic]
    fn rejects_zero_radius() {
        SenseSource::new(
            SpreadAlgorithm::Shadowcast,
            [0, 0],
            0.0,
            Distance::Chebyshev,
        );
    }

    #[test]
    #[should_panic]
    fn rejects_negative_intensity() {
        source().set_intensity(-0.5);
    }

    #[test]
    #[should_panic]
    fn rejects_out_of_range_span() {
        source().set_span(361.0);
    }
}
