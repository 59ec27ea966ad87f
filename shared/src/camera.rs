use crate::geo::{MAX_MERCATOR_LAT, Pose};
use crate::spring::{RestThreshold, Spring, SpringConfig};

/// Degrees; roughly a tenth of a metre at these latitudes.
const CENTER_REST: RestThreshold = RestThreshold {
    displacement: 1e-6,
    velocity: 1e-4,
};
const ZOOM_REST: RestThreshold = RestThreshold {
    displacement: 1e-5,
    velocity: 1e-4,
};

/// Owns the camera pose and animates it toward a target with one spring
/// per axis, so a zoom-only change never disturbs the center and vice versa.
///
/// `target_pose` changes instantly; `render_pose` is the continuously
/// interpolated value used for projection.
#[derive(Debug, Clone)]
pub struct ViewportController {
    lon: Spring,
    lat: Spring,
    zoom: Spring,
    target: Pose,
}

impl ViewportController {
    pub fn new(initial: Pose, config: SpringConfig) -> Self {
        Self {
            lon: Spring::with_rest(initial.center.lon, config, CENTER_REST),
            lat: Spring::with_rest(initial.center.lat, config, CENTER_REST),
            zoom: Spring::with_rest(initial.zoom, config, ZOOM_REST),
            target: initial,
        }
    }

    /// Begin (or continue) animating toward `pose`. The springs keep their
    /// current position and velocity, so an in-flight move bends smoothly
    /// toward the new target. Invalid poses are ignored.
    pub fn set_target(&mut self, pose: Pose) {
        if !pose.is_valid() {
            tracing::warn!(?pose, "ignoring invalid camera target");
            return;
        }
        self.target = pose;
        self.lon.set_target(pose.center.lon);
        self.lat.set_target(pose.center.lat);
        self.zoom.set_target(pose.zoom);
    }

    /// Jump straight to `pose` with no animation.
    pub fn snap_to(&mut self, pose: Pose) {
        if !pose.is_valid() {
            return;
        }
        self.target = pose;
        self.lon.set_immediate(pose.center.lon);
        self.lat.set_immediate(pose.center.lat);
        self.zoom.set_immediate(pose.zoom);
    }

    /// Advance by `dt` seconds. Returns `true` while any axis is moving.
    pub fn tick(&mut self, dt: f64) -> bool {
        let lon = self.lon.tick(dt);
        let lat = self.lat.tick(dt);
        let zoom = self.zoom.tick(dt);
        lon || lat || zoom
    }

    pub fn target_pose(&self) -> Pose {
        self.target
    }

    /// The interpolated pose to project with this frame. Always a valid
    /// pose even when a spring momentarily leaves the legal range.
    pub fn render_pose(&self) -> Pose {
        Pose::new(
            self.lon.value().clamp(-180.0, 180.0),
            self.lat.value().clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT),
            self.zoom.value().max(f64::MIN_POSITIVE),
        )
    }

    /// Per-axis velocity as (lon, lat, zoom).
    pub fn velocity(&self) -> (f64, f64, f64) {
        (self.lon.velocity(), self.lat.velocity(), self.zoom.velocity())
    }

    pub fn is_settled(&self) -> bool {
        self.lon.is_settled() && self.lat.is_settled() && self.zoom.is_settled()
    }
}
