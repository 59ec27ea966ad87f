//! Damped spring integrator used for every animated camera axis.
//!
//! Values are pulled each frame via [`Spring::value`]; call [`Spring::tick`]
//! with the elapsed time first. Re-targeting keeps the current position and
//! velocity, so motion stays continuous when a new target arrives mid-flight.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Fixed integration sub-step in seconds. Frame deltas are split into
/// steps no longer than this.
pub const MAX_SUBSTEP_SECS: f64 = 1.0 / 240.0;

/// Frame deltas above this are clamped (tab switches, debugger pauses).
pub const MAX_FRAME_SECS: f64 = 0.1;

/// Damping ratios below this bounce visibly and are rejected at startup.
pub const MIN_DAMPING_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "SpringConfigOverride")]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
}

/// Serialized form. A missing `damping` means critical damping for the
/// given stiffness and mass, not the default spring's damping.
#[derive(Deserialize)]
struct SpringConfigOverride {
    #[serde(default = "default_stiffness")]
    stiffness: f64,
    #[serde(default)]
    damping: Option<f64>,
    #[serde(default = "default_mass")]
    mass: f64,
}

const DEFAULT_STIFFNESS: f64 = 170.0;
const DEFAULT_MASS: f64 = 1.0;

fn default_stiffness() -> f64 {
    DEFAULT_STIFFNESS
}

fn default_mass() -> f64 {
    DEFAULT_MASS
}

impl From<SpringConfigOverride> for SpringConfig {
    fn from(raw: SpringConfigOverride) -> Self {
        let critical = Self::critically_damped(raw.stiffness, raw.mass);
        match raw.damping {
            Some(damping) => Self { damping, ..critical },
            None => critical,
        }
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::critically_damped(DEFAULT_STIFFNESS, DEFAULT_MASS)
    }
}

impl SpringConfig {
    /// Damping chosen so the spring returns to rest as fast as possible
    /// without overshoot: `c = 2 * sqrt(k * m)`.
    pub fn critically_damped(stiffness: f64, mass: f64) -> Self {
        Self {
            stiffness,
            damping: 2.0 * (stiffness * mass).sqrt(),
            mass,
        }
    }

    /// `c / (2 * sqrt(k * m))`: 1.0 is critical, below bounces, above crawls.
    pub fn damping_ratio(&self) -> f64 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let Self {
            stiffness,
            damping,
            mass,
        } = *self;
        if !stiffness.is_finite() || stiffness <= 0.0 {
            return Err(ConfigError::SpringStiffness(stiffness));
        }
        if !mass.is_finite() || mass <= 0.0 {
            return Err(ConfigError::SpringMass(mass));
        }
        if !damping.is_finite() || damping < 0.0 {
            return Err(ConfigError::SpringDamping(damping));
        }
        let ratio = self.damping_ratio();
        if ratio < MIN_DAMPING_RATIO {
            return Err(ConfigError::Underdamped {
                ratio,
                min: MIN_DAMPING_RATIO,
            });
        }
        // Semi-implicit Euler blows up once either term approaches 2 per step.
        let omega_h = (stiffness / mass).sqrt() * MAX_SUBSTEP_SECS;
        let decay_h = damping / mass * MAX_SUBSTEP_SECS;
        if omega_h >= 1.0 || decay_h >= 1.0 {
            return Err(ConfigError::UnstableStep { omega_h, decay_h });
        }
        Ok(())
    }
}

/// How close to the target counts as "at rest".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestThreshold {
    pub displacement: f64,
    pub velocity: f64,
}

impl Default for RestThreshold {
    fn default() -> Self {
        Self {
            displacement: 1e-4,
            velocity: 1e-3,
        }
    }
}

/// One animated scalar.
#[derive(Debug, Clone)]
pub struct Spring {
    value: f64,
    velocity: f64,
    target: f64,
    config: SpringConfig,
    rest: RestThreshold,
}

impl Spring {
    pub fn new(initial: f64, config: SpringConfig) -> Self {
        Self::with_rest(initial, config, RestThreshold::default())
    }

    pub fn with_rest(initial: f64, config: SpringConfig, rest: RestThreshold) -> Self {
        Self {
            value: initial,
            velocity: 0.0,
            target: initial,
            config,
            rest,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Re-target without touching position or velocity.
    pub fn set_target(&mut self, target: f64) {
        if target.is_finite() {
            self.target = target;
        }
    }

    /// Jump to `value` with no animation.
    pub fn set_immediate(&mut self, value: f64) {
        if value.is_finite() {
            self.value = value;
            self.target = value;
            self.velocity = 0.0;
        }
    }

    pub fn is_settled(&self) -> bool {
        self.value == self.target && self.velocity == 0.0
    }

    /// Advance by `dt` seconds. Returns `true` while still moving.
    pub fn tick(&mut self, dt: f64) -> bool {
        if self.is_settled() {
            return false;
        }
        if !dt.is_finite() || dt <= 0.0 {
            return true;
        }

        let SpringConfig {
            stiffness,
            damping,
            mass,
        } = self.config;

        let mut remaining = dt.min(MAX_FRAME_SECS);
        while remaining > 0.0 {
            let h = remaining.min(MAX_SUBSTEP_SECS);
            let displacement = self.value - self.target;
            let acceleration = (-stiffness * displacement - damping * self.velocity) / mass;
            self.velocity += acceleration * h;
            self.value += self.velocity * h;
            remaining -= h;
        }

        // Snap once within tolerance so the value lands exactly on target
        // instead of creeping through sub-pixel residue forever.
        if (self.value - self.target).abs() < self.rest.displacement
            && self.velocity.abs() < self.rest.velocity
        {
            self.value = self.target;
            self.velocity = 0.0;
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f64 = 1.0 / 60.0;

    fn run_until_settled(spring: &mut Spring, max_frames: usize) -> Option<usize> {
        (0..max_frames).find(|_| !spring.tick(FRAME))
    }

    #[test]
    fn default_config_is_critically_damped_and_valid() {
        let config = SpringConfig::default();
        assert!((config.damping_ratio() - 1.0).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn settles_exactly_on_target() {
        let mut spring = Spring::new(0.0, SpringConfig::default());
        spring.set_target(10.0);
        let frames = run_until_settled(&mut spring, 600).expect("spring should settle");
        assert!(frames > 10, "settled implausibly fast: {frames}");
        assert_eq!(spring.value(), 10.0);
        assert_eq!(spring.velocity(), 0.0);
        assert!(spring.is_settled());
    }

    #[test]
    fn critically_damped_does_not_overshoot_meaningfully() {
        let mut spring = Spring::new(0.0, SpringConfig::default());
        spring.set_target(1.0);
        let mut peak: f64 = 0.0;
        for _ in 0..600 {
            spring.tick(FRAME);
            peak = peak.max(spring.value());
        }
        assert!(peak <= 1.0 + 1e-3, "overshoot to {peak}");
    }

    #[test]
    fn retarget_keeps_position_and_velocity() {
        let mut spring = Spring::new(0.0, SpringConfig::default());
        spring.set_target(10.0);
        for _ in 0..5 {
            spring.tick(FRAME);
        }
        let (value, velocity) = (spring.value(), spring.velocity());
        assert!(velocity > 0.0);
        spring.set_target(-4.0);
        assert_eq!(spring.value(), value);
        assert_eq!(spring.velocity(), velocity);
        run_until_settled(&mut spring, 600).expect("spring should settle");
        assert_eq!(spring.value(), -4.0);
    }

    #[test]
    fn repeated_same_target_stays_put() {
        let mut spring = Spring::new(3.0, SpringConfig::default());
        spring.set_target(3.0);
        assert!(!spring.tick(FRAME));
        assert_eq!(spring.value(), 3.0);
    }

    #[test]
    fn huge_frame_delta_is_clamped() {
        let mut spring = Spring::new(0.0, SpringConfig::default());
        spring.set_target(1.0);
        spring.tick(30.0);
        assert!(spring.value().is_finite());
        assert!(spring.value() < 1.0 + 1e-3);
    }

    #[test]
    fn non_positive_or_nan_dt_is_ignored() {
        let mut spring = Spring::new(0.0, SpringConfig::default());
        spring.set_target(1.0);
        assert!(spring.tick(0.0));
        assert!(spring.tick(f64::NAN));
        assert_eq!(spring.value(), 0.0);
    }

    #[test]
    fn validate_rejects_pathological_constants() {
        let bad = [
            SpringConfig { stiffness: 0.0, damping: 1.0, mass: 1.0 },
            SpringConfig { stiffness: 100.0, damping: 20.0, mass: 0.0 },
            SpringConfig { stiffness: 100.0, damping: -1.0, mass: 1.0 },
            SpringConfig { stiffness: 100.0, damping: 0.0, mass: 1.0 },
            SpringConfig { stiffness: f64::INFINITY, damping: 20.0, mass: 1.0 },
            SpringConfig::critically_damped(1.0e6, 1.0),
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{config:?} should be rejected");
        }
    }

    #[test]
    fn config_deserializes_partial_overrides() {
        let config: SpringConfig = serde_json::from_str(r#"{"stiffness": 120.0}"#).unwrap();
        assert_eq!(config.stiffness, 120.0);
        assert_eq!(config.mass, 1.0);
    }

    #[test]
    fn missing_damping_is_critical_for_overridden_stiffness_and_mass() {
        for json in [
            r#"{"stiffness": 400.0}"#,
            r#"{"stiffness": 1000.0}"#,
            r#"{"mass": 2.5}"#,
            r#"{"stiffness": 60.0, "mass": 0.5}"#,
        ] {
            let config: SpringConfig = serde_json::from_str(json).unwrap();
            assert!(
                (config.damping_ratio() - 1.0).abs() < 1e-12,
                "{json} gave ratio {}",
                config.damping_ratio()
            );
            assert!(config.validate().is_ok(), "{json} should validate");
        }
    }

    #[test]
    fn explicit_damping_is_kept() {
        let config: SpringConfig =
            serde_json::from_str(r#"{"stiffness": 100.0, "damping": 30.0}"#).unwrap();
        assert_eq!(config.damping, 30.0);
        assert_eq!(config.mass, 1.0);
    }
}
