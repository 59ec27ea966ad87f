use serde::{Deserialize, Serialize};

use crate::geo::Pose;
use crate::layout::LayoutConfig;
use crate::spring::SpringConfig;
use crate::style::Palette;

pub const DEFAULT_OVERVIEW_POSE: Pose = Pose::new(127.5, 35.8, 1.0);
pub const DEFAULT_STYLE_TRANSITION_MS: f64 = 500.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("spring stiffness must be positive and finite, got {0}")]
    SpringStiffness(f64),
    #[error("spring mass must be positive and finite, got {0}")]
    SpringMass(f64),
    #[error("spring damping must be non-negative and finite, got {0}")]
    SpringDamping(f64),
    #[error("spring damping ratio {ratio:.3} is below the minimum {min}")]
    Underdamped { ratio: f64, min: f64 },
    #[error(
        "spring is unstable at the integration step (omega*h = {omega_h:.3}, c/m*h = {decay_h:.3})"
    )]
    UnstableStep { omega_h: f64, decay_h: f64 },
    #[error("overview pose {0:?} is invalid")]
    OverviewPose(Pose),
    #[error("{field} must be positive and finite, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("dimmed opacity must be within [0, 1], got {0}")]
    Opacity(f64),
    #[error("failed to parse navigator config: {0}")]
    Parse(#[from] serde_json::Error),
}

pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

/// Every tunable the navigator reads. Missing keys fall back to defaults,
/// so a JSON override only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    pub spring: SpringConfig,
    pub overview_pose: Pose,
    pub layout: LayoutConfig,
    pub palette: Palette,
    pub style_transition_ms: f64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            spring: SpringConfig::default(),
            overview_pose: DEFAULT_OVERVIEW_POSE,
            layout: LayoutConfig::default(),
            palette: Palette::default(),
            style_transition_ms: DEFAULT_STYLE_TRANSITION_MS,
        }
    }
}

impl NavigatorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.spring.validate()?;
        if !self.overview_pose.is_valid() {
            return Err(ConfigError::OverviewPose(self.overview_pose));
        }
        self.layout.validate()?;
        self.palette.validate()?;
        if !self.style_transition_ms.is_finite() || self.style_transition_ms < 0.0 {
            return Err(ConfigError::NonPositive {
                field: "style_transition_ms",
                value: self.style_transition_ms,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        NavigatorConfig::default().validate().unwrap();
    }

    #[test]
    fn defaults_carry_the_documented_constants() {
        let config = NavigatorConfig::default();
        assert_eq!(config.overview_pose, Pose::new(127.5, 35.8, 1.0));
        assert_eq!(config.palette.dimmed_opacity, 0.3);
        assert_eq!(config.layout.mobile_breakpoint, 768.0);
        assert_eq!(config.style_transition_ms, 500.0);
    }

    #[test]
    fn partial_json_override_keeps_other_defaults() {
        let config = NavigatorConfig::from_json(
            r#"{"spring": {"stiffness": 120.0, "damping": 21.0}, "layout": {"mobile_breakpoint": 640.0}}"#,
        )
        .unwrap();
        assert_eq!(config.spring.stiffness, 120.0);
        assert_eq!(config.spring.damping, 21.0);
        assert_eq!(config.layout.mobile_breakpoint, 640.0);
        assert_eq!(config.palette, Palette::default());
    }

    #[test]
    fn stiffness_only_override_stays_critically_damped() {
        for stiffness in [400.0, 1000.0] {
            let json = format!(r#"{{"spring": {{"stiffness": {stiffness}}}}}"#);
            let config = NavigatorConfig::from_json(&json).unwrap();
            assert_eq!(config.spring.stiffness, stiffness);
            assert!((config.spring.damping_ratio() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn from_json_rejects_diverging_spring() {
        let err = NavigatorConfig::from_json(r#"{"spring": {"stiffness": 100.0, "damping": 0.0}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Underdamped { .. }), "{err}");
    }

    #[test]
    fn from_json_rejects_invalid_overview_pose() {
        let err = NavigatorConfig::from_json(
            r#"{"overview_pose": {"center": [127.5, 35.8], "zoom": 0.0}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::OverviewPose(_)));
    }

    #[test]
    fn from_json_reports_parse_errors() {
        let err = NavigatorConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
