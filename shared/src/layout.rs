use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, require_positive};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

impl DeviceClass {
    /// Strictly under the breakpoint is mobile.
    pub fn for_width(width: f64, breakpoint: f64) -> Self {
        if width < breakpoint {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }
}

/// A value with one variant per device class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerDevice {
    pub mobile: f64,
    pub desktop: f64,
}

impl PerDevice {
    pub const fn new(mobile: f64, desktop: f64) -> Self {
        Self { mobile, desktop }
    }

    pub fn get(&self, class: DeviceClass) -> f64 {
        match class {
            DeviceClass::Mobile => self.mobile,
            DeviceClass::Desktop => self.desktop,
        }
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        require_positive(field, self.mobile)?;
        require_positive(field, self.desktop)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub mobile_breakpoint: f64,
    /// Projection scale with no region focused.
    pub overview_scale: PerDevice,
    /// Projection scale while a region is focused.
    pub focused_scale: PerDevice,
    /// City marker radius in CSS pixels; not scaled with the canvas.
    pub marker_radius: PerDevice,
    /// City marker label size in CSS pixels.
    pub marker_font_px: PerDevice,
    /// Region label size in view-box units.
    pub label_font_px: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            mobile_breakpoint: 768.0,
            overview_scale: PerDevice::new(10_000.0, 4_000.0),
            focused_scale: PerDevice::new(6_000.0, 7_000.0),
            marker_radius: PerDevice::new(3.0, 4.0),
            marker_font_px: PerDevice::new(12.0, 14.0),
            label_font_px: 28.0,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("layout.mobile_breakpoint", self.mobile_breakpoint)?;
        self.overview_scale.validate("layout.overview_scale")?;
        self.focused_scale.validate("layout.focused_scale")?;
        self.marker_radius.validate("layout.marker_radius")?;
        self.marker_font_px.validate("layout.marker_font_px")?;
        require_positive("layout.label_font_px", self.label_font_px)
    }
}

/// Device class tracking plus the numbers derived from it.
#[derive(Debug, Clone)]
pub struct ResponsiveLayout {
    config: LayoutConfig,
    device_class: DeviceClass,
}

impl ResponsiveLayout {
    pub fn new(config: LayoutConfig, width: f64) -> Self {
        let device_class = DeviceClass::for_width(width, config.mobile_breakpoint);
        Self {
            config,
            device_class,
        }
    }

    /// Record a new viewport width. Returns `true` only when the device
    /// class flipped, so callers can skip work for same-class resizes.
    pub fn resize(&mut self, width: f64) -> bool {
        let class = DeviceClass::for_width(width, self.config.mobile_breakpoint);
        if class == self.device_class {
            return false;
        }
        tracing::debug!(?class, width, "device class changed");
        self.device_class = class;
        true
    }

    pub fn device_class(&self) -> DeviceClass {
        self.device_class
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn projection_scale(&self, focused: bool) -> f64 {
        if focused {
            self.config.focused_scale.get(self.device_class)
        } else {
            self.config.overview_scale.get(self.device_class)
        }
    }

    pub fn marker_radius(&self) -> f64 {
        self.config.marker_radius.get(self.device_class)
    }

    pub fn marker_font_px(&self) -> f64 {
        self.config.marker_font_px.get(self.device_class)
    }

    pub fn label_font_px(&self) -> f64 {
        self.config.label_font_px
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoint_is_exclusive_for_mobile() {
        assert_eq!(DeviceClass::for_width(767.0, 768.0), DeviceClass::Mobile);
        assert_eq!(DeviceClass::for_width(768.0, 768.0), DeviceClass::Desktop);
    }

    #[test]
    fn crossing_threshold_flips_once_and_updates_scale() {
        let mut layout = ResponsiveLayout::new(LayoutConfig::default(), 1024.0);
        assert_eq!(layout.device_class(), DeviceClass::Desktop);
        assert_eq!(layout.projection_scale(false), 4_000.0);

        assert!(layout.resize(500.0));
        assert_eq!(layout.device_class(), DeviceClass::Mobile);
        assert_eq!(layout.projection_scale(false), 10_000.0);
        assert_eq!(layout.projection_scale(true), 6_000.0);

        assert!(!layout.resize(480.0));
        assert_eq!(layout.device_class(), DeviceClass::Mobile);
    }

    #[test]
    fn resizing_within_class_does_not_flip() {
        let mut layout = ResponsiveLayout::new(LayoutConfig::default(), 1024.0);
        assert!(!layout.resize(900.0));
        assert_eq!(layout.device_class(), DeviceClass::Desktop);
    }

    #[test]
    fn marker_sizes_follow_device_class() {
        let mut layout = ResponsiveLayout::new(LayoutConfig::default(), 1280.0);
        assert_eq!(layout.marker_radius(), 4.0);
        assert_eq!(layout.marker_font_px(), 14.0);
        layout.resize(375.0);
        assert_eq!(layout.marker_radius(), 3.0);
        assert_eq!(layout.marker_font_px(), 12.0);
    }

    #[test]
    fn validate_rejects_non_positive_values() {
        let mut config = LayoutConfig::default();
        config.focused_scale.mobile = 0.0;
        assert!(config.validate().is_err());

        let mut config = LayoutConfig::default();
        config.mobile_breakpoint = f64::NAN;
        assert!(config.validate().is_err());
    }
}
