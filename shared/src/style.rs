use serde::{Deserialize, Serialize};

use crate::colors::Rgb;
use crate::config::{ConfigError, require_positive};
use crate::registry::Region;
use crate::selection::SelectionState;

pub const DIMMED_OPACITY: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Fill for features with no region.
    pub neutral: Rgb,
    /// Fill for regions other than the focused one.
    pub dimmed: Rgb,
    /// Hover fill for regions without their own highlight color.
    pub highlight: Rgb,
    pub glow: Rgb,
    pub dimmed_opacity: f64,
    pub stroke_width: f64,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            neutral: Rgb(0x33, 0x41, 0x55),
            dimmed: Rgb(0x1e, 0x29, 0x3b),
            highlight: Rgb(0xf8, 0xfa, 0xfc),
            glow: Rgb(0x81, 0x8c, 0xf8),
            dimmed_opacity: DIMMED_OPACITY,
            stroke_width: 0.5,
        }
    }
}

impl Palette {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.dimmed_opacity) {
            return Err(ConfigError::Opacity(self.dimmed_opacity));
        }
        require_positive("palette.stroke_width", self.stroke_width)
    }
}

/// How one feature is drawn this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureStyle {
    pub fill: Rgb,
    pub opacity: f64,
    /// `None` draws no outline.
    pub stroke: Option<Rgb>,
    pub glow: bool,
    /// Whether the feature reacts to hover and click (pointer cursor).
    pub interactive: bool,
}

/// Style for a feature whose region is `region` (`None` when unmapped).
///
/// | selected | own region | hovered | fill      | opacity | stroke | glow |
/// |----------|------------|---------|-----------|---------|--------|------|
/// | none     | -          | yes     | highlight | 1.0     | region | yes  |
/// | none     | -          | no      | region    | 1.0     | none   | no   |
/// | some     | yes        | -       | region    | 1.0     | region | no   |
/// | some     | no         | -       | dimmed    | 0.3     | none   | no   |
///
/// Unmapped features always take the neutral fill and are never interactive;
/// they still dim alongside everything else while a region is focused.
pub fn style_feature(
    region: Option<&Region>,
    selection: &SelectionState,
    palette: &Palette,
) -> FeatureStyle {
    let opacity_when_other = if selection.is_focused() {
        palette.dimmed_opacity
    } else {
        1.0
    };

    let Some(region) = region else {
        return FeatureStyle {
            fill: palette.neutral,
            opacity: opacity_when_other,
            stroke: None,
            glow: false,
            interactive: false,
        };
    };

    match selection.selected() {
        None if selection.hovered() == Some(region.id.as_str()) => FeatureStyle {
            fill: region.highlight.unwrap_or(palette.highlight),
            opacity: 1.0,
            stroke: Some(region.color),
            glow: true,
            interactive: true,
        },
        None => FeatureStyle {
            fill: region.color,
            opacity: 1.0,
            stroke: None,
            glow: false,
            interactive: true,
        },
        Some(selected) if selected == region.id => FeatureStyle {
            fill: region.color,
            opacity: 1.0,
            stroke: Some(region.color),
            glow: false,
            interactive: false,
        },
        Some(_) => FeatureStyle {
            fill: palette.dimmed,
            opacity: palette.dimmed_opacity,
            stroke: None,
            glow: false,
            interactive: false,
        },
    }
}
