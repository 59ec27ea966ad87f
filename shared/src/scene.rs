use crate::colors::Rgb;
use crate::geo::{Mercator, ScreenSize, view_box_fit};
use crate::navigator::RegionNavigator;
use crate::selection::Phase;
use crate::style::FeatureStyle;

/// One projected feature outline. All rings of all polygons are listed
/// together and meant to be filled with the even-odd rule.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDraw {
    pub index: usize,
    pub rings: Vec<Vec<(f64, f64)>>,
    pub style: FeatureStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionLabel {
    pub region_id: String,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_px: f64,
}

/// A city marker. Unlike region labels, which are sized in view-box units
/// and grow with the canvas, radius and font are CSS pixels picked per
/// device class so markers stay tappable and legible on small screens.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub poi_id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub font_px: f64,
    pub color: Rgb,
}

/// Frame-local draw list in canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub features: Vec<FeatureDraw>,
    /// Region names; only in the overview.
    pub labels: Vec<RegionLabel>,
    /// The focused region's cities; only while focused.
    pub markers: Vec<Marker>,
    pub stroke_width: f64,
    pub glow: Rgb,
}

fn on_screen(projection: &Mercator, draw_bounds: &crate::geo::Bounds, size: ScreenSize) -> bool {
    if draw_bounds.is_empty() {
        return false;
    }
    // Mercator is monotone in both axes, so the projected corners bound the feature.
    let (x0, y0) = projection.project(draw_bounds.min);
    let (x1, y1) = projection.project(draw_bounds.max);
    let (left, right) = (x0.min(x1), x0.max(x1));
    let (top, bottom) = (y0.min(y1), y0.max(y1));
    right >= 0.0 && left <= size.width && bottom >= 0.0 && top <= size.height
}

/// Project the navigator's current state for a canvas of `size`.
/// Features entirely off-canvas are skipped.
pub fn build_scene(nav: &RegionNavigator, size: ScreenSize) -> Scene {
    let projection = nav.projection(size);
    let registry = nav.registry();
    let palette = &nav.config().palette;

    let features = registry
        .features()
        .iter()
        .enumerate()
        .filter(|(_, f)| on_screen(&projection, &f.bounds, size))
        .map(|(index, feature)| FeatureDraw {
            index,
            rings: feature
                .polygons
                .iter()
                .flatten()
                .map(|ring| ring.iter().map(|p| projection.project(*p)).collect())
                .collect(),
            style: nav.style_of(feature),
        })
        .collect();

    let mut labels = Vec::new();
    let mut markers = Vec::new();
    match nav.phase() {
        Phase::Overview => {
            let font_px = nav.layout().label_font_px() * view_box_fit(size);
            for region in registry.regions() {
                let Some(anchor) = region.label_anchor else {
                    continue;
                };
                let (x, y) = projection.project(anchor);
                labels.push(RegionLabel {
                    region_id: region.id.clone(),
                    text: region.display_name.clone(),
                    x,
                    y,
                    font_px,
                });
            }
        }
        Phase::RegionFocused(region_id) => {
            let color = registry
                .region(region_id)
                .map(|r| r.color)
                .unwrap_or(palette.highlight);
            let radius = nav.layout().marker_radius();
            let font_px = nav.layout().marker_font_px();
            for poi in nav.visible_points_of_interest() {
                let (x, y) = projection.project(poi.coordinate);
                markers.push(Marker {
                    poi_id: poi.id.clone(),
                    name: poi.name.clone(),
                    x,
                    y,
                    radius,
                    font_px,
                    color,
                });
            }
        }
    }

    Scene {
        features,
        labels,
        markers,
        stroke_width: palette.stroke_width,
        glow: palette.glow,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::NavigatorConfig;
    use crate::geo::Pose;
    use crate::navigator::NoEvents;
    use crate::registry::test_support::two_region_registry;

    const SIZE: ScreenSize = ScreenSize::new(800.0, 600.0);

    fn navigator(overview: Pose) -> RegionNavigator {
        let config = NavigatorConfig {
            overview_pose: overview,
            ..NavigatorConfig::default()
        };
        RegionNavigator::new(Arc::new(two_region_registry()), config, 1024.0, Box::new(NoEvents))
            .unwrap()
    }

    fn settle(nav: &mut RegionNavigator) {
        while nav.tick(1.0 / 60.0) {}
    }

    #[test]
    fn overview_has_labels_and_no_markers() {
        // Zoomed far out so every feature is on the canvas.
        let nav = navigator(Pose::new(20.0, 20.0, 0.05));
        let scene = build_scene(&nav, SIZE);
        assert_eq!(scene.features.len(), 5);
        assert!(scene.markers.is_empty());
        let labels: Vec<&str> = scene.labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(labels, vec!["Alpha", "Beta", "Gamma"]);
        assert_eq!(scene.labels[0].font_px, 28.0);
    }

    #[test]
    fn focused_has_markers_for_that_region_only() {
        let mut nav = navigator(Pose::new(20.0, 20.0, 0.05));
        nav.select_region("A");
        settle(&mut nav);
        let scene = build_scene(&nav, SIZE);
        assert!(scene.labels.is_empty());
        let ids: Vec<&str> = scene.markers.iter().map(|m| m.poi_id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2"]);
        assert_eq!(scene.markers[0].radius, 4.0);
        assert_eq!(scene.markers[0].font_px, 14.0);
        assert!((scene.markers[0].x - 400.0).abs() < 1e-6);
        assert!((scene.markers[0].y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn labels_scale_with_canvas_but_markers_keep_css_pixels() {
        let half = ScreenSize::new(400.0, 300.0);
        let nav = navigator(Pose::new(20.0, 20.0, 0.05));
        assert_eq!(build_scene(&nav, half).labels[0].font_px, 14.0);

        let mut nav = navigator(Pose::new(20.0, 20.0, 0.05));
        nav.select_region("A");
        settle(&mut nav);
        let scene = build_scene(&nav, half);
        assert_eq!(scene.markers[0].radius, 4.0);
        assert_eq!(scene.markers[0].font_px, 14.0);
        // Hit-testing uses the same unscaled radius.
        let (x, y) = (scene.markers[0].x, scene.markers[0].y);
        let reach = 4.0 + crate::navigator::MARKER_HIT_SLOP;
        assert!(nav.point_of_interest_at(x + reach - 0.5, y, half).is_some());
        assert!(nav.point_of_interest_at(x + reach + 0.5, y, half).is_none());
    }

    #[test]
    fn off_canvas_features_are_culled() {
        let mut nav = navigator(Pose::new(20.0, 20.0, 0.05));
        nav.select_region("A");
        settle(&mut nav);
        let scene = build_scene(&nav, SIZE);
        let indices: Vec<usize> = scene.features.iter().map(|f| f.index).collect();
        assert!(indices.contains(&0));
        assert!(!indices.contains(&2), "beta is far off-canvas at zoom 3");
    }

    #[test]
    fn scene_styles_match_the_styler() {
        let mut nav = navigator(Pose::new(20.0, 20.0, 0.05));
        nav.on_feature_pointer_enter(2);
        let scene = build_scene(&nav, SIZE);
        for draw in &scene.features {
            let feature = &nav.registry().features()[draw.index];
            assert_eq!(draw.style, nav.style_of(feature));
        }
        let beta = scene.features.iter().find(|d| d.index == 2).unwrap();
        assert!(beta.style.glow);
    }
}
