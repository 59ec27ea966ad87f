//! The composition root: turns pointer, resize and routing input into
//! selection transitions, camera targets and outbound notifications.

use std::sync::Arc;

use crate::camera::ViewportController;
use crate::config::{ConfigError, NavigatorConfig};
use crate::geo::{LonLat, Mercator, Pose, ScreenSize};
use crate::layout::ResponsiveLayout;
use crate::registry::{Feature, GeoRegistry, PointOfInterest, Region};
use crate::route::Route;
use crate::selection::{Phase, SelectionState};
use crate::spring::{RestThreshold, Spring};
use crate::style::{FeatureStyle, style_feature};

/// Extra pixels around a marker that still count as a hit.
pub const MARKER_HIT_SLOP: f64 = 6.0;

const SCALE_REST: RestThreshold = RestThreshold {
    displacement: 0.01,
    velocity: 0.1,
};

#[derive(Debug, Clone, Copy)]
enum Motion {
    Animate,
    Snap,
}

/// Outbound notifications for whoever owns page navigation.
pub trait NavigatorEvents {
    fn region_selected(&mut self, _region: &Region) {}
    fn city_selected(&mut self, _city: &PointOfInterest) {}
    fn back(&mut self) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default)]
pub struct NoEvents;

impl NavigatorEvents for NoEvents {}

pub struct RegionNavigator {
    registry: Arc<GeoRegistry>,
    config: NavigatorConfig,
    selection: SelectionState,
    viewport: ViewportController,
    /// Base projection scale, eased so overview/focused/device flips never jump.
    scale: Spring,
    layout: ResponsiveLayout,
    /// Feature last reported under the pointer, to pair leave with enter.
    pointer_feature: Option<usize>,
    events: Box<dyn NavigatorEvents>,
}

impl std::fmt::Debug for RegionNavigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionNavigator")
            .field("selection", &self.selection)
            .field("viewport", &self.viewport)
            .field("scale", &self.scale.value())
            .field("device_class", &self.layout.device_class())
            .finish_non_exhaustive()
    }
}

impl RegionNavigator {
    /// Validates `config` up front so nothing per-frame can fail.
    pub fn new(
        registry: Arc<GeoRegistry>,
        config: NavigatorConfig,
        width: f64,
        events: Box<dyn NavigatorEvents>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let layout = ResponsiveLayout::new(config.layout.clone(), width);
        let scale = Spring::with_rest(layout.projection_scale(false), config.spring, SCALE_REST);
        Ok(Self {
            viewport: ViewportController::new(config.overview_pose, config.spring),
            selection: SelectionState::default(),
            registry,
            config,
            scale,
            layout,
            pointer_feature: None,
            events,
        })
    }

    pub fn registry(&self) -> &Arc<GeoRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn phase(&self) -> Phase<'_> {
        self.selection.phase()
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn layout(&self) -> &ResponsiveLayout {
        &self.layout
    }

    pub fn selected_region(&self) -> Option<&Region> {
        self.selection
            .selected()
            .and_then(|id| self.registry.region(id))
    }

    pub fn hovered_region(&self) -> Option<&Region> {
        self.selection
            .hovered()
            .and_then(|id| self.registry.region(id))
    }

    fn feature_region(&self, index: usize) -> Option<String> {
        self.registry
            .feature(index)
            .and_then(|f| f.region_id.clone())
    }

    // --- Pointer input ---

    /// Hover the feature's region. Unmapped features and hovers while a
    /// region is focused are ignored.
    pub fn on_feature_pointer_enter(&mut self, index: usize) -> bool {
        let Some(region_id) = self.feature_region(index) else {
            return false;
        };
        self.selection.hover(&region_id)
    }

    pub fn on_feature_pointer_leave(&mut self, index: usize) -> bool {
        let Some(region_id) = self.feature_region(index) else {
            return false;
        };
        self.selection.unhover(&region_id)
    }

    /// The pointer moved over feature `hit` (`None` for empty space).
    /// Emits the leave/enter pair when the feature under the pointer changes.
    pub fn on_pointer_over(&mut self, hit: Option<usize>) -> bool {
        if hit == self.pointer_feature {
            return false;
        }
        let mut changed = false;
        if let Some(old) = self.pointer_feature.take() {
            changed |= self.on_feature_pointer_leave(old);
        }
        if let Some(new) = hit {
            changed |= self.on_feature_pointer_enter(new);
        }
        self.pointer_feature = hit;
        changed
    }

    /// Focus the feature's region. Features are not clickable while a
    /// region is already focused.
    pub fn on_feature_click(&mut self, index: usize) -> bool {
        if self.selection.is_focused() {
            return false;
        }
        let Some(region_id) = self.feature_region(index) else {
            return false;
        };
        self.focus(&region_id, Motion::Animate)
    }

    /// Notify the observer of a city in the focused region. Ignored in the
    /// overview and for ids outside the focused region's list.
    pub fn on_point_of_interest_click(&mut self, poi_id: &str) -> bool {
        let Some(region_id) = self.selection.selected() else {
            return false;
        };
        let registry = Arc::clone(&self.registry);
        let Some(poi) = registry.point_of_interest(region_id, poi_id) else {
            tracing::debug!(region = %region_id, city = %poi_id, "ignoring click on unknown city");
            return false;
        };
        tracing::debug!(city = %poi.id, "city selected");
        self.events.city_selected(poi);
        true
    }

    /// Return to the overview. Only a change out of a focused region is
    /// reported to the observer.
    pub fn on_back(&mut self) -> bool {
        let was_focused = self.selection.is_focused();
        self.selection.back();
        if !was_focused {
            return false;
        }
        tracing::debug!("back to overview");
        // Re-enter whatever is under the pointer on its next move.
        self.pointer_feature = None;
        self.viewport.set_target(self.config.overview_pose);
        self.scale.set_target(self.layout.projection_scale(false));
        self.events.back();
        true
    }

    /// Router-driven selection. Works from any state, so an external route
    /// change can move straight from one focused region to another.
    pub fn select_region(&mut self, id: &str) -> bool {
        self.focus(id, Motion::Animate)
    }

    /// Apply an externally changed route. Map and list routes both focus
    /// their region; city routes belong to other pages and are ignored.
    pub fn apply_route(&mut self, route: &Route) -> bool {
        match route {
            Route::Overview => self.on_back(),
            Route::Region(id) | Route::List(id) => self.select_region(id),
            Route::City(_) => false,
        }
    }

    /// Like [`select_region`](Self::select_region) but the camera and scale
    /// jump straight to the focused view. Used for deep links on first paint.
    pub fn restore_region(&mut self, id: &str) -> bool {
        self.focus(id, Motion::Snap)
    }

    fn focus(&mut self, id: &str, motion: Motion) -> bool {
        if !self.selection.select(id, &self.registry) {
            return false;
        }
        let registry = Arc::clone(&self.registry);
        let Some(region) = registry.region(id) else {
            return false;
        };
        let pose = registry.focus_pose(id).unwrap_or_else(|| {
            tracing::warn!(region = %id, "region has no focus pose; using overview pose");
            self.config.overview_pose
        });
        let scale = self.layout.projection_scale(true);
        self.pointer_feature = None;
        tracing::debug!(region = %id, ?pose, ?motion, "region focused");
        match motion {
            Motion::Animate => {
                self.viewport.set_target(pose);
                self.scale.set_target(scale);
            }
            Motion::Snap => {
                self.viewport.snap_to(pose);
                self.scale.set_immediate(scale);
            }
        }
        self.events.region_selected(region);
        true
    }

    // --- Resize & animation ---

    /// Track the viewport width. Returns `true` when the device class
    /// flipped and the projection scale was re-targeted.
    pub fn on_resize(&mut self, width: f64) -> bool {
        if !self.layout.resize(width) {
            return false;
        }
        self.scale
            .set_target(self.layout.projection_scale(self.selection.is_focused()));
        true
    }

    /// Advance every animation by `dt` seconds. Returns `true` while
    /// anything is still moving.
    pub fn tick(&mut self, dt: f64) -> bool {
        let camera = self.viewport.tick(dt);
        let scale = self.scale.tick(dt);
        camera || scale
    }

    pub fn is_settled(&self) -> bool {
        self.viewport.is_settled() && self.scale.is_settled()
    }

    pub fn render_pose(&self) -> Pose {
        self.viewport.render_pose()
    }

    pub fn target_pose(&self) -> Pose {
        self.viewport.target_pose()
    }

    /// The eased base projection scale (before zoom and view-box fit).
    pub fn projection_scale(&self) -> f64 {
        self.scale.value()
    }

    pub fn projection(&self, size: ScreenSize) -> Mercator {
        Mercator::for_pose(&self.render_pose(), self.projection_scale(), size)
    }

    // --- Derived output ---

    pub fn style_of(&self, feature: &Feature) -> FeatureStyle {
        style_feature(
            self.registry.region_of(feature),
            &self.selection,
            &self.config.palette,
        )
    }

    /// Cities drawn as markers: the focused region's list, empty in the overview.
    pub fn visible_points_of_interest(&self) -> &[PointOfInterest] {
        match self.selection.selected() {
            Some(id) => self.registry.points_of_interest(id),
            None => &[],
        }
    }

    // --- Hit-testing in screen space ---

    pub fn feature_at(&self, x: f64, y: f64, size: ScreenSize) -> Option<usize> {
        let p: LonLat = self.projection(size).invert(x, y);
        self.registry.feature_at(p)
    }

    /// Nearest visible marker within its radius plus slop.
    pub fn point_of_interest_at(&self, x: f64, y: f64, size: ScreenSize) -> Option<&PointOfInterest> {
        let projection = self.projection(size);
        let reach = self.layout.marker_radius() + MARKER_HIT_SLOP;
        self.visible_points_of_interest()
            .iter()
            .map(|poi| {
                let (px, py) = projection.project(poi.coordinate);
                (poi, (px - x).hypot(py - y))
            })
            .filter(|(_, d)| *d <= reach)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(poi, _)| poi)
    }

    /// Whether the pointer at (x, y) should show a pointer cursor.
    pub fn is_interactive_at(&self, x: f64, y: f64, size: ScreenSize) -> bool {
        if self.point_of_interest_at(x, y, size).is_some() {
            return true;
        }
        self.feature_at(x, y, size)
            .and_then(|idx| self.registry.feature(idx))
            .is_some_and(|f| self.style_of(f).interactive)
    }
}
