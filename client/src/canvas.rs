use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::rc::Rc;
use std::sync::Arc;

use leptos::either::Either;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, CanvasWindingRule, HtmlCanvasElement, MouseEvent, PointerEvent};

use tripmap_shared::animation::StyleAnimator;
use tripmap_shared::scene::{Scene, build_scene};
use tripmap_shared::{
    ConfigError, GeoRegistry, NavigatorConfig, PointOfInterest, RegionNavigator, Route, ScreenSize,
};

use crate::app::{FocusedRegion, HoveredRegion};
use crate::listeners::{WindowListener, device_pixel_ratio, window_width};
use crate::render_loop::FrameLoop;
use crate::router::{HashRouter, current_route, push_route};

const BACKGROUND: &str = "#0f172a";
const GLOW_BLUR: f64 = 14.0;
const LABEL_FILL: &str = "rgba(248, 250, 252, 0.92)";
const LABEL_HALO: &str = "rgba(15, 23, 42, 0.85)";
const BACK_BUTTON_STYLE: &str = "position: absolute; top: 16px; left: 16px; padding: 6px 14px; border-radius: 9999px; border: 1px solid #475569; background: rgba(15, 23, 42, 0.8); color: #f8fafc; cursor: pointer;";
const VIEW_TOGGLE_STYLE: &str = "position: absolute; top: 16px; right: 16px; gap: 4px; padding: 4px; border-radius: 9999px; border: 1px solid #475569; background: rgba(15, 23, 42, 0.8);";
const CITY_LIST_STYLE: &str = "position: absolute; inset: 64px 16px 16px; overflow-y: auto; padding: 8px; border-radius: 12px; background: rgba(15, 23, 42, 0.94);";
const CITY_CARD_STYLE: &str = "display: block; width: 100%; margin: 0 0 8px; padding: 12px 16px; text-align: left; border-radius: 10px; border: 1px solid #334155; background: #1e293b; color: #f8fafc; cursor: pointer;";
const FONT_STACK: &str = "'Pretendard', 'Noto Sans KR', system-ui, sans-serif";

/// Everything acquired by a mounted map: the frame loop and window
/// listeners. Dropping it releases all of them.
struct MapBindings {
    frame_loop: Rc<FrameLoop>,
    _resize: Option<WindowListener>,
    _hashchange: Option<WindowListener>,
}

impl Drop for MapBindings {
    fn drop(&mut self) {
        self.frame_loop.stop();
    }
}

thread_local! {
    static MAP_BINDINGS: RefCell<Option<MapBindings>> = const { RefCell::new(None) };
}

type SharedNavigator = Rc<RefCell<RegionNavigator>>;

fn build_navigator(
    registry: Arc<GeoRegistry>,
    config: NavigatorConfig,
) -> Result<RegionNavigator, ConfigError> {
    let width = window_width();
    match RegionNavigator::new(registry.clone(), config, width, Box::new(HashRouter)) {
        Ok(nav) => Ok(nav),
        Err(err) => {
            tracing::warn!(%err, "invalid navigator config; falling back to defaults");
            RegionNavigator::new(registry, NavigatorConfig::default(), width, Box::new(HashRouter))
        }
    }
}

/// Page signals kept in step with the navigator.
#[derive(Clone, Copy)]
struct MapSignals {
    focused: RwSignal<Option<String>>,
    hovered: RwSignal<Option<String>>,
    cities: RwSignal<Vec<PointOfInterest>>,
    show_list: RwSignal<bool>,
}

impl MapSignals {
    /// Push display names and the focused region's cities into the page.
    fn sync(&self, nav: &RegionNavigator) {
        let focused_name = nav.selected_region().map(|r| r.display_name.clone());
        if self.focused.get_untracked() != focused_name {
            self.focused.set(focused_name);
        }
        let hovered_name = nav.hovered_region().map(|r| r.display_name.clone());
        if self.hovered.get_untracked() != hovered_name {
            self.hovered.set(hovered_name);
        }
        let cities = nav.visible_points_of_interest();
        if self.cities.with_untracked(|current| current.as_slice() != cities) {
            self.cities.set(cities.to_vec());
        }
    }

    /// The city list shows only on a list route for the focused region.
    fn show_route(&self, route: &Route, nav: &RegionNavigator) {
        let list = matches!(route, Route::List(_)) && nav.selection().is_focused();
        if self.show_list.get_untracked() != list {
            self.show_list.set(list);
        }
    }
}

fn toggle_button_style(active: bool) -> String {
    let (background, color) = if active {
        ("#f8fafc", "#0f172a")
    } else {
        ("transparent", "#cbd5e1")
    };
    format!(
        "padding: 4px 12px; border: none; border-radius: 9999px; cursor: pointer; background: {background}; color: {color};"
    )
}

/// Canvas size in CSS pixels.
fn css_size(canvas: &HtmlCanvasElement) -> ScreenSize {
    let rect = canvas.get_bounding_client_rect();
    ScreenSize::new(rect.width(), rect.height())
}

/// Pointer position relative to the canvas, in CSS pixels.
fn local_point(canvas: &HtmlCanvasElement, e: &MouseEvent) -> (f64, f64) {
    let rect = canvas.get_bounding_client_rect();
    (
        e.client_x() as f64 - rect.left(),
        e.client_y() as f64 - rect.top(),
    )
}

fn set_cursor(canvas: &HtmlCanvasElement, pointer: bool) {
    let cursor = if pointer { "pointer" } else { "default" };
    web_sys::HtmlElement::style(canvas).set_property("cursor", cursor).ok();
}

/// Interactive drill-down map. Owns the navigator for its lifetime.
#[component]
pub fn MapCanvas(registry: Arc<GeoRegistry>, config: NavigatorConfig) -> impl IntoView {
    let FocusedRegion(focused) = expect_context();
    let HoveredRegion(hovered) = expect_context();
    let ui = MapSignals {
        focused,
        hovered,
        cities: RwSignal::new(Vec::new()),
        show_list: RwSignal::new(false),
    };
    let cities = ui.cities;
    let show_list = ui.show_list;
    // City chosen in the list; handed to the navigator by an effect below.
    let picked_city: RwSignal<Option<String>> = RwSignal::new(None);

    let style_transition_ms = config.style_transition_ms;
    let nav = match build_navigator(registry, config) {
        Ok(nav) => nav,
        Err(err) => {
            tracing::error!(%err, "navigator could not be created");
            return Either::Left(view! { <p class="map-error">"Map configuration is invalid."</p> });
        }
    };
    let nav: SharedNavigator = Rc::new(RefCell::new(nav));
    let animator = Rc::new(RefCell::new(StyleAnimator::new(style_transition_ms)));
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let cached_ctx: Rc<RefCell<Option<CanvasRenderingContext2d>>> = Rc::new(RefCell::new(None));
    let last_frame: Rc<Cell<Option<f64>>> = Rc::new(Cell::new(None));

    let frame_loop = Rc::new(FrameLoop::new({
        let nav = nav.clone();
        let animator = animator.clone();
        let cached_ctx = cached_ctx.clone();
        let last_frame = last_frame.clone();
        move |now: f64| {
            let Some(canvas) = canvas_ref.get_untracked() else {
                last_frame.set(None);
                return false;
            };
            let canvas: &HtmlCanvasElement = &canvas;
            let size = css_size(canvas);
            if size.width <= 0.0 || size.height <= 0.0 {
                last_frame.set(None);
                return false;
            }

            let dpr = device_pixel_ratio();
            let pw = (size.width * dpr).round().max(1.0) as u32;
            let ph = (size.height * dpr).round().max(1.0) as u32;
            if canvas.width() != pw || canvas.height() != ph {
                canvas.set_width(pw);
                canvas.set_height(ph);
                // Resizing resets 2D context state.
                *cached_ctx.borrow_mut() = None;
            }

            let ctx = {
                let mut slot = cached_ctx.borrow_mut();
                if slot.is_none() {
                    *slot = canvas
                        .get_context("2d")
                        .ok()
                        .flatten()
                        .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok());
                }
                let Some(ctx) = slot.clone() else {
                    return false;
                };
                ctx
            };

            let dt = last_frame.get().map_or(0.0, |prev| (now - prev) / 1000.0);
            last_frame.set(Some(now));

            let mut nav = nav.borrow_mut();
            let moving = nav.tick(dt);
            let mut scene = build_scene(&nav, size);
            drop(nav);

            let mut animator = animator.borrow_mut();
            for draw in &mut scene.features {
                draw.style = animator.resolve(draw.index, draw.style, now);
            }
            let fading = animator.is_animating(now);

            ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0).ok();
            draw_scene(&ctx, &scene, size);

            let more = moving || fading;
            if !more {
                last_frame.set(None);
            }
            more
        }
    }));

    // Initial paint once the canvas is in the DOM. Deep links open on the
    // focused view directly instead of flying in from the overview.
    Effect::new({
        let frame_loop = frame_loop.clone();
        let nav = nav.clone();
        move || {
            if canvas_ref.get().is_none() {
                return;
            }
            let route = current_route();
            let mut nav = nav.borrow_mut();
            if let Some(id) = route.region_id() {
                nav.restore_region(id);
            }
            ui.show_route(&route, &nav);
            ui.sync(&nav);
            frame_loop.mark_dirty();
        }
    });

    Effect::new({
        let nav = nav.clone();
        let frame_loop = frame_loop.clone();
        move || {
            let Some(id) = picked_city.get() else {
                return;
            };
            picked_city.set(None);
            if nav.borrow_mut().on_point_of_interest_click(&id) {
                frame_loop.mark_dirty();
            }
        }
    });

    let resize = WindowListener::new("resize", {
        let nav = nav.clone();
        let frame_loop = frame_loop.clone();
        move |_| {
            nav.borrow_mut().on_resize(window_width());
            frame_loop.mark_dirty();
        }
    });

    let hashchange = WindowListener::new("hashchange", {
        let nav = nav.clone();
        let frame_loop = frame_loop.clone();
        move |_| {
            let route = current_route();
            let mut nav = nav.borrow_mut();
            let changed = nav.apply_route(&route);
            ui.show_route(&route, &nav);
            if changed {
                tracing::debug!(?route, "route applied");
                ui.sync(&nav);
                frame_loop.mark_dirty();
            }
        }
    });

    MAP_BINDINGS.with(|slot| {
        *slot.borrow_mut() = Some(MapBindings {
            frame_loop: frame_loop.clone(),
            _resize: resize,
            _hashchange: hashchange,
        });
    });
    on_cleanup(|| {
        MAP_BINDINGS.with(|slot| {
            slot.borrow_mut().take();
        });
    });

    // --- Input handlers ---

    let on_pointer_move = {
        let nav = nav.clone();
        let frame_loop = frame_loop.clone();
        move |e: PointerEvent| {
            let Some(canvas) = canvas_ref.get_untracked() else {
                return;
            };
            let size = css_size(&canvas);
            let (x, y) = local_point(&canvas, &e);

            let mut nav = nav.borrow_mut();
            let hit = nav.feature_at(x, y, size);
            let changed = nav.on_pointer_over(hit);
            set_cursor(&canvas, nav.is_interactive_at(x, y, size));
            if changed {
                ui.sync(&nav);
                frame_loop.mark_dirty();
            }
        }
    };

    let on_pointer_leave = {
        let nav = nav.clone();
        let frame_loop = frame_loop.clone();
        move |_: PointerEvent| {
            let mut nav = nav.borrow_mut();
            if nav.on_pointer_over(None) {
                ui.sync(&nav);
                frame_loop.mark_dirty();
            }
        }
    };

    let on_click = {
        let nav = nav.clone();
        let frame_loop = frame_loop.clone();
        move |e: MouseEvent| {
            let Some(canvas) = canvas_ref.get_untracked() else {
                return;
            };
            let size = css_size(&canvas);
            let (x, y) = local_point(&canvas, &e);

            let mut nav = nav.borrow_mut();
            let poi_id = nav.point_of_interest_at(x, y, size).map(|p| p.id.clone());
            let changed = match poi_id {
                Some(id) => nav.on_point_of_interest_click(&id),
                None => match nav.feature_at(x, y, size) {
                    Some(idx) => nav.on_feature_click(idx),
                    None => false,
                },
            };
            set_cursor(&canvas, nav.is_interactive_at(x, y, size));
            if changed {
                ui.sync(&nav);
                frame_loop.mark_dirty();
            }
        }
    };

    let on_back = {
        let nav = nav.clone();
        let frame_loop = frame_loop.clone();
        move |_: MouseEvent| {
            let mut nav = nav.borrow_mut();
            if nav.on_back() {
                ui.show_route(&Route::Overview, &nav);
                ui.sync(&nav);
                frame_loop.mark_dirty();
            }
        }
    };

    // Map/list switches only rewrite the hash; the hashchange binding
    // applies the result.
    let focused_route = {
        let nav = nav.clone();
        move |list: bool| {
            let nav = nav.borrow();
            let Some(id) = nav.selection().selected() else {
                return;
            };
            let route = if list {
                Route::List(id.to_string())
            } else {
                Route::Region(id.to_string())
            };
            push_route(&route);
        }
    };
    let on_show_map = {
        let focused_route = focused_route.clone();
        move |_: MouseEvent| focused_route(false)
    };
    let on_show_list = move |_: MouseEvent| focused_route(true);

    Either::Right(view! {
        <div style="position: relative; width: 100%; height: 100%; overflow: hidden;">
            <canvas
                node_ref=canvas_ref
                style="position: absolute; inset: 0; width: 100%; height: 100%; touch-action: manipulation;"
                on:pointermove=on_pointer_move
                on:pointerleave=on_pointer_leave
                on:click=on_click
            />
            <button
                class="map-back"
                style=move || {
                    let display = if focused.get().is_some() { "block" } else { "none" };
                    format!("{BACK_BUTTON_STYLE} display: {display};")
                }
                on:click=on_back
            >
                "← 전체 지도"
            </button>
            <div
                class="map-view-toggle"
                style=move || {
                    let display = if focused.get().is_some() { "flex" } else { "none" };
                    format!("{VIEW_TOGGLE_STYLE} display: {display};")
                }
            >
                <button
                    style=move || toggle_button_style(!show_list.get())
                    on:click=on_show_map
                >
                    "지도"
                </button>
                <button
                    style=move || toggle_button_style(show_list.get())
                    on:click=on_show_list
                >
                    "목록"
                </button>
            </div>
            <div
                class="city-list"
                style=move || {
                    let display = if show_list.get() { "block" } else { "none" };
                    format!("{CITY_LIST_STYLE} display: {display};")
                }
            >
                <For
                    each=move || cities.get()
                    key=|city| city.id.clone()
                    children=move |city: PointOfInterest| {
                        let id = city.id.clone();
                        view! {
                            <button
                                class="city-card"
                                style=CITY_CARD_STYLE
                                on:click=move |_| picked_city.set(Some(id.clone()))
                            >
                                <div style="font-size: 1rem; font-weight: 600;">{city.name}</div>
                                {city.description.map(|desc| view! {
                                    <div style="margin-top: 4px; font-size: 0.85rem; color: #94a3b8;">{desc}</div>
                                })}
                            </button>
                        }
                    }
                />
            </div>
        </div>
    })
}

// --- Canvas 2D drawing ---

fn trace_rings(ctx: &CanvasRenderingContext2d, rings: &[Vec<(f64, f64)>]) {
    ctx.begin_path();
    for ring in rings {
        let Some(&(x0, y0)) = ring.first() else {
            continue;
        };
        ctx.move_to(x0, y0);
        for &(x, y) in &ring[1..] {
            ctx.line_to(x, y);
        }
        ctx.close_path();
    }
}

fn draw_scene(ctx: &CanvasRenderingContext2d, scene: &Scene, size: ScreenSize) {
    ctx.set_global_alpha(1.0);
    ctx.set_fill_style_str(BACKGROUND);
    ctx.fill_rect(0.0, 0.0, size.width, size.height);

    let glow_css = scene.glow.css(0.9);
    ctx.set_line_join("round");

    for draw in &scene.features {
        let style = &draw.style;
        trace_rings(ctx, &draw.rings);
        ctx.set_global_alpha(style.opacity);
        if style.glow {
            ctx.set_shadow_color(&glow_css);
            ctx.set_shadow_blur(GLOW_BLUR);
        }
        ctx.set_fill_style_str(&style.fill.to_hex());
        ctx.fill_with_canvas_winding_rule(CanvasWindingRule::Evenodd);
        if style.glow {
            ctx.set_shadow_color("transparent");
            ctx.set_shadow_blur(0.0);
        }
        if let Some(stroke) = style.stroke {
            ctx.set_stroke_style_str(&stroke.to_hex());
            // Hovered outlines read better a little heavier.
            let width = if style.glow {
                scene.stroke_width * 3.0
            } else {
                scene.stroke_width * 2.0
            };
            ctx.set_line_width(width);
            ctx.stroke();
        }
    }
    ctx.set_global_alpha(1.0);

    draw_labels(ctx, scene);
    draw_markers(ctx, scene);
}

/// Region names with a dark halo so they stay legible over any fill.
fn draw_labels(ctx: &CanvasRenderingContext2d, scene: &Scene) {
    if scene.labels.is_empty() {
        return;
    }
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    for label in &scene.labels {
        ctx.set_font(&format!("600 {:.1}px {FONT_STACK}", label.font_px));
        ctx.set_stroke_style_str(LABEL_HALO);
        ctx.set_line_width((label.font_px / 6.0).max(2.0));
        ctx.stroke_text(&label.text, label.x, label.y).ok();
        ctx.set_fill_style_str(LABEL_FILL);
        ctx.fill_text(&label.text, label.x, label.y).ok();
    }
}

fn draw_markers(ctx: &CanvasRenderingContext2d, scene: &Scene) {
    if scene.markers.is_empty() {
        return;
    }
    ctx.set_text_align("left");
    ctx.set_text_baseline("middle");
    for marker in &scene.markers {
        ctx.begin_path();
        ctx.arc(marker.x, marker.y, marker.radius, 0.0, TAU).ok();
        ctx.set_fill_style_str(&marker.color.brighten(1.3).to_hex());
        ctx.fill();
        ctx.set_stroke_style_str(LABEL_FILL);
        ctx.set_line_width(1.5);
        ctx.stroke();

        let tx = marker.x + marker.radius + 4.0;
        ctx.set_font(&format!("500 {:.0}px {FONT_STACK}", marker.font_px));
        ctx.set_stroke_style_str(LABEL_HALO);
        ctx.set_line_width(3.0);
        ctx.stroke_text(&marker.name, tx, marker.y).ok();
        ctx.set_fill_style_str(LABEL_FILL);
        ctx.fill_text(&marker.name, tx, marker.y).ok();
    }
}
