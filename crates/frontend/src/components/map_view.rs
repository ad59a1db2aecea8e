use dioxus::html::geometry::WheelDelta;
use dioxus::html::input_data::MouseButton;
use dioxus::prelude::*;
use forecast360_shared::geo::{LatLng, LatLngBounds};
use forecast360_shared::registry::{self, TopicId};

use crate::effects::{Camera, ViewportRunner};
use crate::projection;

const MAP_CONTAINER_ID: &str = "forecast-map-container";

/// Drag threshold in pixels; movement below this is treated as a click.
const DRAG_THRESHOLD: f64 = 3.0;

/// Zoom change per wheel notch or button press.
const ZOOM_STEP: f64 = 0.5;

/// Container size assumed until the element is mounted.
const FALLBACK_SIZE: (f64, f64) = (1024.0, 768.0);

// ---------------------------------------------------------------------------
// DOM helpers
// ---------------------------------------------------------------------------

fn container_rect() -> Option<web_sys::DomRect> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(MAP_CONTAINER_ID)?;
    Some(element.get_bounding_client_rect())
}

fn measure(mut size: Signal<(f64, f64)>) {
    if let Some(rect) = container_rect() {
        let measured = (rect.width(), rect.height());
        if measured.0 > 0.0 && measured.1 > 0.0 && *size.peek() != measured {
            size.set(measured);
        }
    }
}

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

/// Convert a wheel delta (pixels / lines / pages) to a uniform pixel-like value.
fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y * 40.0,
        WheelDelta::Pages(d) => d.y * 400.0,
    }
}

/// Next zoom level for a wheel movement; scrolling up zooms in.
fn wheel_zoom(current: f64, delta_y: f64, min: f64, max: f64) -> f64 {
    let next = if delta_y < 0.0 {
        current + ZOOM_STEP
    } else if delta_y > 0.0 {
        current - ZOOM_STEP
    } else {
        current
    };
    next.clamp(min, max)
}

/// Graticule and home-region outline in container pixels.
fn build_svg_overlay(camera: Camera, width: f64, height: f64, home_region: &LatLngBounds) -> String {
    let view = projection::visible_bounds(camera.center, camera.zoom, width, height);
    let (lats, lons) = projection::graticule(&view);
    let mut svg = String::new();

    for lat in lats {
        let (_, y) = projection::to_screen(LatLng::new(lat, camera.center.lon), camera.center, camera.zoom, width, height);
        svg.push_str(&format!(
            r#"<line class="graticule" x1="0" y1="{y:.1}" x2="{width:.1}" y2="{y:.1}"/>"#
        ));
    }
    for lon in lons {
        let (x, _) = projection::to_screen(LatLng::new(camera.center.lat, lon), camera.center, camera.zoom, width, height);
        svg.push_str(&format!(
            r#"<line class="graticule" x1="{x:.1}" y1="0" x2="{x:.1}" y2="{height:.1}"/>"#
        ));
    }

    let top_left = LatLng::new(home_region.north(), home_region.west());
    let (x, y) = projection::to_screen(top_left, camera.center, camera.zoom, width, height);
    let ppd = projection::pixels_per_degree(camera.zoom);
    let (lat_span, lon_span) = home_region.span();
    let (w, h) = (lon_span * ppd, lat_span * ppd);
    svg.push_str(&format!(
        r#"<rect class="home-region" x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}"/>"#
    ));

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.0}" height="{height:.0}" style="position:absolute;top:0;left:0;pointer-events:none;">{svg}</svg>"#
    )
}

/// Tell the dashboard where the user left the camera.
fn report_moved(runner: ViewportRunner, size: (f64, f64)) {
    let mut dashboard = runner.dashboard;
    let camera = *runner.camera.peek();
    let visible = projection::visible_bounds(camera.center, camera.zoom, size.0, size.1);
    let effects = dashboard.write().on_viewport_moved(visible, camera.zoom);
    runner.run(effects);
}

/// Zoom to `new_zoom` keeping the container point (`cx`, `cy`) fixed.
fn zoom_to(mut runner: ViewportRunner, new_zoom: f64, cx: f64, cy: f64, size: (f64, f64), bounds: LatLngBounds) {
    let camera = *runner.camera.peek();
    if (new_zoom - camera.zoom).abs() < 1e-9 {
        return;
    }
    let center = projection::zoom_around(camera.center, camera.zoom, new_zoom, cx, cy, size.0, size.1);
    runner.stop_flight();
    runner.camera.set(Camera {
        center: bounds.clamp(center),
        zoom: new_zoom,
    });
    report_moved(runner, size);
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

#[component]
pub fn MapView(runner: ViewportRunner, selected: Option<TopicId>, on_select: EventHandler<TopicId>) -> Element {
    let mut runner = runner;
    let size = use_signal(|| FALLBACK_SIZE);

    let viewport_config = runner.dashboard.read().config().viewport.clone();
    let bounds = viewport_config.bounds;
    let (min_zoom, max_zoom) = (viewport_config.min_zoom, viewport_config.max_zoom);

    // Drag state (mouse)
    let mut is_dragging = use_signal(|| false);
    let mut did_drag = use_signal(|| false);
    let mut drag_start = use_signal(|| (0.0_f64, 0.0_f64));
    let mut drag_start_center = use_signal(|| LatLng::new(0.0, 0.0));

    let camera = *runner.camera.read();
    let (width, height) = *size.read();
    let svg_html = build_svg_overlay(camera, width, height, &viewport_config.home_region);
    let markers: Vec<(TopicId, &str, &str, String, &str)> = registry::topics()
        .iter()
        .map(|topic| {
            let (x, y) = projection::to_screen(topic.position, camera.center, camera.zoom, width, height);
            let class = if selected == Some(topic.id) { "marker selected" } else { "marker" };
            (topic.id, topic.title, topic.icon, format!("left:{x:.1}px;top:{y:.1}px;"), class)
        })
        .collect();
    let readout = format!("{} · z{:.1}", camera.center, camera.zoom);

    let container_class = if *is_dragging.read() && *did_drag.read() {
        "map-container dragging"
    } else {
        "map-container"
    };

    let end_drag = move || {
        let was_drag = *is_dragging.peek() && *did_drag.peek();
        is_dragging.set(false);
        did_drag.set(false);
        if was_drag {
            report_moved(runner, *size.peek());
        }
    };
    let mut end_drag_up = end_drag;
    let mut end_drag_leave = end_drag;

    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "{container_class}",

            onmounted: move |_| measure(size),

            onwheel: move |evt: Event<WheelData>| {
                evt.prevent_default();
                measure(size);
                let delta_y = wheel_delta_y(evt.data().delta());
                let current = runner.camera.peek().zoom;
                let new_zoom = wheel_zoom(current, delta_y, min_zoom, max_zoom);
                let Some(rect) = container_rect() else { return };
                let client = evt.data().client_coordinates();
                zoom_to(runner, new_zoom, client.x - rect.left(), client.y - rect.top(), *size.peek(), bounds);
            },

            onmousedown: move |evt: Event<MouseData>| {
                if evt.trigger_button() != Some(MouseButton::Primary) {
                    return;
                }
                measure(size);
                let client = evt.client_coordinates();
                is_dragging.set(true);
                did_drag.set(false);
                drag_start.set((client.x, client.y));
                drag_start_center.set(runner.camera.peek().center);
            },

            onmousemove: move |evt: Event<MouseData>| {
                if !*is_dragging.peek() {
                    return;
                }
                let client = evt.client_coordinates();
                let (sx, sy) = *drag_start.peek();
                let (dx, dy) = (client.x - sx, client.y - sy);

                if !*did_drag.peek() && (dx.abs() > DRAG_THRESHOLD || dy.abs() > DRAG_THRESHOLD) {
                    did_drag.set(true);
                    runner.stop_flight();
                }
                if *did_drag.peek() {
                    let zoom = runner.camera.peek().zoom;
                    let center = projection::pan_center(*drag_start_center.peek(), dx, dy, zoom);
                    // Hard wall: the center never leaves the map bounds, even mid-drag.
                    runner.camera.set(Camera { center: bounds.clamp(center), zoom });
                }
            },

            onmouseup: move |_| end_drag_up(),
            onmouseleave: move |_| end_drag_leave(),

            div {
                dangerous_inner_html: "{svg_html}",
                style: "position:absolute;top:0;left:0;width:100%;height:100%;pointer-events:none;",
            }

            for (id, title, icon, style, class) in markers {
                button {
                    key: "{id}",
                    class: "{class}",
                    style: "{style}",
                    title: "{title}",
                    onclick: move |_| on_select.call(id),
                    span { class: "marker-icon", "{icon}" }
                    span { class: "marker-label", "{title}" }
                }
            }

            div { class: "zoom-controls",
                button {
                    disabled: camera.zoom >= max_zoom,
                    onclick: move |_| {
                        let (w, h) = *size.peek();
                        let new_zoom = (runner.camera.peek().zoom + ZOOM_STEP).min(max_zoom);
                        zoom_to(runner, new_zoom, w / 2.0, h / 2.0, (w, h), bounds);
                    },
                    "+"
                }
                button {
                    disabled: camera.zoom <= min_zoom,
                    onclick: move |_| {
                        let (w, h) = *size.peek();
                        let new_zoom = (runner.camera.peek().zoom - ZOOM_STEP).max(min_zoom);
                        zoom_to(runner, new_zoom, w / 2.0, h / 2.0, (w, h), bounds);
                    },
                    "−"
                }
            }

            div { class: "coord-readout",
                "{readout}"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast360_shared::geo::{HOME_CENTER, HOME_REGION};

    // --- wheel_zoom tests ---

    #[test]
    fn test_wheel_up_zooms_in() {
        assert_eq!(wheel_zoom(8.0, -120.0, 6.0, 13.0), 8.5);
    }

    #[test]
    fn test_wheel_down_zooms_out() {
        assert_eq!(wheel_zoom(8.0, 40.0, 6.0, 13.0), 7.5);
    }

    #[test]
    fn test_wheel_zoom_respects_limits() {
        assert_eq!(wheel_zoom(13.0, -1.0, 6.0, 13.0), 13.0);
        assert_eq!(wheel_zoom(6.0, 1.0, 6.0, 13.0), 6.0);
        assert_eq!(wheel_zoom(9.0, 0.0, 6.0, 13.0), 9.0);
    }

    // --- build_svg_overlay tests ---

    #[test]
    fn test_overlay_draws_home_region() {
        let camera = Camera {
            center: HOME_CENTER,
            zoom: 8.0,
        };
        let svg = build_svg_overlay(camera, 1024.0, 768.0, &HOME_REGION);
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches(r#"class="home-region""#).count(), 1);
        let ppd = projection::pixels_per_degree(8.0);
        let expected_width = format!(r#"width="{:.1}""#, HOME_REGION.span().1 * ppd);
        assert!(svg.contains(&expected_width));
    }

    #[test]
    fn test_overlay_graticule_matches_visible_degrees() {
        let camera = Camera {
            center: LatLng::new(-17.5, 178.0),
            zoom: 8.0,
        };
        let svg = build_svg_overlay(camera, 1024.0, 768.0, &HOME_REGION);
        let view = projection::visible_bounds(camera.center, camera.zoom, 1024.0, 768.0);
        let (lats, lons) = projection::graticule(&view);
        assert_eq!(svg.matches(r#"class="graticule""#).count(), lats.len() + lons.len());
        assert!(!lats.is_empty() && !lons.is_empty());
    }
}
