use forecast360_shared::geo::{LatLng, LatLngBounds};

/// Width in pixels of the whole world at zoom 0.
const WORLD_PX: f64 = 256.0;

/// Pure function: screen pixels per degree at `zoom` (equirectangular, both
/// axes share one scale).
pub fn pixels_per_degree(zoom: f64) -> f64 {
    WORLD_PX * 2f64.powf(zoom) / 360.0
}

/// Container-relative pixel position of `point` when the map is centered on
/// `center`.
pub fn to_screen(point: LatLng, center: LatLng, zoom: f64, width: f64, height: f64) -> (f64, f64) {
    let ppd = pixels_per_degree(zoom);
    (
        width / 2.0 + (point.lon - center.lon) * ppd,
        height / 2.0 - (point.lat - center.lat) * ppd,
    )
}

/// Inverse of [`to_screen`].
pub fn from_screen(x: f64, y: f64, center: LatLng, zoom: f64, width: f64, height: f64) -> LatLng {
    let ppd = pixels_per_degree(zoom);
    LatLng::new(
        center.lat - (y - height / 2.0) / ppd,
        center.lon + (x - width / 2.0) / ppd,
    )
}

/// Geographic rectangle covered by a `width` x `height` container.
pub fn visible_bounds(center: LatLng, zoom: f64, width: f64, height: f64) -> LatLngBounds {
    let ppd = pixels_per_degree(zoom);
    let half_lat = height / 2.0 / ppd;
    let half_lon = width / 2.0 / ppd;
    LatLngBounds::new(
        LatLng::new(center.lat - half_lat, center.lon - half_lon),
        LatLng::new(center.lat + half_lat, center.lon + half_lon),
    )
}

/// Center after dragging the map content by (`dx`, `dy`) pixels.
pub fn pan_center(start: LatLng, dx: f64, dy: f64, zoom: f64) -> LatLng {
    let ppd = pixels_per_degree(zoom);
    LatLng::new(start.lat + dy / ppd, start.lon - dx / ppd)
}

/// Center that keeps the point under the cursor fixed while zooming from
/// `old_zoom` to `new_zoom`.
pub fn zoom_around(
    center: LatLng,
    old_zoom: f64,
    new_zoom: f64,
    cursor_x: f64,
    cursor_y: f64,
    width: f64,
    height: f64,
) -> LatLng {
    let anchor = from_screen(cursor_x, cursor_y, center, old_zoom, width, height);
    let ppd = pixels_per_degree(new_zoom);
    LatLng::new(
        anchor.lat + (cursor_y - height / 2.0) / ppd,
        anchor.lon - (cursor_x - width / 2.0) / ppd,
    )
}

/// Whole-degree lines crossing `view`, for the graticule overlay.
pub fn graticule(view: &LatLngBounds) -> (Vec<f64>, Vec<f64>) {
    let lats = (view.south().ceil() as i32..=view.north().floor() as i32)
        .map(f64::from)
        .collect();
    let lons = (view.west().ceil() as i32..=view.east().floor() as i32)
        .map(f64::from)
        .collect();
    (lats, lons)
}
