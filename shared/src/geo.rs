use std::f64::consts::FRAC_PI_4;

use serde::{Deserialize, Serialize};

/// Mercator is undefined at the poles; clamp to the usual web-map limit.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

/// Geographic coordinate in degrees. Serialized as `[lon, lat]` like GeoJSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

impl From<[f64; 2]> for LonLat {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<LonLat> for [f64; 2] {
    fn from(value: LonLat) -> Self {
        [value.lon, value.lat]
    }
}

/// Camera state: the coordinate at the middle of the canvas and a zoom factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub center: LonLat,
    pub zoom: f64,
}

impl Pose {
    pub const fn new(lon: f64, lat: f64, zoom: f64) -> Self {
        Self {
            center: LonLat::new(lon, lat),
            zoom,
        }
    }

    /// `zoom > 0` and the center inside valid longitude/latitude ranges.
    pub fn is_valid(&self) -> bool {
        self.zoom.is_finite() && self.zoom > 0.0 && self.center.is_valid()
    }

    /// Component-wise distance check.
    #[cfg(test)]
    pub fn approx_eq(&self, other: &Pose, epsilon: f64) -> bool {
        (self.center.lon - other.center.lon).abs() <= epsilon
            && (self.center.lat - other.center.lat).abs() <= epsilon
            && (self.zoom - other.zoom).abs() <= epsilon
    }
}

/// Axis-aligned lon/lat bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: LonLat,
    pub max: LonLat,
}

impl Bounds {
    pub fn empty() -> Self {
        Self {
            min: LonLat::new(f64::MAX, f64::MAX),
            max: LonLat::new(f64::MIN, f64::MIN),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.lon > self.max.lon || self.min.lat > self.max.lat
    }

    pub fn extend(&mut self, p: LonLat) {
        self.min.lon = self.min.lon.min(p.lon);
        self.min.lat = self.min.lat.min(p.lat);
        self.max.lon = self.max.lon.max(p.lon);
        self.max.lat = self.max.lat.max(p.lat);
    }

    pub fn union(&mut self, other: &Bounds) {
        if other.is_empty() {
            return;
        }
        self.extend(other.min);
        self.extend(other.max);
    }

    pub fn contains(&self, p: LonLat) -> bool {
        p.lon >= self.min.lon && p.lon <= self.max.lon && p.lat >= self.min.lat && p.lat <= self.max.lat
    }
}

pub type Ring = Vec<LonLat>;

/// One polygon: the first ring is the outer boundary, the rest are holes.
pub type Polygon = Vec<Ring>;

pub fn polygon_bounds(polygons: &[Polygon]) -> Bounds {
    let mut bounds = Bounds::empty();
    for p in polygons.iter().flatten().flatten() {
        bounds.extend(*p);
    }
    bounds
}

/// Even-odd containment over every ring of the polygon, so holes are excluded.
pub fn polygon_contains(polygon: &Polygon, p: LonLat) -> bool {
    let mut inside = false;
    for ring in polygon {
        if ring.len() < 3 {
            continue;
        }
        let mut j = ring.len() - 1;
        for i in 0..ring.len() {
            let a = ring[i];
            let b = ring[j];
            if (a.lat > p.lat) != (b.lat > p.lat) {
                let x = (b.lon - a.lon) * (p.lat - a.lat) / (b.lat - a.lat) + a.lon;
                if p.lon < x {
                    inside = !inside;
                }
            }
            j = i;
        }
    }
    inside
}

/// Signed shoelace area and area-weighted centroid of a closed or open ring.
fn ring_area_centroid(ring: &Ring) -> (f64, LonLat) {
    if ring.len() < 3 {
        return (0.0, ring.first().copied().unwrap_or(LonLat::new(0.0, 0.0)));
    }
    let mut area2 = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let a = ring[j];
        let b = ring[i];
        let cross = a.lon * b.lat - b.lon * a.lat;
        area2 += cross;
        cx += (a.lon + b.lon) * cross;
        cy += (a.lat + b.lat) * cross;
        j = i;
    }
    if area2.abs() < f64::EPSILON {
        let n = ring.len() as f64;
        let lon = ring.iter().map(|p| p.lon).sum::<f64>() / n;
        let lat = ring.iter().map(|p| p.lat).sum::<f64>() / n;
        return (0.0, LonLat::new(lon, lat));
    }
    let area = area2 / 2.0;
    (area, LonLat::new(cx / (3.0 * area2), cy / (3.0 * area2)))
}

/// Absolute area of the polygon's outer ring minus its holes, in square degrees.
pub fn polygon_area(polygon: &Polygon) -> f64 {
    let mut rings = polygon.iter();
    let Some(outer) = rings.next() else {
        return 0.0;
    };
    let holes: f64 = rings.map(|r| ring_area_centroid(r).0.abs()).sum();
    (ring_area_centroid(outer).0.abs() - holes).max(0.0)
}

/// Centroid of the outer ring. Good enough for label placement.
pub fn polygon_centroid(polygon: &Polygon) -> Option<LonLat> {
    polygon.first().map(|outer| ring_area_centroid(outer).1)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

/// Spherical Mercator centered on a pose.
///
/// Scale constants are expressed in the 800x600 view box the map was
/// authored against; `fit` converts them to the actual canvas size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mercator {
    scale: f64,
    center_x: f64,
    center_y: f64,
    translate: (f64, f64),
}

pub const VIEW_BOX: ScreenSize = ScreenSize::new(800.0, 600.0);

/// Uniform factor mapping view-box units onto a canvas of `size`.
pub fn view_box_fit(size: ScreenSize) -> f64 {
    (size.width / VIEW_BOX.width)
        .min(size.height / VIEW_BOX.height)
        .max(0.0)
}

fn mercator_y(lat: f64) -> f64 {
    let phi = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    (FRAC_PI_4 + phi / 2.0).tan().ln()
}

impl Mercator {
    /// Projection for `pose` drawn at `base_scale` onto a canvas of `size`.
    pub fn for_pose(pose: &Pose, base_scale: f64, size: ScreenSize) -> Self {
        Self {
            scale: base_scale * pose.zoom * view_box_fit(size),
            center_x: pose.center.lon.to_radians(),
            center_y: mercator_y(pose.center.lat),
            translate: size.center(),
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn project(&self, p: LonLat) -> (f64, f64) {
        (
            self.translate.0 + self.scale * (p.lon.to_radians() - self.center_x),
            self.translate.1 - self.scale * (mercator_y(p.lat) - self.center_y),
        )
    }

    pub fn invert(&self, x: f64, y: f64) -> LonLat {
        if self.scale <= 0.0 {
            return LonLat::new(self.center_x.to_degrees(), 0.0);
        }
        let lon = (self.center_x + (x - self.translate.0) / self.scale).to_degrees();
        let my = self.center_y - (y - self.translate.1) / self.scale;
        let lat = (2.0 * my.exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
        LonLat::new(lon, lat)
    }
}
