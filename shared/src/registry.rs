//! Static geographic data: boundary features, the region table and the
//! points of interest grouped under each region.
//!
//! Everything here is loaded once and then only read. Survivable data
//! problems (unknown alias targets, missing focus poses, unsupported
//! geometry) are logged and degraded rather than rejected.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::colors::{Rgb, region_color};
use crate::geo::{
    Bounds, LonLat, Polygon, Pose, Ring, polygon_area, polygon_bounds, polygon_centroid,
};
use crate::spatial::FeatureGrid;

pub type RegionId = String;

const BUNDLED_REGION_TABLE: &str = include_str!("../data/regions.json");

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to parse geographic data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("region record has an empty id")]
    EmptyRegionId,
    #[error("region {0:?} is defined more than once")]
    DuplicateRegion(String),
    #[error("region {region:?} has invalid color {value:?}")]
    InvalidColor { region: String, value: String },
}

/// One polygon (or multipolygon) from the boundary dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub source_name: String,
    /// `None` for features with no entry in the region table.
    pub region_id: Option<RegionId>,
    pub polygons: Vec<Polygon>,
    pub bounds: Bounds,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub id: RegionId,
    pub display_name: String,
    pub color: Rgb,
    /// Hover fill; the palette highlight is used when absent.
    pub highlight: Option<Rgb>,
    pub focus_pose: Option<Pose>,
    /// Where the overview label is drawn.
    pub label_anchor: Option<LonLat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub id: String,
    pub name: String,
    #[serde(default, rename = "desc", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "coordinates")]
    pub coordinate: LonLat,
}

// --- Region table (hand-authored JSON) ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionTable {
    /// Source feature name -> region id. Several features may share a region.
    #[serde(default)]
    pub aliases: HashMap<String, RegionId>,
    #[serde(default)]
    pub regions: Vec<RegionRecord>,
    /// Region id -> cities shown when the region is focused.
    #[serde(default)]
    pub cities: HashMap<RegionId, Vec<PointOfInterest>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegionRecord {
    pub id: RegionId,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub highlight: Option<String>,
    #[serde(default)]
    pub focus: Option<Pose>,
}

impl RegionTable {
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The province table compiled into the binary.
    pub fn bundled() -> Result<Self, RegistryError> {
        Self::from_json(BUNDLED_REGION_TABLE)
    }
}

// --- Boundary dataset (GeoJSON subset) ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<GeoJsonFeature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeoJsonFeature {
    #[serde(default)]
    pub properties: Option<FeatureProperties>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureProperties {
    #[serde(default)]
    pub name: Option<String>,
}

/// GeoJSON positions may carry altitude; only lon/lat are kept.
type Position = Vec<f64>;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    #[serde(other)]
    Unsupported,
}

impl FeatureCollection {
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        Ok(serde_json::from_str(json)?)
    }
}

fn to_ring(positions: &[Position]) -> Ring {
    positions
        .iter()
        .filter(|p| p.len() >= 2)
        .map(|p| LonLat::new(p[0], p[1]))
        .collect()
}

fn to_polygon(rings: &[Vec<Position>]) -> Polygon {
    rings.iter().map(|r| to_ring(r)).filter(|r| r.len() >= 3).collect()
}

impl Geometry {
    fn into_polygons(self) -> Option<Vec<Polygon>> {
        let polygons: Vec<Polygon> = match self {
            Geometry::Polygon { coordinates } => vec![to_polygon(&coordinates)],
            Geometry::MultiPolygon { coordinates } => {
                coordinates.iter().map(|p| to_polygon(p)).collect()
            }
            Geometry::Unsupported => return None,
        };
        let polygons: Vec<Polygon> = polygons.into_iter().filter(|p| !p.is_empty()).collect();
        (!polygons.is_empty()).then_some(polygons)
    }
}

// --- Registry ---

#[derive(Debug, Clone)]
pub struct GeoRegistry {
    features: Vec<Feature>,
    regions: Vec<Region>,
    region_index: HashMap<RegionId, usize>,
    points_of_interest: HashMap<RegionId, Vec<PointOfInterest>>,
    grid: FeatureGrid,
}

fn parse_color(region: &str, value: &str) -> Result<Rgb, RegistryError> {
    Rgb::parse_hex(value).ok_or_else(|| RegistryError::InvalidColor {
        region: region.to_string(),
        value: value.to_string(),
    })
}

impl GeoRegistry {
    pub fn build(table: RegionTable, boundaries: FeatureCollection) -> Result<Self, RegistryError> {
        let RegionTable {
            aliases,
            regions: records,
            cities,
        } = table;

        let mut regions = Vec::with_capacity(records.len());
        let mut region_index = HashMap::with_capacity(records.len());
        for record in records {
            if record.id.trim().is_empty() {
                return Err(RegistryError::EmptyRegionId);
            }
            if region_index.contains_key(&record.id) {
                return Err(RegistryError::DuplicateRegion(record.id));
            }
            let color = match record.color.as_deref() {
                Some(value) => parse_color(&record.id, value)?,
                None => region_color(&record.id),
            };
            let highlight = record
                .highlight
                .as_deref()
                .map(|value| parse_color(&record.id, value))
                .transpose()?;
            let focus_pose = match record.focus {
                Some(pose) if pose.is_valid() => Some(pose),
                Some(pose) => {
                    tracing::warn!(region = %record.id, ?pose, "ignoring invalid focus pose");
                    None
                }
                None => None,
            };
            region_index.insert(record.id.clone(), regions.len());
            regions.push(Region {
                id: record.id,
                display_name: record.name,
                color,
                highlight,
                focus_pose,
                label_anchor: None,
            });
        }

        for (name, target) in &aliases {
            if !region_index.contains_key(target) {
                tracing::warn!(feature = %name, region = %target, "alias points at unknown region; feature stays unmapped");
            }
        }

        let mut features = Vec::with_capacity(boundaries.features.len());
        for raw in boundaries.features {
            let name = raw
                .properties
                .and_then(|p| p.name)
                .unwrap_or_default();
            let Some(polygons) = raw.geometry.and_then(Geometry::into_polygons) else {
                tracing::warn!(feature = %name, "skipping feature without polygon geometry");
                continue;
            };
            let region_id = aliases
                .get(&name)
                .filter(|id| region_index.contains_key(*id))
                .cloned();
            features.push(Feature {
                bounds: polygon_bounds(&polygons),
                source_name: name,
                region_id,
                polygons,
            });
        }

        // Label each region at the centroid of its largest polygon.
        let mut largest: HashMap<&str, (f64, LonLat)> = HashMap::new();
        for feature in &features {
            let Some(region_id) = feature.region_id.as_deref() else {
                continue;
            };
            for polygon in &feature.polygons {
                let area = polygon_area(polygon);
                let Some(centroid) = polygon_centroid(polygon) else {
                    continue;
                };
                let entry = largest.entry(region_id).or_insert((f64::MIN, centroid));
                if area > entry.0 {
                    *entry = (area, centroid);
                }
            }
        }
        for region in &mut regions {
            region.label_anchor = largest.get(region.id.as_str()).map(|(_, c)| *c);
        }

        let mut points_of_interest = HashMap::new();
        for (region_id, pois) in cities {
            if !region_index.contains_key(&region_id) {
                tracing::warn!(region = %region_id, "dropping cities listed under unknown region");
                continue;
            }
            points_of_interest.insert(region_id, pois);
        }

        let grid = FeatureGrid::build(&features);

        tracing::debug!(
            features = features.len(),
            regions = regions.len(),
            "geo registry loaded"
        );

        Ok(Self {
            features,
            regions,
            region_index,
            points_of_interest,
            grid,
        })
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn feature(&self, index: usize) -> Option<&Feature> {
        self.features.get(index)
    }

    /// Regions in table order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region(&self, id: &str) -> Option<&Region> {
        self.region_index.get(id).map(|&idx| &self.regions[idx])
    }

    pub fn region_of(&self, feature: &Feature) -> Option<&Region> {
        feature.region_id.as_deref().and_then(|id| self.region(id))
    }

    pub fn focus_pose(&self, id: &str) -> Option<Pose> {
        self.region(id).and_then(|r| r.focus_pose)
    }

    /// Cities of a region; empty for regions without any.
    pub fn points_of_interest(&self, region_id: &str) -> &[PointOfInterest] {
        self.points_of_interest
            .get(region_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn point_of_interest(&self, region_id: &str, poi_id: &str) -> Option<&PointOfInterest> {
        self.points_of_interest(region_id)
            .iter()
            .find(|poi| poi.id == poi_id)
    }

    /// Feature under a geographic coordinate.
    pub fn feature_at(&self, p: LonLat) -> Option<usize> {
        self.grid.find_at(&self.features, p)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn features_resolve_to_regions_through_aliases() {
        let registry = two_region_registry();
        let ids: Vec<Option<&str>> = registry
            .features()
            .iter()
            .map(|f| f.region_id.as_deref())
            .collect();
        assert_eq!(ids, vec![Some("A"), Some("A"), Some("B"), Some("C"), None]);
        assert_eq!(registry.region("A").unwrap().display_name, "Alpha");
        assert!(registry.region("missing").is_none());
    }

    #[test]
    fn focus_pose_is_optional() {
        let registry = two_region_registry();
        assert_eq!(registry.focus_pose("A"), Some(Pose::new(10.0, 20.0, 3.0)));
        assert_eq!(registry.focus_pose("C"), None);
        assert_eq!(registry.focus_pose("nope"), None);
    }

    #[test]
    fn points_of_interest_grouped_by_region() {
        let registry = two_region_registry();
        let names: Vec<&str> = registry
            .points_of_interest("A")
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Alpha One", "Alpha Two"]);
        assert!(registry.points_of_interest("C").is_empty());
        assert_eq!(
            registry.point_of_interest("A", "a2").and_then(|p| p.description.as_deref()),
            Some("second")
        );
        assert!(registry.point_of_interest("B", "a1").is_none());
    }

    #[test]
    fn label_anchor_uses_largest_polygon() {
        let registry = two_region_registry();
        let anchor = registry.region("A").unwrap().label_anchor.unwrap();
        assert!((anchor.lon - 10.0).abs() < 1e-9);
        assert!((anchor.lat - 20.0).abs() < 1e-9);
    }

    #[test]
    fn feature_at_hits_polygons() {
        let registry = two_region_registry();
        assert_eq!(registry.feature_at(LonLat::new(9.0, 19.0)), Some(0));
        assert_eq!(registry.feature_at(LonLat::new(32.0, 32.0)), Some(4));
        assert_eq!(registry.feature_at(LonLat::new(0.0, 0.0)), None);
    }

    #[test]
    fn alias_to_unknown_region_leaves_feature_unmapped() {
        let table = RegionTable::from_json(
            r##"{"aliases": {"x": "ghost"}, "regions": [{"id": "A", "name": "A", "color": "#123456"}]}"##,
        )
        .unwrap();
        let registry = GeoRegistry::build(table, collection(&[square("x", 0.0, 0.0, 1.0)])).unwrap();
        assert_eq!(registry.features()[0].region_id, None);
    }

    #[test]
    fn invalid_focus_pose_is_dropped() {
        let table = RegionTable::from_json(
            r##"{"regions": [{"id": "A", "name": "A", "focus": {"center": [0, 0], "zoom": -1}}]}"##,
        )
        .unwrap();
        let registry = GeoRegistry::build(table, FeatureCollection::default()).unwrap();
        assert_eq!(registry.focus_pose("A"), None);
        assert_eq!(registry.region("A").unwrap().color, region_color("A"));
    }

    #[test]
    fn rejects_duplicate_and_empty_ids_and_bad_colors() {
        let dup = RegionTable::from_json(
            r#"{"regions": [{"id": "A", "name": "A"}, {"id": "A", "name": "again"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            GeoRegistry::build(dup, FeatureCollection::default()),
            Err(RegistryError::DuplicateRegion(id)) if id == "A"
        ));

        let empty = RegionTable::from_json(r#"{"regions": [{"id": " ", "name": "blank"}]}"#).unwrap();
        assert!(matches!(
            GeoRegistry::build(empty, FeatureCollection::default()),
            Err(RegistryError::EmptyRegionId)
        ));

        let bad = RegionTable::from_json(r#"{"regions": [{"id": "A", "name": "A", "color": "red"}]}"#)
            .unwrap();
        assert!(matches!(
            GeoRegistry::build(bad, FeatureCollection::default()),
            Err(RegistryError::InvalidColor { .. })
        ));
    }

    #[test]
    fn geojson_multipolygons_altitudes_and_unsupported_geometry() {
        let json = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"name": "islands"}, "geometry": {"type": "MultiPolygon", "coordinates": [
                [[[0,0,5],[1,0,5],[1,1,5],[0,1,5],[0,0,5]]],
                [[[3,3],[4,3],[4,4],[3,4],[3,3]]]
            ]}},
            {"type": "Feature", "properties": {"name": "road"}, "geometry": {"type": "LineString", "coordinates": [[0,0],[1,1]]}},
            {"type": "Feature", "properties": null, "geometry": null}
        ]}"#;
        let registry = GeoRegistry::build(
            RegionTable::default(),
            FeatureCollection::from_json(json).unwrap(),
        )
        .unwrap();
        assert_eq!(registry.features().len(), 1);
        assert_eq!(registry.features()[0].polygons.len(), 2);
        assert_eq!(registry.feature_at(LonLat::new(3.5, 3.5)), Some(0));
    }

    #[test]
    fn bundled_table_covers_all_provinces() {
        let table = RegionTable::bundled().unwrap();
        assert_eq!(table.regions.len(), 9);
        assert_eq!(table.aliases.get("서울특별시").map(String::as_str), Some("gyeonggi"));
        let registry = GeoRegistry::build(table, FeatureCollection::default()).unwrap();
        for region in registry.regions() {
            assert!(region.focus_pose.is_some(), "{} lacks a focus pose", region.id);
        }
        assert_eq!(registry.points_of_interest("jeonnam").len(), 4);
        assert_eq!(registry.region("jeju").unwrap().display_name, "제주도");
    }
}
