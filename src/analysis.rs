use crate::crs;
use crate::types::{
    AggregationError, Feature, FeatureTable, ZoneSummary, COL_AREA_HA, COL_LOCALITY,
    COL_OCCUPATION_ID, COL_ZONE_ID, COL_ZONE_NAME,
};
use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::contains::Contains;
use geo::{Geometry, MultiPolygon, Point};
use rstar::{RTree, RTreeObject, AABB};
use std::collections::HashSet;

// Wrapper for RTree indexing
struct ZoneEnvelope {
    slot: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for ZoneEnvelope {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

// Counts, for every zone, the occupation points strictly inside it. Every
// zone of the input appears exactly once in the output, in input order, count
// 0 when nothing falls inside. A point inside two overlapping zones counts
// toward both; a point exactly on a boundary counts toward none, which also
// settles the shared-edge case between adjacent zones.
pub fn aggregate(
    zones: &FeatureTable,
    occupations: &FeatureTable,
) -> Result<Vec<ZoneSummary>, AggregationError> {
    if !zones.has_column(COL_ZONE_ID) {
        return Err(AggregationError::MissingColumn(COL_ZONE_ID));
    }

    // 1. One summary row per zone, ids as text, filterable attributes
    //    lower-cased
    let mut summaries = Vec::new();
    for feature in &zones.features {
        let geometry = match &feature.geometry {
            Geometry::MultiPolygon(mp) => mp.clone(),
            Geometry::Polygon(p) => MultiPolygon::new(vec![p.clone()]),
            _ => continue,
        };
        summaries.push(ZoneSummary {
            id: feature.text(COL_ZONE_ID),
            name: feature.text(COL_ZONE_NAME).to_lowercase(),
            locality: feature.text(COL_LOCALITY).to_lowercase(),
            area_ha: feature.number(COL_AREA_HA),
            occupations: 0,
            geometry,
        });
    }
    if summaries.is_empty() && !zones.features.is_empty() {
        return Err(AggregationError::NoZoneGeometry);
    }

    // 2. Occupation ids as text, their points brought into the zone
    //    coordinate system before any containment test
    let (ids, mut points): (Vec<String>, Vec<Point<f64>>) = occupations
        .features
        .iter()
        .filter_map(|feature| match &feature.geometry {
            Geometry::Point(point) => Some((feature.text(COL_OCCUPATION_ID), *point)),
            _ => None,
        })
        .unzip();
    if occupations.epsg != zones.epsg {
        crs::reproject_points(&mut points, occupations.epsg, zones.epsg)?;
    }

    // 3. Candidate lookup through bounding boxes, exact test per candidate
    let envelopes: Vec<ZoneEnvelope> = summaries
        .iter()
        .enumerate()
        .filter_map(|(slot, zone)| {
            zone.geometry.bounding_rect().map(|rect| ZoneEnvelope {
                slot,
                aabb: AABB::from_corners(
                    [rect.min().x, rect.min().y],
                    [rect.max().x, rect.max().y],
                ),
            })
        })
        .collect();
    let tree = RTree::bulk_load(envelopes);

    for (id, point) in ids.iter().zip(&points) {
        let envelope = AABB::from_point([point.x(), point.y()]);
        for candidate in tree.locate_in_envelope_intersecting(&envelope) {
            if summaries[candidate.slot].geometry.contains(point) {
                tracing::debug!("occupation {id} within zone {}", summaries[candidate.slot].id);
                summaries[candidate.slot].occupations += 1;
            }
        }
    }

    Ok(summaries)
}

// Caller-chosen zone restriction: a locality set plus an optional exact name,
// compared case-insensitively. Blank selections mean no restriction, so a
// cleared text box never turns into a filter for "".
#[derive(Debug, Clone, Default)]
pub struct ZoneFilter {
    localities: HashSet<String>,
    name: Option<String>,
}

impl ZoneFilter {
    pub fn new(localities: &[String], name: Option<&str>) -> Self {
        Self {
            localities: localities
                .iter()
                .map(|l| l.trim().to_lowercase())
                .filter(|l| !l.is_empty())
                .collect(),
            name: name
                .map(|n| n.trim().to_lowercase())
                .filter(|n| !n.is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.localities.is_empty() && self.name.is_none()
    }

    pub fn matches(&self, feature: &Feature) -> bool {
        if !self.localities.is_empty() {
            let locality = feature.text(COL_LOCALITY).to_lowercase();
            if !self.localities.contains(&locality) {
                return false;
            }
        }
        if let Some(expected) = &self.name {
            if feature.text(COL_ZONE_NAME).to_lowercase() != *expected {
                return false;
            }
        }
        true
    }

    pub fn filter_table(&self, table: &FeatureTable) -> FeatureTable {
        if self.is_empty() {
            return table.clone();
        }
        FeatureTable {
            columns: table.columns.clone(),
            features: table
                .features
                .iter()
                .filter(|f| self.matches(f))
                .cloned()
                .collect(),
            epsg: table.epsg,
        }
    }
}
