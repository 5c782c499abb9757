use geo::algorithm::bounding_rect::BoundingRect;
use geo::{Coord, Geometry, MultiPolygon, Rect};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

// Column names exactly as they ship in the source datasets. id_poligon is
// the join key of the whole analysis.
pub const COL_ZONE_ID: &str = "id_poligon";
pub const COL_ZONE_NAME: &str = "nombre_pol";
pub const COL_LOCALITY: &str = "Localidad";
// The occupation dataset misspells its locality column
pub const COL_LOCALITY_SOURCE: &str = "localidas";
pub const COL_AREA_HA: &str = "Área_Ha_";
pub const COL_OCCUPATION_ID: &str = "id_ocupac";
pub const COL_COUNT: &str = "Cantidad_Ocupaciones";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    Zones,
    Occupations,
}

// The loader reduces every dbase field to one of these two: the area column
// becomes a number, everything else text with missing values as ""
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Geometry<f64>,
    pub attributes: HashMap<String, Value>,
}

impl Feature {
    // Numbers render in their shortest form, so a numeric id of 1.0 compares
    // equal to the text "1"
    pub fn text(&self, column: &str) -> String {
        match self.attributes.get(column) {
            Some(Value::Text(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            None => String::new(),
        }
    }

    pub fn number(&self, column: &str) -> f64 {
        match self.attributes.get(column) {
            Some(Value::Number(n)) => *n,
            Some(Value::Text(s)) => s.trim().parse().unwrap_or(0.0),
            None => 0.0,
        }
    }
}

// One loaded dataset. Column order follows the source attribute table; epsg
// is always 4326 after loading.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    pub columns: Vec<String>,
    pub features: Vec<Feature>,
    pub epsg: u32,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn bounds(&self) -> Option<Rect<f64>> {
        let mut overall: Option<Rect<f64>> = None;
        for feature in &self.features {
            let Some(rect) = feature.geometry.bounding_rect() else {
                continue;
            };
            overall = Some(match overall {
                None => rect,
                Some(acc) => Rect::new(
                    Coord {
                        x: acc.min().x.min(rect.min().x),
                        y: acc.min().y.min(rect.min().y),
                    },
                    Coord {
                        x: acc.max().x.max(rect.max().x),
                        y: acc.max().y.max(rect.max().y),
                    },
                ),
            });
        }
        overall
    }
}

// One row of the aggregation output. Name and locality arrive lower-cased.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneSummary {
    pub id: String,
    pub name: String,
    pub locality: String,
    pub area_ha: f64,
    pub occupations: u64,
    pub geometry: MultiPolygon<f64>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("request for {url} failed")]
    Network {
        url: String,
        source: reqwest::Error,
    },
    #[error("could not read archive")]
    Archive(#[from] zip::result::ZipError),
    #[error("no .shp file inside the archive")]
    MissingShapefile,
    #[error("missing .dbf attribute table next to {shp:?}")]
    MissingAttributes { shp: PathBuf },
    #[error("shapefile did not parse under the default encoding ({default_encoding}) nor latin-1 ({latin1})")]
    Parse {
        default_encoding: String,
        latin1: String,
    },
    #[error("could not convert shapefile geometry: {0}")]
    Geometry(String),
    #[error("unrecognized coordinate reference system: {0}")]
    UnknownCrs(String),
    #[error(transparent)]
    Crs(#[from] crate::crs::CrsError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("zone table is missing the {0:?} column")]
    MissingColumn(&'static str),
    #[error("zone table contains no polygon geometries")]
    NoZoneGeometry,
    #[error(transparent)]
    Crs(#[from] crate::crs::CrsError),
}

// Hectares for display: whole hectares plus the fractional remainder in
// square meters, 1234.5678 -> "1,234 ha + 5,678 m²"
pub fn format_area_ha(area: f64) -> String {
    if !area.is_finite() || area < 0.0 {
        return "N/A".to_string();
    }
    let hectares = area.trunc() as u64;
    let square_meters = (area.fract() * 10_000.0).round() as u64;
    format!(
        "{} ha + {} m²",
        group_thousands(hectares),
        group_thousands(square_meters)
    )
}

fn group_thousands(mut n: u64) -> String {
    let mut groups = Vec::new();
    loop {
        if n < 1000 {
            groups.push(n.to_string());
            break;
        }
        groups.push(format!("{:03}", n % 1000));
        n /= 1000;
    }
    groups.reverse();
    groups.join(",")
}
