use crate::types::FeatureTable;
use geo::algorithm::map_coords::MapCoordsInPlace;
use geo::{Coord, Geometry, Point};
use proj4rs::proj::Proj;
use thiserror::Error;

// Every loaded table is normalized to geographic WGS84
pub const WGS84: u32 = 4326;

#[derive(Debug, Error)]
pub enum CrsError {
    #[error("no projection definition for EPSG:{0}")]
    UnknownEpsg(u32),
    #[error("projection failed: {0}")]
    Projection(String),
}

// Proj4 definitions for the systems this data actually shows up in. The bool
// marks geographic (angular) systems, whose coordinates proj4rs exchanges in
// radians.
fn definition(epsg: u32) -> Option<(String, bool)> {
    match epsg {
        4326 => Some(("+proj=longlat +datum=WGS84 +no_defs".to_string(), true)),
        4686 => Some((
            "+proj=longlat +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +no_defs".to_string(),
            true,
        )),
        // MAGNA-SIRGAS / Colombia Bogota zone
        3116 => Some((
            "+proj=tmerc +lat_0=4.596200416666666 +lon_0=-74.07750791666666 +k=1 \
             +x_0=1000000 +y_0=1000000 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs"
                .to_string(),
            false,
        )),
        // MAGNA-SIRGAS / Origen-Nacional
        9377 => Some((
            "+proj=tmerc +lat_0=4 +lon_0=-73 +k=0.9992 +x_0=5000000 +y_0=2000000 \
             +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs"
                .to_string(),
            false,
        )),
        3857 => Some((
            "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 \
             +units=m +nadgrids=@null +no_defs"
                .to_string(),
            false,
        )),
        32601..=32660 => Some((utm_definition(epsg - 32600, 0.0), false)),
        32701..=32760 => Some((utm_definition(epsg - 32700, 10_000_000.0), false)),
        _ => None,
    }
}

fn utm_definition(zone: u32, false_northing: f64) -> String {
    let central_meridian = -183 + 6 * zone as i32;
    format!(
        "+proj=tmerc +lat_0=0 +lon_0={central_meridian} +k=0.9996 +x_0=500000 \
         +y_0={false_northing} +datum=WGS84 +units=m +no_defs"
    )
}

pub struct Transformer {
    src: Proj,
    dst: Proj,
    src_geographic: bool,
    dst_geographic: bool,
}

impl Transformer {
    pub fn new(from_epsg: u32, to_epsg: u32) -> Result<Self, CrsError> {
        let (src_def, src_geographic) =
            definition(from_epsg).ok_or(CrsError::UnknownEpsg(from_epsg))?;
        let (dst_def, dst_geographic) =
            definition(to_epsg).ok_or(CrsError::UnknownEpsg(to_epsg))?;
        let src = Proj::from_proj_string(&src_def)
            .map_err(|e| CrsError::Projection(e.to_string()))?;
        let dst = Proj::from_proj_string(&dst_def)
            .map_err(|e| CrsError::Projection(e.to_string()))?;
        Ok(Self {
            src,
            dst,
            src_geographic,
            dst_geographic,
        })
    }

    pub fn apply(&self, x: f64, y: f64) -> Result<(f64, f64), CrsError> {
        let mut point = (x, y, 0.0);
        if self.src_geographic {
            point.0 = point.0.to_radians();
            point.1 = point.1.to_radians();
        }
        proj4rs::transform::transform(&self.src, &self.dst, &mut point)
            .map_err(|e| CrsError::Projection(e.to_string()))?;
        if self.dst_geographic {
            point.0 = point.0.to_degrees();
            point.1 = point.1.to_degrees();
        }
        Ok((point.0, point.1))
    }
}

pub fn reproject_table(table: &mut FeatureTable, to_epsg: u32) -> Result<(), CrsError> {
    if table.epsg == to_epsg {
        return Ok(());
    }
    let transformer = Transformer::new(table.epsg, to_epsg)?;
    let remap = |coord: Coord<f64>| -> Result<Coord<f64>, CrsError> {
        let (x, y) = transformer.apply(coord.x, coord.y)?;
        Ok(Coord { x, y })
    };
    for feature in &mut table.features {
        remap_geometry(&mut feature.geometry, remap)?;
    }
    table.epsg = to_epsg;
    Ok(())
}

// geo's MapCoordsInPlace impl for the Geometry enum re-borrows the closure at
// every Geometry/GeometryCollection level, so its monomorphization never
// terminates. Dispatch on the concrete kinds instead.
fn remap_geometry<F>(geometry: &mut Geometry<f64>, remap: F) -> Result<(), CrsError>
where
    F: Fn(Coord<f64>) -> Result<Coord<f64>, CrsError> + Copy,
{
    match geometry {
        Geometry::Point(g) => g.try_map_coords_in_place(remap),
        Geometry::Line(g) => g.try_map_coords_in_place(remap),
        Geometry::LineString(g) => g.try_map_coords_in_place(remap),
        Geometry::Polygon(g) => g.try_map_coords_in_place(remap),
        Geometry::MultiPoint(g) => g.try_map_coords_in_place(remap),
        Geometry::MultiLineString(g) => g.try_map_coords_in_place(remap),
        Geometry::MultiPolygon(g) => g.try_map_coords_in_place(remap),
        Geometry::GeometryCollection(collection) => {
            for inner in &mut collection.0 {
                remap_geometry(inner, remap)?;
            }
            Ok(())
        }
        Geometry::Rect(g) => g.try_map_coords_in_place(remap),
        Geometry::Triangle(g) => g.try_map_coords_in_place(remap),
    }
}

pub fn reproject_points(
    points: &mut [Point<f64>],
    from_epsg: u32,
    to_epsg: u32,
) -> Result<(), CrsError> {
    if from_epsg == to_epsg {
        return Ok(());
    }
    let transformer = Transformer::new(from_epsg, to_epsg)?;
    for point in points.iter_mut() {
        let (x, y) = transformer.apply(point.x(), point.y())?;
        *point = Point::new(x, y);
    }
    Ok(())
}

// Resolves a .prj WKT string to an EPSG code. The root AUTHORITY entry is the
// last one in WKT1; ESRI-flavored files routinely omit authorities, so fall
// back to matching well-known names.
pub fn parse_prj(wkt: &str) -> Option<u32> {
    if let Some(code) = last_authority_epsg(wkt) {
        return Some(code);
    }
    named_crs(wkt)
}

fn last_authority_epsg(wkt: &str) -> Option<u32> {
    let mut code = None;
    let mut rest = wkt;
    while let Some(pos) = rest.find("AUTHORITY[") {
        let tail = &rest[pos + "AUTHORITY[".len()..];
        if let Some(parsed) = authority_body_epsg(tail) {
            code = Some(parsed);
        }
        rest = tail;
    }
    code
}

fn authority_body_epsg(tail: &str) -> Option<u32> {
    let body = &tail[..tail.find(']')?];
    let parts: Vec<&str> = body.split('"').collect();
    if parts.len() >= 4 && parts[1].eq_ignore_ascii_case("EPSG") {
        parts[3].trim().parse().ok()
    } else {
        None
    }
}

fn named_crs(wkt: &str) -> Option<u32> {
    let lower = wkt.to_lowercase();
    // Web Mercator and UTM names embed "WGS_1984", so they go first.
    if lower.contains("web_mercator")
        || lower.contains("web mercator")
        || lower.contains("pseudo-mercator")
        || lower.contains("pseudo_mercator")
    {
        return Some(3857);
    }
    if let Some(code) = utm_zone_code(&lower) {
        return Some(code);
    }
    if lower.contains("origen-nacional") || lower.contains("origen_nacional") {
        return Some(9377);
    }
    if lower.contains("magna") && lower.contains("bogota") {
        return Some(3116);
    }
    if lower.contains("magna") {
        return Some(4686);
    }
    if lower.contains("gcs_wgs_1984") || lower.contains("wgs 84") || lower.contains("wgs_1984") {
        return Some(4326);
    }
    None
}

fn utm_zone_code(lower: &str) -> Option<u32> {
    let utm = lower.find("utm")?;
    let tail = &lower[utm..];
    let zone_word = tail.find("zone")?;
    let after = tail[zone_word + "zone".len()..].trim_start_matches(['_', ' ']);
    let digits: String = after.chars().take_while(|c| c.is_ascii_digit()).collect();
    let zone: u32 = digits.parse().ok()?;
    if !(1..=60).contains(&zone) {
        return None;
    }
    match after[digits.len()..].chars().next()? {
        'n' => Some(32600 + zone),
        's' => Some(32700 + zone),
        _ => None,
    }
}
