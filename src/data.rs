use crate::crs;
use crate::types::{
    DatasetKind, Feature, FeatureTable, LoadError, Value, COL_AREA_HA, COL_LOCALITY,
    COL_LOCALITY_SOURCE,
};
use anyhow::Context;
use geo::{Geometry, MultiPolygon, Point};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

// Raw bytes of a zipped shapefile in, normalized table out: geometries in
// WGS84, the area column numeric, every other attribute text with "" for
// missing values.
pub fn load_dataset(bytes: &[u8], kind: DatasetKind) -> Result<FeatureTable, LoadError> {
    // 1. Extract to scoped temporary storage
    let scratch = tempfile::tempdir()?;
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    archive.extract(scratch.path())?;

    // 2. Locate the shapefile parts
    let parts = locate_shapefile(scratch.path())?;

    // 3. Parse, with a single latin-1 retry on decode failure
    let raw = parse_records(&parts.shp, &parts.dbf)?;

    // 4. Resolve the source coordinate system
    let epsg = match &parts.prj {
        Some(path) => {
            let wkt = std::fs::read_to_string(path)?;
            crs::parse_prj(&wkt).ok_or_else(|| {
                LoadError::UnknownCrs(wkt.trim().chars().take(80).collect())
            })?
        }
        // No .prj: the source is taken at face value as WGS84.
        None => crs::WGS84,
    };

    // 5. Normalize attributes and reproject if needed
    let mut table = build_table(raw, kind, epsg)?;
    if table.epsg != crs::WGS84 {
        println!("Reprojecting from EPSG:{} to EPSG:4326...", table.epsg);
        crs::reproject_table(&mut table, crs::WGS84)?;
    }

    println!(
        "Loaded {} features from {}",
        table.features.len(),
        parts
            .shp
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("shapefile")
    );
    Ok(table)
}

struct ShapefileParts {
    shp: PathBuf,
    dbf: PathBuf,
    prj: Option<PathBuf>,
}

fn locate_shapefile(dir: &Path) -> Result<ShapefileParts, LoadError> {
    let mut shp_files = Vec::new();
    collect_shp(dir, &mut shp_files)?;
    shp_files.sort();
    let shp = shp_files.first().cloned().ok_or(LoadError::MissingShapefile)?;
    if shp_files.len() > 1 {
        tracing::warn!(
            "archive contains {} shapefiles, using {:?}",
            shp_files.len(),
            shp
        );
    }
    let dbf = sibling(&shp, "dbf").ok_or_else(|| LoadError::MissingAttributes {
        shp: shp.clone(),
    })?;
    let prj = sibling(&shp, "prj");
    Ok(ShapefileParts { shp, dbf, prj })
}

fn collect_shp(dir: &Path, found: &mut Vec<PathBuf>) -> Result<(), std::io::Error> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_shp(&path, found)?;
        } else if has_extension(&path, "shp") {
            found.push(path);
        }
    }
    Ok(())
}

// Same stem next to the .shp, extension matched case-insensitively (archives
// mix .dbf and .DBF freely)
fn sibling(shp: &Path, extension: &str) -> Option<PathBuf> {
    let stem = shp.file_stem()?;
    let dir = shp.parent()?;
    for entry in std::fs::read_dir(dir).ok()?.flatten() {
        let path = entry.path();
        if path.file_stem() == Some(stem) && has_extension(&path, extension) {
            return Some(path);
        }
    }
    None
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

struct RawTable {
    columns: Vec<String>,
    rows: Vec<(shapefile::Shape, shapefile::dbase::Record)>,
}

// Two-attempt parse: strict UTF-8 first, then CP1252 (the dbase flavor of
// latin-1). Both failures abort the load with both causes attached.
fn parse_records(shp: &Path, dbf: &Path) -> Result<RawTable, LoadError> {
    let renamed = sanitize_field_names(dbf)?;
    let mut raw = match read_with_encoding(shp, dbf, dbase::Unicode) {
        Ok(raw) => Ok(raw),
        Err(first) => {
            tracing::warn!("default encoding failed ({first:#}), retrying as latin-1");
            match read_with_encoding(shp, dbf, yore::code_pages::CP1252) {
                Ok(raw) => Ok(raw),
                Err(retry) => Err(LoadError::Parse {
                    default_encoding: format!("{first:#}"),
                    latin1: format!("{retry:#}"),
                }),
            }
        }
    }?;
    for (placeholder, name) in &renamed {
        rename_raw_field(&mut raw, placeholder, name);
    }
    Ok(raw)
}

// dbase decodes header field names as strict ASCII no matter which record
// encoding is chosen, so a name like Área_Ha_ aborts the whole read. Swap
// such names for ASCII placeholders on disk and report the decoded
// originals, to be put back once the records are in.
fn sanitize_field_names(dbf: &Path) -> Result<Vec<(String, String)>, LoadError> {
    use yore::CodePage;

    let mut bytes = std::fs::read(dbf)?;
    let mut renames = Vec::new();
    let mut patched = false;
    // Field descriptors: 32 bytes each starting at offset 32, the name in
    // the first 11, the array closed by a 0x0D byte.
    let mut offset = 32;
    while offset + 32 <= bytes.len() && bytes[offset] != 0x0D {
        let name_len = bytes[offset..offset + 11]
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(11);
        let name = &bytes[offset..offset + name_len];
        if !name.is_ascii() {
            let decoded = match std::str::from_utf8(name) {
                Ok(text) => Some(text.trim_end().to_string()),
                Err(_) => CodePage::decode(&yore::code_pages::CP1252, name)
                    .ok()
                    .map(|text| text.trim_end().to_string()),
            };
            let placeholder = format!("__field_{}", (offset - 32) / 32);
            let slot = &mut bytes[offset..offset + 11];
            slot.fill(0);
            slot[..placeholder.len()].copy_from_slice(placeholder.as_bytes());
            patched = true;
            // An undecodable name keeps its placeholder; the data still loads
            if let Some(decoded) = decoded {
                renames.push((placeholder, decoded));
            }
        }
        offset += 32;
    }
    if patched {
        std::fs::write(dbf, &bytes)?;
    }
    Ok(renames)
}

fn rename_raw_field(raw: &mut RawTable, placeholder: &str, name: &str) {
    for column in raw.columns.iter_mut() {
        if column.as_str() == placeholder {
            *column = name.to_string();
        }
    }
    for (_, record) in raw.rows.iter_mut() {
        if let Some(value) = record.remove(placeholder) {
            record.insert(name.to_string(), value);
        }
    }
}

fn read_with_encoding<E: dbase::Encoding + 'static>(
    shp: &Path,
    dbf: &Path,
    encoding: E,
) -> anyhow::Result<RawTable> {
    let shape_reader = shapefile::ShapeReader::from_path(shp)
        .with_context(|| format!("Failed to open shapefile: {:?}", shp))?;
    let dbase_reader = dbase::Reader::from_path_with_encoding(dbf, encoding)
        .with_context(|| format!("Failed to open attribute table: {:?}", dbf))?;
    let columns: Vec<String> = dbase_reader
        .fields()
        .iter()
        .map(|f| f.name().to_string())
        .collect();

    let mut reader = shapefile::Reader::new(shape_reader, dbase_reader);
    let mut rows = Vec::new();
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result?;
        rows.push((shape, record));
    }
    Ok(RawTable { columns, rows })
}

fn build_table(raw: RawTable, kind: DatasetKind, epsg: u32) -> Result<FeatureTable, LoadError> {
    let mut columns = raw.columns;
    let mut features = Vec::new();

    for (shape, record) in raw.rows {
        let geometry = match convert_shape(shape, kind)? {
            Some(geometry) => geometry,
            None => continue, // Skip shapes of the wrong kind
        };

        let mut attributes = HashMap::new();
        for column in &columns {
            let value = match record.get(column) {
                Some(field) if column == COL_AREA_HA => {
                    Value::Number(round2(field_to_number(field)))
                }
                Some(field) => Value::Text(field_to_text(field)),
                None => Value::Text(String::new()),
            };
            attributes.insert(column.clone(), value);
        }
        features.push(Feature {
            geometry,
            attributes,
        });
    }

    if kind == DatasetKind::Occupations {
        rename_column(&mut columns, &mut features, COL_LOCALITY_SOURCE, COL_LOCALITY);
    }

    Ok(FeatureTable {
        columns,
        features,
        epsg,
    })
}

fn convert_shape(
    shape: shapefile::Shape,
    kind: DatasetKind,
) -> Result<Option<Geometry<f64>>, LoadError> {
    match kind {
        DatasetKind::Zones => {
            let polygon: MultiPolygon<f64> = match shape {
                shapefile::Shape::Polygon(p) => p
                    .try_into()
                    .map_err(|e| LoadError::Geometry(format!("{:?}", e)))?,
                shapefile::Shape::PolygonM(p) => p
                    .try_into()
                    .map_err(|e| LoadError::Geometry(format!("{:?}", e)))?,
                shapefile::Shape::PolygonZ(p) => p
                    .try_into()
                    .map_err(|e| LoadError::Geometry(format!("{:?}", e)))?,
                _ => return Ok(None),
            };
            if polygon.0.is_empty() {
                return Ok(None);
            }
            Ok(Some(Geometry::MultiPolygon(polygon)))
        }
        DatasetKind::Occupations => Ok(match shape {
            shapefile::Shape::Point(p) => Some(Geometry::Point(Point::new(p.x, p.y))),
            shapefile::Shape::PointM(p) => Some(Geometry::Point(Point::new(p.x, p.y))),
            shapefile::Shape::PointZ(p) => Some(Geometry::Point(Point::new(p.x, p.y))),
            _ => None,
        }),
    }
}

fn field_to_text(field: &dbase::FieldValue) -> String {
    use dbase::FieldValue;
    match field {
        FieldValue::Character(Some(s)) => s.clone(),
        FieldValue::Character(None) => String::new(),
        FieldValue::Numeric(Some(n)) => n.to_string(),
        FieldValue::Numeric(None) => String::new(),
        FieldValue::Float(Some(f)) => f.to_string(),
        FieldValue::Float(None) => String::new(),
        FieldValue::Integer(i) => i.to_string(),
        FieldValue::Double(d) => d.to_string(),
        FieldValue::Currency(c) => c.to_string(),
        FieldValue::Logical(Some(b)) => b.to_string(),
        FieldValue::Logical(None) => String::new(),
        FieldValue::Date(Some(date)) => {
            format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
        }
        FieldValue::Date(None) => String::new(),
        FieldValue::Memo(m) => m.clone(),
        _ => String::new(),
    }
}

fn field_to_number(field: &dbase::FieldValue) -> f64 {
    use dbase::FieldValue;
    match field {
        FieldValue::Numeric(Some(n)) => *n,
        FieldValue::Float(Some(f)) => f64::from(*f),
        FieldValue::Integer(i) => f64::from(*i),
        FieldValue::Double(d) => *d,
        FieldValue::Currency(c) => *c,
        FieldValue::Character(Some(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn rename_column(columns: &mut [String], features: &mut [Feature], from: &str, to: &str) {
    let Some(column) = columns.iter_mut().find(|c| c.as_str() == from) else {
        return;
    };
    *column = to.to_string();
    for feature in features {
        if let Some(value) = feature.attributes.remove(from) {
            feature.attributes.insert(to.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::Transformer;
    use dbase::{FieldValue, Record, TableWriterBuilder};
    use std::io::Write;

    const BOGOTA_PRJ: &str = "PROJCS[\"MAGNA-SIRGAS / Colombia Bogota zone\",\
        GEOGCS[\"MAGNA-SIRGAS\",DATUM[\"Marco_Geocentrico_Nacional_de_Referencia\",\
        SPHEROID[\"GRS 1980\",6378137,298.257222101]],PRIMEM[\"Greenwich\",0],\
        UNIT[\"degree\",0.0174532925199433],AUTHORITY[\"EPSG\",\"4686\"]],\
        PROJECTION[\"Transverse_Mercator\"],UNIT[\"metre\",1],\
        AUTHORITY[\"EPSG\",\"3116\"]]";

    fn square_ring(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Vec<shapefile::Point> {
        vec![
            shapefile::Point::new(minx, miny),
            shapefile::Point::new(minx, maxy),
            shapefile::Point::new(maxx, maxy),
            shapefile::Point::new(maxx, miny),
            shapefile::Point::new(minx, miny),
        ]
    }

    fn write_zone_shapefile(dir: &Path, rows: &[(&str, &str, &str, f64, [f64; 4])]) {
        let table = TableWriterBuilder::new()
            .add_character_field("id_poligon".try_into().unwrap(), 20)
            .add_character_field("nombre_pol".try_into().unwrap(), 40)
            .add_character_field("Localidad".try_into().unwrap(), 40)
            .add_numeric_field("Área_Ha_".try_into().unwrap(), 12, 3);
        let mut writer = shapefile::Writer::from_path(dir.join("zones.shp"), table).unwrap();
        for (id, name, locality, area, [minx, miny, maxx, maxy]) in rows {
            let mut record = Record::default();
            record.insert(
                "id_poligon".to_string(),
                FieldValue::Character(Some((*id).to_string())),
            );
            record.insert(
                "nombre_pol".to_string(),
                FieldValue::Character(Some((*name).to_string())),
            );
            record.insert(
                "Localidad".to_string(),
                FieldValue::Character(Some((*locality).to_string())),
            );
            record.insert("Área_Ha_".to_string(), FieldValue::Numeric(Some(*area)));
            let polygon = shapefile::Polygon::new(shapefile::PolygonRing::Outer(square_ring(
                *minx, *miny, *maxx, *maxy,
            )));
            writer.write_shape_and_record(&polygon, &record).unwrap();
        }
    }

    fn write_point_shapefile(dir: &Path, rows: &[(&str, &str, f64, f64)], prj: Option<&str>) {
        let table = TableWriterBuilder::new()
            .add_character_field("id_ocupac".try_into().unwrap(), 20)
            .add_character_field("localidas".try_into().unwrap(), 40);
        let mut writer = shapefile::Writer::from_path(dir.join("occupations.shp"), table).unwrap();
        for (id, locality, x, y) in rows {
            let mut record = Record::default();
            record.insert(
                "id_ocupac".to_string(),
                FieldValue::Character(Some((*id).to_string())),
            );
            record.insert(
                "localidas".to_string(),
                FieldValue::Character(Some((*locality).to_string())),
            );
            writer
                .write_shape_and_record(&shapefile::Point::new(*x, *y), &record)
                .unwrap();
        }
        drop(writer);
        if let Some(wkt) = prj {
            std::fs::write(dir.join("occupations.prj"), wkt).unwrap();
        }
    }

    fn zip_dir(dir: &Path) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options: zip::write::FileOptions<'_, ()> = zip::write::FileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            for entry in std::fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_file() {
                    let name = path.file_name().unwrap().to_str().unwrap().to_string();
                    zip.start_file(name, options).unwrap();
                    zip.write_all(&std::fs::read(&path).unwrap()).unwrap();
                }
            }
            zip.finish().unwrap();
        }
        buf
    }

    fn patch_file(path: &Path, needle: &[u8], replacement: &[u8]) {
        assert_eq!(needle.len(), replacement.len());
        let mut bytes = std::fs::read(path).unwrap();
        let pos = bytes
            .windows(needle.len())
            .position(|window| window == needle)
            .expect("needle not found");
        bytes[pos..pos + replacement.len()].copy_from_slice(replacement);
        std::fs::write(path, bytes).unwrap();
    }

    fn zone_archive() -> Vec<u8> {
        let dir = tempfile::tempdir().unwrap();
        write_zone_shapefile(
            dir.path(),
            &[
                ("1", "Zona Norte", "Usme", 12.346, [0.0, 0.0, 10.0, 10.0]),
                ("2", "Zona Sur", "Sumapaz", 3.0, [20.0, 0.0, 30.0, 10.0]),
            ],
        );
        zip_dir(dir.path())
    }

    #[test]
    fn loads_zones_and_normalizes_attributes() {
        let table = load_dataset(&zone_archive(), DatasetKind::Zones).unwrap();

        assert_eq!(
            table.columns,
            vec!["id_poligon", "nombre_pol", "Localidad", "Área_Ha_"]
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.epsg, 4326);

        let first = &table.features[0];
        assert_eq!(first.text("id_poligon"), "1");
        assert_eq!(first.text("nombre_pol"), "Zona Norte");
        assert_eq!(
            first.attributes.get("Área_Ha_"),
            Some(&Value::Number(12.35))
        );
        assert!(matches!(first.geometry, Geometry::MultiPolygon(_)));
    }

    #[test]
    fn loading_is_idempotent() {
        let bytes = zone_archive();
        let first = load_dataset(&bytes, DatasetKind::Zones).unwrap();
        let second = load_dataset(&bytes, DatasetKind::Zones).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn area_column_tolerates_text_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let table = TableWriterBuilder::new()
            .add_character_field("id_poligon".try_into().unwrap(), 20)
            .add_character_field("Área_Ha_".try_into().unwrap(), 20);
        let mut writer = shapefile::Writer::from_path(dir.path().join("zones.shp"), table).unwrap();
        let mut record = Record::default();
        record.insert(
            "id_poligon".to_string(),
            FieldValue::Character(Some("1".to_string())),
        );
        record.insert(
            "Área_Ha_".to_string(),
            FieldValue::Character(Some("n/a".to_string())),
        );
        let polygon = shapefile::Polygon::new(shapefile::PolygonRing::Outer(square_ring(
            0.0, 0.0, 1.0, 1.0,
        )));
        writer.write_shape_and_record(&polygon, &record).unwrap();
        drop(writer);

        let loaded = load_dataset(&zip_dir(dir.path()), DatasetKind::Zones).unwrap();
        assert_eq!(
            loaded.features[0].attributes.get("Área_Ha_"),
            Some(&Value::Number(0.0))
        );
    }

    #[test]
    fn numeric_ids_normalize_to_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let table = TableWriterBuilder::new()
            .add_numeric_field("id_poligon".try_into().unwrap(), 10, 0);
        let mut writer = shapefile::Writer::from_path(dir.path().join("zones.shp"), table).unwrap();
        let mut record = Record::default();
        record.insert("id_poligon".to_string(), FieldValue::Numeric(Some(7.0)));
        let polygon = shapefile::Polygon::new(shapefile::PolygonRing::Outer(square_ring(
            0.0, 0.0, 1.0, 1.0,
        )));
        writer.write_shape_and_record(&polygon, &record).unwrap();
        drop(writer);

        let loaded = load_dataset(&zip_dir(dir.path()), DatasetKind::Zones).unwrap();
        assert_eq!(loaded.features[0].text("id_poligon"), "7");
    }

    #[test]
    fn point_locality_column_is_renamed() {
        let dir = tempfile::tempdir().unwrap();
        write_point_shapefile(dir.path(), &[("a", "Usme", 5.0, 5.0)], None);

        let table = load_dataset(&zip_dir(dir.path()), DatasetKind::Occupations).unwrap();
        assert!(table.has_column(COL_LOCALITY));
        assert!(!table.has_column(COL_LOCALITY_SOURCE));
        assert_eq!(table.features[0].text(COL_LOCALITY), "Usme");
        assert!(matches!(table.features[0].geometry, Geometry::Point(_)));
    }

    #[test]
    fn latin1_attributes_load_via_the_fallback() {
        let dir = tempfile::tempdir().unwrap();
        write_point_shapefile(dir.path(), &[("a", "ocupacion", 5.0, 5.0)], None);
        // Make the stored text latin-1: "ocupaci\xF3n" is invalid UTF-8, so
        // the strict first attempt fails and the CP1252 retry decodes it.
        patch_file(
            &dir.path().join("occupations.dbf"),
            b"ocupacion",
            b"ocupaci\xF3n",
        );

        let table = load_dataset(&zip_dir(dir.path()), DatasetKind::Occupations).unwrap();
        let locality = table.features[0].text(COL_LOCALITY);
        assert_eq!(locality, "ocupación");
        assert!(!locality.contains('\u{FFFD}'));
    }

    #[test]
    fn latin1_field_names_are_restored_after_loading() {
        let dir = tempfile::tempdir().unwrap();
        write_zone_shapefile(
            dir.path(),
            &[("1", "Bosque San Jose", "Usme", 2.5, [0.0, 0.0, 10.0, 10.0])],
        );
        // Rewrite the header and one value the way ESRI tools ship them: the
        // area field name and the zone name in CP1252 rather than UTF-8.
        let dbf = dir.path().join("zones.dbf");
        patch_file(&dbf, "Área_Ha_".as_bytes(), b"\xC1rea_Ha_\x00");
        patch_file(&dbf, b"Jose", b"Jos\xE9");

        let table = load_dataset(&zip_dir(dir.path()), DatasetKind::Zones).unwrap();
        assert_eq!(
            table.columns,
            vec!["id_poligon", "nombre_pol", "Localidad", "Área_Ha_"]
        );
        assert_eq!(
            table.features[0].attributes.get(COL_AREA_HA),
            Some(&Value::Number(2.5))
        );
        assert_eq!(table.features[0].text("nombre_pol"), "Bosque San José");
    }

    #[test]
    fn projected_points_are_normalized_to_wgs84() {
        let forward = Transformer::new(crs::WGS84, 3116).unwrap();
        let (x, y) = forward.apply(-74.1, 4.6).unwrap();

        let dir = tempfile::tempdir().unwrap();
        write_point_shapefile(dir.path(), &[("a", "Usme", x, y)], Some(BOGOTA_PRJ));

        let table = load_dataset(&zip_dir(dir.path()), DatasetKind::Occupations).unwrap();
        assert_eq!(table.epsg, crs::WGS84);
        let Geometry::Point(point) = &table.features[0].geometry else {
            panic!("expected a point");
        };
        assert!((point.x() - -74.1).abs() < 1e-6, "lon was {}", point.x());
        assert!((point.y() - 4.6).abs() < 1e-6, "lat was {}", point.y());
    }

    #[test]
    fn unintelligible_prj_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_point_shapefile(
            dir.path(),
            &[("a", "Usme", 5.0, 5.0)],
            Some("LOCAL_CS[\"in-house grid\"]"),
        );

        let err = load_dataset(&zip_dir(dir.path()), DatasetKind::Occupations).unwrap_err();
        assert!(matches!(err, LoadError::UnknownCrs(_)));
    }

    #[test]
    fn loaded_datasets_flow_into_the_aggregation() {
        let zones_dir = tempfile::tempdir().unwrap();
        write_zone_shapefile(
            zones_dir.path(),
            &[("1", "Zona Norte", "Usme", 12.0, [0.0, 0.0, 10.0, 10.0])],
        );
        let points_dir = tempfile::tempdir().unwrap();
        write_point_shapefile(
            points_dir.path(),
            &[("a", "Usme", 5.0, 5.0), ("b", "Usme", 50.0, 50.0)],
            None,
        );

        let zones = load_dataset(&zip_dir(zones_dir.path()), DatasetKind::Zones).unwrap();
        let occupations =
            load_dataset(&zip_dir(points_dir.path()), DatasetKind::Occupations).unwrap();

        let summaries = crate::analysis::aggregate(&zones, &occupations).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, "1");
        assert_eq!(summaries[0].occupations, 1);
    }

    #[test]
    fn missing_shapefile_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("readme.txt"), "nothing here").unwrap();

        let err = load_dataset(&zip_dir(dir.path()), DatasetKind::Zones).unwrap_err();
        assert!(matches!(err, LoadError::MissingShapefile));
    }

    #[test]
    fn garbage_bytes_are_an_archive_error() {
        let err = load_dataset(b"this is not a zip archive", DatasetKind::Zones).unwrap_err();
        assert!(matches!(err, LoadError::Archive(_)));
    }
}
