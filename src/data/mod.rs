use geojson::feature::Id;
use geojson::{Feature, GeoJson, JsonObject, Value};
use glam::DVec2;
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{LoadError, LoadResult};
use crate::map::{Polygon, Ring, Shape};
use crate::shading::{Marker, ValueTable};

/// Column holding the country code in the World Bank export
const ID_COLUMN: usize = 4;
/// Column holding the life expectancy value
const VALUE_COLUMN: usize = 5;
const COLUMN_COUNT: usize = 6;
/// World Bank placeholder for a missing value
const MISSING: &str = "..";

/// Load the country code -> life expectancy table from a World Bank CSV export
pub fn load_value_table(path: &Path) -> LoadResult<ValueTable> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parse_value_table(&content);
    info!(path = %path.display(), countries = table.len(), "loaded life expectancy table");
    Ok(table)
}

/// Rows are split on every comma. The series name itself contains one
/// ("Life expectancy at birth, total (years)"), which is why a data row
/// has six columns with the code at index 4 and the value at index 5.
pub fn parse_value_table(content: &str) -> ValueTable {
    let mut table = ValueTable::new();

    for (line_no, row) in content.lines().enumerate() {
        let columns: Vec<&str> = row.split(',').collect();
        if columns.len() != COLUMN_COUNT || columns[VALUE_COLUMN].trim() == MISSING {
            continue;
        }

        let id = columns[ID_COLUMN].trim();
        match columns[VALUE_COLUMN].trim().parse::<f64>() {
            Ok(value) if !id.is_empty() => {
                table.insert(id.to_string(), value);
            }
            _ => debug!(line = line_no + 1, "skipping row without a usable value"),
        }
    }

    table
}

/// Load one marker per country polygon from a GeoJSON file
pub fn load_country_markers(path: &Path) -> LoadResult<Vec<Marker<Shape>>> {
    let mut bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let markers = parse_country_markers(&mut bytes, path)?;
    info!(path = %path.display(), countries = markers.len(), "loaded country shapes");
    Ok(markers)
}

/// Parse GeoJSON bytes in place (simd-json mutates its input)
pub fn parse_country_markers(bytes: &mut [u8], path: &Path) -> LoadResult<Vec<Marker<Shape>>> {
    let object: JsonObject = simd_json::serde::from_slice(bytes).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let geojson = GeoJson::from_json_object(object).map_err(|source| LoadError::GeoJson {
        path: path.to_path_buf(),
        source,
    })?;

    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => Vec::new(),
    };

    // Indexed parallel iterators keep feature order through collect
    let markers: Vec<Marker<Shape>> = features.par_iter().filter_map(feature_to_marker).collect();

    if markers.is_empty() {
        return Err(LoadError::NoFeatures(path.to_path_buf()));
    }
    Ok(markers)
}

fn feature_to_marker(feature: &Feature) -> Option<Marker<Shape>> {
    let Some(id) = feature_id(feature) else {
        warn!("skipping country feature without an id");
        return None;
    };

    let polygons = match feature.geometry.as_ref().map(|g| &g.value) {
        Some(Value::Polygon(rings)) => vec![to_polygon(rings)],
        Some(Value::MultiPolygon(polygons)) => polygons.iter().map(|rings| to_polygon(rings)).collect(),
        _ => {
            warn!(%id, "skipping country feature without polygon geometry");
            return None;
        }
    };

    Some(Marker::new(id, Arc::new(Shape::new(polygons))))
}

/// Feature `id`, else the `id`, `iso_a3` or `name` property
fn feature_id(feature: &Feature) -> Option<String> {
    match &feature.id {
        Some(Id::String(s)) if !s.is_empty() => return Some(s.clone()),
        Some(Id::Number(n)) => return Some(n.to_string()),
        _ => {}
    }

    ["id", "iso_a3", "name"]
        .iter()
        .filter_map(|key| feature.property(key))
        .find_map(|v| v.as_str().filter(|s| !s.is_empty()).map(str::to_string))
}

fn to_polygon(rings: &[Vec<Vec<f64>>]) -> Polygon {
    let mut rings = rings.iter().map(|ring| to_ring(ring));
    let exterior = rings.next().unwrap_or_default();
    Polygon::new(exterior, rings.collect())
}

fn to_ring(coords: &[Vec<f64>]) -> Ring {
    coords
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| DVec2::new(c[0], c[1]))
        .collect()
}

/// Boxy stand-in countries for when no data files are available
pub fn generate_sample_world() -> (Vec<Marker<Shape>>, ValueTable) {
    let countries = [
        ("CAN", (-140.0, 49.0, -55.0, 70.0), Some(81.9)),
        ("USA", (-125.0, 25.0, -67.0, 49.0), Some(78.8)),
        ("MEX", (-117.0, 15.0, -87.0, 25.0), Some(76.7)),
        ("BRA", (-73.0, -33.0, -35.0, 5.0), Some(74.4)),
        ("ARG", (-73.0, -55.0, -54.0, -33.0), None),
        ("FRA", (-4.0, 43.0, 8.0, 51.0), Some(82.3)),
        ("NGA", (3.0, 4.0, 14.0, 14.0), Some(52.8)),
        ("COD", (12.0, -13.0, 31.0, 5.0), Some(58.7)),
        ("RUS", (30.0, 50.0, 180.0, 77.0), Some(70.7)),
        ("IND", (68.0, 8.0, 90.0, 28.0), Some(68.0)),
        ("CHN", (75.0, 28.0, 134.0, 50.0), Some(75.8)),
        ("JPN", (129.0, 31.0, 146.0, 45.0), Some(83.8)),
        ("AUS", (113.0, -39.0, 154.0, -11.0), Some(82.3)),
    ];

    let mut values = ValueTable::new();
    let markers = countries
        .into_iter()
        .map(|(id, (min_lon, min_lat, max_lon, max_lat), value)| {
            if let Some(value) = value {
                values.insert(id.to_string(), value);
            }
            Marker::new(id, Arc::new(Shape::rect(min_lon, min_lat, max_lon, max_lat)))
        })
        .collect();

    (markers, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::HitTest;
    use std::path::PathBuf;

    const WORLD_BANK_CSV: &str = "\
Series Name,Series Code,Country Name,Country Code,2014 [YR2014]
Life expectancy at birth, total (years),SP.DYN.LE00.IN,Afghanistan,AFG,60.37446341
Life expectancy at birth, total (years),SP.DYN.LE00.IN,Albania,ALB,77.83
Life expectancy at birth, total (years),SP.DYN.LE00.IN,American Samoa,ASM,..
Life expectancy at birth, total (years),SP.DYN.LE00.IN,Andorra,AND,not-a-number

Data from database: World Development Indicators,,,,
";

    const COUNTRIES_GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "id": "AFG", "properties": {"name": "Afghanistan"},
     "geometry": {"type": "Polygon", "coordinates": [[[61.0, 30.0], [75.0, 30.0], [75.0, 38.0], [61.0, 38.0], [61.0, 30.0]]]}},
    {"type": "Feature", "properties": {"name": "Islands"},
     "geometry": {"type": "MultiPolygon", "coordinates": [
        [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
        [[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 5.0]]]]}},
    {"type": "Feature", "id": "PNT", "properties": {},
     "geometry": {"type": "Point", "coordinates": [10.0, 10.0]}},
    {"type": "Feature", "properties": {},
     "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]}}
  ]
}"#;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("lifexp-map-{}-{}", std::process::id(), name));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_value_table() {
        let table = parse_value_table(WORLD_BANK_CSV);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("AFG"), Some(&60.37446341));
        assert_eq!(table.get("ALB"), Some(&77.83));
        assert!(!table.contains_key("ASM"));
        assert!(!table.contains_key("AND"));
    }

    #[test]
    fn test_load_value_table_missing_file() {
        let err = load_value_table(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_load_value_table_from_disk() {
        let path = temp_file("values.csv", WORLD_BANK_CSV);
        let table = load_value_table(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_parse_country_markers() {
        let mut bytes = COUNTRIES_GEOJSON.as_bytes().to_vec();
        let markers = parse_country_markers(&mut bytes, Path::new("countries.geo.json")).unwrap();

        let ids: Vec<&str> = markers.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["AFG", "Islands"]);

        assert!(markers[0].geometry.contains(DVec2::new(67.0, 34.0)));
        assert_eq!(markers[1].geometry.polygons.len(), 2);
        assert_eq!(markers[1].geometry.bbox(), (0.0, 0.0, 6.0, 6.0));
    }

    #[test]
    fn test_parse_invalid_json() {
        let mut bytes = b"{ not json".to_vec();
        let err = parse_country_markers(&mut bytes, Path::new("bad.json")).unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }));
    }

    #[test]
    fn test_parse_without_countries() {
        let mut bytes = br#"{"type": "FeatureCollection", "features": []}"#.to_vec();
        let err = parse_country_markers(&mut bytes, Path::new("empty.json")).unwrap_err();
        assert!(matches!(err, LoadError::NoFeatures(_)));
    }

    #[test]
    fn test_load_country_markers_from_disk() {
        let path = temp_file("countries.geo.json", COUNTRIES_GEOJSON);
        let markers = load_country_markers(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(markers.len(), 2);
    }

    #[test]
    fn test_sample_world() {
        let (markers, values) = generate_sample_world();
        assert_eq!(markers.len(), 13);
        assert_eq!(values.len(), 12);
        assert!(markers.iter().all(|m| m.geometry.polygons.len() == 1));
        assert!(!values.contains_key("ARG"));
    }
}
