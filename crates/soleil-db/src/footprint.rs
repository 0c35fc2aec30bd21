//! Decoding of `ST_AsGeoJSON` building footprints

use geo_types::{Geometry, Polygon};
use soleil_core::BuildingObstacle;
use tracing::warn;

/// Turn one building row into obstacles.
///
/// A polygon gives its exterior ring; a multipolygon gives one obstacle per
/// member. Unsupported geometries and malformed documents are skipped.
pub fn footprints_to_obstacles(
    geojson: &str,
    height: f64,
    ground_altitude: f64,
) -> Vec<BuildingObstacle> {
    let geometry = match decode(geojson) {
        Ok(geometry) => geometry,
        Err(e) => {
            warn!(error = %e, "Skipping unparseable footprint");
            return Vec::new();
        }
    };

    let polygons: Vec<Polygon<f64>> = match geometry {
        Geometry::Polygon(polygon) => vec![polygon],
        Geometry::MultiPolygon(multi) => multi.0,
        other => {
            warn!(
                geometry_type = geometry_kind(&other),
                "Skipping unsupported footprint geometry"
            );
            return Vec::new();
        }
    };

    polygons
        .into_iter()
        .map(|polygon| {
            let (exterior, _holes) = polygon.into_inner();
            BuildingObstacle {
                footprint: exterior,
                height,
                ground_altitude,
            }
        })
        .collect()
}

fn decode(text: &str) -> Result<Geometry<f64>, geojson::Error> {
    let geometry: geojson::Geometry = serde_json::from_str(text)?;
    Geometry::try_from(geometry)
}

fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::LineString(_) => "LineString",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        _ => "other",
    }
}
