//! Decoding of point resources.
//!
//! Two encodings are accepted:
//!
//! - a JSON array of records with numeric `lat`, `lng` and optional `weight`
//!   (default `1.0`); unknown fields are ignored
//! - with the `geojson` feature, a GeoJSON `FeatureCollection`, `Feature` or
//!   bare geometry of `Point` / `MultiPoint`, with the weight taken from a
//!   numeric `weight` property
//!
//! Every decoded point is validated; one bad record makes the whole
//! resource malformed.

use crate::error::{LayersError, Result};
use geolayers_types::point::GeoPoint;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct PointRecord {
    lat: f64,
    lng: f64,
    #[serde(default)]
    weight: Option<f64>,
}

/// Decode the bytes of resource `resource` into validated points.
pub fn decode_points(resource: &str, data: &[u8]) -> Result<Vec<GeoPoint>> {
    let value: Value =
        serde_json::from_slice(data).map_err(|e| LayersError::malformed(resource, e))?;

    let points = match value {
        Value::Array(_) => decode_records(resource, value)?,
        #[cfg(feature = "geojson")]
        Value::Object(_) => decode_geojson(resource, value)?,
        _ => {
            return Err(LayersError::malformed(
                resource,
                "expected an array of point records",
            ));
        }
    };

    for (position, point) in points.iter().enumerate() {
        validate_point(point).map_err(|reason| {
            LayersError::malformed(resource, format!("point {}: {}", position, reason))
        })?;
    }

    Ok(points)
}

fn decode_records(resource: &str, value: Value) -> Result<Vec<GeoPoint>> {
    let records: Vec<PointRecord> =
        serde_json::from_value(value).map_err(|e| LayersError::malformed(resource, e))?;

    Ok(records
        .into_iter()
        .map(|record| {
            GeoPoint::weighted(
                record.lat,
                record.lng,
                record.weight.unwrap_or(GeoPoint::DEFAULT_WEIGHT),
            )
        })
        .collect())
}

#[cfg(feature = "geojson")]
fn decode_geojson(resource: &str, value: Value) -> Result<Vec<GeoPoint>> {
    use geojson::GeoJson;

    let geojson =
        GeoJson::from_json_value(value).map_err(|e| LayersError::malformed(resource, e))?;
    let mut points = Vec::new();

    match geojson {
        GeoJson::FeatureCollection(collection) => {
            for feature in &collection.features {
                push_feature(resource, feature, &mut points)?;
            }
        }
        GeoJson::Feature(feature) => push_feature(resource, &feature, &mut points)?,
        GeoJson::Geometry(geometry) => {
            push_geometry(resource, &geometry, GeoPoint::DEFAULT_WEIGHT, &mut points)?
        }
    }

    Ok(points)
}

#[cfg(feature = "geojson")]
fn push_feature(
    resource: &str,
    feature: &geojson::Feature,
    points: &mut Vec<GeoPoint>,
) -> Result<()> {
    let weight = match feature.property("weight") {
        None | Some(Value::Null) => GeoPoint::DEFAULT_WEIGHT,
        Some(value) => value.as_f64().ok_or_else(|| {
            LayersError::malformed(resource, format!("non-numeric weight property: {}", value))
        })?,
    };

    match &feature.geometry {
        Some(geometry) => push_geometry(resource, geometry, weight, points),
        None => Err(LayersError::malformed(resource, "feature without geometry")),
    }
}

#[cfg(feature = "geojson")]
fn push_geometry(
    resource: &str,
    geometry: &geojson::Geometry,
    weight: f64,
    points: &mut Vec<GeoPoint>,
) -> Result<()> {
    use geojson::Value as Geometry;

    let position_to_point = |position: &[f64]| match position {
        [lng, lat, ..] => Ok(GeoPoint::weighted(*lat, *lng, weight)),
        _ => Err(LayersError::malformed(
            resource,
            "position needs longitude and latitude",
        )),
    };

    match &geometry.value {
        Geometry::Point(position) => points.push(position_to_point(position.as_slice())?),
        Geometry::MultiPoint(positions) => {
            for position in positions {
                points.push(position_to_point(position.as_slice())?);
            }
        }
        other => {
            return Err(LayersError::malformed(
                resource,
                format!("unsupported geometry type: {}", other.type_name()),
            ));
        }
    }
    Ok(())
}

/// Validates coordinates and weight of a decoded point.
///
/// Latitude: [-90.0, 90.0], longitude: [-180.0, 180.0], weight finite and
/// non-negative.
///
/// # Examples
///
/// ```
/// use geolayers::format::validate_point;
/// use geolayers::GeoPoint;
///
/// assert!(validate_point(&GeoPoint::new(59.93, 30.33)).is_ok());
/// assert!(validate_point(&GeoPoint::new(95.0, 30.33)).is_err());
/// assert!(validate_point(&GeoPoint::weighted(59.93, 30.33, -1.0)).is_err());
/// ```
pub fn validate_point(point: &GeoPoint) -> std::result::Result<(), String> {
    if !point.lat.is_finite() {
        return Err(format!("Latitude must be finite, got: {}", point.lat));
    }

    if !point.lng.is_finite() {
        return Err(format!("Longitude must be finite, got: {}", point.lng));
    }

    if !(-90.0..=90.0).contains(&point.lat) {
        return Err(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            point.lat
        ));
    }

    if !(-180.0..=180.0).contains(&point.lng) {
        return Err(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            point.lng
        ));
    }

    if !point.weight.is_finite() || point.weight < 0.0 {
        return Err(format!(
            "Weight must be finite and non-negative, got: {}",
            point.weight
        ));
    }

    Ok(())
}
