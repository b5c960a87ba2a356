//! GeoJSON boundary reader.
//!
//! Accepts a `FeatureCollection` or a single `Feature`. Only `Polygon` and
//! `MultiPolygon` geometries are kept; everything else is filtered out.

use foundation::math::GeoCoordinate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::FormatError;

/// Property keys consulted (in order) for a feature's name and code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureAliases {
    pub name_keys: Vec<String>,
    pub code_keys: Vec<String>,
}

impl Default for FeatureAliases {
    fn default() -> Self {
        Self {
            name_keys: ["NAME", "ADMIN", "NAME_EN", "name", "name_en", "COUNTRY", "shapeName"]
                .map(String::from)
                .to_vec(),
            code_keys: ["CODE", "ISO_A3", "ADM0_A3", "iso_a3", "shapeGroup"]
                .map(String::from)
                .to_vec(),
        }
    }
}

/// A polygonal boundary. Outer rings and holes are kept in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub name: String,
    pub code: String,
    pub rings: Vec<Vec<GeoCoordinate>>,
}

impl BoundaryFeature {
    /// Replaces name and code, e.g. with the values a country entry was configured with.
    pub fn with_identity(mut self, name: impl Into<String>, code: impl Into<String>) -> Self {
        self.name = name.into();
        self.code = code.into();
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.rings.iter().map(Vec::len).sum()
    }
}

pub fn parse_boundaries(
    payload: &str,
    aliases: &FeatureAliases,
) -> Result<Vec<BoundaryFeature>, FormatError> {
    if payload.trim().is_empty() {
        return Err(FormatError::EmptyInput);
    }
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| FormatError::InvalidGeoJson(format!("JSON parse error: {e}")))?;
    boundaries_from_value(&value, aliases)
}

pub fn boundaries_from_value(
    value: &Value,
    aliases: &FeatureAliases,
) -> Result<Vec<BoundaryFeature>, FormatError> {
    let obj = value
        .as_object()
        .ok_or_else(|| FormatError::InvalidGeoJson("document must be an object".to_string()))?;
    let ty = obj.get("type").and_then(|v| v.as_str()).unwrap_or_default();

    let features: Vec<&Value> = match ty {
        "FeatureCollection" => obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                FormatError::InvalidGeoJson("FeatureCollection without features".to_string())
            })?
            .iter()
            .collect(),
        "Feature" => vec![value],
        other => {
            return Err(FormatError::InvalidGeoJson(format!(
                "expected Feature or FeatureCollection, got `{other}`"
            )));
        }
    };

    let mut out = Vec::new();
    for (index, feature) in features.into_iter().enumerate() {
        match feature_from_value(feature, aliases) {
            Ok(Some(f)) => out.push(f),
            Ok(None) => {}
            Err(reason) => warn!(index, %reason, "skipping malformed boundary feature"),
        }
    }
    Ok(out)
}

fn feature_from_value(
    value: &Value,
    aliases: &FeatureAliases,
) -> Result<Option<BoundaryFeature>, String> {
    let obj = value.as_object().ok_or("feature must be an object")?;
    let Some(geometry) = obj.get("geometry").and_then(|g| g.as_object()) else {
        return Ok(None);
    };
    let geom_type = geometry.get("type").and_then(|v| v.as_str()).unwrap_or_default();
    let coords = geometry.get("coordinates");

    let rings = match (geom_type, coords) {
        ("Polygon", Some(c)) => parse_polygon(c)?,
        ("MultiPolygon", Some(c)) => {
            let polys = c.as_array().ok_or("MultiPolygon coordinates must be an array")?;
            let mut rings = Vec::new();
            for poly in polys {
                rings.extend(parse_polygon(poly)?);
            }
            rings
        }
        ("Polygon" | "MultiPolygon", None) => return Err("geometry missing coordinates".into()),
        _ => return Ok(None),
    };

    let empty = Map::new();
    let props = obj
        .get("properties")
        .and_then(|v| v.as_object())
        .unwrap_or(&empty);
    let name = first_property(props, &aliases.name_keys).unwrap_or_default();
    let code = first_property(props, &aliases.code_keys).unwrap_or_default();

    Ok(Some(BoundaryFeature { name, code, rings }))
}

fn parse_polygon(value: &Value) -> Result<Vec<Vec<GeoCoordinate>>, String> {
    let rings = value.as_array().ok_or("Polygon coordinates must be an array")?;
    rings.iter().map(parse_ring).collect()
}

fn parse_ring(value: &Value) -> Result<Vec<GeoCoordinate>, String> {
    let positions = value.as_array().ok_or("ring must be an array")?;
    positions
        .iter()
        .map(|p| -> Result<GeoCoordinate, String> {
            let pair = p.as_array().ok_or("position must be an array")?;
            let lon = pair.first().and_then(|v| v.as_f64());
            let lat = pair.get(1).and_then(|v| v.as_f64());
            match (lon, lat) {
                (Some(lon), Some(lat)) if lon.is_finite() && lat.is_finite() => {
                    Ok(GeoCoordinate::from_lon_lat(lon, lat))
                }
                _ => Err(format!("invalid position: {p}")),
            }
        })
        .collect()
}

fn first_property(props: &Map<String, Value>, keys: &[String]) -> Option<String> {
    keys.iter().find_map(|k| match props.get(k) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_polygons_and_multipolygons() {
        let payload = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"ADMIN": "Poland", "ISO_A3": "POL"},
                 "geometry": {"type": "Polygon", "coordinates": [[[14,49],[24,49],[24,55],[14,55],[14,49]]]}},
                {"type": "Feature", "properties": {"NAME": "Korea"},
                 "geometry": {"type": "MultiPolygon", "coordinates": [
                    [[[126,34],[129,34],[129,38],[126,34]]],
                    [[[126.5,33.2],[126.9,33.2],[126.7,33.5],[126.5,33.2]]]
                 ]}},
                {"type": "Feature", "properties": {"NAME": "Road"},
                 "geometry": {"type": "LineString", "coordinates": [[0,0],[1,1]]}},
                {"type": "Feature", "properties": {}, "geometry": null}
            ]
        }"#;
        let features = parse_boundaries(payload, &FeatureAliases::default()).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].name, "Poland");
        assert_eq!(features[0].code, "POL");
        assert_eq!(features[0].rings.len(), 1);
        assert_eq!(features[0].rings[0][1], GeoCoordinate::new(49.0, 24.0));
        assert_eq!(features[1].rings.len(), 2);
        assert_eq!(features[1].code, "");
    }

    #[test]
    fn accepts_a_single_feature() {
        let payload = r#"{"type": "Feature", "properties": {"name": "Brazil"},
            "geometry": {"type": "Polygon", "coordinates": [[[-60,-10],[-50,-10],[-55,0]]]}}"#;
        let features = parse_boundaries(payload, &FeatureAliases::default()).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].name, "Brazil");
        assert_eq!(features[0].vertex_count(), 3);
    }

    #[test]
    fn custom_aliases_are_honored() {
        let payload = r#"{"type": "Feature", "properties": {"pays": "France", "NAME": "ignored"},
            "geometry": {"type": "Polygon", "coordinates": [[[0,45],[5,45],[2,48]]]}}"#;
        let aliases = FeatureAliases {
            name_keys: vec!["pays".into()],
            code_keys: vec![],
        };
        let features = parse_boundaries(payload, &aliases).unwrap();
        assert_eq!(features[0].name, "France");
    }

    #[test]
    fn malformed_features_are_skipped_not_fatal() {
        let payload = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {}, "geometry": {"type": "Polygon", "coordinates": [[["a", 1]]]}},
            {"type": "Feature", "properties": {"NAME": "ok"}, "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1]]]}}
        ]}"#;
        let features = parse_boundaries(payload, &FeatureAliases::default()).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].name, "ok");
    }

    #[test]
    fn rejects_non_geojson_documents() {
        assert!(matches!(
            parse_boundaries("[1,2]", &FeatureAliases::default()),
            Err(FormatError::InvalidGeoJson(_))
        ));
        assert!(matches!(
            parse_boundaries(r#"{"type": "Topology"}"#, &FeatureAliases::default()),
            Err(FormatError::InvalidGeoJson(_))
        ));
        assert!(matches!(
            parse_boundaries("{not json", &FeatureAliases::default()),
            Err(FormatError::InvalidGeoJson(_))
        ));
        assert_eq!(
            parse_boundaries("", &FeatureAliases::default()),
            Err(FormatError::EmptyInput)
        );
    }
}
