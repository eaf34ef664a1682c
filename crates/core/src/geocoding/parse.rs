//! Ordered-alias parsing of geocoder responses.
//!
//! Providers disagree on field names (`lat` vs `latitude` vs `y`) and on
//! envelopes (`results`, `candidates`, bare arrays). Each field is looked up
//! through a fixed, ordered alias list; the first present, well-typed value
//! wins. Numbers encoded as strings are accepted.

use serde_json::{Map, Value};

use super::{AddressMeta, AddressSuggestion, GeoPoint, GeocodedAddress};

const LATITUDE_KEYS: &[&str] = &["lat", "latitude", "y"];
const LONGITUDE_KEYS: &[&str] = &["lng", "lon", "long", "longitude", "x"];
/// Nested objects (or GeoJSON `[lng, lat]` arrays) that may hold coordinates.
const POINT_CONTAINER_KEYS: &[&str] = &["location", "geometry", "coordinates", "point", "geo"];
const LIST_KEYS: &[&str] = &["results", "candidates", "suggestions", "features", "items", "data"];
const SINGLE_KEYS: &[&str] = &["result", "data"];

const ID_KEYS: &[&str] = &["id", "place_id", "placeId", "candidate_id"];
const LABEL_KEYS: &[&str] = &[
    "label",
    "formatted_address",
    "formattedAddress",
    "display_name",
    "displayName",
    "address",
    "direccion",
    "name",
];
const CITY_KEYS: &[&str] = &["city", "localidad", "locality", "town"];
const DEPARTMENT_KEYS: &[&str] = &["department", "departamento", "state", "region"];
const POSTAL_CODE_KEYS: &[&str] = &["postal_code", "postalCode", "postcode", "zip", "codigo_postal"];

/// Guards against pathological nesting.
const MAX_DEPTH: usize = 4;

fn first_value<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_text(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(as_text)
}

fn first_number(object: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(as_number)
}

/// Extract a finite point from an object, looking into known containers.
pub fn parse_point(value: &Value) -> Option<GeoPoint> {
    parse_point_at_depth(value, 0)
}

fn parse_point_at_depth(value: &Value, depth: usize) -> Option<GeoPoint> {
    if depth > MAX_DEPTH {
        return None;
    }

    match value {
        Value::Object(object) => {
            if let (Some(lat), Some(lng)) = (
                first_number(object, LATITUDE_KEYS),
                first_number(object, LONGITUDE_KEYS),
            ) {
                if let Some(point) = GeoPoint::new(lat, lng) {
                    return Some(point);
                }
            }

            POINT_CONTAINER_KEYS
                .iter()
                .filter_map(|key| object.get(*key))
                .find_map(|nested| parse_point_at_depth(nested, depth + 1))
        }
        // GeoJSON order
        Value::Array(items) if items.len() == 2 => {
            let lng = as_number(&items[0])?;
            let lat = as_number(&items[1])?;
            GeoPoint::new(lat, lng)
        }
        _ => None,
    }
}

/// Extract address metadata; absent fields stay `None`.
pub fn parse_meta(value: &Value) -> AddressMeta {
    let Some(object) = value.as_object() else {
        return AddressMeta::default();
    };

    AddressMeta {
        formatted_address: first_text(object, LABEL_KEYS),
        city: first_text(object, CITY_KEYS),
        department: first_text(object, DEPARTMENT_KEYS),
        postal_code: first_text(object, POSTAL_CODE_KEYS),
    }
}

/// Unwrap a response envelope down to its first (or only) result object.
pub fn unwrap_single(value: &Value) -> Option<&Value> {
    unwrap_single_at_depth(value, 0)
}

fn unwrap_single_at_depth(value: &Value, depth: usize) -> Option<&Value> {
    if depth > MAX_DEPTH {
        return None;
    }

    match value {
        Value::Array(items) => items
            .first()
            .and_then(|first| unwrap_single_at_depth(first, depth + 1)),
        Value::Object(object) => {
            if let Some(list) = first_value(object, LIST_KEYS).filter(|v| v.is_array()) {
                return unwrap_single_at_depth(list, depth + 1);
            }
            if let Some(single) = first_value(object, SINGLE_KEYS).filter(|v| v.is_object()) {
                return unwrap_single_at_depth(single, depth + 1);
            }
            Some(value)
        }
        _ => None,
    }
}

/// Parse a forward-geocoding response.
pub fn parse_geocoded(value: &Value) -> Option<GeocodedAddress> {
    let result = unwrap_single(value)?;
    let point = parse_point(result)?;
    Some(GeocodedAddress {
        point,
        meta: parse_meta(result),
    })
}

/// Parse a reverse-geocoding response.
pub fn parse_reverse(value: &Value) -> Option<AddressMeta> {
    let result = unwrap_single(value)?;
    let meta = parse_meta(result);
    if meta == AddressMeta::default() {
        None
    } else {
        Some(meta)
    }
}

/// Parse an autocomplete response; items without a label are skipped.
pub fn parse_suggestions(value: &Value) -> Vec<AddressSuggestion> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(object) => match first_value(object, LIST_KEYS) {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| {
            let object = item.as_object()?;
            Some(AddressSuggestion {
                id: first_text(object, ID_KEYS),
                label: first_text(object, LABEL_KEYS)?,
                point: parse_point(item),
            })
        })
        .collect()
}
