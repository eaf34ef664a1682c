//! Geographic types.

use serde::{Deserialize, Serialize};

/// A point on the globe with finite coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Build a point; `None` unless both coordinates are finite.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if latitude.is_finite() && longitude.is_finite() {
            Some(Self {
                latitude,
                longitude,
            })
        } else {
            None
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Descriptive data about a geocoded place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

/// A geocoded address: coordinates plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedAddress {
    pub point: GeoPoint,
    #[serde(flatten)]
    pub meta: AddressMeta,
}

/// An address autocomplete candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSuggestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<GeoPoint>,
}

/// What to geocode: free text or a provider candidate id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeocodeTarget {
    Text(String),
    Id(String),
}

/// User-supplied location for a search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationInput {
    pub location: String,
}

impl LocationInput {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }
}
