//! Mock geocoding provider for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::geocoding::{
    AddressMeta, AddressSuggestion, GeoPoint, GeocodeTarget, GeocodedAddress, GeocodingError,
    GeocodingProvider,
};

/// Mock implementation of [`GeocodingProvider`].
///
/// Knows a fixed set of addresses keyed by their exact text. The text doubles
/// as the candidate id, so geocoding by id and by text agree.
#[derive(Debug, Default)]
pub struct MockGeocoder {
    addresses: Arc<RwLock<HashMap<String, GeocodedAddress>>>,
    targets: Arc<RwLock<Vec<GeocodeTarget>>>,
    next_error: Arc<RwLock<Option<GeocodingError>>>,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an address. Non-finite coordinates are ignored.
    pub async fn add_address(&self, text: &str, latitude: f64, longitude: f64) {
        let Some(point) = GeoPoint::new(latitude, longitude) else {
            return;
        };
        let address = GeocodedAddress {
            point,
            meta: AddressMeta {
                formatted_address: Some(text.to_string()),
                ..AddressMeta::default()
            },
        };
        self.addresses
            .write()
            .await
            .insert(text.to_string(), address);
    }

    /// Make the next provider call fail with `error`.
    pub async fn set_next_error(&self, error: GeocodingError) {
        *self.next_error.write().await = Some(error);
    }

    /// Targets passed to `geocode_address`, oldest first.
    pub async fn geocoded_targets(&self) -> Vec<GeocodeTarget> {
        self.targets.read().await.clone()
    }

    async fn take_error(&self) -> Result<(), GeocodingError> {
        match self.next_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl GeocodingProvider for MockGeocoder {
    async fn get_candidates(&self, text: &str) -> Result<Vec<AddressSuggestion>, GeocodingError> {
        self.take_error().await?;

        let needle = text.trim().to_lowercase();
        let addresses = self.addresses.read().await;
        let mut candidates: Vec<AddressSuggestion> = addresses
            .iter()
            .filter(|(label, _)| !needle.is_empty() && label.to_lowercase().contains(&needle))
            .map(|(label, address)| AddressSuggestion {
                id: Some(label.clone()),
                label: label.clone(),
                point: Some(address.point),
            })
            .collect();
        candidates.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(candidates)
    }

    async fn geocode_address(
        &self,
        target: &GeocodeTarget,
    ) -> Result<Option<GeocodedAddress>, GeocodingError> {
        self.targets.write().await.push(target.clone());
        self.take_error().await?;

        let key = match target {
            GeocodeTarget::Text(text) | GeocodeTarget::Id(text) => text,
        };
        Ok(self.addresses.read().await.get(key).cloned())
    }

    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<AddressMeta>, GeocodingError> {
        self.take_error().await?;

        let addresses = self.addresses.read().await;
        Ok(addresses
            .values()
            .find(|address| {
                address.point.latitude() == latitude && address.point.longitude() == longitude
            })
            .map(|address| address.meta.clone()))
    }
}
