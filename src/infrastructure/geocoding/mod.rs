//! Geocoder implementations selected from configuration

mod mapquest;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::config::{GeocoderConfig, GeocoderProvider};
use crate::domain::{GeocodedAddress, Geocoder};
use crate::shared::DomainResult;

pub use mapquest::MapQuestGeocoder;

/// Resolves nothing; bootcamps are stored without a location.
pub struct NoopGeocoder;

#[async_trait]
impl Geocoder for NoopGeocoder {
    async fn geocode(&self, _address: &str) -> DomainResult<Option<GeocodedAddress>> {
        Ok(None)
    }
}

/// Fixed address book, case-insensitive on the lookup key.
#[derive(Default)]
pub struct StaticGeocoder {
    entries: HashMap<String, GeocodedAddress>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, address: &str, result: GeocodedAddress) -> Self {
        self.entries.insert(address.trim().to_lowercase(), result);
        self
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, address: &str) -> DomainResult<Option<GeocodedAddress>> {
        Ok(self.entries.get(&address.trim().to_lowercase()).cloned())
    }
}

pub fn build_geocoder(config: &GeocoderConfig) -> Arc<dyn Geocoder> {
    match config.provider {
        GeocoderProvider::Mapquest if config.api_key.is_empty() => {
            warn!("MapQuest geocoder selected without an api_key; geocoding disabled");
            Arc::new(NoopGeocoder)
        }
        GeocoderProvider::Mapquest => Arc::new(MapQuestGeocoder::new(
            config.base_url.clone(),
            config.api_key.clone(),
        )),
        GeocoderProvider::None => Arc::new(NoopGeocoder),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boston() -> GeocodedAddress {
        GeocodedAddress {
            latitude: 42.35,
            longitude: -71.06,
            formatted_address: None,
            street: None,
            city: Some("Boston".into()),
            state: Some("MA".into()),
            zipcode: Some("02118".into()),
            country: Some("US".into()),
        }
    }

    #[tokio::test]
    async fn static_lookup_ignores_case_and_padding() {
        let geocoder = StaticGeocoder::new().with("02118", boston());
        assert_eq!(geocoder.geocode(" 02118 ").await.unwrap(), Some(boston()));
        assert_eq!(geocoder.geocode("90210").await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_api_key_falls_back_to_noop() {
        let config = GeocoderConfig {
            provider: GeocoderProvider::Mapquest,
            api_key: String::new(),
            ..GeocoderConfig::default()
        };
        let geocoder = build_geocoder(&config);
        assert_eq!(geocoder.geocode("Boston").await.unwrap(), None);
    }
}
