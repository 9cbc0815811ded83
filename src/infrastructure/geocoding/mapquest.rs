use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{GeocodedAddress, Geocoder};
use crate::shared::{DomainError, DomainResult};

/// MapQuest geocoding v1 (`/address?key=..&location=..`).
pub struct MapQuestGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MapQuestGeocoder {
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    results: Vec<ResultEntry>,
}

#[derive(Debug, Deserialize)]
struct ResultEntry {
    #[serde(default)]
    locations: Vec<Location>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Location {
    lat_lng: LatLng,
    #[serde(default)]
    street: String,
    #[serde(default, rename = "adminArea5")]
    city: String,
    #[serde(default, rename = "adminArea3")]
    state: String,
    #[serde(default)]
    postal_code: String,
    #[serde(default, rename = "adminArea1")]
    country: String,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn into_address(location: Location) -> GeocodedAddress {
    let state_zip = [location.state.trim(), location.postal_code.trim()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let formatted = [
        location.street.trim(),
        location.city.trim(),
        state_zip.as_str(),
        location.country.trim(),
    ]
    .iter()
    .filter(|s| !s.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join(", ");

    GeocodedAddress {
        latitude: location.lat_lng.lat,
        longitude: location.lat_lng.lng,
        formatted_address: non_empty(formatted),
        street: non_empty(location.street),
        city: non_empty(location.city),
        state: non_empty(location.state),
        zipcode: non_empty(location.postal_code),
        country: non_empty(location.country),
    }
}

fn first_match(body: Response) -> Option<GeocodedAddress> {
    body.results
        .into_iter()
        .next()?
        .locations
        .into_iter()
        .next()
        .map(into_address)
}

#[async_trait]
impl Geocoder for MapQuestGeocoder {
    async fn geocode(&self, address: &str) -> DomainResult<Option<GeocodedAddress>> {
        debug!(address = %address, "Geocoding via MapQuest");
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("key", self.api_key.as_str()), ("location", address)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(DomainError::Storage(format!(
                "Geocoder responded with {}",
                response.status()
            )));
        }
        let body: Response = response.json().await?;
        Ok(first_match(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_location() {
        let body: Response = serde_json::from_str(
            r#"{
                "results": [{
                    "locations": [{
                        "street": "233 Bay State Rd",
                        "adminArea5": "Boston",
                        "adminArea3": "MA",
                        "adminArea1": "US",
                        "postalCode": "02215",
                        "latLng": { "lat": 42.350846, "lng": -71.103896 }
                    }]
                }]
            }"#,
        )
        .unwrap();

        let address = first_match(body).unwrap();
        assert_eq!(address.longitude, -71.103896);
        assert_eq!(address.city.as_deref(), Some("Boston"));
        assert_eq!(
            address.formatted_address.as_deref(),
            Some("233 Bay State Rd, Boston, MA 02215, US")
        );
    }

    #[test]
    fn empty_results_mean_no_match() {
        let body: Response = serde_json::from_str(r#"{ "results": [] }"#).unwrap();
        assert!(first_match(body).is_none());
    }

    #[test]
    fn blank_components_become_none() {
        let body: Response = serde_json::from_str(
            r#"{ "results": [{ "locations": [{ "street": "", "latLng": { "lat": 1.0, "lng": 2.0 } }] }] }"#,
        )
        .unwrap();
        let address = first_match(body).unwrap();
        assert!(address.street.is_none());
        assert!(address.formatted_address.is_none());
    }
}
