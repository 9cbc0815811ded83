//! Geocoding contract and spherical-distance helpers

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::DomainResult;

/// Earth radius used to turn a distance into radians.
pub const EARTH_RADIUS_MILES: f64 = 3963.0;

/// Best match returned by a geocoding provider
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedAddress {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the provider has no match for `address`.
    async fn geocode(&self, address: &str) -> DomainResult<Option<GeocodedAddress>>;
}

/// GeoJSON point plus the address components it was resolved from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeoLocation {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude]`
    #[schema(value_type = Vec<f64>)]
    pub coordinates: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl GeoLocation {
    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

impl From<GeocodedAddress> for GeoLocation {
    fn from(address: GeocodedAddress) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [address.longitude, address.latitude],
            formatted_address: address.formatted_address,
            street: address.street,
            city: address.city,
            state: address.state,
            zipcode: address.zipcode,
            country: address.country,
        }
    }
}

/// Distance in miles to an angle in radians on the Earth's surface.
pub fn miles_to_radians(distance: f64) -> f64 {
    distance / EARTH_RADIUS_MILES
}

/// Central angle (radians) between two `(lng, lat)` points in degrees.
pub fn central_angle(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lng1, lat1) = (a.0.to_radians(), a.1.to_radians());
    let (lng2, lat2) = (b.0.to_radians(), b.1.to_radians());
    let dlat = lat2 - lat1;
    let dlng = lng2 - lng1;
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_has_zero_angle() {
        assert_eq!(central_angle((-71.1, 42.3), (-71.1, 42.3)), 0.0);
    }

    #[test]
    fn boston_to_providence_is_about_41_miles() {
        let boston = (-71.0589, 42.3601);
        let providence = (-71.4128, 41.824);
        let miles = central_angle(boston, providence) * EARTH_RADIUS_MILES;
        assert!((miles - 41.0).abs() < 2.0, "got {miles}");
    }

    #[test]
    fn location_from_geocoded_address() {
        let location = GeoLocation::from(GeocodedAddress {
            latitude: 42.35,
            longitude: -71.06,
            formatted_address: Some("Boston, MA 02118, US".into()),
            street: None,
            city: Some("Boston".into()),
            state: Some("MA".into()),
            zipcode: Some("02118".into()),
            country: Some("US".into()),
        });
        assert_eq!(location.kind, "Point");
        assert_eq!(location.longitude(), -71.06);
        assert_eq!(location.latitude(), 42.35);

        let json = serde_json::to_value(&location).unwrap();
        assert_eq!(json["type"], "Point");
        assert_eq!(json["formattedAddress"], "Boston, MA 02118, US");
        assert!(json.get("street").is_none());
    }
}
