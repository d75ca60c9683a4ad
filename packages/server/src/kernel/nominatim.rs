use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, instrument};

use super::{BaseGeocoder, Place, PlaceKind};
use crate::config::Config;

/// Nominatim `jsonv2` search hit (only the fields classification needs)
#[derive(Debug, Deserialize)]
struct NominatimResponse {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    address: NominatimAddress,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    country: Option<String>,
    state: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    municipality: Option<String>,
}

impl NominatimAddress {
    /// Settlement name, whichever granularity Nominatim reported
    fn locality(&self) -> Option<String> {
        self.city
            .as_ref()
            .or(self.town.as_ref())
            .or(self.village.as_ref())
            .or(self.hamlet.as_ref())
            .or(self.municipality.as_ref())
            .cloned()
    }
}

impl From<NominatimResponse> for Place {
    fn from(response: NominatimResponse) -> Self {
        let city = response.address.locality();
        Place {
            kind: PlaceKind::from(response.kind.as_str()),
            country: response.address.country,
            state: response.address.state,
            city,
        }
    }
}

/// Geocoder backed by OpenStreetMap Nominatim
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
    timeout: Duration,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>, user_agent: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agent: user_agent.into(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.nominatim_url.clone(),
            config.geocoder_user_agent.clone(),
            Duration::from_secs(config.geocoder_timeout_secs),
        )
    }

    fn search_url(&self, name: &str) -> String {
        format!(
            "{}/search?q={}&format=jsonv2&addressdetails=1&limit=1&accept-language=en",
            self.base_url,
            urlencoding::encode(name.trim())
        )
    }
}

#[async_trait]
impl BaseGeocoder for NominatimGeocoder {
    #[instrument(skip(self))]
    async fn search(&self, name: &str) -> Result<Option<Place>> {
        let url = self.search_url(name);

        debug!(name = %name, "Geocoding location");

        let response: Vec<NominatimResponse> = self
            .client
            .get(&url)
            .header("User-Agent", &self.user_agent)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, name = %name, "Geocoding API request failed");
                anyhow!("Geocoding API request failed: {}", e)
            })?
            .error_for_status()
            .map_err(|e| anyhow!("Geocoding API returned an error: {}", e))?
            .json()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to parse geocoding response");
                anyhow!("Failed to parse geocoding response: {}", e)
            })?;

        let place = response.into_iter().next().map(Place::from);
        debug!(name = %name, place = ?place, "Geocoding finished");
        Ok(place)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_a_city_hit() {
        let raw = r#"[{
            "place_id": 1,
            "category": "place",
            "type": "city",
            "display_name": "Berkeley, Alameda County, California, United States",
            "address": {"city": "Berkeley", "county": "Alameda County", "state": "California", "country": "United States"}
        }]"#;
        let hits: Vec<NominatimResponse> = serde_json::from_str(raw).unwrap();
        let place = Place::from(hits.into_iter().next().unwrap());

        assert_eq!(place.kind, PlaceKind::City);
        assert_eq!(place.state.as_deref(), Some("California"));
        assert_eq!(place.country.as_deref(), Some("United States"));
        assert_eq!(place.city.as_deref(), Some("Berkeley"));
    }

    #[test]
    fn falls_back_to_town_and_tolerates_missing_address() {
        let raw = r#"[{"type": "university", "address": {"town": "Stanford", "state": "California"}},
                      {"type": "peak"}]"#;
        let hits: Vec<NominatimResponse> = serde_json::from_str(raw).unwrap();
        let places: Vec<Place> = hits.into_iter().map(Place::from).collect();

        assert_eq!(places[0].kind, PlaceKind::University);
        assert_eq!(places[0].city.as_deref(), Some("Stanford"));
        assert_eq!(places[1].kind, PlaceKind::Other("peak".to_string()));
        assert_eq!(places[1].country, None);
    }

    #[test]
    fn encodes_the_query() {
        let geocoder = NominatimGeocoder::new(
            "https://nominatim.example.org/",
            "test",
            Duration::from_secs(1),
        );
        assert_eq!(
            geocoder.search_url(" San Francisco "),
            "https://nominatim.example.org/search?q=San%20Francisco&format=jsonv2&addressdetails=1&limit=1&accept-language=en"
        );
    }

    #[tokio::test]
    #[ignore] // Requires network access to nominatim.openstreetmap.org
    async fn geocodes_a_real_state() {
        let geocoder = NominatimGeocoder::new(
            crate::config::DEFAULT_NOMINATIM_URL,
            crate::config::DEFAULT_GEOCODER_USER_AGENT,
            Duration::from_secs(10),
        );
        let place = geocoder.search("California").await.unwrap().unwrap();
        assert_eq!(place.kind, PlaceKind::Administrative);
        assert_eq!(place.state.as_deref(), Some("California"));
    }
}
