//! Google web APIs: Custom Search, PageSpeed Insights, Places and Geocoding.

use contentprofiler_shared::{
    ContentProfilerError, Credentials, GoogleSettings, Result, SearchItem,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::http::HttpClient;

/// Fields requested from Place Details unless the caller asks otherwise.
pub const DEFAULT_PLACE_FIELDS: &str = "name,formatted_address,geometry,opening_hours,website,formatted_phone_number,types,rating,user_ratings_total";

/// Number of search results requested by the pipeline.
pub const DEFAULT_SEARCH_COUNT: u32 = 8;

/// PageSpeed analysis strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    #[default]
    Desktop,
    Mobile,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Desktop => "DESKTOP",
            Self::Mobile => "MOBILE",
        }
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A geocoded coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeocodeResult {
    pub lat: f64,
    pub lng: f64,
}

/// One entry from a nearby search. Unmodelled fields are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceSummary {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of nearby-search results.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NearbyPage {
    #[serde(default)]
    pub results: Vec<PlaceSummary>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Parameters for a nearby search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NearbySearch {
    pub lat: f64,
    pub lng: f64,
    pub radius_m: u32,
    pub keyword: Option<String>,
    pub place_type: Option<String>,
    pub page_token: Option<String>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeEntry>,
}

#[derive(Deserialize)]
struct GeocodeEntry {
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

// ---------------------------------------------------------------------------
// GoogleClient
// ---------------------------------------------------------------------------

/// Client for every Google endpoint the profiler uses.
///
/// Search uses the primary API key, PageSpeed its own key and the Maps
/// endpoints the places key; the override keys have already fallen back to
/// the primary key in [`Credentials`].
#[derive(Debug, Clone)]
pub struct GoogleClient {
    http: HttpClient,
    api_key: String,
    cse_id: String,
    pagespeed_key: String,
    places_key: String,
    search_base: String,
    maps_base: String,
}

impl GoogleClient {
    pub fn new(http: HttpClient, credentials: &Credentials, settings: &GoogleSettings) -> Self {
        Self {
            http,
            api_key: credentials.google_api_key.clone(),
            cse_id: credentials.google_cse_id.clone(),
            pagespeed_key: credentials.pagespeed_api_key.clone(),
            places_key: credentials.places_api_key.clone(),
            search_base: settings.search_base_url.trim_end_matches('/').to_string(),
            maps_base: settings.maps_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Custom Search. A response without `items` yields an empty list.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, count: u32) -> Result<Vec<SearchItem>> {
        let url = format!("{}/customsearch/v1", self.search_base);
        let params = [
            ("key", self.api_key.clone()),
            ("cx", self.cse_id.clone()),
            ("q", query.to_string()),
            ("num", count.to_string()),
        ];
        let value = self.http.get_json(&url, &params, &[]).await?;
        let response: SearchResponse = serde_json::from_value(value)
            .map_err(|e| ContentProfilerError::parse(format!("search response: {e}")))?;
        debug!(results = response.items.len(), "search complete");
        Ok(response.items)
    }

    /// PageSpeed Insights report for `target`, returned as-is.
    #[instrument(skip(self))]
    pub async fn page_speed(&self, target: &str, strategy: Strategy) -> Result<Value> {
        let url = format!("{}/pagespeedonline/v5/runPagespeed", self.search_base);
        let params = [
            ("url", target.to_string()),
            ("key", self.pagespeed_key.clone()),
            ("strategy", strategy.as_str().to_string()),
        ];
        self.http.get_json(&url, &params, &[]).await
    }

    #[instrument(skip(self))]
    pub async fn places_text_search(&self, query: &str) -> Result<Value> {
        let url = format!("{}/maps/api/place/textsearch/json", self.maps_base);
        let params = [("key", self.places_key.clone()), ("query", query.to_string())];
        self.http.get_json(&url, &params, &[]).await
    }

    #[instrument(skip(self))]
    pub async fn place_details(&self, place_id: &str, fields: &str) -> Result<Value> {
        let url = format!("{}/maps/api/place/details/json", self.maps_base);
        let params = [
            ("key", self.places_key.clone()),
            ("place_id", place_id.to_string()),
            ("fields", fields.to_string()),
        ];
        self.http.get_json(&url, &params, &[]).await
    }

    /// Geocode a free-form address or postal code. May return no results.
    #[instrument(skip(self))]
    pub async fn geocode(&self, address: &str) -> Result<Vec<GeocodeResult>> {
        let url = format!("{}/maps/api/geocode/json", self.maps_base);
        let params = [("key", self.places_key.clone()), ("address", address.to_string())];
        let value = self.http.get_json(&url, &params, &[]).await?;
        let response: GeocodeResponse = serde_json::from_value(value)
            .map_err(|e| ContentProfilerError::parse(format!("geocode response: {e}")))?;

        Ok(response
            .results
            .into_iter()
            .map(|entry| GeocodeResult {
                lat: entry.geometry.location.lat,
                lng: entry.geometry.location.lng,
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn places_nearby(&self, search: &NearbySearch) -> Result<NearbyPage> {
        let url = format!("{}/maps/api/place/nearbysearch/json", self.maps_base);
        let mut params = vec![
            ("key", self.places_key.clone()),
            ("location", format!("{},{}", search.lat, search.lng)),
            ("radius", search.radius_m.to_string()),
        ];
        if let Some(keyword) = &search.keyword {
            params.push(("keyword", keyword.clone()));
        }
        if let Some(place_type) = &search.place_type {
            params.push(("type", place_type.clone()));
        }
        if let Some(token) = &search.page_token {
            params.push(("pagetoken", token.clone()));
        }

        let value = self.http.get_json(&url, &params, &[]).await?;
        serde_json::from_value(value)
            .map_err(|e| ContentProfilerError::parse(format!("nearby search response: {e}")))
    }
}

/// Place id of the first text-search result, if any.
pub fn first_place_id(text_search: &Value) -> Option<&str> {
    text_search
        .get("results")?
        .as_array()?
        .first()?
        .get("place_id")?
        .as_str()
}
