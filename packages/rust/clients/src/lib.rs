//! HTTP clients for the external services Content Profiler talks to.
//!
//! - [`HttpClient`]: reqwest wrapper with the shared retry policy
//! - [`GoogleClient`]: search, PageSpeed, Places and Geocoding
//! - [`OpenAiClient`]: chat completions

pub mod google;
pub mod http;
pub mod openai;

pub use google::{
    DEFAULT_PLACE_FIELDS, DEFAULT_SEARCH_COUNT, GeocodeResult, GoogleClient, NearbyPage,
    NearbySearch, PlaceSummary, Strategy, first_place_id,
};
pub use http::{HttpClient, RetryPolicy};
pub use openai::{ChatMessage, ChatRequest, OpenAiClient, Role};
