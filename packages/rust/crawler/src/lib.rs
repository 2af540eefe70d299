//! Page scraping for Content Profiler.
//!
//! This crate provides:
//! - [`links`]: URL normalization, registrable domains, link extraction and classification
//! - [`extract`]: readability-style main-text extraction
//! - [`engine`]: the sequential [`Scraper`] for a business's own site

pub mod engine;
pub mod extract;
pub mod links;

pub use engine::{Scraper, SiteScrape};
pub use extract::extract_main_text;
pub use links::{
    ClassifiedLinks, DIRECTORY_DOMAINS, SOCIAL_DOMAINS, classify_links, domain_of, extract_links,
    is_directory_domain, is_social_domain, normalize_url,
};
