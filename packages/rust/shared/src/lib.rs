//! Shared types, error model, and configuration for Content Profiler.
//!
//! This crate is the foundation depended on by all other Content Profiler crates.
//! It provides:
//! - [`ContentProfilerError`]: the unified error type
//! - Source types ([`SourceBundle`], [`ScrapedPage`], [`StepOutcome`])
//! - The synthesized [`Profile`] and its sections
//! - Configuration ([`AppConfig`], [`Credentials`], [`Settings`])

pub mod config;
pub mod error;
pub mod profile;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BulkSettings, Credentials, GoogleSettings, HttpSettings, OpenAiSettings,
    ScrapeSettings, Settings, config_dir, config_file_path, load_settings, load_settings_from,
};
pub use error::{ContentProfilerError, Result};
pub use profile::{
    Faq, Location, Meta, Organization, Policies, Product, Profile, Service, TeamMember, Voice,
    value_text,
};
pub use types::{ScrapedPage, ScrapingStats, SearchItem, SocialProfile, SourceBundle, StepOutcome};
