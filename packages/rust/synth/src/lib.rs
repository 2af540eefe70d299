//! Everything derived from the collected sources with or after the language
//! model: the structured profile, markdown content, training data, JSON-LD
//! and the optional ideas/pitches reports.

pub mod ideas;
pub mod jsonld;
pub mod markdown;
pub mod synthesize;
pub mod training;
pub mod truncate;

pub use ideas::{generate_ideas_markdown, generate_pitches_markdown};
pub use jsonld::build_organization_jsonld;
pub use markdown::{ContentFile, render_markdown, title_case};
pub use synthesize::synthesize_profile;
pub use training::{TrainingDataset, build_training_data};
pub use truncate::{TruncationLimits, truncate_for_model};
