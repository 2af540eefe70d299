//! Core pipeline orchestration for Content Profiler.
//!
//! This crate ties together search, scraping and synthesis into the
//! end-to-end workflows: [`run_pipeline`] for one query and [`run_bulk`]
//! for a batch of nearby businesses.

pub mod assembler;
pub mod bulk;
pub mod pipeline;
pub mod slug;

pub use bulk::{BulkEntry, BulkQuery, find_businesses, parse_bulk_query, run_bulk};
pub use pipeline::{
    PipelineRun, PipelineSummary, ProfilerContext, ProgressReporter, SilentProgress,
    run_pipeline, select_primary_url, write_ideas_and_pitches,
};
pub use slug::slugify;
