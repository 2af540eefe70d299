//! Profile output directory assembler.
//!
//! Writes one run's artifacts under `<out_base>/<slug>/`. Every file is
//! written to a temp file and renamed into place, one file at a time.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, instrument};

use contentprofiler_shared::{ContentProfilerError, Profile, Result, SourceBundle};
use contentprofiler_synth::{ContentFile, TrainingDataset};

pub const SOURCES_FILE: &str = "sources.json";
pub const PROFILE_FILE: &str = "profile.json";
pub const TRAINING_FILE: &str = "training.json";
pub const CONTENT_DIR: &str = "content";
pub const JSONLD_DIR: &str = "jsonld";
pub const ORGANIZATION_JSONLD_FILE: &str = "organization.jsonld";
pub const IDEAS_FILE: &str = "ideas.md";
pub const PITCHES_FILE: &str = "pitches.md";

/// Everything one pipeline run writes.
#[derive(Debug, Clone, Copy)]
pub struct ProfileOutputs<'a> {
    pub sources: &'a SourceBundle,
    pub profile: &'a Profile,
    pub training: &'a TrainingDataset,
    pub content: &'a [ContentFile],
    pub organization_jsonld: &'a Value,
}

/// Write a profile output directory.
///
/// Creates the following layout:
/// ```text
/// <out_dir>/
/// ├── sources.json
/// ├── profile.json
/// ├── training.json
/// ├── content/
/// │   ├── about.md
/// │   └── ...
/// └── jsonld/
///     └── organization.jsonld
/// ```
#[instrument(skip_all, fields(out_dir = %out_dir.display(), content_files = outputs.content.len()))]
pub fn assemble(out_dir: &Path, outputs: &ProfileOutputs<'_>) -> Result<PathBuf> {
    create_dirs(out_dir)?;

    write_json(&out_dir.join(SOURCES_FILE), outputs.sources)?;
    write_json(&out_dir.join(PROFILE_FILE), outputs.profile)?;
    write_json(&out_dir.join(TRAINING_FILE), outputs.training)?;

    let content_dir = out_dir.join(CONTENT_DIR);
    for file in outputs.content {
        write_atomic(&content_dir.join(file.name), file.body.as_bytes())?;
    }

    write_json(
        &out_dir.join(JSONLD_DIR).join(ORGANIZATION_JSONLD_FILE),
        outputs.organization_jsonld,
    )?;

    info!(path = %out_dir.display(), "profile output written");
    Ok(out_dir.to_path_buf())
}

/// Write `ideas.md` or `pitches.md` next to the profile.
pub fn write_report(out_dir: &Path, file_name: &str, markdown: &str) -> Result<()> {
    write_atomic(&out_dir.join(file_name), markdown.as_bytes())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn create_dirs(out_dir: &Path) -> Result<()> {
    for dir in [out_dir.join(CONTENT_DIR), out_dir.join(JSONLD_DIR)] {
        std::fs::create_dir_all(&dir).map_err(|e| ContentProfilerError::io(&dir, e))?;
    }
    debug!(path = %out_dir.display(), "directory structure created");
    Ok(())
}

/// Write a JSON file (pretty-printed).
fn write_json<T: serde::Serialize>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).map_err(|e| {
        ContentProfilerError::validation(format!("JSON serialization failed: {e}"))
    })?;
    write_atomic(path, json.as_bytes())
}

/// Write to a sibling temp file, then rename over the target.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ContentProfilerError::validation(format!("bad output path {path:?}")))?;
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, contents).map_err(|e| ContentProfilerError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| ContentProfilerError::io(path, e))?;

    debug!(path = %path.display(), size = contents.len(), "wrote file");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use contentprofiler_synth::{build_organization_jsonld, build_training_data, render_markdown};

    fn temp_dir() -> PathBuf {
        test_support::temp_dir("assembler")
    }

    fn write_sample(out_dir: &Path) {
        let sources = SourceBundle {
            query: "Example Dentist".into(),
            ..Default::default()
        };
        let profile = Profile::from_json_str(r#"{"organization": {"name": "Example Dentist"}}"#)
            .unwrap();
        let training = build_training_data(&profile, &sources);
        let content = render_markdown(&profile);
        let jsonld = build_organization_jsonld(&profile, None);

        assemble(
            out_dir,
            &ProfileOutputs {
                sources: &sources,
                profile: &profile,
                training: &training,
                content: &content,
                organization_jsonld: &jsonld,
            },
        )
        .unwrap();
    }

    #[test]
    fn assemble_creates_directory_structure() {
        let tmp = temp_dir();
        let out_dir = tmp.join("example-dentist");
        write_sample(&out_dir);

        for file in [SOURCES_FILE, PROFILE_FILE, TRAINING_FILE] {
            assert!(out_dir.join(file).is_file(), "{file} missing");
        }
        assert!(out_dir.join("content/about.md").is_file());
        assert!(out_dir.join("content/homepage-hero.md").is_file());
        assert!(out_dir.join("jsonld/organization.jsonld").is_file());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn assemble_writes_pretty_json_and_no_temp_files() {
        let tmp = temp_dir();
        write_sample(&tmp);

        let profile = std::fs::read_to_string(tmp.join(PROFILE_FILE)).unwrap();
        assert!(profile.contains("\n  \"organization\""));

        let leftovers: Vec<_> = std::fs::read_dir(&tmp)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn assemble_is_idempotent() {
        let tmp = temp_dir();
        write_sample(&tmp);
        write_sample(&tmp);
        assert_eq!(std::fs::read_dir(tmp.join(CONTENT_DIR)).unwrap().count(), 4);
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn write_report_replaces_previous_content() {
        let tmp = temp_dir();
        write_report(&tmp, IDEAS_FILE, "first").unwrap();
        write_report(&tmp, IDEAS_FILE, "second").unwrap();
        assert_eq!(
            std::fs::read_to_string(tmp.join(IDEAS_FILE)).unwrap(),
            "second"
        );
        let _ = std::fs::remove_dir_all(&tmp);
    }
}
