//! Bulk mode: find businesses of one genre near a postal code and profile
//! each of them in turn.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, instrument, warn};

use contentprofiler_clients::{NearbySearch, PlaceSummary};
use contentprofiler_shared::{ContentProfilerError, Result};

use crate::pipeline::{ProfilerContext, ProgressReporter, run_pipeline, write_ideas_and_pitches};

/// A parsed `"<zip>|<genre>"` query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkQuery {
    pub zip: String,
    pub genre: String,
}

/// Result row for one profiled business.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkEntry {
    pub query: String,
    pub out_dir: PathBuf,
    pub name: String,
    pub phone: String,
    pub website: String,
}

/// Split `"<zip>|<genre>"` on the first `|`. Both parts are trimmed and must
/// be non-empty.
pub fn parse_bulk_query(raw: &str) -> Result<BulkQuery> {
    let usage = || {
        ContentProfilerError::validation(format!(
            "bulk query must be \"<zip>|<genre>\" (e.g. \"78701|dentist\"), got {raw:?}"
        ))
    };

    let (zip, genre) = raw.split_once('|').ok_or_else(usage)?;
    let (zip, genre) = (zip.trim(), genre.trim());
    if zip.is_empty() || genre.is_empty() {
        return Err(usage());
    }

    Ok(BulkQuery {
        zip: zip.to_string(),
        genre: genre.to_string(),
    })
}

/// Nearby businesses matching `genre` around `zip`.
///
/// The radius starts at the configured initial radius and doubles each round
/// while fewer than `target` results have been collected. Results are
/// counted as they arrive, so a repeated place still counts toward the
/// target; duplicates are dropped by place id at the end.
#[instrument(skip(ctx))]
pub async fn find_businesses(
    ctx: &ProfilerContext,
    zip: &str,
    genre: &str,
    target: usize,
) -> Result<Vec<PlaceSummary>> {
    let settings = &ctx.bulk;
    let location = ctx
        .google
        .geocode(zip)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ContentProfilerError::validation(format!("could not geocode {zip}")))?;

    let mut found: Vec<PlaceSummary> = Vec::new();
    let mut radius = settings.initial_radius_m;
    let mut rounds = 0;

    while found.len() < target && radius <= settings.max_radius_m && rounds < settings.max_radius_rounds
    {
        let mut search = NearbySearch {
            lat: location.lat,
            lng: location.lng,
            radius_m: radius,
            keyword: Some(genre.to_string()),
            ..Default::default()
        };

        loop {
            let page = ctx.google.places_nearby(&search).await?;
            collect_places(&mut found, page.results, target);

            match page.next_page_token {
                Some(token) if found.len() < target => {
                    tokio::time::sleep(settings.page_delay()).await;
                    search.page_token = Some(token);
                }
                _ => break,
            }
        }

        info!(radius_m = radius, collected = found.len(), "nearby search round complete");
        radius = radius.saturating_mul(2);
        rounds += 1;
    }

    let mut seen = HashSet::new();
    let mut unique: Vec<PlaceSummary> = found
        .into_iter()
        .filter(|place| place.place_id.as_ref().is_some_and(|id| seen.insert(id.clone())))
        .collect();
    unique.truncate(target);
    Ok(unique)
}

fn collect_places(found: &mut Vec<PlaceSummary>, results: Vec<PlaceSummary>, target: usize) {
    for place in results {
        if place.place_id.as_deref().is_some_and(|id| !id.is_empty()) {
            found.push(place);
            if found.len() >= target {
                break;
            }
        }
    }
}

/// Search query used to profile a nearby-search result.
fn business_query(place: &PlaceSummary, genre: &str) -> String {
    let name = place.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(genre);
    let vicinity = place
        .vicinity
        .as_deref()
        .filter(|v| !v.is_empty())
        .or(place.formatted_address.as_deref())
        .unwrap_or_default();
    format!("{name} {vicinity}").trim().to_string()
}

/// Profile up to `target_count` businesses, then write ideas and pitches for
/// each. A business that fails is logged and skipped.
#[instrument(skip(ctx, out_base, progress))]
pub async fn run_bulk(
    ctx: &ProfilerContext,
    zip: &str,
    genre: &str,
    out_base: &Path,
    progress: &dyn ProgressReporter,
) -> Result<Vec<BulkEntry>> {
    let found = find_businesses(ctx, zip, genre, ctx.bulk.target_count).await?;
    info!(candidates = found.len(), "running bulk profiling");

    let mut entries = Vec::with_capacity(found.len());
    for (index, place) in found.iter().enumerate() {
        let query = business_query(place, genre);
        progress.business_started(&query, index + 1, found.len());

        match run_pipeline(ctx, &query, out_base, progress).await {
            Ok(run) => {
                let out_dir = run.summary.out_dir;
                if let Err(e) = write_ideas_and_pitches(ctx, &run.sources, &out_dir, progress).await
                {
                    warn!(%query, error = %e, "ideas/pitches generation failed");
                }

                let org = run.profile.organization.unwrap_or_default();
                entries.push(BulkEntry {
                    query,
                    out_dir,
                    name: org.name.unwrap_or_default(),
                    phone: org.phone.unwrap_or_default(),
                    website: org.url.unwrap_or_default(),
                });
            }
            Err(e) => warn!(%query, error = %e, "profiling failed, skipping business"),
        }

        tokio::time::sleep(ctx.bulk.business_delay()).await;
    }

    info!(profiled = entries.len(), "bulk run complete");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SilentProgress;
    use crate::test_support::{mount_chat_reply, temp_dir, test_context};
    use serde_json::{Value, json};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn place(id: Option<&str>, name: &str) -> Value {
        match id {
            Some(id) => json!({"place_id": id, "name": name, "vicinity": "Congress Ave"}),
            None => json!({"name": name}),
        }
    }

    async fn mount_geocode(server: &MockServer, results: Value) {
        Mock::given(method("GET"))
            .and(path("/maps/api/geocode/json"))
            .and(query_param("address", "78701"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": results})))
            .mount(server)
            .await;
    }

    async fn mount_austin(server: &MockServer) {
        mount_geocode(
            server,
            json!([{"geometry": {"location": {"lat": 30.27, "lng": -97.74}}}]),
        )
        .await;
    }

    fn ids(places: &[PlaceSummary]) -> Vec<&str> {
        places.iter().filter_map(|p| p.place_id.as_deref()).collect()
    }

    #[test]
    fn parses_bulk_queries() {
        assert_eq!(
            parse_bulk_query(" 78701 | dentist ").unwrap(),
            BulkQuery {
                zip: "78701".into(),
                genre: "dentist".into(),
            }
        );
        assert_eq!(
            parse_bulk_query("78701|coffee|tea").unwrap().genre,
            "coffee|tea"
        );
        assert!(parse_bulk_query("78701 dentist").is_err());
        assert!(parse_bulk_query("|dentist").is_err());
        assert!(parse_bulk_query("78701|  ").is_err());
    }

    #[test]
    fn business_query_falls_back() {
        let named = PlaceSummary {
            name: Some("Example Dentist".into()),
            vicinity: Some("100 Congress Ave".into()),
            ..Default::default()
        };
        assert_eq!(business_query(&named, "dentist"), "Example Dentist 100 Congress Ave");

        let unnamed = PlaceSummary {
            formatted_address: Some("2 Oak Ave, Austin".into()),
            ..Default::default()
        };
        assert_eq!(business_query(&unnamed, "dentist"), "dentist 2 Oak Ave, Austin");
        assert_eq!(business_query(&PlaceSummary::default(), "dentist"), "dentist");
    }

    #[tokio::test]
    async fn follows_page_tokens_and_dedupes() {
        let server = MockServer::start().await;
        mount_austin(&server).await;

        // Token page first so it wins over the catch-all first page.
        Mock::given(method("GET"))
            .and(path("/maps/api/place/nearbysearch/json"))
            .and(query_param("pagetoken", "t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [place(Some("p2"), "Two"), place(Some("p3"), "Three")]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/maps/api/place/nearbysearch/json"))
            .and(query_param("keyword", "dentist"))
            .and(query_param("radius", "5000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [place(Some("p1"), "One"), place(Some("p2"), "Two"), place(None, "No id")],
                "next_page_token": "t1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let found = find_businesses(&test_context(&server), "78701", "dentist", 4)
            .await
            .unwrap();
        assert_eq!(ids(&found), vec!["p1", "p2", "p3"]);
    }

    #[tokio::test]
    async fn stops_at_target() {
        let server = MockServer::start().await;
        mount_austin(&server).await;
        Mock::given(method("GET"))
            .and(path("/maps/api/place/nearbysearch/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [place(Some("p1"), "One"), place(Some("p2"), "Two"), place(Some("p3"), "Three")],
                "next_page_token": "more"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let found = find_businesses(&test_context(&server), "78701", "dentist", 2)
            .await
            .unwrap();
        assert_eq!(ids(&found), vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn repeated_places_count_toward_target() {
        let server = MockServer::start().await;
        mount_austin(&server).await;
        Mock::given(method("GET"))
            .and(path("/maps/api/place/nearbysearch/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"results": [place(Some("p1"), "One")]})),
            )
            .expect(3)
            .mount(&server)
            .await;

        let found = find_businesses(&test_context(&server), "78701", "dentist", 3)
            .await
            .unwrap();
        assert_eq!(ids(&found), vec!["p1"]);
    }

    #[tokio::test]
    async fn radius_expansion_is_capped() {
        let server = MockServer::start().await;
        mount_austin(&server).await;
        Mock::given(method("GET"))
            .and(path("/maps/api/place/nearbysearch/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            // 5, 10, 20, 40 and 80 km; 160 km is past the limit
            .expect(5)
            .mount(&server)
            .await;

        let found = find_businesses(&test_context(&server), "78701", "dentist", 20)
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn geocode_without_results_is_fatal() {
        let server = MockServer::start().await;
        mount_geocode(&server, json!([])).await;
        Mock::given(method("GET"))
            .and(path("/maps/api/place/nearbysearch/json"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = find_businesses(&test_context(&server), "78701", "dentist", 20)
            .await
            .unwrap_err();
        assert!(matches!(err, ContentProfilerError::Validation { .. }));
        assert!(err.to_string().contains("78701"));
    }

    #[tokio::test]
    async fn run_bulk_skips_failed_businesses() {
        let server = MockServer::start().await;
        mount_austin(&server).await;
        Mock::given(method("GET"))
            .and(path("/maps/api/place/nearbysearch/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"place_id": "a", "name": "Alpha Dental", "vicinity": "1 Main St"},
                    {"place_id": "b", "formatted_address": "2 Oak Ave"}
                ]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/customsearch/v1"))
            .and(query_param("q", "Alpha Dental 1 Main St"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/customsearch/v1"))
            .and(query_param("q", "dentist 2 Oak Ave"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/maps/api/place/textsearch/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .mount(&server)
            .await;
        mount_chat_reply(&server, r#"{"organization": {"name": "Alpha Dental", "phone": "555-0101"}}"#)
            .await;

        let out_base = temp_dir("bulk");
        let entries = run_bulk(
            &test_context(&server),
            "78701",
            "dentist",
            &out_base,
            &SilentProgress,
        )
        .await
        .unwrap();

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.query, "Alpha Dental 1 Main St");
        assert_eq!(entry.out_dir, out_base.join("alpha-dental"));
        assert_eq!(entry.name, "Alpha Dental");
        assert_eq!(entry.phone, "555-0101");
        assert_eq!(entry.website, "");
        assert!(entry.out_dir.join("ideas.md").is_file());
        assert!(entry.out_dir.join("pitches.md").is_file());

        let row = serde_json::to_value(entry).unwrap();
        assert!(row["outDir"].is_string());

        let _ = std::fs::remove_dir_all(&out_base);
    }
}
