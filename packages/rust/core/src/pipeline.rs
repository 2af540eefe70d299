//! End-to-end profiling pipeline:
//! search → places → scrape → page speed → synthesize → write outputs.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{info, instrument, warn};

use contentprofiler_clients::{
    DEFAULT_PLACE_FIELDS, DEFAULT_SEARCH_COUNT, GoogleClient, HttpClient, OpenAiClient, Strategy,
    first_place_id,
};
use contentprofiler_crawler::{Scraper, SiteScrape, domain_of, is_directory_domain, is_social_domain};
use contentprofiler_shared::{
    AppConfig, BulkSettings, Profile, Result, ScrapingStats, SearchItem, SourceBundle, StepOutcome,
};
use contentprofiler_synth::{
    build_organization_jsonld, build_training_data, generate_ideas_markdown,
    generate_pitches_markdown, render_markdown, synthesize_profile,
};

use crate::assembler::{self, IDEAS_FILE, PITCHES_FILE, ProfileOutputs};
use crate::slug::slugify;

/// Clients and settings shared by every run in a process.
#[derive(Debug, Clone)]
pub struct ProfilerContext {
    pub google: GoogleClient,
    pub scraper: Scraper,
    pub llm: OpenAiClient,
    pub bulk: BulkSettings,
}

impl ProfilerContext {
    /// Build all clients from one immutable configuration.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let settings = &config.settings;
        let http = HttpClient::new(&settings.http)?;

        Ok(Self {
            google: GoogleClient::new(http.clone(), &config.credentials, &settings.google),
            scraper: Scraper::new(http.clone(), &settings.scrape),
            llm: OpenAiClient::new(http, &config.credentials, &settings.openai),
            bulk: settings.bulk.clone(),
        })
    }
}

/// What a run reports back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSummary {
    pub out_dir: PathBuf,
    pub primary_url: Option<String>,
    pub pages_scraped: usize,
    pub social_profiles_found: usize,
    #[serde(rename = "trainingQAPairs")]
    pub training_qa_pairs: usize,
    pub content_files: usize,
}

/// A finished run: the summary plus the in-memory bundle and profile, so
/// follow-up steps do not have to re-read them from disk.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub summary: PipelineSummary,
    pub sources: SourceBundle,
    pub profile: Profile,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each page is scraped.
    fn page_scraped(&self, url: &str, current: usize, max: usize);
    /// Called when the pipeline completes.
    fn done(&self, summary: &PipelineSummary);
    /// Called before each business in a bulk run (1-based `index`).
    fn business_started(&self, query: &str, index: usize, total: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn page_scraped(&self, _url: &str, _current: usize, _max: usize) {}
    fn done(&self, _summary: &PipelineSummary) {}
    fn business_started(&self, _query: &str, _index: usize, _total: usize) {}
}

/// First search hit that is the business's own site: not a social platform
/// or listing directory. Falls back to the first hit.
pub fn select_primary_url(items: &[SearchItem]) -> Option<String> {
    items
        .iter()
        .find(|item| {
            domain_of(&item.link)
                .is_some_and(|d| !d.is_empty() && !is_social_domain(&d) && !is_directory_domain(&d))
        })
        .or_else(|| items.first())
        .map(|item| item.link.clone())
        .filter(|link| !link.is_empty())
}

/// Run the full profiling pipeline for `query` and write the outputs
/// under `<out_base>/<slug>/`.
///
/// Search, the primary page scrape and synthesis transport failures abort
/// the run; places, page speed and secondary page failures are recorded
/// and skipped.
#[instrument(skip_all, fields(query = %query))]
pub async fn run_pipeline(
    ctx: &ProfilerContext,
    query: &str,
    out_base: &Path,
    progress: &dyn ProgressReporter,
) -> Result<PipelineRun> {
    let start = Instant::now();
    info!("starting profile pipeline");

    // --- Phase 1: Search ---
    progress.phase("Searching the web");
    let cse = ctx.google.search(query, DEFAULT_SEARCH_COUNT).await?;
    let primary_url = select_primary_url(&cse);
    info!(results = cse.len(), primary_url = ?primary_url, "search complete");

    // --- Phase 2: Places ---
    progress.phase("Looking up places");
    let (places, place_details) = lookup_places(&ctx.google, query).await;

    // --- Phase 3: Scrape ---
    let site = match &primary_url {
        Some(url) => {
            progress.phase("Scraping primary site");
            let max_pages = ctx.scraper.max_pages();
            let mut scraped = 0;
            ctx.scraper
                .scrape_site(url, |page| {
                    scraped += 1;
                    progress.page_scraped(&page.url, scraped, max_pages);
                })
                .await?
        }
        None => {
            warn!("no primary URL found, skipping scrape");
            SiteScrape::default()
        }
    };

    // --- Phase 4: Page speed ---
    let pagespeed = match &primary_url {
        Some(url) => {
            progress.phase("Running PageSpeed");
            StepOutcome::capture("pagespeed", ctx.google.page_speed(url, Strategy::Desktop).await)
        }
        None => StepOutcome::Skipped,
    };

    // --- Phase 5: Bundle ---
    let sources = SourceBundle {
        query: query.to_string(),
        cse,
        primary_url: primary_url.clone(),
        places,
        place_details,
        pagespeed,
        scraping_stats: ScrapingStats {
            total_pages_scraped: site.pages.len(),
            social_profiles_found: site.social_profiles.len(),
        },
        scraped: site.pages,
        social_profiles: site.social_profiles,
    };

    // --- Phase 6: Synthesize ---
    progress.phase("Synthesizing profile");
    let profile = synthesize_profile(&ctx.llm, &sources).await?;

    // --- Phase 7: Derive ---
    let content = render_markdown(&profile);
    let training = build_training_data(&profile, &sources);
    let jsonld = build_organization_jsonld(&profile, primary_url.as_deref());

    // --- Phase 8: Write ---
    progress.phase("Writing outputs");
    let slug = slugify(profile.organization_name().unwrap_or(query));
    let out_dir = assembler::assemble(
        &out_base.join(slug),
        &ProfileOutputs {
            sources: &sources,
            profile: &profile,
            training: &training,
            content: &content,
            organization_jsonld: &jsonld,
        },
    )?;

    let summary = PipelineSummary {
        out_dir,
        primary_url,
        pages_scraped: sources.scraping_stats.total_pages_scraped,
        social_profiles_found: sources.scraping_stats.social_profiles_found,
        training_qa_pairs: training.qa_pairs.len(),
        content_files: content.len(),
    };

    info!(
        out_dir = %summary.out_dir.display(),
        pages = summary.pages_scraped,
        qa_pairs = summary.training_qa_pairs,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "profile pipeline complete"
    );
    progress.done(&summary);

    Ok(PipelineRun {
        summary,
        sources,
        profile,
    })
}

/// Text search, then details for the first hit. Neither failure is fatal.
async fn lookup_places(
    google: &GoogleClient,
    query: &str,
) -> (StepOutcome<serde_json::Value>, StepOutcome<serde_json::Value>) {
    let places = match google.places_text_search(query).await {
        Ok(places) => places,
        Err(e) => {
            warn!(error = %e, "places text search failed, skipping");
            return (
                StepOutcome::Failed {
                    error: e.to_string(),
                },
                StepOutcome::Skipped,
            );
        }
    };

    let details = match first_place_id(&places) {
        Some(place_id) => StepOutcome::capture(
            "place_details",
            google.place_details(place_id, DEFAULT_PLACE_FIELDS).await,
        ),
        None => StepOutcome::Skipped,
    };

    (StepOutcome::Ok(places), details)
}

/// Generate `ideas.md` and `pitches.md` for a finished run.
#[instrument(skip_all, fields(out_dir = %out_dir.display()))]
pub async fn write_ideas_and_pitches(
    ctx: &ProfilerContext,
    sources: &SourceBundle,
    out_dir: &Path,
    progress: &dyn ProgressReporter,
) -> Result<()> {
    progress.phase("Generating product ideas and audit");
    let ideas = generate_ideas_markdown(&ctx.llm, sources).await?;
    assembler::write_report(out_dir, IDEAS_FILE, &ideas)?;

    progress.phase("Generating sales pitches");
    let pitches = generate_pitches_markdown(&ctx.llm, sources).await?;
    assembler::write_report(out_dir, PITCHES_FILE, &pitches)?;

    info!("ideas and pitches written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{mount_chat_reply, temp_dir, test_context};
    use serde_json::{Value, json};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn html(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .insert_header("content-type", "text/html")
            .set_body_string(format!("<html><body><main>{body}</main></body></html>"))
    }

    fn search_hit(link: &str) -> Value {
        json!({"title": "Example Dentist", "link": link, "snippet": "Family dentistry in Austin"})
    }

    async fn mount_search(server: &MockServer, items: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/customsearch/v1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": items})))
            .expect(1)
            .mount(server)
            .await;
    }

    async fn mount_places(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/maps/api/place/textsearch/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"place_id": "place-1", "name": "Example Dentist"}],
                "status": "OK"
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/maps/api/place/details/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"formatted_phone_number": "(512) 555-0100"}
            })))
            .mount(server)
            .await;
    }

    async fn mount_pagespeed(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/pagespeedonline/v5/runPagespeed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "lighthouseResult": {"categories": {"performance": {"score": 0.91}}}
            })))
            .mount(server)
            .await;
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn primary_url_skips_social_and_directories() {
        let items: Vec<SearchItem> = [
            "https://www.yelp.com/biz/example-dentist",
            "https://www.facebook.com/exampledentist",
            "https://exampledentist.com/",
        ]
        .iter()
        .map(|link| SearchItem {
            link: link.to_string(),
            ..Default::default()
        })
        .collect();
        assert_eq!(
            select_primary_url(&items).as_deref(),
            Some("https://exampledentist.com/")
        );
        assert_eq!(select_primary_url(&items[..2]).as_deref(), Some(items[0].link.as_str()));
        assert_eq!(select_primary_url(&[]), None);
    }

    #[tokio::test]
    async fn example_dentist_end_to_end() {
        let server = MockServer::start().await;
        let site = server.uri();

        mount_search(
            &server,
            vec![
                search_hit("https://www.facebook.com/exampledentist"),
                search_hit(&format!("{site}/")),
            ],
        )
        .await;
        mount_places(&server).await;
        mount_pagespeed(&server).await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html(
                r#"<h1>Example Dentist</h1><p>Gentle care downtown.</p>
                <a href="/services">Services</a>
                <a href="/team">Team</a>
                <a href="/contact">Contact</a>
                <a href="/services#cleaning">Cleaning</a>"#,
            ))
            .expect(1)
            .mount(&server)
            .await;
        for page in ["/services", "/team", "/contact"] {
            Mock::given(method("GET"))
                .and(path(page))
                .respond_with(html(&format!("<p>{page} page</p>")))
                .expect(1)
                .mount(&server)
                .await;
        }

        let profile = json!({
            "organization": {
                "name": "Example Dentist",
                "description": "Family dentistry in downtown Austin.",
                "phone": "(512) 555-0100",
                "url": format!("{site}/"),
                "address": "100 Congress Ave, Austin, TX 78701"
            },
            "services": [{"name": "Cleaning", "summary": "Routine cleaning.", "benefits": ["Healthy gums"]}],
            "faqs": [{"q": "Do you take insurance?", "a": "Most plans."}],
            "voice": {"tone": "friendly"}
        });
        mount_chat_reply(&server, &profile.to_string()).await;

        let out_base = temp_dir("pipeline");
        let run = run_pipeline(
            &test_context(&server),
            "Example Dentist 78701",
            &out_base,
            &SilentProgress,
        )
        .await
        .unwrap();

        let summary = &run.summary;
        assert_eq!(summary.out_dir, out_base.join("example-dentist"));
        assert_eq!(summary.primary_url.as_deref(), Some(format!("{site}/").as_str()));
        assert_eq!(summary.pages_scraped, 4);
        assert_eq!(summary.social_profiles_found, 0);
        assert_eq!(summary.content_files, 4);
        // faq + 2 per service + contact + location
        assert_eq!(summary.training_qa_pairs, 5);

        let mut content: Vec<String> = std::fs::read_dir(summary.out_dir.join("content"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        content.sort();
        assert_eq!(
            content,
            vec!["about.md", "faqs.md", "homepage-hero.md", "services.md"]
        );

        let jsonld = read_json(&summary.out_dir.join("jsonld/organization.jsonld"));
        let id = jsonld["@graph"][0]["@id"].as_str().unwrap();
        assert!(id.ends_with("#organization"));
        assert_eq!(id, format!("{site}#organization"));

        let sources = read_json(&summary.out_dir.join("sources.json"));
        assert_eq!(sources["query"], "Example Dentist 78701");
        assert_eq!(sources["scrapingStats"]["totalPagesScraped"], 4);
        assert_eq!(sources["places"]["results"][0]["place_id"], "place-1");
        assert_eq!(
            sources["placeDetails"]["result"]["formatted_phone_number"],
            "(512) 555-0100"
        );
        assert!(sources["pagespeed"]["lighthouseResult"].is_object());

        let training = read_json(&summary.out_dir.join("training.json"));
        assert_eq!(training["context"]["scraped_pages_count"], 4);

        let _ = std::fs::remove_dir_all(&out_base);
    }

    #[tokio::test]
    async fn places_and_pagespeed_failures_are_recorded() {
        let server = MockServer::start().await;
        let site = server.uri();

        mount_search(&server, vec![search_hit(&site)]).await;
        Mock::given(method("GET"))
            .and(path("/maps/api/place/textsearch/json"))
            .respond_with(ResponseTemplate::new(403).set_body_string("REQUEST_DENIED"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/pagespeedonline/v5/runPagespeed"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html("<p>Welcome</p>"))
            .mount(&server)
            .await;
        mount_chat_reply(&server, "{}").await;

        let out_base = temp_dir("pipeline-failures");
        let run = run_pipeline(&test_context(&server), "Acme Plumbing", &out_base, &SilentProgress)
            .await
            .unwrap();

        assert!(run.sources.places.is_failed());
        assert_eq!(run.sources.place_details, StepOutcome::Skipped);
        assert!(run.sources.pagespeed.is_failed());
        // slug falls back to the query when the profile has no name
        assert_eq!(run.summary.out_dir, out_base.join("acme-plumbing"));

        let sources = read_json(&run.summary.out_dir.join("sources.json"));
        assert!(sources["places"]["error"].as_str().unwrap().contains("403"));
        assert_eq!(sources["placeDetails"], json!({}));
        assert!(sources["pagespeed"]["error"].is_string());

        let _ = std::fs::remove_dir_all(&out_base);
    }

    #[tokio::test]
    async fn no_search_results_skips_scrape_and_pagespeed() {
        let server = MockServer::start().await;
        mount_search(&server, vec![]).await;
        mount_places(&server).await;
        Mock::given(method("GET"))
            .and(path("/pagespeedonline/v5/runPagespeed"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        mount_chat_reply(&server, "").await;

        let out_base = temp_dir("pipeline-empty");
        let run = run_pipeline(&test_context(&server), "Nowhere Co", &out_base, &SilentProgress)
            .await
            .unwrap();

        assert_eq!(run.summary.primary_url, None);
        assert_eq!(run.summary.pages_scraped, 0);
        assert_eq!(run.sources.pagespeed, StepOutcome::Skipped);
        assert_eq!(run.profile, Profile::default());

        let sources = read_json(&run.summary.out_dir.join("sources.json"));
        assert_eq!(sources["primaryUrl"], Value::Null);
        assert_eq!(sources["pagespeed"], json!({}));

        let _ = std::fs::remove_dir_all(&out_base);
    }

    #[tokio::test]
    async fn primary_page_failure_aborts_run() {
        let server = MockServer::start().await;
        let site = server.uri();
        mount_search(&server, vec![search_hit(&format!("{site}/home"))]).await;
        mount_places(&server).await;
        Mock::given(method("GET"))
            .and(path("/home"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let out_base = temp_dir("pipeline-abort");
        let result =
            run_pipeline(&test_context(&server), "Example", &out_base, &SilentProgress).await;
        assert!(result.is_err());
        assert!(!out_base.join("example").exists());

        let _ = std::fs::remove_dir_all(&out_base);
    }

    #[tokio::test]
    async fn writes_ideas_and_pitches() {
        let server = MockServer::start().await;
        mount_chat_reply(&server, "- Launch a booking chatbot").await;

        let out_dir = temp_dir("ideas");
        write_ideas_and_pitches(
            &test_context(&server),
            &SourceBundle::default(),
            &out_dir,
            &SilentProgress,
        )
        .await
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(out_dir.join(IDEAS_FILE)).unwrap(),
            "- Launch a booking chatbot"
        );
        assert!(out_dir.join(PITCHES_FILE).is_file());

        let _ = std::fs::remove_dir_all(&out_dir);
    }
}
