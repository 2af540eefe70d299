//! Sequential site scraper: the primary page, then a capped set of its
//! internal links.

use std::collections::HashSet;

use contentprofiler_clients::HttpClient;
use contentprofiler_shared::{Result, ScrapeSettings, ScrapedPage, SocialProfile};
use tracing::{debug, info, instrument, warn};

use crate::extract::extract_main_text;
use crate::links::{classify_links, domain_of, extract_links, normalize_url};

/// Pages and social profile stubs collected from one site.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteScrape {
    /// The primary page first, then internal pages in link order.
    pub pages: Vec<ScrapedPage>,
    pub social_profiles: Vec<SocialProfile>,
}

/// Fetches pages one at a time through the shared [`HttpClient`].
#[derive(Debug, Clone)]
pub struct Scraper {
    http: HttpClient,
    max_pages: usize,
    max_social_profiles: usize,
}

impl Scraper {
    pub fn new(http: HttpClient, settings: &ScrapeSettings) -> Self {
        Self {
            http,
            max_pages: settings.max_pages,
            max_social_profiles: settings.max_social_profiles,
        }
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Fetch one page and reduce it to main text and links.
    #[instrument(skip(self))]
    pub async fn extract_page(&self, url: &str) -> Result<ScrapedPage> {
        let url = normalize_url(url);
        let html = self.http.get_text(&url, &[]).await?;
        let text = extract_main_text(&html);
        let links = extract_links(&html, &url);
        debug!(%url, chars = text.len(), links = links.len(), "page extracted");
        Ok(ScrapedPage { url, text, links })
    }

    /// Scrape `primary_url` and up to `max_pages - 1` of its internal links.
    ///
    /// A failure on the primary page is returned; failures on internal pages
    /// are logged and skipped. Social links are recorded, not fetched.
    /// `on_page` is called after each successfully scraped page.
    #[instrument(skip(self, on_page))]
    pub async fn scrape_site(
        &self,
        primary_url: &str,
        mut on_page: impl FnMut(&ScrapedPage),
    ) -> Result<SiteScrape> {
        let first = self.extract_page(primary_url).await?;
        on_page(&first);

        let primary_domain = domain_of(primary_url).unwrap_or_default();
        let classified = classify_links(&first.links, &primary_domain);
        info!(
            internal = classified.internal.len(),
            social = classified.social.len(),
            "classified primary page links"
        );

        let mut visited: HashSet<String> = HashSet::from([first.url.clone()]);
        let mut pages = vec![first];

        for link in classified.internal.iter().take(self.max_pages) {
            if pages.len() >= self.max_pages {
                break;
            }
            let normalized = normalize_url(link);
            if !visited.insert(normalized.clone()) {
                debug!(url = %normalized, "already scraped, skipping");
                continue;
            }
            match self.extract_page(&normalized).await {
                Ok(page) => {
                    on_page(&page);
                    pages.push(page);
                }
                Err(e) => warn!(url = %normalized, error = %e, "failed to scrape page, skipping"),
            }
        }

        let social_profiles = classified
            .social
            .into_iter()
            .take(self.max_social_profiles)
            .map(|url| {
                let platform = domain_of(&url).unwrap_or_default();
                SocialProfile { url, platform }
            })
            .collect();

        Ok(SiteScrape {
            pages,
            social_profiles,
        })
    }
}
