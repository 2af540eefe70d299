//! URL normalization, registrable domains and link classification.

use std::collections::HashSet;

use scraper::{Html, Selector};
use url::{Host, Url};

/// Social platforms whose profile links are collected but never fetched.
pub const SOCIAL_DOMAINS: &[&str] = &[
    "facebook.com",
    "instagram.com",
    "linkedin.com",
    "x.com",
    "twitter.com",
    "youtube.com",
    "tiktok.com",
];

/// Listing directories that never count as a business's own site.
pub const DIRECTORY_DOMAINS: &[&str] = &["yelp.com"];

/// Canonical form used for fetching and de-duplication.
///
/// Adds `https://` when the scheme is missing, drops the fragment and query,
/// and strips trailing slashes from the path (the root has no path at all).
/// Ports are kept.
pub fn normalize_url(raw: &str) -> String {
    let raw = raw.trim();
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    match Url::parse(&with_scheme) {
        Ok(url) => {
            let host = url.host_str().unwrap_or_default();
            let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
            let path = url.path().trim_end_matches('/');
            format!("{}://{host}{port}{path}", url.scheme())
        }
        Err(_) => with_scheme
            .split(['#', '?'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string(),
    }
}

/// Registrable domain of `url` (public suffix plus one label).
///
/// IP addresses and hosts with no registrable part (e.g. `localhost`) yield
/// the host itself. `None` when the URL has no host.
pub fn domain_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url)
        .or_else(|_| Url::parse(&format!("https://{url}")))
        .ok()?;

    match parsed.host()? {
        Host::Ipv4(ip) => Some(ip.to_string()),
        Host::Ipv6(ip) => Some(ip.to_string()),
        Host::Domain(host) => {
            let host = host.trim_end_matches('.');
            Some(
                psl::domain_str(host)
                    .map(str::to_string)
                    .unwrap_or_else(|| host.to_string()),
            )
        }
    }
}

pub fn is_social_domain(domain: &str) -> bool {
    SOCIAL_DOMAINS.contains(&domain)
}

pub fn is_directory_domain(domain: &str) -> bool {
    DIRECTORY_DOMAINS.contains(&domain)
}

/// Absolute outbound links of an HTML document, de-duplicated in first-seen order.
///
/// Fragment, `mailto:`, `tel:` and `javascript:` targets are dropped.
/// Root-relative (`/x`) and scheme-relative (`//host/x`) hrefs are resolved
/// against `base_url`; other relative hrefs are ignored.
pub fn extract_links(html: &str, base_url: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let Ok(anchor) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let base = Url::parse(base_url).ok();

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for el in doc.select(&anchor) {
        let Some(href) = el.value().attr("href").map(str::trim) else {
            continue;
        };
        if let Some(link) = resolve_href(href, base.as_ref()) {
            if seen.insert(link.clone()) {
                links.push(link);
            }
        }
    }

    links
}

fn resolve_href(href: &str, base: Option<&Url>) -> Option<String> {
    let lower = href.to_ascii_lowercase();
    if href.is_empty()
        || href.starts_with('#')
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("javascript:")
    {
        return None;
    }

    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Some(href.to_string());
    }

    let base = base?;
    if href.starts_with("//") {
        return Some(format!("{}:{href}", base.scheme()));
    }
    if href.starts_with('/') {
        let host = base.host_str()?;
        let port = base.port().map(|p| format!(":{p}")).unwrap_or_default();
        return Some(format!("{}://{host}{port}{href}", base.scheme()));
    }

    None
}

/// Links split by where they point relative to the primary site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedLinks {
    /// Same registrable domain as the primary site.
    pub internal: Vec<String>,
    /// Links to a known social platform.
    pub social: Vec<String>,
}

/// Split `links` into internal and social links. Everything else is dropped.
pub fn classify_links(links: &[String], primary_domain: &str) -> ClassifiedLinks {
    let mut classified = ClassifiedLinks::default();

    for link in links {
        let Some(domain) = domain_of(link) else {
            continue;
        };
        if is_social_domain(&domain) {
            classified.social.push(link.clone());
        } else if domain == primary_domain {
            classified.internal.push(link.clone());
        }
    }

    classified
}
