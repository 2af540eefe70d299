//! Markdown content files rendered from a [`Profile`].

use contentprofiler_shared::{Faq, Product, Profile, Service, TeamMember};

/// One file under `content/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFile {
    pub name: &'static str,
    pub body: String,
}

const DEFAULT_TONE: &str = "Professional";

/// Render the content files for `profile`, in output order.
///
/// `about.md`, `services.md`, `faqs.md` and `homepage-hero.md` are always
/// produced; `team.md` and `products.md` only when there is something to list.
pub fn render_markdown(profile: &Profile) -> Vec<ContentFile> {
    let org = profile.organization.clone().unwrap_or_default();
    let name = org.name.as_deref().unwrap_or_default();
    let description = org.description.as_deref().unwrap_or_default();

    let mut files = vec![
        ContentFile {
            name: "about.md",
            body: format!("# About {name}\n\n{description}\n"),
        },
        ContentFile {
            name: "services.md",
            body: section("# Services", profile.services.iter().map(render_service)),
        },
        ContentFile {
            name: "faqs.md",
            body: section(
                "# Frequently Asked Questions",
                profile.faqs.iter().map(render_faq),
            ),
        },
        ContentFile {
            name: "homepage-hero.md",
            body: format!("# {} {name}\n\n{description}\n", title_case(hero_tone(profile))),
        },
    ];

    if !profile.team.is_empty() {
        files.push(ContentFile {
            name: "team.md",
            body: section("# Our Team", profile.team.iter().map(render_member)),
        });
    }
    if !profile.products.is_empty() {
        files.push(ContentFile {
            name: "products.md",
            body: section("# Products", profile.products.iter().map(render_product)),
        });
    }

    files
}

/// Capitalize the first letter of every word and lower-case the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

fn hero_tone(profile: &Profile) -> &str {
    profile
        .voice
        .as_ref()
        .and_then(|voice| present(&voice.tone))
        .unwrap_or(DEFAULT_TONE)
}

fn section(heading: &str, entries: impl Iterator<Item = String>) -> String {
    format!("{heading}\n\n{}", entries.collect::<Vec<_>>().join("\n\n"))
}

/// The field's text when it is set and non-empty.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

fn bullet_list(items: &[String]) -> String {
    format!("- {}", items.join("\n- "))
}

fn render_service(service: &Service) -> String {
    let mut md = format!(
        "## {}\n\n{}\n\n",
        service.name.as_deref().unwrap_or_default(),
        service.summary.as_deref().unwrap_or_default()
    );
    if let Some(details) = present(&service.details) {
        md.push_str(&format!("### Details\n{details}\n\n"));
    }
    if !service.bullets.is_empty() {
        md.push_str(&format!("### Key Features:\n{}\n\n", bullet_list(&service.bullets)));
    }
    if !service.benefits.is_empty() {
        md.push_str(&format!("### Benefits:\n{}\n\n", bullet_list(&service.benefits)));
    }
    if let Some(duration) = present(&service.duration) {
        md.push_str(&format!("**Duration:** {duration}\n\n"));
    }
    if let Some(pricing) = present(&service.pricing) {
        md.push_str(&format!("**Pricing:** {pricing}\n\n"));
    }
    md
}

fn render_faq(faq: &Faq) -> String {
    format!(
        "### {}\n\n{}",
        faq.q.as_deref().unwrap_or_default(),
        faq.a.as_deref().unwrap_or_default()
    )
}

fn render_member(member: &TeamMember) -> String {
    let mut md = format!(
        "## {}\n**{}**\n\n{}\n\n",
        member.name.as_deref().unwrap_or_default(),
        member.role.as_deref().unwrap_or_default(),
        member.bio.as_deref().unwrap_or_default()
    );
    if !member.specialties.is_empty() {
        md.push_str(&format!(
            "**Specialties:** {}\n\n",
            member.specialties.join(", ")
        ));
    }
    md
}

fn render_product(product: &Product) -> String {
    let mut md = format!(
        "## {}\n\n{}\n\n",
        product.name.as_deref().unwrap_or_default(),
        product.description.as_deref().unwrap_or_default()
    );
    if let Some(category) = present(&product.category) {
        md.push_str(&format!("**Category:** {category}\n\n"));
    }
    if !product.features.is_empty() {
        md.push_str(&format!("**Features:**\n{}\n\n", bullet_list(&product.features)));
    }
    if let Some(pricing) = present(&product.pricing) {
        md.push_str(&format!("**Pricing:** {pricing}\n\n"));
    }
    md
}
