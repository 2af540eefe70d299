//! schema.org Organization markup (`jsonld/organization.jsonld`).

use contentprofiler_shared::Profile;
use serde_json::{Value, json};

/// Single-node `@graph` describing the organization.
///
/// The node `@id` is the organization URL (or `primary_url` when the profile
/// has none) without a trailing slash, suffixed with `#organization`.
pub fn build_organization_jsonld(profile: &Profile, primary_url: Option<&str>) -> Value {
    let org = profile.organization.clone().unwrap_or_default();
    let org_url = org.url.as_deref().filter(|u| !u.is_empty());
    let site = org_url.or(primary_url.filter(|u| !u.is_empty()));

    let id_base = site.map(|u| u.trim_end_matches('/')).unwrap_or_default();

    json!({
        "@context": "https://schema.org",
        "@graph": [{
            "@type": "Organization",
            "@id": format!("{id_base}#organization"),
            "name": org.name,
            "url": site,
            "telephone": org.phone,
            "description": org.description,
            "sameAs": org.social,
            "address": non_empty(org.address),
            "openingHoursSpecification": non_empty(org.hours),
        }]
    })
}

/// Empty strings, arrays and objects count as absent.
fn non_empty(value: Option<Value>) -> Value {
    match value {
        Some(Value::String(s)) if s.is_empty() => Value::Null,
        Some(Value::Array(a)) if a.is_empty() => Value::Null,
        Some(Value::Object(o)) if o.is_empty() => Value::Null,
        Some(v) => v,
        None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentprofiler_shared::Organization;

    fn node(value: &Value) -> &Value {
        &value["@graph"][0]
    }

    #[test]
    fn uses_organization_url_for_id() {
        let profile = Profile {
            organization: Some(Organization {
                name: Some("Example Dentist".into()),
                url: Some("https://exampledentist.com/".into()),
                phone: Some("512-555-0100".into()),
                social: vec!["https://facebook.com/exampledentist".into()],
                hours: Some(json!(["Mo-Fr 08:00-17:00"])),
                ..Default::default()
            }),
            ..Default::default()
        };

        let doc = build_organization_jsonld(&profile, Some("https://other.com"));
        assert_eq!(doc["@context"], "https://schema.org");
        let org = node(&doc);
        assert_eq!(org["@type"], "Organization");
        assert_eq!(org["@id"], "https://exampledentist.com#organization");
        assert_eq!(org["url"], "https://exampledentist.com/");
        assert_eq!(org["telephone"], "512-555-0100");
        assert_eq!(org["sameAs"], json!(["https://facebook.com/exampledentist"]));
        assert_eq!(org["openingHoursSpecification"], json!(["Mo-Fr 08:00-17:00"]));
        assert_eq!(org["address"], Value::Null);
    }

    #[test]
    fn falls_back_to_primary_url() {
        let doc = build_organization_jsonld(&Profile::default(), Some("https://exampledentist.com/"));
        let org = node(&doc);
        assert_eq!(org["@id"], "https://exampledentist.com#organization");
        assert_eq!(org["url"], "https://exampledentist.com/");
        assert_eq!(org["name"], Value::Null);
        assert_eq!(org["sameAs"], json!([]));
    }

    #[test]
    fn no_url_at_all() {
        let doc = build_organization_jsonld(&Profile::default(), None);
        let org = node(&doc);
        assert_eq!(org["@id"], "#organization");
        assert_eq!(org["url"], Value::Null);
        assert_eq!(org["description"], Value::Null);
    }
}
