//! The synthesized business profile.
//!
//! Profiles come back from a language model, so every field is optional and
//! deserialization is forgiving: a value of the wrong JSON type is dropped
//! instead of failing the whole document, scalars are accepted where text is
//! expected, and unknown top-level keys survive a round trip through
//! [`Profile::extra`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default, deserialize_with = "lenient::opt")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<Organization>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub services: Vec<Service>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub faqs: Vec<Faq>,
    #[serde(default, deserialize_with = "lenient::opt")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<Voice>,
    #[serde(default, deserialize_with = "lenient::opt")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub products: Vec<Product>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub team: Vec<TeamMember>,
    #[serde(default, deserialize_with = "lenient::opt")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policies: Option<Policies>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub locations: Vec<Location>,
    /// Top-level keys the model returned that are not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    /// Parse a model response. Fails only when the text is not a JSON object.
    pub fn from_json_str(raw: &str) -> crate::Result<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| crate::ContentProfilerError::parse(format!("profile JSON: {e}")))?;
        if !value.is_object() {
            return Err(crate::ContentProfilerError::parse(
                "profile JSON is not an object",
            ));
        }
        serde_json::from_value(value)
            .map_err(|e| crate::ContentProfilerError::parse(format!("profile JSON: {e}")))
    }

    /// Organization name when present and non-blank.
    pub fn organization_name(&self) -> Option<&str> {
        self.organization
            .as_ref()
            .and_then(|org| org.name.as_deref())
            .filter(|name| !name.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Free-form: a single line or a structured postal address.
    #[serde(default, deserialize_with = "lenient::opt_value")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,
    /// Free-form: text, a list of lines or a day-keyed object.
    #[serde(default, deserialize_with = "lenient::opt_value")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<Value>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub social: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_established: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub bullets: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub benefits: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_service_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub features: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub specialties: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Faq {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub a: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Policies {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_value")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_value")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<Value>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub services: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voice {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub brand_traits: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_level: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication_style: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage_description: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub primary_keywords: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub secondary_keywords: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub target_audience: Vec<String>,
}

// ---------------------------------------------------------------------------
// Free-form value rendering
// ---------------------------------------------------------------------------

/// Render a free-form JSON value (address, hours) as a single line of text.
///
/// Strings are used as-is, objects and arrays are flattened to their values
/// joined with `", "`, and null renders as the empty string.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Object(map) => join_values(map.values()),
        Value::Array(items) => join_values(items.iter()),
        other => other.to_string(),
    }
}

fn join_values<'a>(values: impl Iterator<Item = &'a Value>) -> String {
    values
        .map(value_text)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Lenient deserializers
// ---------------------------------------------------------------------------

mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn scalar_text(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(scalar_text(Value::deserialize(d)?))
    }

    pub fn string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
            _ => Vec::new(),
        })
    }

    pub fn opt_value<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Null => None,
            other => Some(other),
        })
    }

    pub fn opt<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(d)? {
            value @ Value::Object(_) => serde_json::from_value(value).ok(),
            _ => None,
        })
    }

    pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items
                .into_iter()
                .filter(Value::is_object)
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_a_well_formed_profile() {
        let raw = json!({
            "organization": {
                "name": "Example Dentist",
                "url": "https://exampledentist.com/",
                "phone": "+1 512 555 0100",
                "social": ["https://facebook.com/exampledentist"]
            },
            "services": [{"name": "Cleaning", "summary": "Routine cleaning", "benefits": ["Fresh", "Healthy"]}],
            "faqs": [{"q": "Do you take insurance?", "a": "Yes."}],
            "voice": {"tone": "friendly", "brandTraits": ["warm"]}
        })
        .to_string();

        let profile = Profile::from_json_str(&raw).unwrap();
        assert_eq!(profile.organization_name(), Some("Example Dentist"));
        assert_eq!(profile.services[0].benefits, vec!["Fresh", "Healthy"]);
        assert_eq!(profile.faqs[0].a.as_deref(), Some("Yes."));
        assert_eq!(
            profile.voice.as_ref().unwrap().brand_traits,
            vec!["warm".to_string()]
        );
        assert!(profile.team.is_empty());
    }

    #[test]
    fn wrong_types_are_dropped_not_fatal() {
        let raw = json!({
            "organization": "Example Dentist",
            "services": {"name": "not a list"},
            "faqs": [{"q": "Open late?", "a": true}, "stray string", {"q": 42}],
            "team": [{"name": "Dr. Lee", "specialties": ["implants", 3, null]}],
            "meta": {"homepageTitle": ["not", "text"]}
        })
        .to_string();

        let profile = Profile::from_json_str(&raw).unwrap();
        assert!(profile.organization.is_none());
        assert!(profile.services.is_empty());
        assert_eq!(profile.faqs.len(), 2);
        assert_eq!(profile.faqs[0].a.as_deref(), Some("true"));
        assert_eq!(profile.faqs[1].q.as_deref(), Some("42"));
        assert_eq!(profile.team[0].specialties, vec!["implants", "3"]);
        assert!(profile.meta.unwrap().homepage_title.is_none());
    }

    #[test]
    fn unknown_top_level_keys_are_preserved() {
        let raw = r#"{"organization": {"name": "Acme"}, "reviews": [{"stars": 5}]}"#;
        let profile = Profile::from_json_str(raw).unwrap();
        assert_eq!(profile.extra["reviews"], json!([{"stars": 5}]));

        let written = serde_json::to_value(&profile).unwrap();
        assert_eq!(written["reviews"], json!([{"stars": 5}]));
        assert_eq!(written["organization"]["name"], "Acme");
    }

    #[test]
    fn non_object_payload_is_an_error() {
        assert!(Profile::from_json_str("[1, 2]").is_err());
        assert!(Profile::from_json_str("not json").is_err());
    }

    #[test]
    fn blank_organization_name_counts_as_missing() {
        let profile = Profile::from_json_str(r#"{"organization": {"name": "  "}}"#).unwrap();
        assert_eq!(profile.organization_name(), None);
    }

    #[test]
    fn value_text_rendering() {
        assert_eq!(value_text(&json!("100 Congress Ave")), "100 Congress Ave");
        assert_eq!(
            value_text(&json!({"street": "100 Congress Ave", "city": "Austin", "zip": 78701})),
            "100 Congress Ave, Austin, 78701"
        );
        assert_eq!(value_text(&json!(["Mon 9-5", "Tue 9-5"])), "Mon 9-5, Tue 9-5");
        assert_eq!(value_text(&Value::Null), "");
    }
}
