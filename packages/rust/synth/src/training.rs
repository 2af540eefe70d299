//! Chatbot training dataset derived from a profile (`training.json`).

use contentprofiler_shared::{Profile, SourceBundle, value_text};
use serde::Serialize;
use serde_json::{Value, json};

pub const RESPONSE_GUIDELINES: [&str; 4] = [
    "Always be helpful and professional",
    "Use information only from the provided context",
    "If unsure, direct to contact information",
    "Match the business tone and voice",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingDataset {
    pub context: TrainingContext,
    pub qa_pairs: Vec<QaPair>,
    pub training_instructions: TrainingInstructions,
    pub embeddings_data: Vec<EmbeddingCandidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingContext {
    pub business_name: Option<String>,
    pub business_description: Option<String>,
    pub services: Vec<Option<String>>,
    pub contact_info: ContactInfo,
    pub social_media: Vec<String>,
    pub scraped_pages_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactInfo {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<Value>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
    pub category: String,
    pub context_needed: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingInstructions {
    /// The profile's voice section, or `{}` when there is none.
    pub personality: Value,
    pub response_guidelines: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddingCandidate {
    pub text: String,
    pub metadata: EmbeddingMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddingMetadata {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}

impl QaPair {
    fn new(
        question: String,
        answer: String,
        category: impl Into<String>,
        context_needed: &[&'static str],
    ) -> Self {
        Self {
            question,
            answer,
            category: category.into(),
            context_needed: context_needed.to_vec(),
        }
    }
}

fn text(field: &Option<String>) -> String {
    field.clone().unwrap_or_default()
}

/// Build the training dataset for `profile`.
pub fn build_training_data(profile: &Profile, sources: &SourceBundle) -> TrainingDataset {
    let org = profile.organization.clone().unwrap_or_default();

    let context = TrainingContext {
        business_name: org.name.clone(),
        business_description: org.description.clone(),
        services: profile.services.iter().map(|s| s.name.clone()).collect(),
        contact_info: ContactInfo {
            phone: org.phone.clone(),
            email: org.email.clone(),
            address: org.address.clone(),
            website: org.url.clone(),
        },
        social_media: org.social.clone(),
        scraped_pages_count: sources.scraping_stats.total_pages_scraped,
    };

    let mut qa_pairs = Vec::new();

    for faq in &profile.faqs {
        qa_pairs.push(QaPair::new(
            text(&faq.q),
            text(&faq.a),
            faq.category.clone().unwrap_or_else(|| "general".into()),
            &["business_info"],
        ));
    }

    for service in &profile.services {
        let name = text(&service.name);
        qa_pairs.push(QaPair::new(
            format!("What is {name}?"),
            text(&service.summary),
            "services",
            &["services", "business_info"],
        ));
        qa_pairs.push(QaPair::new(
            format!("What are the benefits of {name}?"),
            service.benefits.join(". "),
            "services",
            &["services"],
        ));
    }

    if let Some(phone) = org.phone.as_deref().filter(|p| !p.is_empty()) {
        qa_pairs.push(QaPair::new(
            "How can I contact you?".into(),
            format!(
                "You can reach us at {phone} or visit our website at {}",
                text(&org.url)
            ),
            "contact",
            &["contact_info"],
        ));
    }

    let address = org.address.as_ref().map(value_text).unwrap_or_default();
    if !address.is_empty() {
        qa_pairs.push(QaPair::new(
            "Where are you located?".into(),
            format!("We're located at {address}"),
            "location",
            &["contact_info"],
        ));
    }

    for member in &profile.team {
        let name = member.name.as_deref().filter(|n| !n.is_empty());
        let bio = member.bio.as_deref().filter(|b| !b.is_empty());
        if let (Some(name), Some(bio)) = (name, bio) {
            qa_pairs.push(QaPair::new(
                format!("Tell me about {name}"),
                bio.to_string(),
                "team",
                &["team_info"],
            ));
        }
    }

    let personality = profile
        .voice
        .as_ref()
        .and_then(|voice| serde_json::to_value(voice).ok())
        .unwrap_or_else(|| json!({}));

    let mut embeddings_data = vec![EmbeddingCandidate {
        text: text(&org.description),
        metadata: EmbeddingMetadata {
            kind: "business_description",
            service_name: None,
            question: None,
        },
    }];
    embeddings_data.extend(profile.services.iter().map(|s| EmbeddingCandidate {
        text: text(&s.summary),
        metadata: EmbeddingMetadata {
            kind: "service",
            service_name: s.name.clone(),
            question: None,
        },
    }));
    embeddings_data.extend(profile.faqs.iter().map(|f| EmbeddingCandidate {
        text: text(&f.a),
        metadata: EmbeddingMetadata {
            kind: "faq",
            service_name: None,
            question: f.q.clone(),
        },
    }));

    TrainingDataset {
        context,
        qa_pairs,
        training_instructions: TrainingInstructions {
            personality,
            response_guidelines: RESPONSE_GUIDELINES.to_vec(),
        },
        embeddings_data,
    }
}
