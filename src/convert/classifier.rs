//! Training-example classifiers
//!
//! Two interchangeable classifiers assign one of the six fixed categories
//! to a question/answer pair: a deterministic keyword matcher and an
//! AI-backed classifier that degrades to the keyword matcher on any
//! failure or unrecognized label.

use tracing::warn;

use super::Category;
use crate::enrich::AiStructurer;

/// Per-category keyword sets, in fixed priority order; first match wins
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Pricing,
        &[
            "price", "cost", "fee", "charge", "how much", "expensive", "cheap", "budget",
        ],
    ),
    (
        Category::Contact,
        &[
            "contact", "phone", "email", "address", "location", "where", "how to reach", "call",
        ],
    ),
    (
        Category::Support,
        &[
            "help", "support", "problem", "issue", "troubleshoot", "fix", "error", "not working",
        ],
    ),
    (
        Category::Policies,
        &[
            "policy", "terms", "condition", "rule", "procedure", "process", "how to",
            "requirement",
        ],
    ),
    (
        Category::Services,
        &[
            "service", "offer", "provide", "available", "what do you", "what can you",
            "capabilities",
        ],
    ),
];

/// Classify a Q&A pair by keyword matching
///
/// Matches the combined question+answer text against each category's
/// keywords in priority order; falls through to [`Category::General`].
/// Total: always returns exactly one of the six labels.
pub fn keyword_classify(question: &str, answer: &str) -> Category {
    let text = format!("{} {}", question, answer).to_lowercase();

    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|kw| text.contains(kw)) {
            return *category;
        }
    }
    Category::General
}

/// Classifier strategy for the SQL converter
#[derive(Debug)]
pub enum Classifier {
    /// Deterministic keyword matcher
    Keyword,
    /// AI-backed, with keyword fallback
    Ai(AiStructurer),
}

impl Classifier {
    /// Classify a Q&A pair, never failing
    pub async fn classify(&self, question: &str, answer: &str) -> Category {
        match self {
            Classifier::Keyword => keyword_classify(question, answer),
            Classifier::Ai(client) => match client.classify_category(question, answer).await {
                Ok(label) => Category::from_label(&label).unwrap_or_else(|| {
                    warn!(
                        "AI returned unrecognized category '{}'; using keyword classifier",
                        label
                    );
                    keyword_classify(question, answer)
                }),
                Err(e) => {
                    warn!("AI classification failed ({}); using keyword classifier", e);
                    keyword_classify(question, answer)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::AiConfig;

    #[test]
    fn test_return_policy_is_policies() {
        let category =
            keyword_classify("What is your return policy?", "30 days, no questions asked.");
        assert_eq!(category, Category::Policies);
    }

    #[test]
    fn test_each_category_reachable() {
        assert_eq!(
            keyword_classify("How much does it cost?", "Ten dollars."),
            Category::Pricing
        );
        assert_eq!(
            keyword_classify("What's your phone number?", "555-0100."),
            Category::Contact
        );
        assert_eq!(
            keyword_classify("My widget is not working", "Restart it."),
            Category::Support
        );
        assert_eq!(
            keyword_classify("What are the terms?", "See the agreement."),
            Category::Policies
        );
        assert_eq!(
            keyword_classify("What do you offer?", "Widgets and gadgets."),
            Category::Services
        );
        assert_eq!(
            keyword_classify("Tell me a fact", "Widgets were invented in 1999."),
            Category::General
        );
    }

    #[test]
    fn test_priority_first_match_wins() {
        // Both pricing ("cost") and services ("service") match; pricing
        // outranks services in the fixed order
        let category = keyword_classify("What does the service cost?", "It depends.");
        assert_eq!(category, Category::Pricing);
    }

    #[test]
    fn test_answer_text_participates() {
        let category = keyword_classify("Tell me more", "Check our pricing: the fee is $5.");
        assert_eq!(category, Category::Pricing);
    }

    #[tokio::test]
    async fn test_ai_classifier_falls_back_on_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/complete")
            .with_status(429)
            .create_async()
            .await;

        let config = AiConfig {
            api_url: format!("{}/complete", server.url()),
            ..AiConfig::default()
        };
        let classifier = Classifier::Ai(AiStructurer::new("key", config).unwrap());

        let category = classifier
            .classify("What is your return policy?", "30 days, no questions asked.")
            .await;
        assert_eq!(category, Category::Policies);
    }

    #[tokio::test]
    async fn test_ai_classifier_uses_valid_label() {
        let mut server = mockito::Server::new_async().await;
        let reply = serde_json::json!({
            "choices": [{"message": {"content": "contact"}}]
        });
        server
            .mock("POST", "/complete")
            .with_status(200)
            .with_body(reply.to_string())
            .create_async()
            .await;

        let config = AiConfig {
            api_url: format!("{}/complete", server.url()),
            ..AiConfig::default()
        };
        let classifier = Classifier::Ai(AiStructurer::new("key", config).unwrap());

        // Keyword classifier alone would say policies ("policy")
        let category = classifier
            .classify("What is your return policy?", "Call our office.")
            .await;
        assert_eq!(category, Category::Contact);
    }

    #[tokio::test]
    async fn test_ai_classifier_rejects_unknown_label() {
        let mut server = mockito::Server::new_async().await;
        let reply = serde_json::json!({
            "choices": [{"message": {"content": "miscellaneous"}}]
        });
        server
            .mock("POST", "/complete")
            .with_status(200)
            .with_body(reply.to_string())
            .create_async()
            .await;

        let config = AiConfig {
            api_url: format!("{}/complete", server.url()),
            ..AiConfig::default()
        };
        let classifier = Classifier::Ai(AiStructurer::new("key", config).unwrap());

        let category = classifier
            .classify("How much is shipping?", "Five dollars flat.")
            .await;
        assert_eq!(category, Category::Pricing);
    }
}
