//! Categorization and SQL conversion
//!
//! Consumes a chatbot dataset (typically loaded from a file written by an
//! earlier run), classifies every training example into one of six fixed
//! categories, and renders the result as SQL INSERT statements for a
//! caller-supplied business identifier.

mod classifier;

pub use classifier::{Classifier, keyword_classify};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::kb::ChatbotDataset;

/// Category labels for knowledge-base records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// What services/products are offered
    Services,
    /// Costs, prices, fees
    Pricing,
    /// How to contact, location, hours
    Contact,
    /// Help, troubleshooting, technical issues
    Support,
    /// Terms, conditions, policies, procedures
    Policies,
    /// Everything else
    General,
}

impl Category {
    /// Stable lowercase label, matching the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Services => "services",
            Category::Pricing => "pricing",
            Category::Contact => "contact",
            Category::Support => "support",
            Category::Policies => "policies",
            Category::General => "general",
        }
    }

    /// Parse a label produced elsewhere (e.g. by the AI classifier)
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "services" => Some(Category::Services),
            "pricing" => Some(Category::Pricing),
            "contact" => Some(Category::Contact),
            "support" => Some(Category::Support),
            "policies" => Some(Category::Policies),
            "general" => Some(Category::General),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One categorized Q&A record, ready for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    /// Caller-supplied business identifier
    pub business_id: String,

    /// Assigned category
    pub category: Category,

    /// The question text
    pub question: String,

    /// The answer text
    pub answer: String,
}

/// Parse a chatbot dataset from JSON text
pub fn load_dataset(json: &str) -> Result<ChatbotDataset> {
    Ok(serde_json::from_str(json)?)
}

/// Classify every training example into a [`CategoryRecord`]
///
/// Fails with a configuration error for a blank `business_id` before any
/// classification happens. Examples with an empty question or answer are
/// skipped with a warning; category assignment is recomputed from the
/// text each run, nothing is persisted.
pub async fn categorize_dataset(
    dataset: &ChatbotDataset,
    business_id: &str,
    classifier: &Classifier,
) -> Result<Vec<CategoryRecord>> {
    let business_id = business_id.trim();
    if business_id.is_empty() {
        return Err(Error::Config(
            "business_id is required for SQL conversion".to_string(),
        ));
    }

    info!(
        "Categorizing {} training examples for business {}",
        dataset.training_data.len(),
        business_id
    );

    let mut records = Vec::with_capacity(dataset.training_data.len());
    for (i, example) in dataset.training_data.iter().enumerate() {
        let question = example.text.trim();
        let answer = example.response.trim();
        if question.is_empty() || answer.is_empty() {
            warn!("Skipping example {}: missing question or answer", i + 1);
            continue;
        }

        let category = classifier.classify(question, answer).await;
        debug!("Example {} -> {}", i + 1, category);
        records.push(CategoryRecord {
            business_id: business_id.to_string(),
            category,
            question: question.to_string(),
            answer: answer.to_string(),
        });
    }

    Ok(records)
}

/// Render records as SQL INSERT statements
///
/// One statement per record, in input order, with quotes and control
/// characters escaped for safe embedding in SQL text.
pub fn render_sql(records: &[CategoryRecord]) -> String {
    let mut out = String::from(
        "-- SQL INSERT statements for knowledge base\n-- Generated from chatbot data\n\n",
    );

    for record in records {
        out.push_str(&format!(
            "insert into knowledge_base (business_id, question, answer, category, priority)\n\
             values\n\
             ('{}', '{}', '{}', '{}', 1);\n\n",
            escape_sql(&record.business_id),
            escape_sql(&record.question),
            escape_sql(&record.answer),
            record.category,
        ));
    }

    out
}

/// Escape text for embedding in a single-quoted SQL string
///
/// Doubles single quotes; control characters become spaces so a crafted
/// page can't smuggle statement separators or line noise into the output.
fn escape_sql(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb::TrainingExample;
    use std::collections::BTreeMap;
    use std::io::Write;

    fn dataset(examples: Vec<(&str, &str)>) -> ChatbotDataset {
        let mut intents = Vec::new();
        let mut responses = BTreeMap::new();
        let mut training_data = Vec::new();
        for (i, (q, a)) in examples.iter().enumerate() {
            let intent = format!("faq_{}", i + 1);
            intents.push(intent.clone());
            responses.insert(intent.clone(), a.to_string());
            training_data.push(TrainingExample {
                intent,
                text: q.to_string(),
                response: a.to_string(),
            });
        }
        ChatbotDataset {
            intents,
            responses,
            training_data,
        }
    }

    #[tokio::test]
    async fn test_blank_business_id_rejected_up_front() {
        let data = dataset(vec![("Q?", "A.")]);
        let result = categorize_dataset(&data, "   ", &Classifier::Keyword).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_cardinality_preserved() {
        let data = dataset(vec![
            ("What is your return policy?", "30 days, no questions asked."),
            ("How much is shipping?", "Five dollars."),
            ("Tell me about widgets", "They are great."),
        ]);

        let records = categorize_dataset(&data, "biz-1", &Classifier::Keyword)
            .await
            .unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].category, Category::Policies);
        assert_eq!(records[1].category, Category::Pricing);
        assert_eq!(records[2].category, Category::General);

        let sql = render_sql(&records);
        assert_eq!(sql.matches("insert into knowledge_base").count(), 3);
    }

    #[tokio::test]
    async fn test_empty_examples_skipped() {
        let data = dataset(vec![("Q?", ""), ("", "A."), ("Real question?", "Real answer.")]);
        let records = categorize_dataset(&data, "biz-1", &Classifier::Keyword)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].question, "Real question?");
    }

    #[test]
    fn test_escape_sql() {
        assert_eq!(escape_sql("it's"), "it''s");
        assert_eq!(escape_sql("line\nbreak\ttab"), "line break tab");
        assert_eq!(escape_sql("plain"), "plain");
    }

    #[test]
    fn test_render_sql_shape() {
        let records = vec![CategoryRecord {
            business_id: "biz-1".to_string(),
            category: Category::Policies,
            question: "What's the policy?".to_string(),
            answer: "It's simple.".to_string(),
        }];

        let sql = render_sql(&records);
        assert!(sql.starts_with("-- SQL INSERT statements for knowledge base\n"));
        assert!(sql.contains(
            "('biz-1', 'What''s the policy?', 'It''s simple.', 'policies', 1);"
        ));
    }

    #[test]
    fn test_load_dataset_from_file() {
        let data = dataset(vec![("Q?", "A.")]);
        let json = serde_json::to_string_pretty(&data).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        let loaded = load_dataset(&text).unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn test_load_dataset_rejects_bad_json() {
        assert!(matches!(load_dataset("not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_category_labels_round_trip() {
        for category in [
            Category::Services,
            Category::Pricing,
            Category::Contact,
            Category::Support,
            Category::Policies,
            Category::General,
        ] {
            assert_eq!(Category::from_label(category.as_str()), Some(category));
        }
        assert_eq!(Category::from_label("nonsense"), None);
    }
}
