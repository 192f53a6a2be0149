//! Chatbot dataset projection
//!
//! Projects a finished knowledge base into an intent/response/training
//! dataset. Pure function of the knowledge base, no external calls.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::KnowledgeBase;

/// Longest response slice taken from a page body when no summary exists
const PAGE_RESPONSE_LIMIT: usize = 300;

/// One chatbot training example
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    /// Intent identifier
    pub intent: String,

    /// Example user text
    pub text: String,

    /// Response the chatbot should give
    pub response: String,
}

/// Chatbot-ready projection of a knowledge base
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatbotDataset {
    /// Unique intent identifiers, in generation order
    pub intents: Vec<String>,

    /// Intent identifier -> response text
    pub responses: BTreeMap<String, String>,

    /// Training examples, one per intent
    pub training_data: Vec<TrainingExample>,
}

/// Project a knowledge base into a chatbot dataset
///
/// FAQ entries become `faq_{n}` intents in FAQ-section order; pages
/// without any FAQ become `page_{n}` intents in page order, answering
/// with the page summary or its leading content slice. Identifiers are
/// 1-indexed and unique within the dataset.
pub fn build_dataset(kb: &KnowledgeBase) -> ChatbotDataset {
    let mut dataset = ChatbotDataset {
        intents: Vec::new(),
        responses: BTreeMap::new(),
        training_data: Vec::new(),
    };

    for (i, faq) in kb.faq_section.iter().enumerate() {
        let intent = format!("faq_{}", i + 1);
        push_intent(&mut dataset, intent, faq.question.clone(), faq.answer.clone());
    }

    let mut page_counter = 0;
    for page in &kb.pages {
        // FAQ-rich pages are already covered by their faq_* intents
        if !page.faqs.is_empty() {
            continue;
        }

        let response = page
            .summary
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| lead_slice(&page.body_text, PAGE_RESPONSE_LIMIT));
        if response.is_empty() {
            continue;
        }

        page_counter += 1;
        let intent = format!("page_{}", page_counter);
        let text = if page.title.is_empty() {
            page.url.clone()
        } else {
            page.title.clone()
        };
        push_intent(&mut dataset, intent, text, response);
    }

    info!(
        "Projected {} intents ({} FAQ, {} page)",
        dataset.intents.len(),
        kb.faq_section.len(),
        page_counter
    );
    dataset
}

fn push_intent(dataset: &mut ChatbotDataset, intent: String, text: String, response: String) {
    dataset.intents.push(intent.clone());
    dataset.responses.insert(intent.clone(), response.clone());
    dataset.training_data.push(TrainingExample {
        intent,
        text,
        response,
    });
}

/// First `limit` characters of `text`, cut back to a char boundary
fn lead_slice(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].trim_end().to_string()
}
