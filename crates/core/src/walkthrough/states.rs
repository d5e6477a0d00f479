use serde::{Deserialize, Serialize};

use crate::dataset::CoPurchase;
use crate::nlp::{AspectMatch, Classification};
use crate::similarity::SimilarityEntry;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkthroughKind {
    Recommendation,
    Review,
}

const RECOMMENDATION_STAGES: [&str; 6] = [
    "Select product",
    "Retrieve co-purchases",
    "Compute similarity",
    "Similarity scores",
    "Rank items",
    "Recommend",
];

const REVIEW_STAGES: [&str; 8] = [
    "Capture text",
    "Lowercase",
    "Remove punctuation",
    "Remove stopwords",
    "Tokenize",
    "Score sentiment",
    "Detect aspects",
    "Generate insight",
];

impl WalkthroughKind {
    pub fn max_steps(self) -> u8 {
        match self {
            Self::Recommendation => 6,
            Self::Review => 8,
        }
    }

    /// Title of a 1-based step, `None` outside `1..=max_steps`.
    pub fn stage_title(self, step: u8) -> Option<&'static str> {
        let stages: &[&str] = match self {
            Self::Recommendation => &RECOMMENDATION_STAGES,
            Self::Review => &REVIEW_STAGES,
        };
        usize::from(step).checked_sub(1).and_then(|index| stages.get(index)).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recommendation => "recommendation",
            Self::Review => "review",
        }
    }
}

/// Intermediate state of one recommendation run. Fields stay `None` until the step that
/// computes them has run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationTrace {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_purchases: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub co_items: Option<Vec<CoPurchase>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarities: Option<Vec<SimilarityEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranked: Option<Vec<SimilarityEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_recommendations: Option<Vec<SimilarityEntry>>,
}

impl RecommendationTrace {
    pub fn similarity(&self, item: &str) -> Option<&SimilarityEntry> {
        self.similarities.as_ref()?.iter().find(|entry| entry.item == item)
    }
}

/// Intermediate state of one review run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewTrace {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowercased: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depunctuated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_tokens: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered_tokens: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed_stopwords: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positive_words: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_words: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_aspects: Option<Vec<AspectMatch>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positive_aspects: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_aspects: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
}

impl ReviewTrace {
    pub fn aspect(&self, aspect: &str) -> Option<&[String]> {
        self.detected_aspects
            .as_ref()?
            .iter()
            .find(|entry| entry.aspect == aspect)
            .map(|entry| entry.keywords.as_slice())
    }
}

/// Read-only copy of an engine's state handed to the presentation layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<T> {
    pub kind: WalkthroughKind,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    pub current_step: u8,
    pub max_steps: u8,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    pub trace: T,
}

impl<T: Serialize> Snapshot<T> {
    /// blake3 digest of the snapshot's JSON form. Identical snapshots share a fingerprint.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{RecommendationTrace, Snapshot, WalkthroughKind};

    #[test]
    fn stage_titles_cover_exactly_the_step_range() {
        for kind in [WalkthroughKind::Recommendation, WalkthroughKind::Review] {
            assert!(kind.stage_title(0).is_none());
            assert!(kind.stage_title(kind.max_steps() + 1).is_none());
            for step in 1..=kind.max_steps() {
                assert!(kind.stage_title(step).is_some(), "{kind:?} step {step}");
            }
        }
        assert_eq!(WalkthroughKind::Review.stage_title(8), Some("Generate insight"));
    }

    #[test]
    fn unset_trace_fields_are_absent_from_json() {
        let trace = RecommendationTrace {
            selected_product: Some("Laptop".to_owned()),
            ..RecommendationTrace::default()
        };

        let json = serde_json::to_value(&trace).expect("serialize");
        assert_eq!(json, serde_json::json!({ "selected_product": "Laptop" }));
    }

    #[test]
    fn fingerprint_changes_with_content() {
        let snapshot = Snapshot {
            kind: WalkthroughKind::Recommendation,
            active: true,
            input: Some("Laptop".to_owned()),
            current_step: 1,
            max_steps: 6,
            completed: false,
            stage: Some("Select product".to_owned()),
            trace: RecommendationTrace::default(),
        };
        let mut advanced = snapshot.clone();
        advanced.current_step = 2;

        let first = snapshot.fingerprint().expect("fingerprint");
        assert_eq!(first, snapshot.clone().fingerprint().expect("fingerprint"));
        assert_ne!(first, advanced.fingerprint().expect("fingerprint"));
        assert_eq!(first.len(), 64);
    }
}
