//! Eight-step lexicon sentiment and aspect trace.

use std::sync::Arc;

use crate::dataset::Dataset;
use crate::errors::StepError;
use crate::nlp;
use crate::walkthrough::engine::{StepFn, StepMachine, Walkthrough};
use crate::walkthrough::states::{ReviewTrace, WalkthroughKind};

pub type ReviewEngine = StepMachine<ReviewWalkthrough>;

const STEPS: [StepFn<ReviewTrace>; 7] = [
    lowercase,
    depunctuate,
    remove_stopwords,
    tokenize,
    score_sentiment,
    detect_aspects,
    generate_insight,
];

#[derive(Clone, Debug)]
pub struct ReviewWalkthrough {
    dataset: Arc<Dataset>,
}

impl ReviewWalkthrough {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }
}

impl Default for ReviewWalkthrough {
    fn default() -> Self {
        Self::new(Dataset::builtin())
    }
}

impl Walkthrough for ReviewWalkthrough {
    type Trace = ReviewTrace;

    fn kind(&self) -> WalkthroughKind {
        WalkthroughKind::Review
    }

    fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    fn capture(&self, input: &str) -> Result<ReviewTrace, StepError> {
        Ok(ReviewTrace {
            original_text: Some(input.to_owned()),
            length: Some(input.chars().count()),
            ..ReviewTrace::default()
        })
    }

    fn steps(&self) -> &'static [StepFn<ReviewTrace>] {
        &STEPS
    }
}

impl ReviewEngine {
    pub fn with_dataset(dataset: Arc<Dataset>) -> Self {
        Self::new(ReviewWalkthrough::new(dataset))
    }
}

impl Default for ReviewEngine {
    fn default() -> Self {
        Self::new(ReviewWalkthrough::default())
    }
}

fn lowercase(_dataset: &Dataset, trace: &ReviewTrace) -> Result<ReviewTrace, StepError> {
    let original = trace.original_text.as_deref().ok_or(StepError::NotActive)?;
    Ok(ReviewTrace { lowercased: Some(nlp::lowercase(original)), ..trace.clone() })
}

fn depunctuate(_dataset: &Dataset, trace: &ReviewTrace) -> Result<ReviewTrace, StepError> {
    let lowered = trace.lowercased.as_deref().unwrap_or_default();
    Ok(ReviewTrace { depunctuated: Some(nlp::depunctuate(lowered)), ..trace.clone() })
}

fn remove_stopwords(dataset: &Dataset, trace: &ReviewTrace) -> Result<ReviewTrace, StepError> {
    let text = trace.depunctuated.as_deref().unwrap_or_default();
    let split = nlp::split_stopwords(text, &dataset.stopwords);
    Ok(ReviewTrace {
        raw_tokens: Some(split.raw_tokens),
        filtered_tokens: Some(split.filtered_tokens),
        removed_stopwords: Some(split.removed_stopwords),
        ..trace.clone()
    })
}

fn tokenize(_dataset: &Dataset, trace: &ReviewTrace) -> Result<ReviewTrace, StepError> {
    Ok(ReviewTrace { tokens: Some(filtered(trace).to_vec()), ..trace.clone() })
}

fn score_sentiment(dataset: &Dataset, trace: &ReviewTrace) -> Result<ReviewTrace, StepError> {
    let tally = nlp::score_sentiment(filtered(trace), &dataset.lexicon);
    Ok(ReviewTrace {
        sentiment_score: Some(tally.score),
        positive_words: Some(tally.positive_words),
        negative_words: Some(tally.negative_words),
        ..trace.clone()
    })
}

fn detect_aspects(dataset: &Dataset, trace: &ReviewTrace) -> Result<ReviewTrace, StepError> {
    let detected = nlp::detect_aspects(filtered(trace), &dataset.aspects);
    Ok(ReviewTrace { detected_aspects: Some(detected), ..trace.clone() })
}

fn generate_insight(dataset: &Dataset, trace: &ReviewTrace) -> Result<ReviewTrace, StepError> {
    let classification = nlp::classify(trace.sentiment_score.unwrap_or(0));
    let detected = trace.detected_aspects.as_deref().unwrap_or_default();
    let polarity = nlp::aspect_polarity(detected, &dataset.lexicon);
    let insight = nlp::generate_insight(classification, &polarity);

    Ok(ReviewTrace {
        classification: Some(classification),
        positive_aspects: Some(polarity.positive_aspects),
        negative_aspects: Some(polarity.negative_aspects),
        insight: Some(insight),
        ..trace.clone()
    })
}

fn filtered(trace: &ReviewTrace) -> &[String] {
    trace.filtered_tokens.as_deref().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::ReviewEngine;
    use crate::errors::StepError;
    use crate::nlp::Classification;

    const SAMPLE: &str = "The product quality is EXCELLENT! Fast delivery.";

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|word| (*word).to_owned()).collect()
    }

    #[test]
    fn sample_review_walks_all_eight_steps() {
        let mut engine = ReviewEngine::default();
        let first = engine.initialize(SAMPLE).expect("initialize");
        assert_eq!(first.trace.length, Some(SAMPLE.chars().count()));
        assert!(first.trace.lowercased.is_none());

        let second = engine.advance().expect("step 2");
        assert_eq!(
            second.trace.lowercased.as_deref(),
            Some("the product quality is excellent! fast delivery.")
        );

        let third = engine.advance().expect("step 3");
        let depunctuated = third.trace.depunctuated.expect("depunctuated");
        assert!(!depunctuated.contains('!'));

        let fourth = engine.advance().expect("step 4");
        assert_eq!(
            fourth.trace.filtered_tokens,
            Some(words(&["product", "quality", "excellent", "fast", "delivery"]))
        );
        assert_eq!(fourth.trace.removed_stopwords, Some(words(&["the", "is"])));

        let fifth = engine.advance().expect("step 5");
        assert_eq!(fifth.trace.tokens, fifth.trace.filtered_tokens);

        let sixth = engine.advance().expect("step 6");
        assert_eq!(sixth.trace.sentiment_score, Some(2));
        assert_eq!(sixth.trace.positive_words, Some(words(&["excellent", "fast"])));
        assert_eq!(sixth.trace.negative_words, Some(Vec::new()));

        let seventh = engine.advance().expect("step 7");
        assert_eq!(seventh.trace.aspect("Quality"), Some(words(&["quality"]).as_slice()));
        let mut delivery = seventh.trace.aspect("Delivery").expect("delivery").to_vec();
        delivery.sort();
        assert_eq!(delivery, words(&["delivery", "fast"]));

        let last = engine.advance().expect("step 8");
        assert_eq!(last.trace.classification, Some(Classification::Positive));
        assert_eq!(last.trace.positive_aspects, Some(words(&["Delivery"])));
        assert_eq!(last.trace.insight.as_deref(), Some("Customers appreciate delivery."));
        assert!(last.completed);
        assert!(engine.is_complete());
    }

    #[test]
    fn negative_review_names_concerns() {
        let mut engine = ReviewEngine::default();
        let last = engine
            .walk("Terrible support, rude staff. Shipping was slow and late!", 8)
            .expect("walk")
            .pop()
            .expect("final snapshot");

        assert_eq!(last.trace.classification, Some(Classification::Negative));
        assert_eq!(last.trace.sentiment_score, Some(-4));
        assert_eq!(
            last.trace.insight.as_deref(),
            Some("Customers raise concerns about delivery and service.")
        );
    }

    #[test]
    fn review_without_aspects_uses_generic_insight() {
        let mut engine = ReviewEngine::default();
        let last = engine.walk("I love it", 8).expect("walk").pop().expect("final snapshot");

        assert_eq!(last.trace.detected_aspects, Some(Vec::new()));
        assert_eq!(last.trace.classification, Some(Classification::Positive));
        assert!(last.trace.insight.as_deref().is_some_and(|insight| insight.contains("positive")));
    }

    #[test]
    fn punctuation_only_review_is_neutral() {
        let mut engine = ReviewEngine::default();
        let last = engine.walk("?!...", 8).expect("walk").pop().expect("final snapshot");

        assert_eq!(last.trace.raw_tokens, Some(Vec::new()));
        assert_eq!(last.trace.sentiment_score, Some(0));
        assert_eq!(last.trace.classification, Some(Classification::Neutral));
    }

    #[test]
    fn advancing_past_final_step_fails_without_mutation() {
        let mut engine = ReviewEngine::default();
        engine.walk(SAMPLE, 8).expect("walk");
        let before = engine.snapshot();

        assert_eq!(engine.advance(), Err(StepError::AlreadyComplete { max_steps: 8 }));
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn advance_before_initialize_is_not_active() {
        let mut engine = ReviewEngine::default();
        assert_eq!(engine.advance(), Err(StepError::NotActive));
        assert_eq!(engine.initialize(""), Err(StepError::InvalidInput));
        assert!(!engine.is_active());
    }
}
