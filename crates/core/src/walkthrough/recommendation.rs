//! Six-step item-to-item collaborative filtering trace.

use std::sync::Arc;

use crate::dataset::Dataset;
use crate::errors::StepError;
use crate::similarity::{self, TOP_RECOMMENDATIONS};
use crate::walkthrough::engine::{StepFn, StepMachine, Walkthrough};
use crate::walkthrough::states::{RecommendationTrace, WalkthroughKind};

pub type RecommendationEngine = StepMachine<RecommendationWalkthrough>;

const STEPS: [StepFn<RecommendationTrace>; 5] =
    [retrieve_co_purchases, compute_similarity, surface_scores, rank_items, recommend];

#[derive(Clone, Debug)]
pub struct RecommendationWalkthrough {
    dataset: Arc<Dataset>,
}

impl RecommendationWalkthrough {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }
}

impl Default for RecommendationWalkthrough {
    fn default() -> Self {
        Self::new(Dataset::builtin())
    }
}

impl Walkthrough for RecommendationWalkthrough {
    type Trace = RecommendationTrace;

    fn kind(&self) -> WalkthroughKind {
        WalkthroughKind::Recommendation
    }

    fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    fn capture(&self, input: &str) -> Result<RecommendationTrace, StepError> {
        let record = self
            .dataset
            .catalog
            .get(input)
            .ok_or_else(|| StepError::UnknownProduct { product: input.to_owned() })?;

        Ok(RecommendationTrace {
            selected_product: Some(record.name.clone()),
            total_purchases: Some(record.total_purchases),
            ..RecommendationTrace::default()
        })
    }

    fn steps(&self) -> &'static [StepFn<RecommendationTrace>] {
        &STEPS
    }
}

impl RecommendationEngine {
    pub fn with_dataset(dataset: Arc<Dataset>) -> Self {
        Self::new(RecommendationWalkthrough::new(dataset))
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(RecommendationWalkthrough::default())
    }
}

fn selected(trace: &RecommendationTrace) -> Result<&str, StepError> {
    trace.selected_product.as_deref().ok_or(StepError::NotActive)
}

fn retrieve_co_purchases(
    dataset: &Dataset,
    trace: &RecommendationTrace,
) -> Result<RecommendationTrace, StepError> {
    let product = selected(trace)?;
    let record = dataset
        .catalog
        .get(product)
        .ok_or_else(|| StepError::UnknownProduct { product: product.to_owned() })?;

    Ok(RecommendationTrace { co_items: Some(record.co_purchases.clone()), ..trace.clone() })
}

fn compute_similarity(
    _dataset: &Dataset,
    trace: &RecommendationTrace,
) -> Result<RecommendationTrace, StepError> {
    let product = selected(trace)?;
    let total = trace.total_purchases.unwrap_or(0);
    let co_items = trace.co_items.as_deref().unwrap_or_default();
    let scores = similarity::similarities(co_items, total)
        .ok_or_else(|| StepError::DivisionByZero { product: product.to_owned() })?;

    Ok(RecommendationTrace { similarities: Some(scores), ..trace.clone() })
}

// Display-only stage: the full-precision scores from step 3 are shown as-is.
fn surface_scores(
    _dataset: &Dataset,
    trace: &RecommendationTrace,
) -> Result<RecommendationTrace, StepError> {
    Ok(trace.clone())
}

fn rank_items(
    _dataset: &Dataset,
    trace: &RecommendationTrace,
) -> Result<RecommendationTrace, StepError> {
    let scores = trace.similarities.as_deref().unwrap_or_default();
    Ok(RecommendationTrace { ranked: Some(similarity::rank(scores)), ..trace.clone() })
}

fn recommend(
    _dataset: &Dataset,
    trace: &RecommendationTrace,
) -> Result<RecommendationTrace, StepError> {
    let ranked = trace.ranked.as_deref().unwrap_or_default();
    Ok(RecommendationTrace {
        top_recommendations: Some(similarity::top_recommendations(ranked, TOP_RECOMMENDATIONS)),
        ..trace.clone()
    })
}
