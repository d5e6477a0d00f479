//! Item-to-item co-purchase similarity.
//!
//! `score = count / total_purchases` at full `f64` precision. Rounding is a display
//! concern and never happens here.

use serde::{Deserialize, Serialize};

use crate::dataset::CoPurchase;

/// Number of ranked items surfaced as recommendations.
pub const TOP_RECOMMENDATIONS: usize = 2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimilarityEntry {
    pub item: String,
    pub count: u32,
    pub total: u32,
    pub score: f64,
}

/// Scores every co-purchased item against the base product's total purchases.
///
/// Returns `None` when `total` is zero; callers map that to their own error.
pub fn similarities(row: &[CoPurchase], total: u32) -> Option<Vec<SimilarityEntry>> {
    if total == 0 {
        return None;
    }

    Some(
        row.iter()
            .map(|co_purchase| SimilarityEntry {
                item: co_purchase.item.clone(),
                count: co_purchase.count,
                total,
                score: f64::from(co_purchase.count) / f64::from(total),
            })
            .collect(),
    )
}

/// Stable descending sort by score; tied entries keep their input order.
pub fn rank(entries: &[SimilarityEntry]) -> Vec<SimilarityEntry> {
    let mut ranked = entries.to_vec();
    ranked.sort_by(|left, right| right.score.total_cmp(&left.score));
    ranked
}

pub fn top_recommendations(ranked: &[SimilarityEntry], limit: usize) -> Vec<SimilarityEntry> {
    ranked.iter().take(limit).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::{rank, similarities, top_recommendations, TOP_RECOMMENDATIONS};
    use crate::dataset::{CoPurchase, Dataset};

    fn row(entries: &[(&str, u32)]) -> Vec<CoPurchase> {
        entries.iter().map(|(item, count)| CoPurchase::new(*item, *count)).collect()
    }

    #[test]
    fn laptop_scores_use_total_purchases_denominator() {
        let dataset = Dataset::builtin();
        let laptop = dataset.catalog.get("Laptop").expect("laptop");

        let scores = similarities(&laptop.co_purchases, laptop.total_purchases).expect("scores");
        let mouse = scores.iter().find(|entry| entry.item == "Mouse").expect("mouse");

        assert_eq!(mouse.count, 45);
        assert_eq!(mouse.total, 165);
        assert_eq!(mouse.score, 45.0 / 165.0);
        assert!((mouse.score - 0.2727).abs() < 1e-4);
    }

    #[test]
    fn all_builtin_scores_are_in_unit_interval() {
        let dataset = Dataset::builtin();
        for record in dataset.catalog.products() {
            let scores =
                similarities(&record.co_purchases, record.total_purchases).expect("nonzero total");
            for entry in scores {
                assert!(entry.score > 0.0 && entry.score <= 1.0, "{}: {}", record.name, entry.item);
            }
        }
    }

    #[test]
    fn zero_total_yields_none() {
        assert!(similarities(&row(&[("Chair", 3)]), 0).is_none());
        assert_eq!(similarities(&[], 0), None);
    }

    #[test]
    fn ranking_is_stable_for_ties() {
        let scores =
            similarities(&row(&[("Case", 10), ("Stylus", 30), ("Keyboard", 30), ("Pen", 30)]), 100)
                .expect("scores");

        let ranked: Vec<_> = rank(&scores).into_iter().map(|entry| entry.item).collect();
        assert_eq!(ranked, ["Stylus", "Keyboard", "Pen", "Case"]);
    }

    #[test]
    fn top_recommendations_never_pad() {
        let scores = similarities(&row(&[("Chair", 4)]), 10).expect("scores");

        assert_eq!(top_recommendations(&rank(&scores), TOP_RECOMMENDATIONS).len(), 1);
        assert!(top_recommendations(&[], TOP_RECOMMENDATIONS).is_empty());
    }
}
