//! TOML dataset overrides.
//!
//! Every section is optional; a missing section keeps the built-in table. Products and
//! co-purchase rows are arrays so dataset order survives parsing.
//!
//! ```toml
//! stopwords = ["the", "is"]
//!
//! [lexicon]
//! positive = ["great"]
//! negative = ["awful"]
//!
//! [[aspects]]
//! aspect = "Quality"
//! keywords = ["quality", "build"]
//!
//! [[products]]
//! name = "Laptop"
//! total_purchases = 165
//! co_purchases = [{ item = "Mouse", count = 45 }]
//! ```

use std::collections::HashSet;

use serde::Deserialize;

use super::{
    AspectKeywordMap, AspectKeywords, Dataset, DatasetError, ProductCatalog, ProductRecord,
    SentimentLexicon, StopwordSet,
};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DatasetPatch {
    stopwords: Option<Vec<String>>,
    lexicon: Option<LexiconPatch>,
    aspects: Option<Vec<AspectKeywords>>,
    products: Option<Vec<ProductRecord>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LexiconPatch {
    positive: Option<Vec<String>>,
    negative: Option<Vec<String>>,
}

pub(crate) fn parse_patch(raw: &str) -> Result<DatasetPatch, DatasetError> {
    Ok(toml::from_str::<DatasetPatch>(raw)?)
}

pub(crate) fn merge_onto_builtin(patch: DatasetPatch) -> Result<Dataset, DatasetError> {
    let mut dataset = (*Dataset::builtin()).clone();

    if let Some(products) = patch.products {
        let mut seen = HashSet::new();
        for record in &products {
            if !seen.insert(record.name.as_str()) {
                return Err(DatasetError::DuplicateProduct(record.name.clone()));
            }
        }
        dataset.catalog = ProductCatalog::new(products);
    }
    if let Some(stopwords) = patch.stopwords {
        dataset.stopwords = StopwordSet::new(stopwords);
    }
    if let Some(lexicon) = patch.lexicon {
        let positive = lexicon
            .positive
            .map(|words| words.into_iter().collect())
            .unwrap_or_else(|| dataset.lexicon.positive.clone());
        let negative = lexicon
            .negative
            .map(|words| words.into_iter().collect())
            .unwrap_or_else(|| dataset.lexicon.negative.clone());
        dataset.lexicon = SentimentLexicon { positive, negative };
    }
    if let Some(aspects) = patch.aspects {
        dataset.aspects = AspectKeywordMap::new(aspects);
    }

    Ok(dataset)
}
