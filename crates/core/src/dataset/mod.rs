//! Read-only lookup tables behind both walkthroughs.
//!
//! The built-in tables are constructed once per process and shared as `Arc<Dataset>`.
//! A TOML file may replace any subset of the tables (see [`file`]); nothing here is ever
//! mutated after construction.

pub mod catalog;
pub mod file;
pub mod lexicon;

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::Serialize;
use thiserror::Error;

pub use catalog::{CoPurchase, ProductCatalog, ProductRecord};
pub use lexicon::{AspectKeywordMap, AspectKeywords, Polarity, SentimentLexicon, StopwordSet};

static BUILTIN: OnceLock<Arc<Dataset>> = OnceLock::new();

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Dataset {
    pub catalog: ProductCatalog,
    pub stopwords: StopwordSet,
    pub lexicon: SentimentLexicon,
    pub aspects: AspectKeywordMap,
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("could not read dataset file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse dataset file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("could not parse dataset: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate product `{0}` in dataset")]
    DuplicateProduct(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DatasetDiagnostic {
    pub check: &'static str,
    pub passed: bool,
    pub details: String,
}

impl Dataset {
    /// Process-wide built-in dataset.
    pub fn builtin() -> Arc<Self> {
        BUILTIN
            .get_or_init(|| {
                Arc::new(Self {
                    catalog: catalog::builtin_catalog(),
                    stopwords: lexicon::builtin_stopwords(),
                    lexicon: lexicon::builtin_lexicon(),
                    aspects: lexicon::builtin_aspects(),
                })
            })
            .clone()
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, DatasetError> {
        let patch = file::parse_patch(raw)?;
        file::merge_onto_builtin(patch)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, DatasetError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| DatasetError::ReadFile { path: path.to_path_buf(), source })?;
        let patch = file::parse_patch(&raw).map_err(|error| match error {
            DatasetError::Parse(source) => {
                DatasetError::ParseFile { path: path.to_path_buf(), source }
            }
            other => other,
        })?;
        let dataset = file::merge_onto_builtin(patch)?;

        tracing::info!(
            event_name = "dataset.loaded",
            path = %path.display(),
            products = dataset.catalog.len(),
            stopwords = dataset.stopwords.len(),
            aspects = dataset.aspects.len(),
            "dataset override loaded"
        );
        Ok(dataset)
    }

    /// Loads the override file when one is configured, otherwise returns the built-in data.
    pub fn load(path: Option<&Path>) -> Result<Arc<Self>, DatasetError> {
        match path {
            Some(path) => Self::from_toml_file(path).map(Arc::new),
            None => Ok(Self::builtin()),
        }
    }

    /// Invariant checks for operators. Violations are reported, never repaired.
    pub fn diagnostics(&self) -> Vec<DatasetDiagnostic> {
        let zero_totals: Vec<_> = self
            .catalog
            .products()
            .iter()
            .filter(|record| record.total_purchases == 0)
            .map(|record| record.name.clone())
            .collect();
        let overlap = self.lexicon.overlap();
        let empty_aspects: Vec<_> = self
            .aspects
            .iter()
            .filter(|entry| entry.keywords.is_empty())
            .map(|entry| entry.aspect.clone())
            .collect();
        let uppercase_stopwords: Vec<_> =
            self.stopwords.iter().filter(|word| *word != word.to_lowercase()).collect();

        vec![
            diagnostic(
                "catalog_totals",
                &zero_totals,
                format!("{} products have positive total purchases", self.catalog.len()),
                "products with zero total purchases",
            ),
            diagnostic(
                "lexicon_disjoint",
                &overlap,
                format!(
                    "{} positive and {} negative words, no overlap",
                    self.lexicon.positive.len(),
                    self.lexicon.negative.len()
                ),
                "words in both sentiment lists",
            ),
            diagnostic(
                "aspect_keywords",
                &empty_aspects,
                format!("{} aspects each have trigger keywords", self.aspects.len()),
                "aspects without keywords",
            ),
            diagnostic(
                "stopwords_lowercase",
                &uppercase_stopwords,
                format!("{} stopwords, all lowercase", self.stopwords.len()),
                "stopwords that can never match a lowercased token",
            ),
        ]
    }
}

fn diagnostic<S: AsRef<str>>(
    check: &'static str,
    offenders: &[S],
    ok_details: String,
    failure_label: &str,
) -> DatasetDiagnostic {
    if offenders.is_empty() {
        return DatasetDiagnostic { check, passed: true, details: ok_details };
    }
    let listed: Vec<&str> = offenders.iter().map(AsRef::as_ref).collect();
    DatasetDiagnostic {
        check,
        passed: false,
        details: format!("{failure_label}: {}", listed.join(", ")),
    }
}
