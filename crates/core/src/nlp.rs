//! Lexicon-based review analysis: normalization, stopword filtering, sentiment counting,
//! keyword aspect detection and a templated insight sentence.

use serde::{Deserialize, Serialize};

use crate::dataset::{AspectKeywordMap, Polarity, SentimentLexicon, StopwordSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Positive,
    Negative,
    Neutral,
}

impl Classification {
    pub fn from_score(score: i32) -> Self {
        match score {
            score if score > 0 => Self::Positive,
            score if score < 0 => Self::Negative,
            _ => Self::Neutral,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopwordSplit {
    pub raw_tokens: Vec<String>,
    pub filtered_tokens: Vec<String>,
    pub removed_stopwords: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentTally {
    pub score: i32,
    pub positive_words: Vec<String>,
    pub negative_words: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectMatch {
    pub aspect: String,
    pub keywords: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectPolarity {
    pub positive_aspects: Vec<String>,
    pub negative_aspects: Vec<String>,
}

pub fn classify(score: i32) -> Classification {
    Classification::from_score(score)
}

pub fn lowercase(text: &str) -> String {
    text.to_lowercase()
}

/// Drops every character that is neither an ASCII word character (`[A-Za-z0-9_]`) nor
/// whitespace.
pub fn depunctuate(text: &str) -> String {
    text.chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_' || ch.is_whitespace())
        .collect()
}

pub fn split_stopwords(text: &str, stopwords: &StopwordSet) -> StopwordSplit {
    let raw_tokens: Vec<String> = text.split_whitespace().map(str::to_owned).collect();
    let (removed_stopwords, filtered_tokens): (Vec<String>, Vec<String>) =
        raw_tokens.iter().cloned().partition(|token| stopwords.contains(token));

    StopwordSplit { raw_tokens, filtered_tokens, removed_stopwords }
}

/// Per-occurrence scoring: a repeated word counts every time it appears.
pub fn score_sentiment(tokens: &[String], lexicon: &SentimentLexicon) -> SentimentTally {
    let mut tally = SentimentTally::default();
    for token in tokens {
        let Some(polarity) = lexicon.polarity(token) else {
            continue;
        };
        tally.score += polarity.weight();
        match polarity {
            Polarity::Positive => tally.positive_words.push(token.clone()),
            Polarity::Negative => tally.negative_words.push(token.clone()),
        }
    }
    tally
}

/// Matched keywords follow token order and keep duplicates. Aspects without a match are
/// left out.
pub fn detect_aspects(tokens: &[String], aspects: &AspectKeywordMap) -> Vec<AspectMatch> {
    aspects
        .iter()
        .filter_map(|entry| {
            let keywords: Vec<String> =
                tokens.iter().filter(|token| entry.keywords.contains(*token)).cloned().collect();
            (!keywords.is_empty()).then(|| AspectMatch { aspect: entry.aspect.clone(), keywords })
        })
        .collect()
}

pub fn aspect_polarity(matches: &[AspectMatch], lexicon: &SentimentLexicon) -> AspectPolarity {
    let mut polarity = AspectPolarity::default();
    for aspect in matches {
        let local: i32 = aspect.keywords.iter().map(|keyword| lexicon.weight(keyword)).sum();
        if local > 0 {
            polarity.positive_aspects.push(aspect.aspect.clone());
        } else if local < 0 {
            polarity.negative_aspects.push(aspect.aspect.clone());
        }
    }
    polarity
}

pub fn generate_insight(classification: Classification, polarity: &AspectPolarity) -> String {
    let praised = join_natural(&polarity.positive_aspects);
    let concerns = join_natural(&polarity.negative_aspects);

    match (praised, concerns) {
        (Some(praised), Some(concerns)) => {
            format!("Customers appreciate {praised}, but raise concerns about {concerns}.")
        }
        (Some(praised), None) => format!("Customers appreciate {praised}."),
        (None, Some(concerns)) => format!("Customers raise concerns about {concerns}."),
        (None, None) => match classification {
            Classification::Positive => {
                "Overall sentiment is positive: customers are satisfied with the product."
                    .to_owned()
            }
            Classification::Negative => {
                "Overall sentiment is negative: customers are dissatisfied with the product."
                    .to_owned()
            }
            Classification::Neutral => {
                "Overall sentiment is neutral: the review carries no clear opinion.".to_owned()
            }
        },
    }
}

fn join_natural(aspects: &[String]) -> Option<String> {
    let names: Vec<String> = aspects.iter().map(|aspect| aspect.to_lowercase()).collect();
    match names.as_slice() {
        [] => None,
        [only] => Some(only.clone()),
        [head @ .., last] => Some(format!("{} and {last}", head.join(", "))),
    }
}
