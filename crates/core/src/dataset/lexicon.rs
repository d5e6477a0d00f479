use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopwordSet {
    words: BTreeSet<String>,
}

impl StopwordSet {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { words: words.into_iter().map(Into::into).collect() }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn weight(self) -> i32 {
        match self {
            Self::Positive => 1,
            Self::Negative => -1,
        }
    }
}

/// Positive and negative word lists. A word is expected in at most one list; if it is in
/// both, the positive list wins.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentLexicon {
    pub positive: BTreeSet<String>,
    pub negative: BTreeSet<String>,
}

impl SentimentLexicon {
    pub fn new<P, N>(positive: P, negative: N) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        N: IntoIterator,
        N::Item: Into<String>,
    {
        Self {
            positive: positive.into_iter().map(Into::into).collect(),
            negative: negative.into_iter().map(Into::into).collect(),
        }
    }

    pub fn polarity(&self, token: &str) -> Option<Polarity> {
        if self.positive.contains(token) {
            Some(Polarity::Positive)
        } else if self.negative.contains(token) {
            Some(Polarity::Negative)
        } else {
            None
        }
    }

    pub fn weight(&self, token: &str) -> i32 {
        self.polarity(token).map(Polarity::weight).unwrap_or(0)
    }

    pub fn overlap(&self) -> Vec<String> {
        self.positive.intersection(&self.negative).cloned().collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectKeywords {
    pub aspect: String,
    pub keywords: BTreeSet<String>,
}

/// Aspect name to trigger keywords, iterated in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AspectKeywordMap {
    aspects: Vec<AspectKeywords>,
}

impl AspectKeywordMap {
    pub fn new(aspects: Vec<AspectKeywords>) -> Self {
        Self { aspects }
    }

    pub fn iter(&self) -> impl Iterator<Item = &AspectKeywords> {
        self.aspects.iter()
    }

    pub fn len(&self) -> usize {
        self.aspects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aspects.is_empty()
    }
}

pub(crate) fn builtin_stopwords() -> StopwordSet {
    StopwordSet::new([
        "a", "about", "all", "am", "an", "and", "are", "as", "at", "be", "been", "being", "but",
        "by", "can", "did", "do", "does", "for", "from", "had", "has", "have", "he", "her", "i",
        "if", "in", "into", "is", "it", "its", "just", "me", "my", "of", "on", "or", "our", "she",
        "so", "that", "the", "their", "them", "these", "they", "this", "those", "to", "too",
        "was", "we", "were", "will", "with", "would", "you", "your",
    ])
}

pub(crate) fn builtin_lexicon() -> SentimentLexicon {
    SentimentLexicon::new(
        [
            "affordable", "amazing", "awesome", "best", "durable", "excellent", "fantastic",
            "fast", "good", "great", "happy", "helpful", "love", "perfect", "quick",
            "recommend", "sturdy", "wonderful",
        ],
        [
            "awful", "bad", "broken", "cheap", "damaged", "defective", "disappointed",
            "expensive", "hate", "horrible", "late", "poor", "rude", "slow", "terrible",
            "useless", "waste", "worst",
        ],
    )
}

pub(crate) fn builtin_aspects() -> AspectKeywordMap {
    let aspect = |name: &str, keywords: &[&str]| AspectKeywords {
        aspect: name.to_owned(),
        keywords: keywords.iter().map(|keyword| (*keyword).to_owned()).collect(),
    };

    AspectKeywordMap::new(vec![
        aspect(
            "Quality",
            &["quality", "build", "material", "durable", "sturdy", "broken", "defective", "design"],
        ),
        aspect(
            "Delivery",
            &["delivery", "shipping", "arrived", "fast", "slow", "late", "package", "damaged"],
        ),
        aspect("Price", &["price", "value", "cost", "expensive", "cheap", "affordable", "worth"]),
        aspect(
            "Service",
            &["service", "support", "staff", "helpful", "rude", "refund", "response"],
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::{builtin_aspects, builtin_lexicon, builtin_stopwords, Polarity, SentimentLexicon};

    #[test]
    fn builtin_lexicon_is_disjoint_and_balanced() {
        let lexicon = builtin_lexicon();

        assert!(lexicon.overlap().is_empty());
        assert_eq!(lexicon.positive.len(), 18);
        assert_eq!(lexicon.negative.len(), 18);
    }

    #[test]
    fn polarity_prefers_positive_list_on_overlap() {
        let lexicon = SentimentLexicon::new(["fine"], ["fine", "bad"]);

        assert_eq!(lexicon.polarity("fine"), Some(Polarity::Positive));
        assert_eq!(lexicon.weight("bad"), -1);
        assert_eq!(lexicon.weight("table"), 0);
        assert_eq!(lexicon.overlap(), vec!["fine".to_owned()]);
    }

    #[test]
    fn stopwords_keep_content_words_out() {
        let stopwords = builtin_stopwords();

        assert!(stopwords.contains("the"));
        assert!(stopwords.contains("is"));
        for content in ["product", "quality", "excellent", "fast", "delivery", "not"] {
            assert!(!stopwords.contains(content), "{content} must survive filtering");
        }
        assert!(stopwords.iter().all(|word| word == word.to_lowercase()));
    }

    #[test]
    fn aspects_are_iterated_in_declaration_order() {
        let aspects = builtin_aspects();
        let names: Vec<_> = aspects.iter().map(|entry| entry.aspect.as_str()).collect();

        assert_eq!(names, ["Quality", "Delivery", "Price", "Service"]);
        let delivery = aspects.iter().find(|entry| entry.aspect == "Delivery");
        assert!(delivery.is_some_and(|entry| entry.keywords.contains("fast")));
    }
}
