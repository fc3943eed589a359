//! Text normalization for soup tokens.
//!
//! Multi-word names are collapsed into single tokens ("Tom Hanks" →
//! "tomhanks") so that a shared first name never counts as shared cast.
//! Keywords are additionally stemmed so inflected forms meet on one root.

use rust_stemmers::Algorithm;

/// Trait for stemming algorithms.
///
/// `Send + Sync` so one stemmer can be shared by the parallel composer.
pub trait Stemmer: Send + Sync {
    /// Reduce a word to its root form.
    fn stem(&self, word: &str) -> String;
}

/// Snowball (Porter2) English stemmer.
pub struct SnowballStemmer {
    inner: rust_stemmers::Stemmer,
}

impl SnowballStemmer {
    pub fn english() -> Self {
        Self {
            inner: rust_stemmers::Stemmer::create(Algorithm::English),
        }
    }
}

impl Default for SnowballStemmer {
    fn default() -> Self {
        Self::english()
    }
}

impl Stemmer for SnowballStemmer {
    fn stem(&self, word: &str) -> String {
        // Snowball rules are defined on lowercase input
        self.inner.stem(&word.to_lowercase()).into_owned()
    }
}

/// Lowercase a token and remove its spaces.
pub fn normalize(token: &str) -> String {
    token.replace(' ', "").to_lowercase()
}

/// Stem a keyword, then normalize it.
pub fn normalize_keyword<S: Stemmer + ?Sized>(stemmer: &S, keyword: &str) -> String {
    normalize(&stemmer.stem(keyword))
}
