use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::TrendGraphResult;
use crate::model::embedding::normalize;

/// Trait for providers that turn description texts into vectors.
///
/// Implementations must be deterministic for a given batch so that similarity
/// scores are reproducible across requests.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Embed a batch of texts. Returns one vector per input, in input order.
    async fn embed_batch(&self, texts: &[String]) -> TrendGraphResult<Vec<Vec<f32>>>;

    /// Return the model name.
    fn model_name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Bag-of-words embedder: local term-frequency vectors
// ---------------------------------------------------------------------------

/// Term-frequency embedder over a vocabulary built from each batch.
///
/// The vocabulary keeps the `max_vocabulary` most frequent words of the batch,
/// ties broken alphabetically, so the same batch always maps to the same space.
pub struct BagOfWordsEmbedder {
    max_vocabulary: usize,
}

impl BagOfWordsEmbedder {
    pub fn new(max_vocabulary: usize) -> Self {
        Self {
            max_vocabulary: max_vocabulary.max(1),
        }
    }

    /// Build a vocabulary from a corpus of documents.
    pub fn vocabulary(&self, documents: &[String]) -> Vec<String> {
        let mut word_counts: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            for word in tokenize(doc) {
                *word_counts.entry(word).or_insert(0) += 1;
            }
        }

        let mut sorted: Vec<_> = word_counts.into_iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        sorted.truncate(self.max_vocabulary);

        sorted.into_iter().map(|(word, _)| word).collect()
    }

    /// Unit-length term-frequency vector of `text` over a fixed vocabulary.
    pub fn embed_with(&self, vocabulary: &[String], text: &str) -> Vec<f32> {
        let mut word_counts: HashMap<String, f32> = HashMap::new();
        let mut total_words = 0.0f32;

        for word in tokenize(text) {
            total_words += 1.0;
            *word_counts.entry(word).or_insert(0.0) += 1.0;
        }

        let mut values: Vec<f32> = vocabulary
            .iter()
            .map(|vocab_word| {
                word_counts.get(vocab_word).copied().unwrap_or(0.0) / total_words.max(1.0)
            })
            .collect();

        normalize(&mut values);
        values
    }
}

impl Default for BagOfWordsEmbedder {
    fn default() -> Self {
        Self::new(512)
    }
}

#[async_trait]
impl TextEmbedder for BagOfWordsEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> TrendGraphResult<Vec<Vec<f32>>> {
        let vocabulary = self.vocabulary(texts);
        Ok(texts
            .iter()
            .map(|text| self.embed_with(&vocabulary, text))
            .collect())
    }

    fn model_name(&self) -> &str {
        "bag-of-words"
    }
}

/// Lower-cased alphanumeric words; `-` and `_` are kept inside words.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().filter_map(|word| {
        let word = word
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
            .collect::<String>();
        let word = word.trim_matches('-').to_string();
        if word.is_empty() {
            None
        } else {
            Some(word)
        }
    })
}
