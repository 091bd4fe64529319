// ============================================================
// Layer 3 — Vocabulary
// ============================================================
// Word-level token <-> index mapping fitted once over the
// normalized corpus and never mutated afterwards.
//
// Index layout:
//   0                  padding (left-fill for short queries, no token)
//   1                  <OOV>   (every token outside the retained top-N)
//   2 ..= max_tokens+1 retained tokens, most frequent first
//
// Both directions are built together in `fit` and stored as two
// plain maps, so lookups never insert anything.
//
// Reference: Rust Book §8 (HashMap), serde `try_from`/`into`

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::error::PipelineError;

/// Index used to left-pad contexts shorter than the window.
pub const PAD_INDEX: u32 = 0;

/// Reserved index for out-of-vocabulary tokens.
pub const OOV_INDEX: u32 = 1;

/// Token stored at `OOV_INDEX`.
pub const OOV_TOKEN: &str = "<OOV>";

const FIRST_TOKEN_INDEX: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "VocabularyFile", into = "VocabularyFile")]
pub struct Vocabulary {
    max_tokens:     usize,
    token_to_index: HashMap<String, u32>,
    index_to_token: BTreeMap<u32, String>,
}

impl Vocabulary {
    /// Fit a vocabulary over a token stream, keeping at most
    /// `max_tokens` tokens ranked by descending frequency.
    /// Equal counts keep the order in which the tokens first appeared.
    pub fn fit<'a, I>(tokens: I, max_tokens: usize) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut first_seen: Vec<&str>        = Vec::new();

        for token in tokens {
            if token.is_empty() || token == OOV_TOKEN {
                continue;
            }
            let count = counts.entry(token).or_insert(0);
            if *count == 0 {
                first_seen.push(token);
            }
            *count += 1;
        }

        // sort_by is stable: ties stay in first-occurrence order
        first_seen.sort_by(|a, b| counts[b].cmp(&counts[a]));
        first_seen.truncate(max_tokens);

        let mut token_to_index = HashMap::with_capacity(first_seen.len() + 1);
        let mut index_to_token = BTreeMap::new();

        token_to_index.insert(OOV_TOKEN.to_string(), OOV_INDEX);
        index_to_token.insert(OOV_INDEX, OOV_TOKEN.to_string());

        for (token, index) in first_seen.into_iter().zip(FIRST_TOKEN_INDEX..) {
            token_to_index.insert(token.to_string(), index);
            index_to_token.insert(index, token.to_string());
        }

        tracing::debug!(
            "Vocabulary fitted: {} tokens kept (cap {})",
            index_to_token.len() - 1,
            max_tokens
        );

        Self { max_tokens, token_to_index, index_to_token }
    }

    /// Fit over a normalized corpus. Periods separate tokens just
    /// like whitespace, so no token ever carries one.
    pub fn fit_corpus(corpus: &str, max_tokens: usize) -> Self {
        Self::fit(corpus_tokens(corpus), max_tokens)
    }

    /// Index of a token, `OOV_INDEX` if it was not retained.
    pub fn index_of(&self, token: &str) -> u32 {
        self.token_to_index.get(token).copied().unwrap_or(OOV_INDEX)
    }

    /// Reverse lookup. `None` for the padding index and any index
    /// outside the fitted range.
    pub fn token(&self, index: u32) -> Option<&str> {
        self.index_to_token.get(&index).map(String::as_str)
    }

    /// Whitespace-split `text` and map every token to its index.
    pub fn encode(&self, text: &str) -> Vec<u32> {
        text.split_whitespace().map(|t| self.index_of(t)).collect()
    }

    /// Number of mapping entries: retained tokens plus the OOV entry.
    pub fn len(&self) -> usize {
        self.token_to_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Width of the model's output layer (highest index + 1).
    pub fn class_count(&self) -> usize {
        self.index_to_token
            .keys()
            .next_back()
            .map_or(FIRST_TOKEN_INDEX as usize, |&last| last as usize + 1)
    }

    /// (token, index) pairs in index order, OOV first.
    pub fn entries(&self) -> impl Iterator<Item = (&str, u32)> {
        self.index_to_token.iter().map(|(&i, t)| (t.as_str(), i))
    }
}

/// Split normalized text into vocabulary tokens.
pub fn corpus_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c == '.' || c.is_whitespace())
        .filter(|t| !t.is_empty())
}

// ─── JSON representation ──────────────────────────────────────────────────────
// Both directions are written out so a consumer in another runtime
// does not have to invert the map itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VocabularyFile {
    oov_token:  String,
    max_tokens: usize,
    word_index: BTreeMap<String, u32>,
    index_word: BTreeMap<u32, String>,
}

impl From<Vocabulary> for VocabularyFile {
    fn from(v: Vocabulary) -> Self {
        Self {
            oov_token:  OOV_TOKEN.to_string(),
            max_tokens: v.max_tokens,
            word_index: v.token_to_index.into_iter().collect(),
            index_word: v.index_to_token,
        }
    }
}

impl TryFrom<VocabularyFile> for Vocabulary {
    type Error = PipelineError;

    fn try_from(file: VocabularyFile) -> Result<Self, Self::Error> {
        let invalid = |msg: String| PipelineError::InvalidVocabulary(msg);

        if file.oov_token != OOV_TOKEN {
            return Err(invalid(format!(
                "expected OOV token '{OOV_TOKEN}', found '{}'",
                file.oov_token
            )));
        }
        if file.word_index.get(OOV_TOKEN) != Some(&OOV_INDEX) {
            return Err(invalid(format!("'{OOV_TOKEN}' must map to index {OOV_INDEX}")));
        }
        if file.word_index.len() != file.index_word.len() {
            return Err(invalid(format!(
                "wordIndex has {} entries but indexWord has {}",
                file.word_index.len(),
                file.index_word.len()
            )));
        }
        if file.index_word.contains_key(&PAD_INDEX) {
            return Err(invalid(format!("index {PAD_INDEX} is reserved for padding")));
        }
        if file.word_index.len() > file.max_tokens + 1 {
            return Err(invalid(format!(
                "{} entries exceed the cap of {} tokens",
                file.word_index.len() - 1,
                file.max_tokens
            )));
        }
        for (token, index) in &file.word_index {
            if file.index_word.get(index) != Some(token) {
                return Err(invalid(format!("'{token}' -> {index} has no matching reverse entry")));
            }
        }

        Ok(Self {
            max_tokens:     file.max_tokens,
            token_to_index: file.word_index.into_iter().collect(),
            index_to_token: file.index_word,
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_most_frequent_token_gets_lowest_index() {
        let v = Vocabulary::fit_corpus("b a a c a b", 10);
        assert_eq!(v.index_of("a"), 2);
        assert_eq!(v.index_of("b"), 3);
        assert_eq!(v.index_of("c"), 4);
    }

    #[test]
    fn test_ties_keep_first_occurrence_order() {
        let v = Vocabulary::fit_corpus("zebra apfel zebra apfel mond", 10);
        assert_eq!(v.index_of("zebra"), 2);
        assert_eq!(v.index_of("apfel"), 3);
        assert_eq!(v.index_of("mond"),  4);
    }

    #[test]
    fn test_cap_bounds_entries_and_collapses_overflow_to_oov() {
        let v = Vocabulary::fit_corpus("a a a b b c d e", 2);
        // N tokens + the OOV entry
        assert_eq!(v.len(), 3);
        assert_eq!(v.index_of("c"), OOV_INDEX);
        assert_eq!(v.encode("a e b"), vec![2, OOV_INDEX, 3]);
        assert_eq!(v.class_count(), 4);
    }

    #[test]
    fn test_periods_split_tokens() {
        let v = Vocabulary::fit_corpus("ende. anfang", 10);
        assert_eq!(v.token(2), Some("ende"));
        assert_eq!(v.token(3), Some("anfang"));
    }

    #[test]
    fn test_reverse_lookup() {
        let v = Vocabulary::fit_corpus("hallo welt", 10);
        assert_eq!(v.token(PAD_INDEX), None);
        assert_eq!(v.token(OOV_INDEX), Some(OOV_TOKEN));
        assert_eq!(v.token(2), Some("hallo"));
        assert_eq!(v.token(99), None);
    }

    #[test]
    fn test_empty_corpus_gives_only_oov() {
        let v = Vocabulary::fit_corpus("", 10);
        assert!(v.is_empty());
        assert_eq!(v.class_count(), 2);
    }

    #[test]
    fn test_json_round_trip() {
        let v    = Vocabulary::fit_corpus("der die das der", 100);
        let json = serde_json::to_string(&v).unwrap();
        assert!(json.contains("\"wordIndex\""));
        assert!(json.contains("\"indexWord\""));
        let back: Vocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn test_rejects_inconsistent_maps() {
        let json = r#"{
            "oovToken": "<OOV>",
            "maxTokens": 10,
            "wordIndex": {"<OOV>": 1, "hallo": 2},
            "indexWord": {"1": "<OOV>", "2": "welt"}
        }"#;
        assert!(serde_json::from_str::<Vocabulary>(json).is_err());
    }

    #[test]
    fn test_rejects_padding_entry() {
        let json = r#"{
            "oovToken": "<OOV>",
            "maxTokens": 10,
            "wordIndex": {"<OOV>": 1, "hallo": 0},
            "indexWord": {"1": "<OOV>", "0": "hallo"}
        }"#;
        assert!(serde_json::from_str::<Vocabulary>(json).is_err());
    }
}
