//! Header masking.
//!
//! Two policies, chosen per [`Masker`]:
//!
//! - [`MaskPolicy::Key`] (default): a header whose **name** contains a
//!   sensitive word has its whole value replaced by [`MASKED`].
//! - [`MaskPolicy::Value`]: every occurrence of a sensitive word inside a
//!   **value** is replaced by [`MASKED`]; the rest of the value is kept.
//!
//! Matching is a case-sensitive substring test. Masking never mutates its
//! input.
//!
//! Under the value policy, words that occur inside [`MASKED`] itself (for
//! example `MASK`) are skipped, so masking an already masked value changes
//! nothing.

use crate::headers::HeaderMap;

/// Replacement text for redacted content.
pub const MASKED: &str = "***MASKED***";

/// Words masked by [`Masker::default`].
pub const DEFAULT_SENSITIVE_WORDS: [&str; 4] = ["password", "secret", "token", "Authorization"];

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MaskPolicy {
    #[default]
    Key,
    Value,
}

/// A fixed word list paired with a policy.
#[derive(Clone, Debug)]
pub struct Masker {
    words: Vec<String>,
    policy: MaskPolicy,
}

impl Masker {
    pub fn new<I, S>(words: I, policy: MaskPolicy) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words = words.into_iter().map(Into::into).filter(|w: &String| !w.is_empty()).collect();
        Self { words, policy }
    }

    pub fn mask(&self, headers: &HeaderMap) -> HeaderMap {
        match self.policy {
            MaskPolicy::Key => mask_keys(headers, &self.words),
            MaskPolicy::Value => mask_values(headers, &self.words),
        }
    }
}

impl Default for Masker {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVE_WORDS, MaskPolicy::Key)
    }
}

/// Masks the whole value of every header whose name contains a word.
pub fn mask_keys<S: AsRef<str>>(headers: &HeaderMap, words: &[S]) -> HeaderMap {
    headers
        .iter()
        .map(|(name, value)| {
            let sensitive = words
                .iter()
                .map(AsRef::as_ref)
                .any(|w| !w.is_empty() && name.contains(w));
            let value = if sensitive { MASKED.to_owned() } else { value.clone() };
            (name.clone(), value)
        })
        .collect()
}

/// Replaces every occurrence of a word inside each value. Words contained
/// in [`MASKED`] are skipped.
pub fn mask_values<S: AsRef<str>>(headers: &HeaderMap, words: &[S]) -> HeaderMap {
    headers
        .iter()
        .map(|(name, value)| {
            let masked = words
                .iter()
                .map(AsRef::as_ref)
                // Also drops "", which matches everywhere.
                .filter(|w| !MASKED.contains(w))
                .fold(value.clone(), |acc, word| {
                    if acc.contains(word) { acc.replace(word, MASKED) } else { acc }
                });
            (name.clone(), masked)
        })
        .collect()
}
