//! Wake phrase detection

use crate::transcription::Transcript;

/// Ordered, lowercase wake phrases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakePhrases(Vec<String>);

impl WakePhrases {
    /// Normalizes to lowercase and drops blank entries
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            phrases
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        )
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First configured phrase contained in `transcript`
    pub fn detect(&self, transcript: &Transcript) -> Option<&str> {
        let text = transcript.as_str();
        self.0
            .iter()
            .find(|phrase| text.contains(phrase.as_str()))
            .map(String::as_str)
    }

    /// The first phrase as it should be spoken back, e.g. "Hey Jarvis"
    pub fn spoken_name(&self) -> Option<String> {
        let primary = self.0.first()?;
        let words: Vec<String> = primary
            .split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect();
        Some(words.join(" "))
    }
}
