use std::collections::HashSet;

use crate::core::signal::Signal;
use crate::models::Profile;

/// Overlap of the languages two profiles speak
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageScorer;

impl LanguageScorer {
    /// Overlap coefficient `|A ∩ B| / min(|A|, |B|)` over normalized language names.
    /// A profile with no usable languages leaves the signal unavailable.
    pub fn score(&self, subject: &Profile, candidate: &Profile) -> Signal {
        let ours = language_set(&subject.languages);
        let theirs = language_set(&candidate.languages);

        if ours.is_empty() || theirs.is_empty() {
            return Signal::Unavailable("no languages declared");
        }

        let shared = ours.intersection(&theirs).count() as f64;
        Signal::value(shared / ours.len().min(theirs.len()) as f64)
    }
}

fn language_set(languages: &[String]) -> HashSet<String> {
    languages
        .iter()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect()
}
