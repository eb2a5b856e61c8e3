use crate::core::signal::Signal;
use crate::models::Profile;

/// Passes through the candidate's stored reliability value
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustScorer;

impl TrustScorer {
    pub fn score(&self, _subject: &Profile, candidate: &Profile) -> Signal {
        match candidate.trust {
            Some(trust) => Signal::value(trust),
            None => Signal::Unavailable("no trust score"),
        }
    }
}
