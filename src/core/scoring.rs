use crate::core::boost::apply_boost;
use crate::core::signal::{clamp_unit, Signal};
use crate::models::{MatchScore, WeightVector};

/// Raw per-signal outcomes for one (subject, candidate) pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalScores {
    pub offer_to_want: f64,
    pub want_to_offer: f64,
    pub geo: Signal,
    pub language: Signal,
    pub trust: Signal,
}

/// Combine the five signals into a bounded compatibility score
///
/// Scoring formula:
/// total = (
///     offer_to_want * w1 +     # subject's offers vs candidate's wants
///     want_to_offer * w2 +     # candidate's offers vs subject's wants
///     geo * w3 +               # proximity, 0.5 when unknown
///     language * w4 +          # shared languages, 0.5 when unknown
///     trust * w5               # stored reliability, 0.5 when unknown
/// )
///
/// The boost floor is applied to the weighted sum, then the total is clamped to [0, 1].
pub fn calculate_match_score(signals: &SignalScores, weights: &WeightVector) -> MatchScore {
    let weights = weights.sanitized();

    let offer_to_want = clamp_unit(signals.offer_to_want);
    let want_to_offer = clamp_unit(signals.want_to_offer);
    let geo = signals.geo.or_neutral();
    let language = signals.language.or_neutral();
    let trust = signals.trust.or_neutral();

    let weighted = offer_to_want * weights.offer_to_want
        + want_to_offer * weights.want_to_offer
        + geo * weights.geo
        + language * weights.language
        + trust * weights.trust;

    let (boosted, boost) = apply_boost(weighted, offer_to_want, want_to_offer);

    MatchScore {
        offer_to_want,
        want_to_offer,
        geo,
        language,
        trust,
        total: clamp_unit(boosted),
        weights,
        boost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoostFloor;

    fn signals(offer_to_want: f64, want_to_offer: f64) -> SignalScores {
        SignalScores {
            offer_to_want,
            want_to_offer,
            geo: Signal::Value(1.0),
            language: Signal::Value(1.0),
            trust: Signal::Value(1.0),
        }
    }

    #[test]
    fn test_weighted_sum() {
        let score = calculate_match_score(&signals(0.5, 0.5), &WeightVector::default());
        // 0.3*0.5 + 0.3*0.5 + 0.15 + 0.15 + 0.10 = 0.7, above the 0.3 floor
        assert!((score.total - 0.7).abs() < 1e-9);
        assert_eq!(score.boost, None);
    }

    #[test]
    fn test_unavailable_signals_are_neutral() {
        let s = SignalScores {
            offer_to_want: 0.0,
            want_to_offer: 0.0,
            geo: Signal::Unavailable("missing location"),
            language: Signal::Unavailable("no languages declared"),
            trust: Signal::Unavailable("no trust score"),
        };
        let score = calculate_match_score(&s, &WeightVector::default());
        assert_eq!(score.geo, 0.5);
        assert_eq!(score.language, 0.5);
        assert_eq!(score.trust, 0.5);
        assert!((score.total - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_boost_overrides_weights() {
        let weights = WeightVector {
            offer_to_want: 0.0,
            want_to_offer: 0.0,
            geo: 0.0,
            language: 0.0,
            trust: 0.0,
        };
        let score = calculate_match_score(&signals(1.0, 0.97), &weights);
        assert_eq!(score.total, 0.8);
        assert_eq!(score.boost, Some(BoostFloor::BothNearExact));
    }

    #[test]
    fn test_total_clamped_for_large_weights() {
        let weights = WeightVector {
            offer_to_want: 10.0,
            want_to_offer: 10.0,
            geo: 10.0,
            language: 10.0,
            trust: 10.0,
        };
        let score = calculate_match_score(&signals(0.9, 0.9), &weights);
        assert_eq!(score.total, 1.0);
    }

    #[test]
    fn test_components_clamped() {
        let score = calculate_match_score(&signals(1.4, -0.3), &WeightVector::default());
        assert_eq!(score.offer_to_want, 1.0);
        assert_eq!(score.want_to_offer, 0.0);
        assert!(score.total >= 0.0 && score.total <= 1.0);
    }
}
