use crate::models::BoostFloor;

/// How a rule's threshold is compared against a directional score
#[derive(Debug, Clone, Copy, PartialEq)]
enum Threshold {
    AtLeast(f64),
    Above(f64),
}

impl Threshold {
    #[inline]
    fn met_by(self, score: f64) -> bool {
        match self {
            Threshold::AtLeast(t) => score >= t,
            Threshold::Above(t) => score > t,
        }
    }
}

/// Whether both directions or either direction must clear the threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quantifier {
    Both,
    Either,
}

#[derive(Debug, Clone, Copy)]
struct BoostRule {
    kind: BoostFloor,
    quantifier: Quantifier,
    threshold: Threshold,
    floor: f64,
}

impl BoostRule {
    fn applies(&self, offer_to_want: f64, want_to_offer: f64) -> bool {
        let a = self.threshold.met_by(offer_to_want);
        let b = self.threshold.met_by(want_to_offer);
        match self.quantifier {
            Quantifier::Both => a && b,
            Quantifier::Either => a || b,
        }
    }
}

/// Evaluated top to bottom; the first applicable rule wins.
/// The rules overlap, so the order is part of the policy.
const BOOST_RULES: [BoostRule; 5] = [
    BoostRule {
        kind: BoostFloor::BothNearExact,
        quantifier: Quantifier::Both,
        threshold: Threshold::AtLeast(0.95),
        floor: 0.8,
    },
    BoostRule {
        kind: BoostFloor::BothStrong,
        quantifier: Quantifier::Both,
        threshold: Threshold::AtLeast(0.8),
        floor: 0.7,
    },
    BoostRule {
        kind: BoostFloor::OneNearExact,
        quantifier: Quantifier::Either,
        threshold: Threshold::AtLeast(0.95),
        floor: 0.6,
    },
    BoostRule {
        kind: BoostFloor::OneStrong,
        quantifier: Quantifier::Either,
        threshold: Threshold::AtLeast(0.8),
        floor: 0.5,
    },
    BoostRule {
        kind: BoostFloor::AnyOverlap,
        quantifier: Quantifier::Either,
        threshold: Threshold::Above(0.0),
        floor: 0.3,
    },
];

/// First boost rule matching the two directional scores, with its floor
pub fn boost_floor(offer_to_want: f64, want_to_offer: f64) -> Option<(BoostFloor, f64)> {
    BOOST_RULES
        .iter()
        .find(|rule| rule.applies(offer_to_want, want_to_offer))
        .map(|rule| (rule.kind, rule.floor))
}

/// Raise `total` to the applicable floor
///
/// Returns the new total and the floor that raised it, if one did.
pub fn apply_boost(total: f64, offer_to_want: f64, want_to_offer: f64) -> (f64, Option<BoostFloor>) {
    match boost_floor(offer_to_want, want_to_offer) {
        Some((kind, floor)) if total < floor => (floor, Some(kind)),
        _ => (total, None),
    }
}
