/// Score substituted for a signal that cannot be computed
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Outcome of one sub-scorer
///
/// Sub-scorers never fail. When they lack the data to say anything they return
/// `Unavailable`, and the caller substitutes [`NEUTRAL_SCORE`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    Value(f64),
    Unavailable(&'static str),
}

impl Signal {
    /// Wrap a raw score, clamping to [0, 1]; non-finite input is unavailable
    pub fn value(score: f64) -> Self {
        if score.is_finite() {
            Signal::Value(clamp_unit(score))
        } else {
            Signal::Unavailable("non-finite score")
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Signal::Value(_))
    }

    pub fn or_neutral(&self) -> f64 {
        self.or(NEUTRAL_SCORE)
    }

    pub fn or(&self, default: f64) -> f64 {
        match *self {
            Signal::Value(v) => v,
            Signal::Unavailable(_) => default,
        }
    }
}

/// Clamp to [0, 1], mapping NaN to 0
#[inline]
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_is_clamped() {
        assert_eq!(Signal::value(1.7), Signal::Value(1.0));
        assert_eq!(Signal::value(-0.2), Signal::Value(0.0));
        assert!(!Signal::value(f64::NAN).is_available());
    }

    #[test]
    fn test_neutral_default() {
        assert_eq!(Signal::Unavailable("no data").or_neutral(), 0.5);
        assert_eq!(Signal::Value(0.25).or_neutral(), 0.25);
    }
}
