//! Raw value generation rules.

use crate::error::{Result, SamplingError};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

/// A rule producing raw values confined to some region of the input space.
pub trait ValueRule<T> {
    /// Draw one value.
    fn draw(&self, rng: &mut dyn RngCore) -> T;

    /// Whether `value` lies in the region this rule draws from.
    fn contains(&self, value: &T) -> bool;
}

/// Category generation rule as written in a catalog document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationRule {
    /// Inclusive integer range.
    Range { min: i64, max: i64 },
    /// Integers with a digit count in `min_digits..=max_digits` and no
    /// leading zero, negated when `negative` is set.
    Digits {
        min_digits: u32,
        max_digits: u32,
        #[serde(default)]
        negative: bool,
    },
}

impl GenerationRule {
    /// Inclusive bounds of the values this rule can produce.
    pub fn bounds(&self) -> (i64, i64) {
        match *self {
            GenerationRule::Range { min, max } => (min, max),
            GenerationRule::Digits {
                min_digits,
                max_digits,
                negative,
            } => {
                let low = 10i64.pow(min_digits.saturating_sub(1));
                let high = 10i64.pow(max_digits) - 1;
                if negative {
                    (-high, -low)
                } else {
                    (low, high)
                }
            }
        }
    }

    /// Reject rules that cannot produce a value.
    pub fn validate(&self) -> Result<()> {
        match *self {
            GenerationRule::Range { min, max } if min > max => Err(SamplingError::config(
                format!("range rule has min {min} greater than max {max}"),
            )),
            GenerationRule::Digits {
                min_digits,
                max_digits,
                ..
            } if min_digits == 0 || min_digits > max_digits || max_digits > 18 => {
                Err(SamplingError::config(format!(
                    "digits rule {min_digits}..={max_digits} must satisfy 1 <= min <= max <= 18"
                )))
            }
            _ => Ok(()),
        }
    }
}

impl ValueRule<i64> for GenerationRule {
    fn draw(&self, rng: &mut dyn RngCore) -> i64 {
        let (low, high) = self.bounds();
        rng.gen_range(low..=high)
    }

    fn contains(&self, value: &i64) -> bool {
        let (low, high) = self.bounds();
        (low..=high).contains(value)
    }
}

/// Uniform magnitude in `0..=max` with an independent fair-coin sign.
///
/// Zero can come out of either branch, so the distribution over the signed
/// range is symmetric but puts twice the weight on zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedMagnitude {
    pub max: i64,
}

impl SignedMagnitude {
    pub fn new(max: i64) -> Self {
        SignedMagnitude { max }
    }
}

impl ValueRule<i64> for SignedMagnitude {
    fn draw(&self, rng: &mut dyn RngCore) -> i64 {
        let negative = rng.gen_bool(0.5);
        let magnitude = rng.gen_range(0..=self.max);
        if negative {
            -magnitude
        } else {
            magnitude
        }
    }

    fn contains(&self, value: &i64) -> bool {
        value.checked_abs().is_some_and(|abs| abs <= self.max)
    }
}
