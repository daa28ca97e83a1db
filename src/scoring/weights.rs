use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// How far the raw weight sum may drift from 1.0 before a warning is logged.
const SUM_TOLERANCE: f64 = 0.01;

/// Relative importance of the four component scores in the Affordability Index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub housing: f64,
    pub transit: f64,
    pub social: f64,
    pub grocery: f64,
}

impl Default for ScoreWeights {
    /// 60% housing, 20% transit, 10% daily living, 10% grocery.
    fn default() -> Self {
        Self {
            housing: 0.6,
            transit: 0.2,
            social: 0.1,
            grocery: 0.1,
        }
    }
}

impl ScoreWeights {
    /// Validates the weights: each must be finite and non-negative, and at
    /// least one must be positive.
    pub fn new(housing: f64, transit: f64, social: f64, grocery: f64) -> Result<Self, ConfigError> {
        let weights = Self {
            housing,
            transit,
            social,
            grocery,
        };

        for (name, w) in weights.named() {
            if !w.is_finite() || w < 0.0 {
                return Err(ConfigError::InvalidWeights(format!(
                    "{name} weight must be a non-negative number, got {w}"
                )));
            }
        }
        if weights.sum() <= 0.0 {
            return Err(ConfigError::InvalidWeights(
                "at least one weight must be positive".to_string(),
            ));
        }

        Ok(weights)
    }

    pub fn sum(&self) -> f64 {
        self.housing + self.transit + self.social + self.grocery
    }

    /// Returns the weights scaled to sum to 1.0.
    pub fn normalized(&self) -> Self {
        let sum = self.sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            warn!(sum, "Weights do not sum to 1.0, normalizing");
        }
        if sum <= 0.0 || !sum.is_finite() {
            return Self::default();
        }
        Self {
            housing: self.housing / sum,
            transit: self.transit / sum,
            social: self.social / sum,
            grocery: self.grocery / sum,
        }
    }

    fn named(&self) -> [(&'static str, f64); 4] {
        [
            ("housing", self.housing),
            ("transit", self.transit),
            ("social", self.social),
            ("grocery", self.grocery),
        ]
    }
}
