//! Category weights applied to SHAP attributions.

use std::sync::RwLock;

use risk_core::{RiskCategory, RiskError, RiskResult};
use serde::{Deserialize, Serialize};

pub const MIN_WEIGHT: f64 = 0.0;
pub const MAX_WEIGHT: f64 = 2.0;
pub const NEUTRAL_WEIGHT: f64 = 1.0;

/// One weight per risk category, each in `[0, 2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWeights {
    pub supply_demand: f64,
    #[serde(rename = "macro")]
    pub macroeconomic: f64,
    pub financial: f64,
    pub geopolitical: f64,
    pub sentiment: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            supply_demand: NEUTRAL_WEIGHT,
            macroeconomic: NEUTRAL_WEIGHT,
            financial: NEUTRAL_WEIGHT,
            geopolitical: NEUTRAL_WEIGHT,
            sentiment: NEUTRAL_WEIGHT,
        }
    }
}

impl CategoryWeights {
    pub fn get(&self, category: RiskCategory) -> f64 {
        match category {
            RiskCategory::SupplyDemand => self.supply_demand,
            RiskCategory::Macro => self.macroeconomic,
            RiskCategory::Financial => self.financial,
            RiskCategory::Geopolitical => self.geopolitical,
            RiskCategory::Sentiment => self.sentiment,
        }
    }

    /// Weight for a stored category code; unknown codes are neutral.
    pub fn for_code(&self, code: &str) -> f64 {
        RiskCategory::parse(code).map_or(NEUTRAL_WEIGHT, |c| self.get(c))
    }

    /// Check every weight in category order and report the first one out of range.
    pub fn validate(&self) -> RiskResult<()> {
        for category in RiskCategory::ORDER {
            let w = self.get(category);
            // NaN fails the range check
            if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&w) {
                return Err(RiskError::invalid(format!(
                    "{} weight must be between {} and {}",
                    category.weight_field(),
                    MIN_WEIGHT,
                    MAX_WEIGHT
                )));
            }
        }
        Ok(())
    }
}

/// Shared, replace-as-a-whole weight state.
///
/// Readers always observe one complete weight set: updates swap all five
/// values under a single write lock. Last writer wins.
#[derive(Debug, Default)]
pub struct WeightConfig {
    current: RwLock<CategoryWeights>,
}

impl WeightConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a configured weight set, rejecting out-of-range values.
    pub fn with_weights(weights: CategoryWeights) -> RiskResult<Self> {
        weights.validate()?;
        Ok(Self {
            current: RwLock::new(weights),
        })
    }

    /// Weight for a category code. Unknown categories return 1.0.
    pub fn get(&self, category: &str) -> f64 {
        self.snapshot().for_code(category)
    }

    pub fn weight(&self, category: RiskCategory) -> f64 {
        self.snapshot().get(category)
    }

    pub fn snapshot(&self) -> CategoryWeights {
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace all five weights. On any out-of-range value nothing changes.
    pub fn set(&self, weights: CategoryWeights) -> RiskResult<()> {
        if let Err(e) = weights.validate() {
            tracing::warn!(error = %e, "Rejected weight update");
            return Err(e);
        }
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = weights;
        tracing::info!(?weights, "Category weights updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights(values: [f64; 5]) -> CategoryWeights {
        CategoryWeights {
            supply_demand: values[0],
            macroeconomic: values[1],
            financial: values[2],
            geopolitical: values[3],
            sentiment: values[4],
        }
    }

    #[test]
    fn test_defaults_are_neutral() {
        let config = WeightConfig::new();
        for c in RiskCategory::ORDER {
            assert_eq!(config.weight(c), 1.0);
        }
    }

    #[test]
    fn test_unknown_category_is_neutral() {
        let config = WeightConfig::new();
        config.set(weights([2.0, 2.0, 2.0, 2.0, 2.0])).unwrap();
        assert_eq!(config.get("WEATHER"), 1.0);
        assert_eq!(config.get("MACRO"), 2.0);
    }

    #[test]
    fn test_update_is_all_or_nothing() {
        let config = WeightConfig::new();
        let before = config.snapshot();

        let err = config.set(weights([0.5, 1.5, 2.5, 0.0, 1.0])).unwrap_err();
        assert_eq!(
            err,
            RiskError::InvalidInput("financial weight must be between 0 and 2".to_string())
        );
        assert_eq!(config.snapshot(), before);
    }

    #[test]
    fn test_first_failing_field_is_named() {
        let err = weights([-0.1, 3.0, 1.0, 1.0, 1.0]).validate().unwrap_err();
        assert!(err.to_string().starts_with("supplyDemand"));

        let err = weights([1.0, 1.0, 1.0, 1.0, f64::NAN]).validate().unwrap_err();
        assert!(err.to_string().starts_with("sentiment"));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let config = WeightConfig::new();
        config.set(weights([0.0, 2.0, 0.0, 2.0, 1.0])).unwrap();
        assert_eq!(config.weight(RiskCategory::Macro), 2.0);
        assert_eq!(config.weight(RiskCategory::SupplyDemand), 0.0);
    }

    #[test]
    fn test_macro_field_serializes_as_macro() {
        let json = serde_json::to_value(CategoryWeights::default()).unwrap();
        assert!(json.get("macro").is_some());
        assert!(json.get("supplyDemand").is_some());
    }

    #[test]
    fn test_independent_configs() {
        let a = WeightConfig::new();
        let b = WeightConfig::with_weights(weights([0.5; 5])).unwrap();
        a.set(weights([2.0; 5])).unwrap();
        assert_eq!(b.weight(RiskCategory::Sentiment), 0.5);
        assert!(WeightConfig::with_weights(weights([5.0; 5])).is_err());
    }
}
