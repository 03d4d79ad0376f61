//! Risk Radar Module
//!
//! Aggregates per-factor SHAP attributions into one normalized 0-100 score
//! per risk category for the radar chart.

use std::sync::Arc;

use risk_core::rounding::round_half_up;
use risk_core::{FactorSample, FactorView, RiskCategory};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::weights::{CategoryWeights, WeightConfig};

/// Factors listed under each radar axis.
pub const TOP_FACTORS_PER_CATEGORY: usize = 3;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// One radar axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarScore {
    pub category: RiskCategory,
    pub label: String,
    /// 0 to 100, one decimal
    pub score: Decimal,
    pub top_factors: Vec<FactorView>,
}

/// Scores one date's factors against the shared weight set.
#[derive(Debug, Clone)]
pub struct RadarScorer {
    weights: Arc<WeightConfig>,
}

impl RadarScorer {
    pub fn new(weights: Arc<WeightConfig>) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &Arc<WeightConfig> {
        &self.weights
    }

    /// Score the factors of a single date.
    ///
    /// Always returns five entries in [`RiskCategory::ORDER`]. The strongest
    /// category scores 100; when every raw score is zero all scores are zero.
    pub fn score(&self, factors: &[FactorSample]) -> Vec<RadarScore> {
        // One snapshot so a concurrent update can't mix weight sets mid-pass
        let weights = self.weights.snapshot();
        score_with(&weights, factors)
    }
}

fn score_with(weights: &CategoryWeights, factors: &[FactorSample]) -> Vec<RadarScore> {
    let raw: Vec<(RiskCategory, Decimal, Vec<FactorView>)> = RiskCategory::ORDER
        .into_iter()
        .map(|category| {
            let members: Vec<&FactorSample> = factors
                .iter()
                .filter(|f| f.category() == Some(category))
                .collect();
            let weight = Decimal::from_f64(weights.get(category)).unwrap_or(Decimal::ONE);
            (
                category,
                raw_score(&members, weight),
                top_factors(&members, TOP_FACTORS_PER_CATEGORY),
            )
        })
        .collect();

    let max_raw = raw
        .iter()
        .map(|(_, r, _)| *r)
        .max()
        .filter(|m| !m.is_zero())
        .unwrap_or(Decimal::ONE);

    raw.into_iter()
        .map(|(category, r, top)| RadarScore {
            category,
            label: category.label().to_string(),
            score: round_half_up(r / max_raw * HUNDRED, 1),
            top_factors: top,
        })
        .collect()
}

/// Mean |shap| of the members times the category weight. No members scores 0.
fn raw_score(members: &[&FactorSample], weight: Decimal) -> Decimal {
    if members.is_empty() {
        return Decimal::ZERO;
    }
    let total: Decimal = members.iter().map(|f| f.abs_shap()).sum();
    total / Decimal::from(members.len()) * weight
}

/// Largest |shap| first; equal magnitudes keep record order.
fn top_factors(members: &[&FactorSample], n: usize) -> Vec<FactorView> {
    let mut sorted = members.to_vec();
    sorted.sort_by(|a, b| b.abs_shap().cmp(&a.abs_shap()));
    sorted.into_iter().take(n).map(FactorView::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn factor(name: &str, category: &str, shap: Decimal) -> FactorSample {
        FactorSample {
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            factor_name: name.to_string(),
            display_name: None,
            category: category.to_string(),
            value: Decimal::ZERO,
            shap_value: shap,
        }
    }

    fn scorer() -> RadarScorer {
        RadarScorer::new(Arc::new(WeightConfig::new()))
    }

    #[test]
    fn test_always_five_in_fixed_order() {
        let scores = scorer().score(&[factor("vix", "FINANCIAL", dec!(0.4))]);
        let order: Vec<_> = scores.iter().map(|s| s.category).collect();
        assert_eq!(order, RiskCategory::ORDER.to_vec());
    }

    #[test]
    fn test_strongest_category_is_hundred() {
        let scores = scorer().score(&[
            factor("inventory", "SUPPLY_DEMAND", dec!(0.8)),
            factor("opec", "SUPPLY_DEMAND", dec!(-0.4)),
            factor("cpi", "MACRO", dec!(0.3)),
            factor("news", "SENTIMENT", dec!(-0.15)),
        ]);

        // SUPPLY_DEMAND mean 0.6, MACRO 0.3, SENTIMENT 0.15
        assert_eq!(scores[0].score, dec!(100));
        assert_eq!(scores[1].score, dec!(50));
        assert_eq!(scores[2].score, Decimal::ZERO);
        assert_eq!(scores[3].score, Decimal::ZERO);
        assert_eq!(scores[4].score, dec!(25));
    }

    #[test]
    fn test_all_zero_when_no_attribution() {
        let scores = scorer().score(&[factor("flat", "MACRO", Decimal::ZERO)]);
        assert!(scores.iter().all(|s| s.score.is_zero()));

        let scores = scorer().score(&[]);
        assert_eq!(scores.len(), 5);
        assert!(scores.iter().all(|s| s.score.is_zero() && s.top_factors.is_empty()));
    }

    #[test]
    fn test_weights_shift_the_maximum() {
        let config = Arc::new(WeightConfig::new());
        let mut w = CategoryWeights::default();
        w.macroeconomic = 2.0;
        config.set(w).unwrap();

        let scores = RadarScorer::new(config).score(&[
            factor("inventory", "SUPPLY_DEMAND", dec!(0.6)),
            factor("cpi", "MACRO", dec!(0.4)),
        ]);

        // MACRO 0.4 * 2 = 0.8 beats SUPPLY_DEMAND 0.6
        assert_eq!(scores[1].score, dec!(100));
        assert_eq!(scores[0].score, dec!(75));
    }

    #[test]
    fn test_score_rounds_half_up_to_one_decimal() {
        let scores = scorer().score(&[
            factor("a", "MACRO", dec!(3)),
            factor("b", "FINANCIAL", dec!(2)),
            factor("c", "GEOPOLITICAL", dec!(0.00195)),
        ]);
        // 2/3 * 100 = 66.666..
        assert_eq!(scores[2].score, dec!(66.7));
        // 0.00195/3 * 100 = 0.065
        assert_eq!(scores[3].score, dec!(0.1));
    }

    #[test]
    fn test_top_three_stable_on_ties() {
        let scores = scorer().score(&[
            factor("first", "GEOPOLITICAL", dec!(0.2)),
            factor("biggest", "GEOPOLITICAL", dec!(-0.9)),
            factor("second", "GEOPOLITICAL", dec!(-0.2)),
            factor("third", "GEOPOLITICAL", dec!(0.2)),
        ]);

        let names: Vec<_> = scores[3]
            .top_factors
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["biggest", "first", "second"]);
    }

    #[test]
    fn test_unknown_category_rows_are_ignored() {
        let scores = scorer().score(&[
            factor("rain", "WEATHER", dec!(5)),
            factor("cpi", "MACRO", dec!(0.1)),
        ]);
        assert_eq!(scores[1].score, dec!(100));
        assert!(scores.iter().all(|s| s.top_factors.iter().all(|f| f.name != "rain")));
    }
}
