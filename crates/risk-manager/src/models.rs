use risk_core::{Alert, FactorView, RiskLevel, TriggerRule};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::radar::RadarScore;

/// Latest observed risk with its strongest drivers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentRisk {
    pub risk_index: Decimal,
    pub risk_level: RiskLevel,
    pub date: String,
    pub top_factors: Vec<FactorView>,
}

/// Outcome of a weight change re-applied to the latest risk sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightUpdateResult {
    /// Adjusted index, 0 to 100, two decimals
    pub risk_index: Decimal,
    pub risk_level: RiskLevel,
    pub radar_scores: Vec<RadarScore>,
    pub top_factors: Vec<FactorView>,
}

/// Raw alert list parameters as received from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub level: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

/// Alert with its parsed trigger rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDetail {
    #[serde(flatten)]
    pub alert: Alert,
    pub trigger_rules: Vec<TriggerRule>,
}
