use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{RiskError, RiskResult};
use crate::level::RiskLevel;

/// Risk factor category used to group attributions on the radar chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskCategory {
    SupplyDemand,
    Macro,
    Financial,
    Geopolitical,
    Sentiment,
}

impl RiskCategory {
    /// Fixed display order of the radar axes.
    pub const ORDER: [RiskCategory; 5] = [
        RiskCategory::SupplyDemand,
        RiskCategory::Macro,
        RiskCategory::Financial,
        RiskCategory::Geopolitical,
        RiskCategory::Sentiment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::SupplyDemand => "SUPPLY_DEMAND",
            RiskCategory::Macro => "MACRO",
            RiskCategory::Financial => "FINANCIAL",
            RiskCategory::Geopolitical => "GEOPOLITICAL",
            RiskCategory::Sentiment => "SENTIMENT",
        }
    }

    /// Human-readable axis label.
    pub fn label(&self) -> &'static str {
        match self {
            RiskCategory::SupplyDemand => "Supply & Demand",
            RiskCategory::Macro => "Macroeconomy",
            RiskCategory::Financial => "Financial Markets",
            RiskCategory::Geopolitical => "Geopolitics",
            RiskCategory::Sentiment => "Market Sentiment",
        }
    }

    /// Field name used by the weight update payload.
    pub fn weight_field(&self) -> &'static str {
        match self {
            RiskCategory::SupplyDemand => "supplyDemand",
            RiskCategory::Macro => "macro",
            RiskCategory::Financial => "financial",
            RiskCategory::Geopolitical => "geopolitical",
            RiskCategory::Sentiment => "sentiment",
        }
    }

    /// Parse a stored category code. Unknown codes yield `None`.
    pub fn parse(code: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|c| c.as_str() == code)
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown risk category: {s}"))
    }
}

/// Daily risk index and oil price observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskSample {
    pub date: NaiveDate,
    /// 0 to 100
    pub risk_index: Decimal,
    /// Level label as recorded upstream; re-derive with [`RiskSample::level`].
    #[serde(default)]
    pub risk_level: Option<String>,
    pub oil_price: Decimal,
}

impl RiskSample {
    pub fn new(date: NaiveDate, risk_index: Decimal, oil_price: Decimal) -> Self {
        Self {
            date,
            risk_index,
            risk_level: Some(RiskLevel::from_index(risk_index).as_str().to_string()),
            oil_price,
        }
    }

    pub fn level(&self) -> RiskLevel {
        RiskLevel::from_index(self.risk_index)
    }

    /// Stored samples must have `0 <= risk_index <= 100` and a positive price.
    pub fn validate(&self) -> RiskResult<()> {
        if self.risk_index < Decimal::ZERO || self.risk_index > Decimal::ONE_HUNDRED {
            return Err(RiskError::invalid(format!(
                "riskIndex must be between 0 and 100, got {} on {}",
                self.risk_index, self.date
            )));
        }
        if self.oil_price <= Decimal::ZERO {
            return Err(RiskError::invalid(format!(
                "oilPrice must be positive, got {} on {}",
                self.oil_price, self.date
            )));
        }
        Ok(())
    }
}

/// Per-factor attribution for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorSample {
    pub date: NaiveDate,
    pub factor_name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Category code as stored, e.g. `"MACRO"`.
    pub category: String,
    pub value: Decimal,
    /// Signed SHAP contribution; magnitude is the influence strength.
    pub shap_value: Decimal,
}

impl FactorSample {
    pub fn abs_shap(&self) -> Decimal {
        self.shap_value.abs()
    }

    pub fn category(&self) -> Option<RiskCategory> {
        RiskCategory::parse(&self.category)
    }
}

/// Factor as presented to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorView {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub shap: Decimal,
    pub category: String,
}

impl From<&FactorSample> for FactorView {
    fn from(f: &FactorSample) -> Self {
        Self {
            name: f.factor_name.clone(),
            display_name: f.display_name.clone(),
            shap: f.shap_value,
            category: f.category.clone(),
        }
    }
}

/// Alert record produced upstream by the monitoring job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: i64,
    pub date: NaiveDate,
    pub level: String,
    pub risk_index: Decimal,
    pub trigger_type: Option<String>,
    pub trigger_factor: Option<String>,
    #[serde(default, alias = "triggerFactorZh")]
    pub trigger_factor_display_name: Option<String>,
    pub summary: Option<String>,
    pub summary_en: Option<String>,
    /// JSON array of trigger rules, optional enrichment.
    #[serde(skip_serializing)]
    pub detail: Option<String>,
    pub ai_report: Option<String>,
}

/// One rule that fired for an alert, parsed from [`Alert::detail`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerRule {
    #[serde(default)]
    pub rule_type: Option<String>,
    #[serde(default)]
    pub factor: Option<String>,
    #[serde(default, alias = "factorZh")]
    pub factor_display_name: Option<String>,
    #[serde(default)]
    pub current_value: Option<Decimal>,
    #[serde(default)]
    pub threshold: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertSort {
    Date,
    RiskIndex,
}

impl AlertSort {
    pub fn column(&self) -> &'static str {
        match self {
            AlertSort::Date => "date",
            AlertSort::RiskIndex => "risk_index",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Sanitized alert page request handed to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertPageQuery {
    pub offset: i64,
    pub limit: i64,
    pub level: Option<RiskLevel>,
    pub sort: AlertSort,
    pub order: SortOrder,
}

/// One page of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub total: i64,
    pub page: i64,
    pub size: i64,
    pub records: Vec<T>,
}
