use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Backtest request as received on the wire.
///
/// Every field is optional so validation can report which one is missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestRequest {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Models whose predictions can be replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BacktestModel {
    #[serde(rename = "XGBoost")]
    XgBoost,
    #[serde(rename = "ARIMA")]
    Arima,
    #[serde(rename = "LSTM")]
    Lstm,
}

impl BacktestModel {
    pub const ALL: [BacktestModel; 3] = [BacktestModel::XgBoost, BacktestModel::Arima, BacktestModel::Lstm];

    pub fn as_str(&self) -> &'static str {
        match self {
            BacktestModel::XgBoost => "XGBoost",
            BacktestModel::Arima => "ARIMA",
            BacktestModel::Lstm => "LSTM",
        }
    }

    /// Maximum relative prediction error, as a fraction.
    pub fn noise_amplitude(&self) -> f64 {
        match self {
            BacktestModel::XgBoost => 0.05,
            BacktestModel::Arima => 0.08,
            BacktestModel::Lstm => 0.06,
        }
    }
}

impl fmt::Display for BacktestModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BacktestModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown model: {s}"))
    }
}

/// Outcome of a backtest run. Derived on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub model: String,
    pub dates: Vec<String>,
    /// Recorded oil prices
    pub actual: Vec<Decimal>,
    /// Simulated predictions, 2 decimals
    pub predicted: Vec<Decimal>,
    pub mae: Decimal,
    pub hit_rate: Decimal,
    pub false_alarm_rate: Decimal,
    pub direction_accuracy: Decimal,
}
