use std::sync::Arc;

use chrono::NaiveDate;
use rand::Rng;
use risk_core::rounding::{f64_half_up, round_half_up};
use risk_core::{RiskError, RiskLevel, RiskResult, RiskSample, RiskStore};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::models::*;
use crate::seed::daily_rng;

/// Replays a model's predictions over recorded history.
///
/// Predictions are synthetic: each day's price and risk are perturbed by
/// noise bounded by the model's amplitude, drawn from a generator seeded by
/// (date, model) alone. The same day always gets the same prediction no
/// matter which range it is requested in.
#[derive(Debug, Clone, Copy)]
pub struct BacktestSimulator {
    model: BacktestModel,
}

impl BacktestSimulator {
    pub fn new(model: BacktestModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> BacktestModel {
        self.model
    }

    /// `samples` must be ascending by date.
    pub fn simulate(&self, samples: &[RiskSample]) -> BacktestResult {
        let n = samples.len();
        let amplitude = self.model.noise_amplitude();

        let mut dates = Vec::with_capacity(n);
        let mut actual = Vec::with_capacity(n);
        let mut predicted = Vec::with_capacity(n);
        let mut hits = 0usize;

        for sample in samples {
            let mut rng = daily_rng(sample.date, self.model);
            let price_noise: f64 = rng.gen_range(-amplitude..=amplitude);
            let risk_noise: f64 = rng.gen_range(-amplitude..=amplitude);

            let price = sample.oil_price.to_f64().unwrap_or(0.0);
            let predicted_price = f64_half_up(price * (1.0 + price_noise), 2);

            let risk = sample.risk_index.to_f64().unwrap_or(0.0);
            let predicted_risk = (risk * (1.0 + risk_noise)).clamp(0.0, 100.0);
            if RiskLevel::from_index(sample.risk_index) == RiskLevel::from_f64(predicted_risk) {
                hits += 1;
            }

            dates.push(sample.date.format("%Y-%m-%d").to_string());
            actual.push(sample.oil_price);
            predicted.push(predicted_price);
        }

        let hit_rate = ratio(hits, n);
        BacktestResult {
            model: self.model.as_str().to_string(),
            dates,
            mae: mean_absolute_error(&actual, &predicted),
            hit_rate,
            false_alarm_rate: Decimal::ONE - hit_rate,
            direction_accuracy: direction_accuracy(&actual, &predicted),
            actual,
            predicted,
        }
    }
}

fn ratio(num: usize, den: usize) -> Decimal {
    if den == 0 {
        return Decimal::ZERO;
    }
    round_half_up(Decimal::from(num) / Decimal::from(den), 4)
}

fn mean_absolute_error(actual: &[Decimal], predicted: &[Decimal]) -> Decimal {
    if actual.is_empty() {
        return Decimal::ZERO;
    }
    let total: Decimal = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (*p - *a).abs())
        .sum();
    round_half_up(total / Decimal::from(actual.len()), 2)
}

/// Share of day-over-day moves whose sign the prediction got right.
/// A flat move counts as up.
fn direction_accuracy(actual: &[Decimal], predicted: &[Decimal]) -> Decimal {
    if actual.len() < 2 {
        return Decimal::ZERO;
    }
    let matches = (1..actual.len())
        .filter(|&i| {
            let actual_up = actual[i] - actual[i - 1] >= Decimal::ZERO;
            let predicted_up = predicted[i] - predicted[i - 1] >= Decimal::ZERO;
            actual_up == predicted_up
        })
        .count();
    ratio(matches, actual.len() - 1)
}

/// Check a request in order, reporting the first problem.
pub fn validate(request: &BacktestRequest) -> RiskResult<(NaiveDate, NaiveDate, BacktestModel)> {
    let (start, end) = match (request.start_date, request.end_date) {
        (Some(s), Some(e)) => (s, e),
        _ => return Err(RiskError::invalid("startDate and endDate are required")),
    };
    if start >= end {
        return Err(RiskError::invalid("startDate must be before endDate"));
    }
    let model = request
        .model
        .as_deref()
        .and_then(|m| m.parse::<BacktestModel>().ok())
        .ok_or_else(|| RiskError::invalid("model must be one of: XGBoost, ARIMA, LSTM"))?;
    Ok((start, end, model))
}

/// Runs backtests against stored history.
pub struct BacktestService {
    store: Arc<dyn RiskStore>,
}

impl BacktestService {
    pub fn new(store: Arc<dyn RiskStore>) -> Self {
        Self { store }
    }

    pub async fn run(&self, request: &BacktestRequest) -> RiskResult<BacktestResult> {
        let (start, end, model) = validate(request)?;

        let samples = self.store.risk_samples_between(start, end).await?;
        if samples.is_empty() {
            return Err(RiskError::not_found("No data found for the given date range"));
        }

        let result = BacktestSimulator::new(model).simulate(&samples);
        tracing::info!(
            %model,
            %start,
            %end,
            samples = samples.len(),
            mae = %result.mae,
            hit_rate = %result.hit_rate,
            "Backtest complete"
        );
        Ok(result)
    }
}
