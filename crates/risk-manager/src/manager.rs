use std::sync::Arc;

use chrono::NaiveDate;
use risk_core::rounding::round_half_up;
use risk_core::{FactorView, RiskError, RiskLevel, RiskResult, RiskStore};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use timeseries::{TimeseriesAssembler, TimeseriesView};

use crate::models::*;
use crate::radar::{RadarScore, RadarScorer};
use crate::weights::{CategoryWeights, WeightConfig};

/// Factors reported alongside a risk snapshot.
pub const TOP_FACTORS: usize = 5;

/// Risk dashboard services over a [`RiskStore`].
pub struct RiskManager {
    store: Arc<dyn RiskStore>,
    scorer: RadarScorer,
    assembler: TimeseriesAssembler,
}

impl RiskManager {
    pub fn new(store: Arc<dyn RiskStore>, weights: Arc<WeightConfig>) -> Self {
        Self {
            store,
            scorer: RadarScorer::new(weights),
            assembler: TimeseriesAssembler::default(),
        }
    }

    pub fn with_assembler(mut self, assembler: TimeseriesAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn store(&self) -> &Arc<dyn RiskStore> {
        &self.store
    }

    pub fn weights(&self) -> CategoryWeights {
        self.scorer.weights().snapshot()
    }

    /// Latest risk index with its five strongest factors.
    pub async fn current_risk(&self) -> RiskResult<CurrentRisk> {
        let latest = self
            .store
            .latest_risk_sample()
            .await?
            .ok_or_else(|| RiskError::not_found("No risk data available"))?;

        let top_factors = self
            .store
            .top_factors_by_abs_shap(latest.date, TOP_FACTORS)
            .await?;

        Ok(CurrentRisk {
            risk_index: latest.risk_index,
            risk_level: latest.level(),
            date: latest.date.format("%Y-%m-%d").to_string(),
            top_factors: top_factors.iter().map(FactorView::from).collect(),
        })
    }

    /// Radar scores for `date`, or for the latest date with factor data.
    pub async fn radar_scores(&self, date: Option<NaiveDate>) -> RiskResult<Vec<RadarScore>> {
        let date = match date {
            Some(d) => d,
            None => self
                .store
                .latest_factor_date()
                .await?
                .ok_or_else(|| RiskError::not_found("No factor data available"))?,
        };

        let factors = self.store.factors_for_date(date).await?;
        if factors.is_empty() {
            return Err(RiskError::not_found(format!("No factor data for date: {date}")));
        }

        tracing::info!(%date, factors = factors.len(), "Computing radar scores");
        Ok(self.scorer.score(&factors))
    }

    /// Every factor recorded for `date`, in stored order.
    pub async fn explain(&self, date: NaiveDate) -> RiskResult<Vec<FactorView>> {
        let factors = self.store.factors_for_date(date).await?;
        Ok(factors.iter().map(FactorView::from).collect())
    }

    /// Store new weights and re-apply them to the latest risk sample.
    ///
    /// Invalid weights are rejected before anything changes. The stored
    /// weights stay updated even if there is no risk sample or factor data
    /// to re-score.
    pub async fn update_weights(&self, weights: CategoryWeights) -> RiskResult<WeightUpdateResult> {
        self.scorer.weights().set(weights)?;

        let latest = self
            .store
            .latest_risk_sample()
            .await?
            .ok_or_else(|| RiskError::not_found("No risk data available"))?;

        let factors = self.store.factors_for_date(latest.date).await?;
        if factors.is_empty() {
            return Err(RiskError::not_found(format!(
                "No factor data for date: {}",
                latest.date
            )));
        }

        let (weighted, unweighted) = factors.iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(weighted, unweighted), f| {
                let w = Decimal::from_f64(weights.for_code(&f.category)).unwrap_or(Decimal::ONE);
                (weighted + f.abs_shap() * w, unweighted + f.abs_shap())
            },
        );
        let ratio = if unweighted.is_zero() {
            Decimal::ONE
        } else {
            weighted / unweighted
        };

        let adjusted = (latest.risk_index * ratio).clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
        let risk_index = round_half_up(adjusted, 2);

        tracing::info!(
            date = %latest.date,
            original = %latest.risk_index,
            adjusted = %risk_index,
            "Re-scored latest risk sample"
        );

        let radar_scores = self.scorer.score(&factors);
        let top_factors = self
            .store
            .top_factors_by_abs_shap(latest.date, TOP_FACTORS)
            .await?;

        Ok(WeightUpdateResult {
            risk_index,
            risk_level: RiskLevel::from_index(risk_index),
            radar_scores,
            top_factors: top_factors.iter().map(FactorView::from).collect(),
        })
    }

    /// Chart series for a date range, downsampled above the configured ceiling.
    pub async fn timeseries(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> RiskResult<TimeseriesView> {
        let (start, end) = TimeseriesAssembler::resolve_range(start, end, today);

        let samples = self.store.risk_samples_between(start, end).await?;
        let alerts = self.store.alerts_between(start, end).await?;

        tracing::info!(%start, %end, samples = samples.len(), alerts = alerts.len(), "Assembling timeseries");
        Ok(self.assembler.assemble(&samples, &alerts))
    }
}
