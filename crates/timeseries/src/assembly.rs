use chrono::{Months, NaiveDate};
use risk_core::{Alert, RiskSample};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::merge::merged_indices;

/// Sample count above which chart series are downsampled.
pub const DEFAULT_LTTB_THRESHOLD: usize = 2000;

/// Default lookback when no start date is given.
const DEFAULT_LOOKBACK_MONTHS: u32 = 24;

/// Chart payload: oil price and risk index on one date axis, plus alert markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeseriesView {
    pub dates: Vec<String>,
    pub oil_price: Vec<Decimal>,
    pub risk_index: Vec<Decimal>,
    pub alerts: Vec<AlertMarker>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertMarker {
    pub date: String,
    pub level: String,
    pub risk_index: Decimal,
}

impl From<&Alert> for AlertMarker {
    fn from(a: &Alert) -> Self {
        Self {
            date: a.date.format("%Y-%m-%d").to_string(),
            level: a.level.clone(),
            risk_index: a.risk_index,
        }
    }
}

/// Builds [`TimeseriesView`]s, downsampling above a sample-count ceiling.
#[derive(Debug, Clone, Copy)]
pub struct TimeseriesAssembler {
    threshold: usize,
}

impl Default for TimeseriesAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_LTTB_THRESHOLD)
    }
}

impl TimeseriesAssembler {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Fill in a missing range: `end` defaults to `today`, `start` to two
    /// years before `end`.
    pub fn resolve_range(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> (NaiveDate, NaiveDate) {
        let end = end.unwrap_or(today);
        let start = start.unwrap_or_else(|| {
            end.checked_sub_months(Months::new(DEFAULT_LOOKBACK_MONTHS))
                .unwrap_or(NaiveDate::MIN)
        });
        (start, end)
    }

    /// `samples` must be ascending by date.
    pub fn assemble(&self, samples: &[RiskSample], alerts: &[Alert]) -> TimeseriesView {
        let keep: Vec<usize> = if samples.len() > self.threshold {
            let oil: Vec<f64> = samples
                .iter()
                .map(|s| s.oil_price.to_f64().unwrap_or(0.0))
                .collect();
            let risk: Vec<f64> = samples
                .iter()
                .map(|s| s.risk_index.to_f64().unwrap_or(0.0))
                .collect();
            let idx = merged_indices(&[&oil, &risk], self.threshold);
            tracing::debug!(
                from = samples.len(),
                to = idx.len(),
                threshold = self.threshold,
                "Downsampled timeseries"
            );
            idx
        } else {
            (0..samples.len()).collect()
        };

        let mut view = TimeseriesView {
            dates: Vec::with_capacity(keep.len()),
            oil_price: Vec::with_capacity(keep.len()),
            risk_index: Vec::with_capacity(keep.len()),
            alerts: alerts.iter().map(AlertMarker::from).collect(),
        };
        for i in keep {
            let s = &samples[i];
            view.dates.push(s.date.format("%Y-%m-%d").to_string());
            view.oil_price.push(s.oil_price);
            view.risk_index.push(s.risk_index);
        }
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn samples(n: usize) -> Vec<RiskSample> {
        let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        (0..n)
            .map(|i| {
                let date = start + chrono::Duration::days(i as i64);
                let risk = Decimal::from((i * 31 % 100) as i64);
                let oil = dec!(60) + Decimal::from((i % 50) as i64);
                RiskSample::new(date, risk, oil)
            })
            .collect()
    }

    #[test]
    fn test_below_ceiling_passes_through() {
        let data = samples(300);
        let view = TimeseriesAssembler::new(300).assemble(&data, &[]);
        assert_eq!(view.dates.len(), 300);
        assert_eq!(view.dates[0], "2000-01-01");
        assert_eq!(view.oil_price[299], data[299].oil_price);
    }

    #[test]
    fn test_above_ceiling_is_merged_and_aligned() {
        let data = samples(3000);
        let view = TimeseriesAssembler::new(100).assemble(&data, &[]);

        assert!(view.dates.len() >= 100 && view.dates.len() <= 200);
        assert_eq!(view.dates.len(), view.oil_price.len());
        assert_eq!(view.dates.len(), view.risk_index.len());
        assert_eq!(view.dates.first().unwrap(), "2000-01-01");
        assert_eq!(
            view.dates.last().unwrap(),
            &data[2999].date.format("%Y-%m-%d").to_string()
        );

        // Every kept triple comes from the same source sample
        for (i, d) in view.dates.iter().enumerate() {
            let src = data
                .iter()
                .find(|s| &s.date.format("%Y-%m-%d").to_string() == d)
                .unwrap();
            assert_eq!(view.oil_price[i], src.oil_price);
            assert_eq!(view.risk_index[i], src.risk_index);
        }
    }

    #[test]
    fn test_alert_markers_carried() {
        let alert = Alert {
            id: 7,
            date: NaiveDate::from_ymd_opt(2000, 1, 5).unwrap(),
            level: "High".to_string(),
            risk_index: dec!(81.5),
            trigger_type: None,
            trigger_factor: None,
            trigger_factor_display_name: None,
            summary: None,
            summary_en: None,
            detail: None,
            ai_report: None,
        };
        let view = TimeseriesAssembler::default().assemble(&samples(10), &[alert]);
        assert_eq!(view.alerts.len(), 1);
        assert_eq!(view.alerts[0].date, "2000-01-05");
        assert_eq!(view.alerts[0].risk_index, dec!(81.5));
    }

    #[test]
    fn test_default_range_is_two_years() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let (start, end) = TimeseriesAssembler::resolve_range(None, None, today);
        assert_eq!(end, today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2022, 2, 28).unwrap());

        let given = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let (start, _) = TimeseriesAssembler::resolve_range(Some(given), None, today);
        assert_eq!(start, given);
    }
}
