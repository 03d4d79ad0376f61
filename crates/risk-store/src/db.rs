use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use risk_core::{
    Alert, AlertPageQuery, FactorSample, RiskLevel, RiskResult, RiskSample, RiskStore,
};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// SQLite-backed risk history.
#[derive(Clone)]
pub struct RiskDb {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct RiskRow {
    date: NaiveDate,
    risk_index: f64,
    risk_level: Option<String>,
    oil_price: f64,
}

impl RiskRow {
    fn into_sample(self) -> RiskSample {
        RiskSample {
            date: self.date,
            risk_index: to_decimal(self.risk_index),
            risk_level: self.risk_level,
            oil_price: to_decimal(self.oil_price),
        }
    }
}

#[derive(sqlx::FromRow)]
struct FactorRow {
    date: NaiveDate,
    factor_name: String,
    display_name: Option<String>,
    category: String,
    value: f64,
    shap_value: f64,
}

impl FactorRow {
    fn into_factor(self) -> FactorSample {
        FactorSample {
            date: self.date,
            factor_name: self.factor_name,
            display_name: self.display_name,
            category: self.category,
            value: to_decimal(self.value),
            shap_value: to_decimal(self.shap_value),
        }
    }
}

#[derive(sqlx::FromRow)]
struct AlertRow {
    id: i64,
    date: NaiveDate,
    level: String,
    risk_index: f64,
    trigger_type: Option<String>,
    trigger_factor: Option<String>,
    trigger_factor_display_name: Option<String>,
    summary: Option<String>,
    summary_en: Option<String>,
    detail: Option<String>,
    ai_report: Option<String>,
}

impl AlertRow {
    fn into_alert(self) -> Alert {
        Alert {
            id: self.id,
            date: self.date,
            level: self.level,
            risk_index: to_decimal(self.risk_index),
            trigger_type: self.trigger_type,
            trigger_factor: self.trigger_factor,
            trigger_factor_display_name: self.trigger_factor_display_name,
            summary: self.summary,
            summary_en: self.summary_en,
            detail: self.detail,
            ai_report: self.ai_report,
        }
    }
}

const ALERT_COLUMNS: &str = "id, date, level, risk_index, trigger_type, trigger_factor, \
                             trigger_factor_display_name, summary, summary_en, detail, ai_report";

const FACTOR_COLUMNS: &str = "date, factor_name, display_name, category, value, shap_value";

fn to_decimal(v: f64) -> Decimal {
    Decimal::from_f64(v).unwrap_or_default()
}

fn to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

impl RiskDb {
    /// Connect and create the schema if needed.
    pub async fn new(database_url: &str, max_connections: u32) -> RiskResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every connection to `:memory:` opens its own empty database.
        let max_connections = if database_url.contains(":memory:") {
            1
        } else {
            max_connections.max(1)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.init_schema().await?;

        tracing::info!(database_url, max_connections, "Risk database ready");
        Ok(db)
    }

    async fn init_schema(&self) -> RiskResult<()> {
        let schema = include_str!("../schema.sql");

        // sqlx executes one statement per query
        for statement in schema.split(';') {
            let stmt = statement.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt).execute(&self.pool).await?;
            }
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert or replace the sample for its date. Out-of-range samples are
    /// rejected before touching the database.
    pub async fn upsert_risk_sample(&self, sample: &RiskSample) -> RiskResult<()> {
        sample.validate()?;

        let level = sample
            .risk_level
            .clone()
            .unwrap_or_else(|| sample.level().as_str().to_string());

        sqlx::query(
            r#"
            INSERT INTO risk_index (date, risk_index, risk_level, oil_price)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(date) DO UPDATE SET
                risk_index = excluded.risk_index,
                risk_level = excluded.risk_level,
                oil_price = excluded.oil_price
            "#,
        )
        .bind(sample.date)
        .bind(to_f64(sample.risk_index))
        .bind(level)
        .bind(to_f64(sample.oil_price))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn insert_factor(&self, factor: &FactorSample) -> RiskResult<i64> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO risk_factor (date, factor_name, display_name, category, value, shap_value)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(factor.date)
        .bind(&factor.factor_name)
        .bind(&factor.display_name)
        .bind(&factor.category)
        .bind(to_f64(factor.value))
        .bind(to_f64(factor.shap_value))
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Insert an alert; the record's `id` is ignored and the new id returned.
    pub async fn insert_alert(&self, alert: &Alert) -> RiskResult<i64> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO alert
            (date, level, risk_index, trigger_type, trigger_factor, trigger_factor_display_name,
             summary, summary_en, detail, ai_report)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(alert.date)
        .bind(&alert.level)
        .bind(to_f64(alert.risk_index))
        .bind(&alert.trigger_type)
        .bind(&alert.trigger_factor)
        .bind(&alert.trigger_factor_display_name)
        .bind(&alert.summary)
        .bind(&alert.summary_en)
        .bind(&alert.detail)
        .bind(&alert.ai_report)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }
}

#[async_trait]
impl RiskStore for RiskDb {
    async fn risk_samples_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RiskResult<Vec<RiskSample>> {
        let rows = sqlx::query_as::<_, RiskRow>(
            r#"
            SELECT date, risk_index, risk_level, oil_price
            FROM risk_index
            WHERE date >= ? AND date <= ?
            ORDER BY date ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RiskRow::into_sample).collect())
    }

    async fn latest_risk_sample(&self) -> RiskResult<Option<RiskSample>> {
        let row = sqlx::query_as::<_, RiskRow>(
            "SELECT date, risk_index, risk_level, oil_price FROM risk_index ORDER BY date DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RiskRow::into_sample))
    }

    async fn factors_for_date(&self, date: NaiveDate) -> RiskResult<Vec<FactorSample>> {
        let rows = sqlx::query_as::<_, FactorRow>(&format!(
            "SELECT {FACTOR_COLUMNS} FROM risk_factor WHERE date = ? ORDER BY id ASC"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FactorRow::into_factor).collect())
    }

    async fn latest_factor_date(&self) -> RiskResult<Option<NaiveDate>> {
        let row: Option<(NaiveDate,)> =
            sqlx::query_as("SELECT date FROM risk_factor ORDER BY date DESC LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(d,)| d))
    }

    async fn top_factors_by_abs_shap(
        &self,
        date: NaiveDate,
        n: usize,
    ) -> RiskResult<Vec<FactorSample>> {
        let rows = sqlx::query_as::<_, FactorRow>(&format!(
            "SELECT {FACTOR_COLUMNS} FROM risk_factor WHERE date = ? \
             ORDER BY ABS(shap_value) DESC, id ASC LIMIT ?"
        ))
        .bind(date)
        .bind(n as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FactorRow::into_factor).collect())
    }

    async fn alerts_between(&self, start: NaiveDate, end: NaiveDate) -> RiskResult<Vec<Alert>> {
        let rows = sqlx::query_as::<_, AlertRow>(&format!(
            "SELECT {ALERT_COLUMNS} FROM alert WHERE date >= ? AND date <= ? ORDER BY date ASC, id ASC"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AlertRow::into_alert).collect())
    }

    async fn count_alerts(&self, level: Option<RiskLevel>) -> RiskResult<i64> {
        let level = level.map(|l| l.as_str());
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM alert WHERE (? IS NULL OR level = ?)")
                .bind(level)
                .bind(level)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn alert_page(&self, query: &AlertPageQuery) -> RiskResult<Vec<Alert>> {
        let level = query.level.map(|l| l.as_str());
        // Sort column and direction come from closed enums, never from user text
        let sql = format!(
            "SELECT {ALERT_COLUMNS} FROM alert WHERE (? IS NULL OR level = ?) \
             ORDER BY {} {}, id {} LIMIT ? OFFSET ?",
            query.sort.column(),
            query.order.keyword(),
            query.order.keyword(),
        );

        let rows = sqlx::query_as::<_, AlertRow>(&sql)
            .bind(level)
            .bind(level)
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(AlertRow::into_alert).collect())
    }

    async fn alert_by_id(&self, id: i64) -> RiskResult<Option<Alert>> {
        let row = sqlx::query_as::<_, AlertRow>(&format!(
            "SELECT {ALERT_COLUMNS} FROM alert WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AlertRow::into_alert))
    }
}
