mod config;
mod rules;
mod validation;

pub use config::{default_weight, DefaultValues, ScoringConfig};
pub use rules::PopulationStats;

pub(crate) use rules::median;

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::debug;

use super::domain::{FactorKind, QualityCategory, ScoreComponent, ScoredTenantRecord, TenantRecord};
use super::normalizer::Normalizer;
use rules::{clip, FinancialBasis, ScoringContext};
use validation::FactorWeights;

/// Fatal configuration problem: no record is scored under a malformed config.
#[derive(Debug, thiserror::Error)]
pub enum ScoringConfigError {
    #[error("unknown scoring factor '{key}'")]
    UnknownFactor { key: String },
    #[error("weight for {factor} must be a non-negative finite number (found {weight})")]
    InvalidWeight { factor: &'static str, weight: f64 },
    #[error("at least one scoring factor must carry a positive weight")]
    NoPositiveWeight,
    #[error("default for {field} is out of range (found {value})")]
    InvalidDefault { field: &'static str, value: f64 },
    #[error("scoring setting {setting} is out of range (found {value})")]
    InvalidSetting { setting: &'static str, value: f64 },
    #[error("failed to read scoring config '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scoring config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Deterministic weighted-composite scorer.
///
/// `as_of` stands in for "now" when measuring ongoing tenancies, so the same
/// records always produce the same scores.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
    weights: FactorWeights,
    as_of: NaiveDate,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig, as_of: NaiveDate) -> Result<Self, ScoringConfigError> {
        let weights = validation::validate(&config)?;
        Ok(Self {
            config,
            weights,
            as_of,
        })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    /// Normalizer sharing this engine's field defaults, with `as_of` as the
    /// reference date for tenancies given only as a length in months.
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::from_defaults(&self.config.defaults).with_reference_date(self.as_of)
    }

    pub fn score(
        &self,
        record: &TenantRecord,
        population: &PopulationStats,
    ) -> ScoredTenantRecord {
        let ctx = ScoringContext {
            config: &self.config,
            population,
            as_of: self.as_of,
        };

        let mut weighted_sum = 0.0;
        let components: Vec<ScoreComponent> = FactorKind::ordered()
            .into_iter()
            .map(|factor| {
                let (score, notes) = rules::sub_score(factor, record, &ctx);
                let weight = self.weights.get(factor);
                weighted_sum += weight * score;
                ScoreComponent {
                    factor,
                    score: self.round(score),
                    weight,
                    notes,
                }
            })
            .collect();

        let quality_score = self.round(clip(weighted_sum / self.weights.total()));

        // The scored copy remembers any imputed financials, so exporting a
        // subset does not re-impute from a different population.
        let basis = FinancialBasis::resolve(record, &ctx);
        let mut scored_record = record.clone();
        scored_record.imputed_monthly_income = basis.imputed_income();
        scored_record.imputed_credit_score = basis.imputed_credit();

        ScoredTenantRecord {
            record: scored_record,
            quality_score,
            category: QualityCategory::from_score(quality_score),
            tenancy_months: round_to(record.tenancy_months(self.as_of), 1),
            components,
        }
    }

    /// Scores a whole dataset; population medians are taken from `records`.
    pub fn score_all(&self, records: &[TenantRecord]) -> Vec<ScoredTenantRecord> {
        let population = PopulationStats::from_records(records);
        debug!(
            records = records.len(),
            median_income = ?population.median_monthly_income,
            median_credit = ?population.median_credit_score,
            "scoring tenant dataset"
        );
        records
            .iter()
            .map(|record| self.score(record, &population))
            .collect()
    }

    fn round(&self, value: f64) -> f64 {
        round_to(value, self.config.precision)
    }
}

pub(crate) fn round_to(value: f64, places: u8) -> f64 {
    let factor = 10f64.powi(i32::from(places));
    (value * factor).round() / factor
}
