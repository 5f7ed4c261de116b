use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::super::domain::FactorKind;
use super::ScoringConfigError;

/// Weighting and fallback configuration consumed by the scoring engine.
///
/// Example JSON:
/// ```json
/// {
///   "weights": { "payment_reliability": 30, "property_care": 25, "financial_stability": 15,
///                "tenancy_length": 20, "references": 5, "conduct": 5 },
///   "defaults": { "property_care_rating": 5.0, "payment_reliability": 50.0 },
///   "target_income_ratio": 3.0
/// }
/// ```
///
/// Factors absent from `weights` carry no weight. Weights need not sum to 100;
/// the composite divides by their total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    pub weights: BTreeMap<String, f64>,
    pub defaults: DefaultValues,
    /// Monthly income / rent ratio that earns the full affordability score.
    pub target_income_ratio: f64,
    /// Credit score that earns nothing.
    pub credit_floor: f64,
    /// Credit score from which the full credit score is earned.
    pub credit_top_band: f64,
    /// Tenancy length (months) that earns the full tenancy score.
    pub tenancy_cap_months: f64,
    /// Decimal places kept on quality and sub-scores.
    pub precision: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: FactorKind::ordered()
                .into_iter()
                .map(|factor| (factor.key().to_string(), default_weight(factor)))
                .collect(),
            defaults: DefaultValues::default(),
            target_income_ratio: 3.0,
            credit_floor: 300.0,
            credit_top_band: 750.0,
            tenancy_cap_months: 36.0,
            precision: 1,
        }
    }
}

impl ScoringConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ScoringConfigError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|source| ScoringConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ScoringConfigError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Checks weights, defaults and tuning values without building an engine.
    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        super::validation::validate(self).map(|_| ())
    }
}

/// Fallback values for fields missing from the source data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultValues {
    /// Neutral midpoint of the 0-10 care scale.
    pub property_care_rating: f64,
    /// Sub-score for tenants without payment history, so new tenants are not penalized.
    pub payment_reliability: f64,
    /// Sub-score used whenever a factor has nothing to judge.
    pub neutral_score: f64,
    /// Fixed monthly income fallback; `None` uses the population median.
    pub monthly_income: Option<f64>,
    /// Fixed credit score fallback; `None` uses the population median.
    pub credit_score: Option<f64>,
}

impl Default for DefaultValues {
    fn default() -> Self {
        Self {
            property_care_rating: 5.0,
            payment_reliability: 50.0,
            neutral_score: 50.0,
            monthly_income: None,
            credit_score: None,
        }
    }
}

pub const fn default_weight(factor: FactorKind) -> f64 {
    match factor {
        FactorKind::PaymentReliability => 30.0,
        FactorKind::PropertyCare => 25.0,
        FactorKind::FinancialStability => 15.0,
        FactorKind::TenancyLength => 20.0,
        FactorKind::References => 5.0,
        FactorKind::Conduct => 5.0,
    }
}
