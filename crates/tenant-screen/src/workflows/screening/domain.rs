use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Average Gregorian month length, used to express tenancy duration in months.
pub(crate) const DAYS_PER_MONTH: f64 = 30.4375;

/// Identifier wrapper for a tenant row. Unique within a dataset.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TenantId(pub String);

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a single rent period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    OnTime,
    Late,
    Missed,
}

impl PaymentStatus {
    pub const fn token(self) -> &'static str {
        match self {
            Self::OnTime => "on_time",
            Self::Late => "late",
            Self::Missed => "missed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "on_time" | "ontime" | "paid" | "yes" | "y" | "o" => Some(Self::OnTime),
            "late" | "l" => Some(Self::Late),
            "missed" | "unpaid" | "no" | "n" | "m" => Some(Self::Missed),
            _ => None,
        }
    }

    pub const fn is_on_time(self) -> bool {
        matches!(self, Self::OnTime)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    FullTime,
    PartTime,
    SelfEmployed,
    Contract,
    Student,
    Retired,
    Unemployed,
    Unknown,
}

impl EmploymentStatus {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::FullTime,
            Self::PartTime,
            Self::SelfEmployed,
            Self::Contract,
            Self::Student,
            Self::Retired,
            Self::Unemployed,
            Self::Unknown,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::FullTime => "Full-time",
            Self::PartTime => "Part-time",
            Self::SelfEmployed => "Self-employed",
            Self::Contract => "Contract",
            Self::Student => "Student",
            Self::Retired => "Retired",
            Self::Unemployed => "Unemployed",
            Self::Unknown => "Unknown",
        }
    }

    /// Accepts labels and snake_case keys alike ("Full-time", "full_time", "FULL TIME").
    pub fn parse(value: &str) -> Option<Self> {
        let compact: String = value
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        match compact.as_str() {
            "fulltime" | "employed" | "ft" => Some(Self::FullTime),
            "parttime" | "pt" => Some(Self::PartTime),
            "selfemployed" | "freelance" | "freelancer" => Some(Self::SelfEmployed),
            "contract" | "contractor" | "temporary" => Some(Self::Contract),
            "student" => Some(Self::Student),
            "retired" => Some(Self::Retired),
            "unemployed" => Some(Self::Unemployed),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

/// Room cleanliness grade from inspection notes; only used to derive a care rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cleanliness {
    Excellent,
    Good,
    Average,
    Poor,
}

impl Cleanliness {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "excellent" => Some(Self::Excellent),
            "good" => Some(Self::Good),
            "average" => Some(Self::Average),
            "poor" => Some(Self::Poor),
            _ => None,
        }
    }

    pub const fn care_rating(self) -> f64 {
        match self {
            Self::Excellent => 10.0,
            Self::Good => 7.0,
            Self::Average => 4.0,
            Self::Poor => 1.0,
        }
    }
}

/// Fully typed tenant row produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantRecord {
    pub tenant_id: TenantId,
    pub name: Option<String>,
    pub age: Option<u8>,
    pub employment_status: EmploymentStatus,
    pub monthly_income: Option<f64>,
    pub credit_score: Option<u16>,
    pub rent_amount: f64,
    /// Oldest period first.
    pub payment_history: Vec<PaymentStatus>,
    pub property_care_rating: f64,
    pub damage_to_property: Option<bool>,
    pub noise_complaints: Option<u32>,
    pub eviction_notice: Option<bool>,
    pub reference_score: Option<f64>,
    pub tenancy_start: NaiveDate,
    pub tenancy_end: Option<NaiveDate>,
    /// Dashboard summary of payment behaviour, used when there is no
    /// per-period history.
    pub rent_paid_on_time: Option<bool>,
    pub late_payments: Option<u32>,
    pub employment_years: Option<f64>,
    /// Financial values a scoring run filled in because the tenant declared
    /// none. Carried through exports so a re-import scores the same way.
    pub imputed_monthly_income: Option<f64>,
    pub imputed_credit_score: Option<f64>,
}

impl TenantRecord {
    /// Length of the tenancy up to its end date, or up to `as_of` while ongoing.
    pub fn tenancy_months(&self, as_of: NaiveDate) -> f64 {
        let end = self.tenancy_end.unwrap_or(as_of);
        let days = (end - self.tenancy_start).num_days().max(0);
        days as f64 / DAYS_PER_MONTH
    }

    pub fn on_time_payments(&self) -> usize {
        self.payment_history
            .iter()
            .filter(|status| status.is_on_time())
            .count()
    }

    /// `None` when there is no history to judge.
    pub fn on_time_ratio(&self) -> Option<f64> {
        if self.payment_history.is_empty() {
            return None;
        }
        Some(self.on_time_payments() as f64 / self.payment_history.len() as f64)
    }

    /// Judged on the payment history when there is one, otherwise on the
    /// dashboard's "rent paid on time" flag.
    pub fn is_reliable_payer(&self) -> bool {
        if self.payment_history.is_empty() {
            return self.rent_paid_on_time == Some(true);
        }
        self.payment_history.iter().all(|status| status.is_on_time())
    }

    pub fn has_late_payments(&self) -> bool {
        if self.payment_history.is_empty() {
            return self.rent_paid_on_time == Some(false)
                || self.late_payments.is_some_and(|count| count > 0);
        }
        self.payment_history
            .iter()
            .any(|status| !status.is_on_time())
    }
}

/// Factors contributing to the composite quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    PaymentReliability,
    PropertyCare,
    FinancialStability,
    TenancyLength,
    References,
    Conduct,
}

impl FactorKind {
    pub const COUNT: usize = 6;

    pub const fn ordered() -> [Self; Self::COUNT] {
        [
            Self::PaymentReliability,
            Self::PropertyCare,
            Self::FinancialStability,
            Self::TenancyLength,
            Self::References,
            Self::Conduct,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::PaymentReliability => "payment_reliability",
            Self::PropertyCare => "property_care",
            Self::FinancialStability => "financial_stability",
            Self::TenancyLength => "tenancy_length",
            Self::References => "references",
            Self::Conduct => "conduct",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PaymentReliability => "Payment Reliability",
            Self::PropertyCare => "Property Care",
            Self::FinancialStability => "Financial Stability",
            Self::TenancyLength => "Tenancy Length",
            Self::References => "References",
            Self::Conduct => "Conduct",
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn parse(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ordered()
            .into_iter()
            .find(|factor| factor.key().eq_ignore_ascii_case(key))
    }

    /// Column name used for this factor in exports and query ranges.
    pub fn score_column(self) -> String {
        format!("{}_score", self.key())
    }
}

/// Banding of the quality score used for screening recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityCategory {
    Excellent,
    VeryGood,
    Good,
    Average,
    Poor,
}

impl QualityCategory {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Excellent,
            Self::VeryGood,
            Self::Good,
            Self::Average,
            Self::Poor,
        ]
    }

    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Excellent
        } else if score >= 70.0 {
            Self::VeryGood
        } else if score >= 60.0 {
            Self::Good
        } else if score >= 50.0 {
            Self::Average
        } else {
            Self::Poor
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::VeryGood => "very_good",
            Self::Good => "good",
            Self::Average => "average",
            Self::Poor => "poor",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent (Premium)",
            Self::VeryGood => "Very Good",
            Self::Good => "Good",
            Self::Average => "Average",
            Self::Poor => "Poor (High Risk)",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ordered().into_iter().find(|category| {
            category.key().eq_ignore_ascii_case(value) || category.label().eq_ignore_ascii_case(value)
        })
    }
}

/// Discrete contribution to a quality score, kept for transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: FactorKind,
    /// Sub-score in `[0, 100]`.
    pub score: f64,
    pub weight: f64,
    pub notes: String,
}

/// A tenant record together with its derived score. Rescoring builds a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTenantRecord {
    pub record: TenantRecord,
    pub quality_score: f64,
    pub category: QualityCategory,
    pub tenancy_months: f64,
    pub components: Vec<ScoreComponent>,
}

impl ScoredTenantRecord {
    pub fn tenant_id(&self) -> &TenantId {
        &self.record.tenant_id
    }

    pub fn sub_score(&self, factor: FactorKind) -> Option<f64> {
        self.components
            .iter()
            .find(|component| component.factor == factor)
            .map(|component| component.score)
    }

    pub fn sub_scores(&self) -> BTreeMap<FactorKind, f64> {
        self.components
            .iter()
            .map(|component| (component.factor, component.score))
            .collect()
    }
}
