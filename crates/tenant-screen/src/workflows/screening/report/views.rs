use serde::Serialize;

use super::super::domain::QualityCategory;

/// Headline metrics of a filtered view compared with the whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_tenants: usize,
    pub dataset_tenants: usize,
    /// Filtered count minus dataset count (zero or negative).
    pub tenant_delta: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_score_delta: Option<f64>,
    pub excellent_count: usize,
    pub excellent_pct: f64,
    pub reliable_payers: usize,
    pub reliable_payers_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: QualityCategory,
    pub category_label: &'static str,
    pub count: usize,
}

/// Average quality score of one slice of tenants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupAverage {
    pub group: &'static str,
    pub count: usize,
    pub average_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmploymentImpact {
    pub employed_average: f64,
    pub unemployed_average: f64,
    pub difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeSplit {
    pub median_monthly_income: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at_or_above_median: Option<GroupAverage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub below_median: Option<GroupAverage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationLevel {
    Priority,
    Strong,
    HighRisk,
}

impl RecommendationLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Priority => "Priority Tenants (Score 80+)",
            Self::Strong => "Strong Tenants (Score 70-79)",
            Self::HighRisk => "High Risk Tenants (Score <50)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub level: RecommendationLevel,
    pub level_label: &'static str,
    pub count: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreeningInsights {
    pub total_tenants: usize,
    pub category_counts: Vec<CategoryCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_impact: Option<EmploymentImpact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income_split: Option<IncomeSplit>,
    pub age_groups: Vec<GroupAverage>,
    pub credit_bands: Vec<GroupAverage>,
    pub recommendations: Vec<Recommendation>,
}
