use super::super::domain::{EmploymentStatus, QualityCategory, ScoredTenantRecord};
use super::super::scoring::{median, round_to};
use super::summary::mean;
use super::views::{
    CategoryCount, EmploymentImpact, GroupAverage, IncomeSplit, Recommendation,
    RecommendationLevel, ScreeningInsights,
};

const AGE_GROUPS: [(&str, u8, u8); 4] = [
    ("18-25", 0, 25),
    ("26-35", 26, 35),
    ("36-45", 36, 45),
    ("45+", 46, u8::MAX),
];

const CREDIT_BANDS: [(&str, u16, u16); 3] = [
    ("750+", 750, u16::MAX),
    ("650-749", 650, 749),
    ("<650", 0, 649),
];

impl ScreeningInsights {
    pub fn from_records(records: &[ScoredTenantRecord]) -> Self {
        Self {
            total_tenants: records.len(),
            category_counts: category_counts(records),
            employment_impact: employment_impact(records),
            income_split: income_split(records),
            age_groups: bucket_averages(&AGE_GROUPS, records, |scored| scored.record.age),
            credit_bands: bucket_averages(&CREDIT_BANDS, records, |scored| {
                scored.record.credit_score
            }),
            recommendations: recommendations(records),
        }
    }
}

fn category_counts(records: &[ScoredTenantRecord]) -> Vec<CategoryCount> {
    QualityCategory::ordered()
        .into_iter()
        .map(|category| CategoryCount {
            category,
            category_label: category.label(),
            count: records
                .iter()
                .filter(|scored| scored.category == category)
                .count(),
        })
        .collect()
}

/// Only reported when both groups are present.
fn employment_impact(records: &[ScoredTenantRecord]) -> Option<EmploymentImpact> {
    let (unemployed, employed): (Vec<&ScoredTenantRecord>, Vec<&ScoredTenantRecord>) = records
        .iter()
        .partition(|scored| scored.record.employment_status == EmploymentStatus::Unemployed);

    let employed_average = mean(employed.iter().map(|scored| scored.quality_score))?;
    let unemployed_average = mean(unemployed.iter().map(|scored| scored.quality_score))?;
    Some(EmploymentImpact {
        employed_average,
        unemployed_average,
        difference: round_to(employed_average - unemployed_average, 1),
    })
}

fn income_split(records: &[ScoredTenantRecord]) -> Option<IncomeSplit> {
    let with_income: Vec<(f64, f64)> = records
        .iter()
        .filter_map(|scored| {
            scored
                .record
                .monthly_income
                .map(|income| (income, scored.quality_score))
        })
        .collect();
    let median_income = median(with_income.iter().map(|(income, _)| *income))?;

    let group = |label: &'static str, keep: &dyn Fn(f64) -> bool| {
        let scores: Vec<f64> = with_income
            .iter()
            .filter(|(income, _)| keep(*income))
            .map(|(_, score)| *score)
            .collect();
        mean(scores.iter().copied()).map(|average_score| GroupAverage {
            group: label,
            count: scores.len(),
            average_score,
        })
    };

    Some(IncomeSplit {
        median_monthly_income: round_to(median_income, 2),
        at_or_above_median: group("at or above median", &|income| income >= median_income),
        below_median: group("below median", &|income| income < median_income),
    })
}

/// Averages per inclusive bucket, skipping empty buckets and records without a value.
fn bucket_averages<T>(
    buckets: &[(&'static str, T, T)],
    records: &[ScoredTenantRecord],
    value: impl Fn(&ScoredTenantRecord) -> Option<T>,
) -> Vec<GroupAverage>
where
    T: PartialOrd + Copy,
{
    buckets
        .iter()
        .filter_map(|(label, low, high)| {
            let scores: Vec<f64> = records
                .iter()
                .filter(|scored| value(scored).is_some_and(|v| v >= *low && v <= *high))
                .map(|scored| scored.quality_score)
                .collect();
            mean(scores.iter().copied()).map(|average_score| GroupAverage {
                group: *label,
                count: scores.len(),
                average_score,
            })
        })
        .collect()
}

fn recommendations(records: &[ScoredTenantRecord]) -> Vec<Recommendation> {
    let count = |category: QualityCategory| {
        records
            .iter()
            .filter(|scored| scored.category == category)
            .count()
    };

    let priority = count(QualityCategory::Excellent);
    let strong = count(QualityCategory::VeryGood);
    let high_risk = count(QualityCategory::Poor);

    vec![
        Recommendation {
            level: RecommendationLevel::Priority,
            level_label: RecommendationLevel::Priority.label(),
            count: priority,
            message: format!("{priority} available; lowest risk, highest reliability"),
        },
        Recommendation {
            level: RecommendationLevel::Strong,
            level_label: RecommendationLevel::Strong.label(),
            count: strong,
            message: format!("{strong} available; solid choice with minor considerations"),
        },
        Recommendation {
            level: RecommendationLevel::HighRisk,
            level_label: RecommendationLevel::HighRisk.label(),
            count: high_risk,
            message: format!(
                "{high_risk} to avoid; consider additional security or guarantors"
            ),
        },
    ]
}
