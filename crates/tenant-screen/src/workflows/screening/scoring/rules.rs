use chrono::NaiveDate;

use super::super::domain::{FactorKind, TenantRecord};
use super::config::ScoringConfig;

const DAMAGE_PENALTY: f64 = 30.0;
const NOISE_COMPLAINT_PENALTY: f64 = 20.0;
const EVICTION_NOTICE_PENALTY: f64 = 50.0;
const ON_TIME_FLAG_POINTS: f64 = 25.0;
const LATE_COUNT_POINTS: f64 = 5.0;
const FEW_LATE_PAYMENTS: u32 = 2;
const EMPLOYMENT_FULL_CREDIT_YEARS: f64 = 2.0;

/// Population medians used when a record lacks a financial field and no fixed
/// fallback is configured.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PopulationStats {
    pub median_monthly_income: Option<f64>,
    pub median_credit_score: Option<f64>,
}

impl PopulationStats {
    pub fn from_records(records: &[TenantRecord]) -> Self {
        Self {
            median_monthly_income: median(records.iter().filter_map(|r| r.monthly_income)),
            median_credit_score: median(
                records
                    .iter()
                    .filter_map(|r| r.credit_score.map(f64::from)),
            ),
        }
    }
}

pub(crate) fn median(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut values: Vec<f64> = values.filter(|value| value.is_finite()).collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

pub(crate) struct ScoringContext<'a> {
    pub config: &'a ScoringConfig,
    pub population: &'a PopulationStats,
    pub as_of: NaiveDate,
}

/// Sub-score in `[0, 100]` for one factor, with an audit note.
pub(crate) fn sub_score(
    factor: FactorKind,
    record: &TenantRecord,
    ctx: &ScoringContext<'_>,
) -> (f64, String) {
    match factor {
        FactorKind::PaymentReliability => payment_reliability(record, ctx),
        FactorKind::PropertyCare => property_care(record),
        FactorKind::FinancialStability => financial_stability(record, ctx),
        FactorKind::TenancyLength => tenancy_length(record, ctx),
        FactorKind::References => references(record, ctx),
        FactorKind::Conduct => conduct(record, ctx),
    }
}

pub(crate) fn clip(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

fn payment_reliability(record: &TenantRecord, ctx: &ScoringContext<'_>) -> (f64, String) {
    if let Some(ratio) = record.on_time_ratio() {
        return (
            clip(ratio * 100.0),
            format!(
                "{}/{} periods paid on time",
                record.on_time_payments(),
                record.payment_history.len()
            ),
        );
    }
    if record.rent_paid_on_time.is_none() && record.late_payments.is_none() {
        return (
            clip(ctx.config.defaults.payment_reliability),
            "no payment history; neutral default applied".to_string(),
        );
    }

    // Summary columns: an on-time flag worth 25 points and a late-payment
    // count worth 5. A missing half takes the neutral share of its points.
    let neutral = clip(ctx.config.defaults.payment_reliability) / 100.0;
    let (flag_points, flag_note) = match record.rent_paid_on_time {
        Some(true) => (ON_TIME_FLAG_POINTS, "rent paid on time"),
        Some(false) => (0.0, "rent not paid on time"),
        None => (ON_TIME_FLAG_POINTS * neutral, "on-time flag unknown"),
    };
    let (late_points, late_note) = match record.late_payments {
        Some(0) => (LATE_COUNT_POINTS, "no late payments".to_string()),
        Some(count) if count <= FEW_LATE_PAYMENTS => {
            (LATE_COUNT_POINTS * 0.4, format!("{count} late payment(s)"))
        }
        Some(count) => (0.0, format!("{count} late payments")),
        None => (LATE_COUNT_POINTS * neutral, "late payments unknown".to_string()),
    };

    (
        clip((flag_points + late_points) / (ON_TIME_FLAG_POINTS + LATE_COUNT_POINTS) * 100.0),
        format!("{flag_note}; {late_note}"),
    )
}

fn property_care(record: &TenantRecord) -> (f64, String) {
    let mut score = record.property_care_rating * 10.0;
    let mut notes = format!("care rating {:.1}/10", record.property_care_rating);
    if record.damage_to_property == Some(true) {
        score -= DAMAGE_PENALTY;
        notes.push_str("; damage to property reported");
    }
    (clip(score), notes)
}

/// Where a financial value used in scoring came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueSource {
    Declared,
    /// Imputed by an earlier run and carried in the record.
    Carried,
    Configured,
    PopulationMedian,
}

impl ValueSource {
    const fn label(self) -> &'static str {
        match self {
            Self::Declared => "declared",
            Self::Carried => "carried imputation",
            Self::Configured => "configured fallback",
            Self::PopulationMedian => "population median",
        }
    }
}

/// Income and credit values a record is scored with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FinancialBasis {
    pub income: Option<(f64, ValueSource)>,
    pub credit: Option<(f64, ValueSource)>,
}

impl FinancialBasis {
    pub fn resolve(record: &TenantRecord, ctx: &ScoringContext<'_>) -> Self {
        let defaults = &ctx.config.defaults;
        Self {
            income: first_known(
                record.monthly_income,
                record.imputed_monthly_income,
                defaults.monthly_income,
                ctx.population.median_monthly_income,
            ),
            credit: first_known(
                record.credit_score.map(f64::from),
                record.imputed_credit_score,
                defaults.credit_score,
                ctx.population.median_credit_score,
            ),
        }
    }

    pub fn imputed_income(&self) -> Option<f64> {
        imputed(self.income)
    }

    pub fn imputed_credit(&self) -> Option<f64> {
        imputed(self.credit)
    }
}

fn first_known(
    declared: Option<f64>,
    carried: Option<f64>,
    configured: Option<f64>,
    median: Option<f64>,
) -> Option<(f64, ValueSource)> {
    declared
        .map(|value| (value, ValueSource::Declared))
        .or_else(|| carried.map(|value| (value, ValueSource::Carried)))
        .or_else(|| configured.map(|value| (value, ValueSource::Configured)))
        .or_else(|| median.map(|value| (value, ValueSource::PopulationMedian)))
}

fn imputed(value: Option<(f64, ValueSource)>) -> Option<f64> {
    value
        .filter(|(_, source)| *source != ValueSource::Declared)
        .map(|(value, _)| value)
}

fn financial_stability(record: &TenantRecord, ctx: &ScoringContext<'_>) -> (f64, String) {
    let config = ctx.config;
    let neutral = clip(config.defaults.neutral_score);
    let basis = FinancialBasis::resolve(record, ctx);

    let (affordability, affordability_note) = match basis.income {
        Some((income, source)) => {
            let ratio = income / record.rent_amount;
            let score = clip((ratio - 1.0) / (config.target_income_ratio - 1.0) * 100.0);
            (score, format!("income-to-rent {ratio:.2} ({})", source.label()))
        }
        None => (neutral, "income unknown".to_string()),
    };

    let (credit_part, credit_note) = match basis.credit {
        Some((score, source)) => {
            let part = clip(
                (score - config.credit_floor) / (config.credit_top_band - config.credit_floor)
                    * 100.0,
            );
            (part, format!("credit score {score:.0} ({})", source.label()))
        }
        None => (neutral, "credit score unknown".to_string()),
    };

    (
        clip((affordability + credit_part) / 2.0),
        format!("{affordability_note}; {credit_note}"),
    )
}

fn tenancy_length(record: &TenantRecord, ctx: &ScoringContext<'_>) -> (f64, String) {
    let months = record.tenancy_months(ctx.as_of);
    let status = if record.tenancy_end.is_some() {
        "ended"
    } else {
        "ongoing"
    };
    let tenancy = clip(months / ctx.config.tenancy_cap_months * 100.0);
    let notes = format!("{months:.1} months ({status})");

    match record.employment_years {
        // Two parts tenancy, one part time in employment.
        Some(years) => {
            let employment = clip(years / EMPLOYMENT_FULL_CREDIT_YEARS * 100.0);
            (
                clip((2.0 * tenancy + employment) / 3.0),
                format!("{notes}; {years:.1} years in employment"),
            )
        }
        None => (tenancy, notes),
    }
}

fn references(record: &TenantRecord, ctx: &ScoringContext<'_>) -> (f64, String) {
    match record.reference_score {
        Some(score) => (clip(score * 10.0), format!("reference score {score:.1}/10")),
        None => (
            clip(ctx.config.defaults.neutral_score),
            "no references; neutral default applied".to_string(),
        ),
    }
}

fn conduct(record: &TenantRecord, ctx: &ScoringContext<'_>) -> (f64, String) {
    if record.noise_complaints.is_none() && record.eviction_notice.is_none() {
        return (
            clip(ctx.config.defaults.neutral_score),
            "no conduct records; neutral default applied".to_string(),
        );
    }

    let complaints = record.noise_complaints.unwrap_or(0);
    let mut score = 100.0 - NOISE_COMPLAINT_PENALTY * f64::from(complaints);
    let mut notes = format!("{complaints} noise complaint(s)");
    if record.eviction_notice == Some(true) {
        score -= EVICTION_NOTICE_PENALTY;
        notes.push_str("; eviction notice served");
    }
    (clip(score), notes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_handles_odd_even_and_empty_inputs() {
        assert_eq!(median([3.0, 1.0, 2.0].into_iter()), Some(2.0));
        assert_eq!(median([4.0, 1.0, 3.0, 2.0].into_iter()), Some(2.5));
        assert_eq!(median(std::iter::empty()), None);
        assert_eq!(median([f64::NAN].into_iter()), None);
    }

    #[test]
    fn clip_bounds_scores() {
        assert_eq!(clip(-5.0), 0.0);
        assert_eq!(clip(150.0), 100.0);
        assert_eq!(clip(f64::NAN), 0.0);
        assert_eq!(clip(42.5), 42.5);
    }
}
