use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{EmploymentStatus, FactorKind, QualityCategory, ScoredTenantRecord};

/// Invalid filter or sort specification. The query is rejected as a whole.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("unknown {context} field '{field}'")]
    UnknownField {
        context: &'static str,
        field: String,
    },
    #[error("malformed range for {field}: {reason}")]
    MalformedRange {
        field: String,
        reason: &'static str,
    },
    #[error("unknown {field} value '{value}'")]
    UnknownValue { field: &'static str, value: String },
}

/// Inclusive numeric bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl NumericRange {
    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    fn check(&self, field: &str) -> Result<(), QueryError> {
        let malformed = |reason| QueryError::MalformedRange {
            field: field.to_string(),
            reason,
        };
        if self.min.is_some_and(|min| !min.is_finite())
            || self.max.is_some_and(|max| !max.is_finite())
        {
            return Err(malformed("bounds must be finite numbers"));
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(malformed("min is greater than max"));
            }
        }
        Ok(())
    }

    fn contains(&self, value: Option<f64>) -> bool {
        let Some(value) = value else {
            return false;
        };
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// Inclusive date bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl DateRange {
    fn check(&self, field: &str) -> Result<(), QueryError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(QueryError::MalformedRange {
                    field: field.to_string(),
                    reason: "from is after to",
                });
            }
        }
        Ok(())
    }

    fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFilter {
    #[default]
    All,
    /// Every period paid on time, or rent flagged as paid on time when there
    /// is no history.
    OnTimeOnly,
    /// A late or missed period, or a late-payment summary.
    HasLatePayments,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

/// Filters, search and sort for one query. Field and value names stay textual
/// here and are checked when the query runs.
///
/// All active filters are AND-combined. Empty `categories`/`employment` lists
/// and a blank `search` impose nothing. Without `sort` the result is ordered
/// by quality score, highest first. Ties always fall back to tenant_id
/// ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub score: Option<NumericRange>,
    pub tenancy_start: Option<DateRange>,
    /// Extra numeric ranges keyed by field name (see [`NumericField`]).
    pub ranges: BTreeMap<String, NumericRange>,
    pub categories: Vec<String>,
    pub employment: Vec<String>,
    pub payment: PaymentFilter,
    pub search: Option<String>,
    pub sort: Option<SortSpec>,
    /// Keep only the first `limit` rows after sorting.
    pub limit: Option<usize>,
}

/// Numeric fields available to range filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    QualityScore,
    Age,
    MonthlyIncome,
    CreditScore,
    RentAmount,
    PropertyCareRating,
    TenancyMonths,
    SubScore(FactorKind),
}

impl NumericField {
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        let field = match name.as_str() {
            "quality_score" | "score" => Self::QualityScore,
            "age" => Self::Age,
            "monthly_income" | "income" => Self::MonthlyIncome,
            "credit_score" => Self::CreditScore,
            "rent_amount" | "rent" => Self::RentAmount,
            "property_care_rating" => Self::PropertyCareRating,
            "tenancy_months" => Self::TenancyMonths,
            other => {
                let factor_key = other.strip_suffix("_score").unwrap_or(other);
                return FactorKind::parse(factor_key).map(Self::SubScore);
            }
        };
        Some(field)
    }

    pub fn value(self, scored: &ScoredTenantRecord) -> Option<f64> {
        let record = &scored.record;
        match self {
            Self::QualityScore => Some(scored.quality_score),
            Self::Age => record.age.map(f64::from),
            Self::MonthlyIncome => record.monthly_income,
            Self::CreditScore => record.credit_score.map(f64::from),
            Self::RentAmount => Some(record.rent_amount),
            Self::PropertyCareRating => Some(record.property_care_rating),
            Self::TenancyMonths => Some(scored.tenancy_months),
            Self::SubScore(factor) => scored.sub_score(factor),
        }
    }
}

/// Fields available for ordering results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    QualityScore,
    TenantId,
    Name,
    Age,
    MonthlyIncome,
    CreditScore,
    RentAmount,
    TenancyStart,
    TenancyMonths,
}

impl SortField {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "quality_score" | "score" => Some(Self::QualityScore),
            "tenant_id" => Some(Self::TenantId),
            "name" => Some(Self::Name),
            "age" => Some(Self::Age),
            "monthly_income" | "income" => Some(Self::MonthlyIncome),
            "credit_score" => Some(Self::CreditScore),
            "rent_amount" | "rent" => Some(Self::RentAmount),
            "tenancy_start" => Some(Self::TenancyStart),
            "tenancy_months" => Some(Self::TenancyMonths),
            _ => None,
        }
    }

    fn compare(
        self,
        direction: SortDirection,
        a: &ScoredTenantRecord,
        b: &ScoredTenantRecord,
    ) -> Ordering {
        let numeric = |field: NumericField| {
            compare_present_first(field.value(a), field.value(b), direction, f64::total_cmp)
        };

        match self {
            Self::QualityScore => numeric(NumericField::QualityScore),
            Self::Age => numeric(NumericField::Age),
            Self::MonthlyIncome => numeric(NumericField::MonthlyIncome),
            Self::CreditScore => numeric(NumericField::CreditScore),
            Self::RentAmount => numeric(NumericField::RentAmount),
            Self::TenancyMonths => numeric(NumericField::TenancyMonths),
            Self::TenantId => direction.apply(a.tenant_id().cmp(b.tenant_id())),
            Self::TenancyStart => {
                direction.apply(a.record.tenancy_start.cmp(&b.record.tenancy_start))
            }
            Self::Name => compare_present_first(
                a.record.name.as_deref().map(str::to_lowercase),
                b.record.name.as_deref().map(str::to_lowercase),
                direction,
                |x, y| x.cmp(y),
            ),
        }
    }
}

/// Missing values sort after present ones regardless of direction.
fn compare_present_first<T>(
    a: Option<T>,
    b: Option<T>,
    direction: SortDirection,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => direction.apply(cmp(&a, &b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

struct CompiledQuery {
    ranges: Vec<(NumericField, NumericRange)>,
    tenancy_start: Option<DateRange>,
    categories: Vec<QualityCategory>,
    employment: Vec<EmploymentStatus>,
    payment: PaymentFilter,
    needle: Option<String>,
    sort_field: SortField,
    direction: SortDirection,
    limit: Option<usize>,
}

impl CompiledQuery {
    fn compile(criteria: &FilterCriteria) -> Result<Self, QueryError> {
        let mut ranges = Vec::new();
        if let Some(score) = criteria.score {
            score.check("quality_score")?;
            ranges.push((NumericField::QualityScore, score));
        }
        for (name, range) in &criteria.ranges {
            let field = NumericField::parse(name).ok_or_else(|| QueryError::UnknownField {
                context: "range",
                field: name.clone(),
            })?;
            range.check(name)?;
            ranges.push((field, *range));
        }

        if let Some(dates) = &criteria.tenancy_start {
            dates.check("tenancy_start")?;
        }

        let categories = criteria
            .categories
            .iter()
            .map(|value| {
                QualityCategory::parse(value).ok_or_else(|| QueryError::UnknownValue {
                    field: "category",
                    value: value.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let employment = criteria
            .employment
            .iter()
            .map(|value| {
                EmploymentStatus::parse(value).ok_or_else(|| QueryError::UnknownValue {
                    field: "employment_status",
                    value: value.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (sort_field, direction) = match &criteria.sort {
            Some(spec) => {
                let field = SortField::parse(&spec.field).ok_or_else(|| {
                    QueryError::UnknownField {
                        context: "sort",
                        field: spec.field.clone(),
                    }
                })?;
                (field, spec.direction)
            }
            None => (SortField::QualityScore, SortDirection::Descending),
        };

        let needle = criteria
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase);

        Ok(Self {
            ranges,
            tenancy_start: criteria.tenancy_start,
            categories,
            employment,
            payment: criteria.payment,
            needle,
            sort_field,
            direction,
            limit: criteria.limit,
        })
    }

    fn matches(&self, scored: &ScoredTenantRecord) -> bool {
        let record = &scored.record;

        if !self
            .ranges
            .iter()
            .all(|(field, range)| range.contains(field.value(scored)))
        {
            return false;
        }

        if let Some(dates) = &self.tenancy_start {
            if !dates.contains(record.tenancy_start) {
                return false;
            }
        }

        if !self.categories.is_empty() && !self.categories.contains(&scored.category) {
            return false;
        }

        if !self.employment.is_empty() && !self.employment.contains(&record.employment_status) {
            return false;
        }

        let payment_ok = match self.payment {
            PaymentFilter::All => true,
            PaymentFilter::OnTimeOnly => record.is_reliable_payer(),
            PaymentFilter::HasLatePayments => record.has_late_payments(),
        };
        if !payment_ok {
            return false;
        }

        match &self.needle {
            Some(needle) => {
                record.tenant_id.0.to_lowercase().contains(needle)
                    || record
                        .name
                        .as_deref()
                        .is_some_and(|name| name.to_lowercase().contains(needle))
            }
            None => true,
        }
    }

    fn compare(&self, a: &ScoredTenantRecord, b: &ScoredTenantRecord) -> Ordering {
        self.sort_field
            .compare(self.direction, a, b)
            .then_with(|| a.tenant_id().cmp(b.tenant_id()))
    }
}

/// Filters, searches and orders scored records without touching the input.
pub fn query(
    records: &[ScoredTenantRecord],
    criteria: &FilterCriteria,
) -> Result<Vec<ScoredTenantRecord>, QueryError> {
    let compiled = CompiledQuery::compile(criteria)?;

    let mut selected: Vec<&ScoredTenantRecord> = records
        .iter()
        .filter(|scored| compiled.matches(scored))
        .collect();
    selected.sort_by(|a, b| compiled.compare(a, b));
    if let Some(limit) = compiled.limit {
        selected.truncate(limit);
    }

    Ok(selected.into_iter().cloned().collect())
}
