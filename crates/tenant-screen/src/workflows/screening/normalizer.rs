use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde::Serialize;

use super::domain::{
    Cleanliness, EmploymentStatus, PaymentStatus, TenantId, TenantRecord, DAYS_PER_MONTH,
};
use super::mapping::{column_for_header, TenantColumn};
use super::parser::RawRow;
use super::scoring::DefaultValues;

const MAX_AGE: u8 = 120;
const MAX_CREDIT_SCORE: u16 = 999;
const MAX_RATING: f64 = 10.0;

/// Why a raw row was kept out of the scored dataset.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RowErrorReason {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
    #[error("invalid value for {field}: '{value}' (expected {expected})")]
    InvalidValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("tenancy_end {end} precedes tenancy_start {start}")]
    TenancyEndsBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("duplicate tenant_id: {tenant_id}")]
    DuplicateTenantId { tenant_id: String },
}

/// Non-fatal, per-row normalization failure.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    /// Zero-based position of the row in the normalizer input.
    pub row_index: usize,
    pub tenant_id: Option<String>,
    pub reason: RowErrorReason,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tenant_id {
            Some(id) => write!(f, "row {} ({}): {}", self.row_index, id, self.reason),
            None => write!(f, "row {}: {}", self.row_index, self.reason),
        }
    }
}

impl std::error::Error for RowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.reason)
    }
}

/// Serializable projection of a [`RowError`] for API consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowErrorView {
    pub row_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    pub reason: String,
}

impl RowError {
    pub fn to_view(&self) -> RowErrorView {
        RowErrorView {
            row_index: self.row_index,
            tenant_id: self.tenant_id.clone(),
            reason: self.reason.to_string(),
        }
    }
}

/// Typed records plus the rows that could not be normalized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedDataset {
    pub records: Vec<TenantRecord>,
    pub errors: Vec<RowError>,
}

/// Converts raw rows into validated tenant records, filling documented defaults.
///
/// With a reference date set, rows that give a tenancy length in months
/// instead of a start date are placed that many months before it.
#[derive(Debug, Clone)]
pub struct Normalizer {
    property_care_rating: f64,
    reference_date: Option<NaiveDate>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::from_defaults(&DefaultValues::default())
    }
}

impl Normalizer {
    pub fn from_defaults(defaults: &DefaultValues) -> Self {
        Self {
            property_care_rating: defaults.property_care_rating,
            reference_date: None,
        }
    }

    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn normalize(&self, raw_rows: &[RawRow]) -> NormalizedDataset {
        let mut dataset = NormalizedDataset::default();
        let mut seen: HashSet<String> = HashSet::new();

        for (row_index, row) in raw_rows.iter().enumerate() {
            let cells = RowCells::resolve(row);
            let tenant_id = cells.get(TenantColumn::TenantId).map(str::to_string);

            let outcome = self.normalize_row(&cells).and_then(|record| {
                if seen.insert(record.tenant_id.0.clone()) {
                    Ok(record)
                } else {
                    Err(RowErrorReason::DuplicateTenantId {
                        tenant_id: record.tenant_id.0,
                    })
                }
            });

            match outcome {
                Ok(record) => dataset.records.push(record),
                Err(reason) => dataset.errors.push(RowError {
                    row_index,
                    tenant_id,
                    reason,
                }),
            }
        }

        dataset
    }

    fn normalize_row(&self, cells: &RowCells<'_>) -> Result<TenantRecord, RowErrorReason> {
        let tenant_id = TenantId(cells.required(TenantColumn::TenantId)?.to_string());
        let rent_raw = cells.required(TenantColumn::RentAmount)?;
        let rent_amount = parse_amount(TenantColumn::RentAmount, rent_raw)?;
        if rent_amount <= 0.0 {
            return Err(invalid(
                TenantColumn::RentAmount,
                rent_raw,
                "a positive amount",
            ));
        }
        let tenancy_start = self.tenancy_start(cells)?;
        let tenancy_end = cells
            .get(TenantColumn::TenancyEnd)
            .map(|raw| parse_date(TenantColumn::TenancyEnd, raw))
            .transpose()?;
        if let Some(end) = tenancy_end {
            if end < tenancy_start {
                return Err(RowErrorReason::TenancyEndsBeforeStart {
                    start: tenancy_start,
                    end,
                });
            }
        }

        let age = cells
            .get(TenantColumn::Age)
            .map(|raw| {
                raw.parse::<u8>()
                    .ok()
                    .filter(|age| *age <= MAX_AGE)
                    .ok_or_else(|| {
                        invalid(TenantColumn::Age, raw, "a whole number of years up to 120")
                    })
            })
            .transpose()?;

        let employment_status = cells
            .get(TenantColumn::EmploymentStatus)
            .map(|raw| {
                EmploymentStatus::parse(raw).ok_or_else(|| {
                    invalid(
                        TenantColumn::EmploymentStatus,
                        raw,
                        "full-time, part-time, self-employed, contract, student, retired or unemployed",
                    )
                })
            })
            .transpose()?
            .unwrap_or(EmploymentStatus::Unknown);

        let monthly_income = match cells.get(TenantColumn::MonthlyIncome) {
            Some(raw) => Some(non_negative(TenantColumn::MonthlyIncome, raw)?),
            None => cells
                .get(TenantColumn::AnnualIncome)
                .map(|raw| {
                    non_negative(TenantColumn::AnnualIncome, raw).map(|annual| annual / 12.0)
                })
                .transpose()?,
        };

        let credit_score = cells
            .get(TenantColumn::CreditScore)
            .map(|raw| {
                raw.parse::<u16>()
                    .ok()
                    .filter(|score| *score <= MAX_CREDIT_SCORE)
                    .ok_or_else(|| {
                        invalid(TenantColumn::CreditScore, raw, "a whole number from 0 to 999")
                    })
            })
            .transpose()?;

        let payment_history = cells
            .get(TenantColumn::PaymentHistory)
            .map(parse_payment_history)
            .transpose()?
            .unwrap_or_default();

        let property_care_rating = match cells.get(TenantColumn::PropertyCareRating) {
            Some(raw) => rating(TenantColumn::PropertyCareRating, raw)?,
            None => match cells.get(TenantColumn::Cleanliness) {
                Some(raw) => Cleanliness::parse(raw)
                    .map(Cleanliness::care_rating)
                    .ok_or_else(|| {
                        invalid(TenantColumn::Cleanliness, raw, "excellent, good, average or poor")
                    })?,
                None => self.property_care_rating,
            },
        };

        let damage_to_property = cells
            .get(TenantColumn::DamageToProperty)
            .map(|raw| parse_flag(TenantColumn::DamageToProperty, raw))
            .transpose()?;
        let eviction_notice = cells
            .get(TenantColumn::EvictionNotice)
            .map(|raw| parse_flag(TenantColumn::EvictionNotice, raw))
            .transpose()?;
        let noise_complaints = cells
            .get(TenantColumn::NoiseComplaints)
            .map(|raw| {
                raw.parse::<u32>()
                    .map_err(|_| invalid(TenantColumn::NoiseComplaints, raw, "a whole number"))
            })
            .transpose()?;
        let reference_score = cells
            .get(TenantColumn::ReferenceScore)
            .map(|raw| rating(TenantColumn::ReferenceScore, raw))
            .transpose()?;

        let rent_paid_on_time = cells
            .get(TenantColumn::RentPaidOnTime)
            .map(|raw| parse_flag(TenantColumn::RentPaidOnTime, raw))
            .transpose()?;
        let late_payments = cells
            .get(TenantColumn::LatePayments)
            .map(|raw| {
                raw.parse::<u32>()
                    .map_err(|_| invalid(TenantColumn::LatePayments, raw, "a whole number"))
            })
            .transpose()?;
        let employment_years = cells
            .get(TenantColumn::EmploymentYears)
            .map(|raw| non_negative(TenantColumn::EmploymentYears, raw))
            .transpose()?;

        let imputed_monthly_income = cells
            .get(TenantColumn::ImputedMonthlyIncome)
            .map(|raw| non_negative(TenantColumn::ImputedMonthlyIncome, raw))
            .transpose()?;
        let imputed_credit_score = cells
            .get(TenantColumn::ImputedCreditScore)
            .map(|raw| {
                parse_amount(TenantColumn::ImputedCreditScore, raw)
                    .ok()
                    .filter(|score| (0.0..=f64::from(MAX_CREDIT_SCORE)).contains(score))
                    .ok_or_else(|| {
                        invalid(TenantColumn::ImputedCreditScore, raw, "a number from 0 to 999")
                    })
            })
            .transpose()?;

        Ok(TenantRecord {
            tenant_id,
            name: cells.get(TenantColumn::Name).map(str::to_string),
            age,
            employment_status,
            monthly_income,
            credit_score,
            rent_amount,
            payment_history,
            property_care_rating,
            damage_to_property,
            noise_complaints,
            eviction_notice,
            reference_score,
            tenancy_start,
            tenancy_end,
            rent_paid_on_time,
            late_payments,
            employment_years,
            imputed_monthly_income,
            imputed_credit_score,
        })
    }

    fn tenancy_start(&self, cells: &RowCells<'_>) -> Result<NaiveDate, RowErrorReason> {
        if let Some(raw) = cells.get(TenantColumn::TenancyStart) {
            return parse_date(TenantColumn::TenancyStart, raw);
        }

        let missing = RowErrorReason::MissingField {
            field: TenantColumn::TenancyStart.field(),
        };
        let (Some(raw), Some(reference)) =
            (cells.get(TenantColumn::TenancyMonths), self.reference_date)
        else {
            return Err(missing);
        };

        let months = non_negative(TenantColumn::TenancyMonths, raw)?;
        let days = (months * DAYS_PER_MONTH).round() as i64;
        chrono::Duration::try_days(days)
            .and_then(|span| reference.checked_sub_signed(span))
            .ok_or_else(|| {
                invalid(TenantColumn::TenancyMonths, raw, "a plausible number of months")
            })
    }
}

/// Normalizes with the built-in defaults.
pub fn normalize(raw_rows: &[RawRow]) -> NormalizedDataset {
    Normalizer::default().normalize(raw_rows)
}

/// Non-blank cells of one row, keyed by canonical column. When two headers map
/// to the same column the first non-blank one (in raw key order) wins.
struct RowCells<'a> {
    cells: BTreeMap<TenantColumn, &'a str>,
}

impl<'a> RowCells<'a> {
    fn resolve(row: &'a RawRow) -> Self {
        let mut cells = BTreeMap::new();
        for (header, value) in row {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            if let Some(column) = column_for_header(header) {
                cells.entry(column).or_insert(value);
            }
        }
        Self { cells }
    }

    fn get(&self, column: TenantColumn) -> Option<&'a str> {
        self.cells.get(&column).copied()
    }

    fn required(&self, column: TenantColumn) -> Result<&'a str, RowErrorReason> {
        self.get(column).ok_or(RowErrorReason::MissingField {
            field: column.field(),
        })
    }
}

fn invalid(column: TenantColumn, raw: &str, expected: &'static str) -> RowErrorReason {
    RowErrorReason::InvalidValue {
        field: column.field(),
        value: raw.to_string(),
        expected,
    }
}

fn parse_amount(column: TenantColumn, raw: &str) -> Result<f64, RowErrorReason> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '\u{a3}' | '$' | '\u{20ac}' | ',' | ' '))
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| invalid(column, raw, "a number"))
}

fn non_negative(column: TenantColumn, raw: &str) -> Result<f64, RowErrorReason> {
    let value = parse_amount(column, raw)?;
    if value < 0.0 {
        return Err(invalid(column, raw, "a non-negative amount"));
    }
    Ok(value)
}

fn rating(column: TenantColumn, raw: &str) -> Result<f64, RowErrorReason> {
    let value = parse_amount(column, raw)?;
    if !(0.0..=MAX_RATING).contains(&value) {
        return Err(invalid(column, raw, "a rating between 0 and 10"));
    }
    Ok(value)
}

fn parse_flag(column: TenantColumn, raw: &str) -> Result<bool, RowErrorReason> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "1" => Ok(true),
        "no" | "n" | "false" | "0" => Ok(false),
        _ => Err(invalid(column, raw, "yes or no")),
    }
}

fn parse_date(column: TenantColumn, raw: &str) -> Result<NaiveDate, RowErrorReason> {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.date_naive());
    }

    for format in ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }

    Err(invalid(column, raw, "a date such as 2024-03-31 or 31/03/2024"))
}

fn parse_payment_history(raw: &str) -> Result<Vec<PaymentStatus>, RowErrorReason> {
    raw.split([';', '|', ','])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            PaymentStatus::parse(token).ok_or_else(|| {
                invalid(
                    TenantColumn::PaymentHistory,
                    raw,
                    "periods of on_time, late or missed separated by ';'",
                )
            })
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn parse_date_for_tests(raw: &str) -> Option<NaiveDate> {
    parse_date(TenantColumn::TenancyStart, raw).ok()
}
