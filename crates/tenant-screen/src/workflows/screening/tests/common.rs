use std::sync::Arc;

use axum::Router;
use chrono::NaiveDate;

use crate::workflows::screening::domain::ScoredTenantRecord;
use crate::workflows::screening::normalizer::normalize;
use crate::workflows::screening::parser::{read_raw_rows, RawRow};
use crate::workflows::screening::scoring::{ScoringConfig, ScoringEngine};
use crate::workflows::screening::screening_router;

/// Six tenants: two premium, two identical mid-range (T-002/T-005), one
/// sparse record relying on defaults and one high-risk tenant.
pub(super) const SAMPLE_CSV: &str = "\
tenant_id,name,age,employment_status,monthly_income,credit_score,rent_amount,payment_history,property_care_rating,damage_to_property,noise_complaints,eviction_notice,reference_score,tenancy_start,tenancy_end
T-001,Alice Walker,29,Full-time,3000,780,600,on_time;on_time;on_time;on_time,9,no,0,no,9,2022-01-01,
T-002,Bob Stone,41,Part-time,1500,650,600,on_time;late;on_time;on_time,7,no,1,no,7,2023-06-01,
T-003,Cara Jones,23,Unemployed,,520,550,late;missed;late,3,yes,3,yes,2,2024-09-01,
T-004,Dan Price,35,Self-employed,2400,700,600,on_time;on_time;on_time,8,no,0,no,8,2021-03-15,2024-03-14
T-005,Bobby Stone,41,Part-time,1500,650,600,on_time;late;on_time;on_time,7,no,1,no,7,2023-06-01,
T-006,,52,Retired,1800,,700,,,,,,,2024-01-01,
";

pub(super) fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date")
}

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::new(ScoringConfig::default(), as_of()).expect("default config is valid")
}

pub(super) fn row(cells: &[(&str, &str)]) -> RawRow {
    cells
        .iter()
        .map(|(header, value)| (header.to_string(), value.to_string()))
        .collect()
}

pub(super) fn minimal_row(tenant_id: &str) -> RawRow {
    row(&[
        ("tenant_id", tenant_id),
        ("rent_amount", "650"),
        ("tenancy_start", "2024-01-01"),
    ])
}

pub(super) fn ideal_row(tenant_id: &str) -> RawRow {
    row(&[
        ("tenant_id", tenant_id),
        ("name", "Ideal Tenant"),
        ("age", "34"),
        ("employment_status", "Full-time"),
        ("monthly_income", "3000"),
        ("credit_score", "800"),
        ("rent_amount", "600"),
        (
            "payment_history",
            "on_time;on_time;on_time;on_time;on_time;on_time",
        ),
        ("property_care_rating", "10"),
        ("damage_to_property", "no"),
        ("noise_complaints", "0"),
        ("eviction_notice", "no"),
        ("reference_score", "10"),
        ("tenancy_start", "2020-01-01"),
    ])
}

pub(super) fn worst_row(tenant_id: &str) -> RawRow {
    row(&[
        ("tenant_id", tenant_id),
        ("name", "Risky Tenant"),
        ("employment_status", "Unemployed"),
        ("monthly_income", "0"),
        ("credit_score", "300"),
        ("rent_amount", "600"),
        ("payment_history", "missed;missed;late;missed"),
        ("property_care_rating", "0"),
        ("damage_to_property", "yes"),
        ("noise_complaints", "5"),
        ("eviction_notice", "yes"),
        ("reference_score", "0"),
        ("tenancy_start", "2025-01-01"),
    ])
}

pub(super) fn sample_rows() -> Vec<RawRow> {
    read_raw_rows(SAMPLE_CSV.as_bytes()).expect("sample csv parses")
}

pub(super) fn scored_sample() -> Vec<ScoredTenantRecord> {
    let dataset = normalize(&sample_rows());
    assert!(dataset.errors.is_empty(), "{:?}", dataset.errors);
    engine().score_all(&dataset.records)
}

pub(super) fn ids(records: &[ScoredTenantRecord]) -> Vec<&str> {
    records
        .iter()
        .map(|scored| scored.tenant_id().0.as_str())
        .collect()
}

pub(super) fn router() -> Router {
    screening_router(Arc::new(ScoringConfig::default()))
}
