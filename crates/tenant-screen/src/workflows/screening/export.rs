use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{FactorKind, PaymentStatus, ScoredTenantRecord};

const RECORD_HEADERS: [&str; 20] = [
    "tenant_id",
    "name",
    "age",
    "employment_status",
    "monthly_income",
    "credit_score",
    "rent_amount",
    "payment_history",
    "property_care_rating",
    "damage_to_property",
    "noise_complaints",
    "eviction_notice",
    "reference_score",
    "tenancy_start",
    "tenancy_end",
    "rent_paid_on_time",
    "late_payments",
    "employment_years",
    "imputed_monthly_income",
    "imputed_credit_score",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Flat, ordered rows ready for CSV serialization. Missing values are empty
/// cells, and every value is written so the normalizer reads it back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn export_headers() -> Vec<String> {
    RECORD_HEADERS
        .iter()
        .map(|header| header.to_string())
        .chain(FactorKind::ordered().into_iter().map(FactorKind::score_column))
        .chain(std::iter::once("quality_score".to_string()))
        .collect()
}

/// Flattens records in the order given; the caller decides the ordering.
pub fn to_exportable(records: &[ScoredTenantRecord]) -> ExportTable {
    ExportTable {
        headers: export_headers(),
        rows: records.iter().map(export_row).collect(),
    }
}

fn export_row(scored: &ScoredTenantRecord) -> Vec<String> {
    let record = &scored.record;
    let mut row = vec![
        record.tenant_id.0.clone(),
        record.name.clone().unwrap_or_default(),
        optional(record.age),
        record.employment_status.label().to_string(),
        optional(record.monthly_income),
        optional(record.credit_score),
        record.rent_amount.to_string(),
        payment_history(&record.payment_history),
        record.property_care_rating.to_string(),
        optional(record.damage_to_property.map(flag)),
        optional(record.noise_complaints),
        optional(record.eviction_notice.map(flag)),
        optional(record.reference_score),
        date(record.tenancy_start),
        record.tenancy_end.map(date).unwrap_or_default(),
        optional(record.rent_paid_on_time.map(flag)),
        optional(record.late_payments),
        optional(record.employment_years),
        optional(record.imputed_monthly_income),
        optional(record.imputed_credit_score),
    ];

    row.extend(
        FactorKind::ordered()
            .into_iter()
            .map(|factor| optional(scored.sub_score(factor))),
    );
    row.push(scored.quality_score.to_string());
    row
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

fn flag(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn date(value: NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

fn payment_history(history: &[PaymentStatus]) -> String {
    history
        .iter()
        .map(|status| status.token())
        .collect::<Vec<_>>()
        .join(";")
}

pub fn write_csv<W: Write>(table: &ExportTable, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&table.headers)?;
    for row in &table.rows {
        csv_writer.write_record(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn to_csv_string(table: &ExportTable) -> Result<String, csv::Error> {
    let mut buffer = Vec::new();
    write_csv(table, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
