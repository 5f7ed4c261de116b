//! HMO tenant screening: normalize raw tenant rows, score them, then filter,
//! sort, search and export the scored dataset.

pub mod domain;
pub mod export;
mod mapping;
pub mod normalizer;
pub mod parser;
pub mod query;
pub mod report;
pub mod router;
pub mod scoring;
pub mod session;

#[cfg(test)]
mod tests;

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use tracing::{info, warn};

pub use domain::{
    EmploymentStatus, FactorKind, PaymentStatus, QualityCategory, ScoreComponent,
    ScoredTenantRecord, TenantId, TenantRecord,
};
pub use export::{to_csv_string, to_exportable, write_csv, ExportTable};
pub use normalizer::{normalize, NormalizedDataset, Normalizer, RowError, RowErrorReason};
pub use parser::RawRow;
pub use query::{
    query, DateRange, FilterCriteria, NumericRange, PaymentFilter, QueryError, SortDirection,
    SortSpec,
};
pub use report::{DashboardSummary, ScreeningInsights};
pub use router::screening_router;
pub use scoring::{ScoringConfig, ScoringConfigError, ScoringEngine};
pub use session::{QueryOutcome, ScreeningSession};

#[derive(Debug)]
pub enum TenantImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for TenantImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TenantImportError::Io(err) => write!(f, "failed to read tenant export: {}", err),
            TenantImportError::Csv(err) => write!(f, "invalid tenant CSV data: {}", err),
        }
    }
}

impl std::error::Error for TenantImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TenantImportError::Io(err) => Some(err),
            TenantImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for TenantImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for TenantImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads tenant CSV exports into a normalized dataset.
pub struct TenantCsvImporter;

impl TenantCsvImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        normalizer: &Normalizer,
    ) -> Result<NormalizedDataset, TenantImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, normalizer)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        normalizer: &Normalizer,
    ) -> Result<NormalizedDataset, TenantImportError> {
        let rows = parser::read_raw_rows(reader)?;
        let dataset = normalizer.normalize(&rows);

        info!(
            rows = rows.len(),
            records = dataset.records.len(),
            rejected = dataset.errors.len(),
            "tenant rows normalized"
        );
        for error in &dataset.errors {
            warn!(%error, "tenant row rejected");
        }

        Ok(dataset)
    }
}

/// Scored dataset plus the rows that never made it into it.
#[derive(Debug, Clone)]
pub struct ScreeningRun {
    pub session: ScreeningSession,
    pub row_errors: Vec<RowError>,
}

/// Imports, normalizes and scores a CSV stream in one pass.
pub fn screen<R: Read>(
    reader: R,
    config: ScoringConfig,
    as_of: NaiveDate,
) -> Result<ScreeningRun, ScreenError> {
    let engine = ScoringEngine::new(config, as_of)?;
    let dataset = TenantCsvImporter::from_reader(reader, &engine.normalizer())?;
    let scored = engine.score_all(&dataset.records);

    Ok(ScreeningRun {
        session: ScreeningSession::new(scored),
        row_errors: dataset.errors,
    })
}

/// Failure of a whole screening run (as opposed to a single rejected row).
#[derive(Debug)]
pub enum ScreenError {
    Import(TenantImportError),
    Scoring(ScoringConfigError),
}

impl std::fmt::Display for ScreenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScreenError::Import(err) => write!(f, "{}", err),
            ScreenError::Scoring(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ScreenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScreenError::Import(err) => Some(err),
            ScreenError::Scoring(err) => Some(err),
        }
    }
}

impl From<TenantImportError> for ScreenError {
    fn from(err: TenantImportError) -> Self {
        Self::Import(err)
    }
}

impl From<ScoringConfigError> for ScreenError {
    fn from(err: ScoringConfigError) -> Self {
        Self::Scoring(err)
    }
}
