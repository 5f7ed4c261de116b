use tracing::warn;

use super::domain::ScoredTenantRecord;
use super::query::{query, FilterCriteria, QueryError};

/// Result of applying criteria to a session.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub records: Vec<ScoredTenantRecord>,
    /// Set when the criteria were rejected; `records` is then the previous result.
    pub rejected: Option<QueryError>,
}

/// One scored dataset plus the last valid query over it.
#[derive(Debug, Clone)]
pub struct ScreeningSession {
    scored: Vec<ScoredTenantRecord>,
    criteria: FilterCriteria,
    current: Vec<ScoredTenantRecord>,
}

impl ScreeningSession {
    pub fn new(scored: Vec<ScoredTenantRecord>) -> Self {
        let criteria = FilterCriteria::default();
        let current = query(&scored, &criteria).unwrap_or_else(|_| scored.clone());
        Self {
            scored,
            criteria,
            current,
        }
    }

    pub fn scored(&self) -> &[ScoredTenantRecord] {
        &self.scored
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn current(&self) -> &[ScoredTenantRecord] {
        &self.current
    }

    pub fn apply(&mut self, criteria: FilterCriteria) -> QueryOutcome {
        match query(&self.scored, &criteria) {
            Ok(records) => {
                self.current = records;
                self.criteria = criteria;
                QueryOutcome {
                    records: self.current.clone(),
                    rejected: None,
                }
            }
            Err(error) => {
                warn!(%error, "query rejected; keeping previous result");
                QueryOutcome {
                    records: self.current.clone(),
                    rejected: Some(error),
                }
            }
        }
    }
}
