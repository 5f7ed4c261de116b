use super::super::domain::{QualityCategory, ScoredTenantRecord};
use super::super::scoring::round_to;
use super::views::DashboardSummary;

impl DashboardSummary {
    /// Summarizes `filtered` and measures it against `full`.
    pub fn compare(filtered: &[ScoredTenantRecord], full: &[ScoredTenantRecord]) -> Self {
        let total_tenants = filtered.len();
        let filtered_average = average_score(filtered);
        let average_score_delta = match (filtered_average, average_score(full)) {
            (Some(filtered_avg), Some(full_avg)) => Some(round_to(filtered_avg - full_avg, 1)),
            _ => None,
        };

        let excellent_count = filtered
            .iter()
            .filter(|scored| scored.category == QualityCategory::Excellent)
            .count();
        let reliable_payers = filtered
            .iter()
            .filter(|scored| scored.record.is_reliable_payer())
            .count();

        Self {
            total_tenants,
            dataset_tenants: full.len(),
            tenant_delta: total_tenants as i64 - full.len() as i64,
            average_score: filtered_average,
            average_score_delta,
            excellent_count,
            excellent_pct: percentage(excellent_count, total_tenants),
            reliable_payers,
            reliable_payers_pct: percentage(reliable_payers, total_tenants),
        }
    }
}

fn average_score(records: &[ScoredTenantRecord]) -> Option<f64> {
    mean(records.iter().map(|scored| scored.quality_score))
}

pub(crate) fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| {
        (sum + value, count + 1)
    });
    (count > 0).then(|| round_to(sum / count as f64, 1))
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round_to(part as f64 / whole as f64 * 100.0, 1)
    }
}
