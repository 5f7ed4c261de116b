use chrono::{Local, NaiveDate};
use clap::Args;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tenant_screen::config::{AppConfig, ScreeningConfig};
use tenant_screen::error::AppError;
use tenant_screen::workflows::screening::{
    screen, to_exportable, write_csv, DashboardSummary, FilterCriteria, NumericRange, RowError,
    ScoredTenantRecord, ScreeningInsights, SortDirection, SortSpec,
};

#[derive(Args, Debug, Default)]
pub(crate) struct ScoreArgs {
    /// Tenant CSV export to score
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// JSON scoring config (overrides APP_SCORING_CONFIG)
    #[arg(long)]
    pub(crate) scoring_config: Option<PathBuf>,
    /// Scoring date for ongoing tenancies (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Only keep tenants scoring at least this much
    #[arg(long)]
    pub(crate) min_score: Option<f64>,
    /// Case-insensitive match on tenant id or name
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// Sort field (defaults to quality_score)
    #[arg(long)]
    pub(crate) sort_by: Option<String>,
    /// Sort ascending instead of descending
    #[arg(long)]
    pub(crate) ascending: bool,
    /// Keep only the first N tenants after sorting
    #[arg(long)]
    pub(crate) top: Option<usize>,
    /// Write the ranked result as CSV to this path
    #[arg(long)]
    pub(crate) export: Option<PathBuf>,
}

impl ScoreArgs {
    fn criteria(&self) -> FilterCriteria {
        let direction = if self.ascending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        };
        let sort = match (&self.sort_by, self.ascending) {
            (Some(field), _) => Some(SortSpec {
                field: field.clone(),
                direction,
            }),
            (None, true) => Some(SortSpec {
                field: "quality_score".to_string(),
                direction,
            }),
            (None, false) => None,
        };

        FilterCriteria {
            score: self.min_score.map(NumericRange::at_least),
            search: self.search.clone(),
            sort,
            limit: self.top,
            ..FilterCriteria::default()
        }
    }
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let mut screening = AppConfig::load()?.screening;
    if let Some(path) = args.scoring_config.clone() {
        screening = ScreeningConfig {
            scoring_path: Some(path),
        };
    }
    let scoring = screening.scoring_config()?;
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());

    let file = File::open(&args.csv)?;
    let mut run = screen(file, scoring, as_of)?;
    let outcome = run.session.apply(args.criteria());
    if let Some(error) = outcome.rejected {
        return Err(error.into());
    }

    render_screening_report(
        &outcome.records,
        run.session.scored(),
        &run.row_errors,
        as_of,
    );

    if let Some(path) = &args.export {
        let writer = BufWriter::new(File::create(path)?);
        write_csv(&to_exportable(&outcome.records), writer)?;
        println!("\nExported {} tenants to {}", outcome.records.len(), path.display());
    }

    Ok(())
}

pub(crate) fn render_screening_report(
    records: &[ScoredTenantRecord],
    dataset: &[ScoredTenantRecord],
    row_errors: &[RowError],
    as_of: NaiveDate,
) {
    println!("HMO tenant screening (scored as of {})", as_of);
    println!(
        "Showing {} of {} scored tenants ({} rows rejected)",
        records.len(),
        dataset.len(),
        row_errors.len()
    );

    if records.is_empty() {
        println!("\nRanked tenants: none match");
    } else {
        println!("\nRanked tenants");
        println!(
            "{:>4}  {:<10} {:<24} {:>6}  {}",
            "#", "Tenant", "Name", "Score", "Category"
        );
        for (rank, scored) in records.iter().enumerate() {
            println!(
                "{:>4}  {:<10} {:<24} {:>6.1}  {}",
                rank + 1,
                scored.tenant_id().0,
                scored.record.name.as_deref().unwrap_or("-"),
                scored.quality_score,
                scored.category.label()
            );
        }
    }

    if !row_errors.is_empty() {
        println!("\nRejected rows");
        for error in row_errors {
            println!("- {}", error);
        }
    }

    let summary = DashboardSummary::compare(records, dataset);
    println!("\nSummary");
    match (summary.average_score, summary.average_score_delta) {
        (Some(average), Some(delta)) => {
            println!("- Average score: {:.1} ({:+.1} vs dataset)", average, delta)
        }
        (Some(average), None) => println!("- Average score: {:.1}", average),
        _ => println!("- Average score: n/a"),
    }
    println!(
        "- Excellent tenants: {} ({:.1}%)",
        summary.excellent_count, summary.excellent_pct
    );
    println!(
        "- Reliable payers: {} ({:.1}%)",
        summary.reliable_payers, summary.reliable_payers_pct
    );

    let insights = ScreeningInsights::from_records(records);
    println!("\nQuality categories");
    for entry in &insights.category_counts {
        println!("- {}: {}", entry.category_label, entry.count);
    }

    if let Some(impact) = &insights.employment_impact {
        println!(
            "\nEmployment impact: employed {:.1} vs unemployed {:.1} ({:+.1})",
            impact.employed_average, impact.unemployed_average, impact.difference
        );
    }
    if let Some(split) = &insights.income_split {
        println!(
            "Income split around median {:.0}/month: above {} | below {}",
            split.median_monthly_income,
            split
                .at_or_above_median
                .as_ref()
                .map_or_else(|| "n/a".to_string(), |group| format!("{:.1}", group.average_score)),
            split
                .below_median
                .as_ref()
                .map_or_else(|| "n/a".to_string(), |group| format!("{:.1}", group.average_score)),
        );
    }

    for (title, groups) in [
        ("Age groups", &insights.age_groups),
        ("Credit bands", &insights.credit_bands),
    ] {
        if groups.is_empty() {
            continue;
        }
        println!("\n{}", title);
        for group in groups {
            println!(
                "- {}: {} tenants, average {:.1}",
                group.group, group.count, group.average_score
            );
        }
    }

    println!("\nRecommendations");
    for recommendation in &insights.recommendations {
        println!(
            "- [{}] {}",
            recommendation.level_label, recommendation.message
        );
    }
}
