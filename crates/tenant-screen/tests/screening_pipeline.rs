use std::io::Cursor;

use chrono::NaiveDate;
use tenant_screen::workflows::screening::{
    normalize, parser::read_raw_rows, query, screen, to_csv_string, to_exportable,
    DashboardSummary, FilterCriteria, NumericRange, QualityCategory, ScoringConfig,
    ScoringEngine, ScreeningInsights, SortDirection, SortSpec, TenantCsvImporter,
};

const FIXTURE: &[u8] = include_bytes!("fixtures/hmo_tenants.csv");

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid as_of")
}

#[test]
fn fixture_imports_valid_rows_and_reports_the_rest() {
    let engine = ScoringEngine::new(ScoringConfig::default(), as_of()).expect("valid config");
    let dataset =
        TenantCsvImporter::from_reader(FIXTURE, &engine.normalizer()).expect("fixture imports");

    assert_eq!(dataset.records.len(), 7);
    let reasons: Vec<(usize, String)> = dataset
        .errors
        .iter()
        .map(|error| (error.row_index, error.reason.to_string()))
        .collect();
    assert_eq!(
        reasons,
        vec![
            (7, "missing required field: tenant_id".to_string()),
            (8, "duplicate tenant_id: HMO-002".to_string()),
            (
                9,
                "invalid value for rent_amount: 'n/a' (expected a number)".to_string()
            ),
        ]
    );

    let priya = &dataset.records[0];
    assert_eq!(priya.monthly_income, Some(3500.0));
    assert_eq!(priya.property_care_rating, 10.0);
    assert_eq!(
        priya.tenancy_start,
        NaiveDate::from_ymd_opt(2022, 2, 1).expect("valid")
    );
}

#[test]
fn ranked_fixture_puts_reliable_long_term_tenants_first() {
    let run = screen(FIXTURE, ScoringConfig::default(), as_of()).expect("screening run");
    let ranked = run.session.current();

    let top = &ranked[0];
    assert!(
        ["HMO-001", "HMO-005"].contains(&top.tenant_id().0.as_str()),
        "unexpected leader {}",
        top.tenant_id()
    );
    assert_eq!(top.category, QualityCategory::Excellent);

    let last = ranked.last().expect("records present");
    assert_eq!(last.tenant_id().0, "HMO-006");
    assert_eq!(last.category, QualityCategory::Poor);

    for pair in ranked.windows(2) {
        assert!(pair[0].quality_score >= pair[1].quality_score);
    }
}

#[test]
fn export_round_trips_through_normalize_and_rescore() {
    let run = screen(FIXTURE, ScoringConfig::default(), as_of()).expect("screening run");
    let original = run.session.current();

    let csv = to_csv_string(&to_exportable(original)).expect("export serializes");
    let rows = read_raw_rows(Cursor::new(csv.as_bytes())).expect("export re-parses");
    let dataset = normalize(&rows);
    assert!(dataset.errors.is_empty(), "{:?}", dataset.errors);

    let engine = ScoringEngine::new(ScoringConfig::default(), as_of()).expect("valid config");
    let rescored = engine.score_all(&dataset.records);

    assert_eq!(rescored.len(), original.len());
    for (before, after) in original.iter().zip(&rescored) {
        assert_eq!(before.tenant_id(), after.tenant_id());
        assert_eq!(before.quality_score, after.quality_score);
        assert_eq!(before.record, after.record);
    }
}

#[test]
fn filtered_export_keeps_scores_of_imputed_tenants() {
    let run = screen(FIXTURE, ScoringConfig::default(), as_of()).expect("screening run");
    // HMO-004 has no income and HMO-007 no credit score; on their own they
    // would produce different population medians than the full dataset.
    let criteria = FilterCriteria {
        employment: vec!["student".to_string(), "contract".to_string()],
        ..FilterCriteria::default()
    };
    let selected = query(run.session.scored(), &criteria).expect("valid query");
    let ids: Vec<&str> = selected
        .iter()
        .map(|scored| scored.tenant_id().0.as_str())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&"HMO-004") && ids.contains(&"HMO-007"));
    for scored in &selected {
        assert!(
            scored.record.imputed_monthly_income.is_some()
                || scored.record.imputed_credit_score.is_some(),
            "{} carries no imputed value",
            scored.tenant_id()
        );
    }

    let csv = to_csv_string(&to_exportable(&selected)).expect("export serializes");
    let rows = read_raw_rows(Cursor::new(csv.as_bytes())).expect("export re-parses");
    let dataset = normalize(&rows);
    assert!(dataset.errors.is_empty(), "{:?}", dataset.errors);

    let engine = ScoringEngine::new(ScoringConfig::default(), as_of()).expect("valid config");
    let rescored = engine.score_all(&dataset.records);

    assert_eq!(rescored.len(), selected.len());
    for (before, after) in selected.iter().zip(&rescored) {
        assert_eq!(before.tenant_id(), after.tenant_id());
        assert_eq!(
            before.quality_score, after.quality_score,
            "{} changed on re-import",
            before.tenant_id()
        );
        assert_eq!(before.record, after.record);
    }
}

#[test]
fn filtered_export_keeps_query_order() {
    let run = screen(FIXTURE, ScoringConfig::default(), as_of()).expect("screening run");
    let criteria = FilterCriteria {
        score: Some(NumericRange::at_least(50.0)),
        sort: Some(SortSpec {
            field: "tenant_id".to_string(),
            direction: SortDirection::Descending,
        }),
        ..FilterCriteria::default()
    };

    let selected = query(run.session.scored(), &criteria).expect("valid query");
    let table = to_exportable(&selected);

    let exported_ids: Vec<&str> = table.rows.iter().map(|row| row[0].as_str()).collect();
    let mut expected: Vec<&str> = selected
        .iter()
        .map(|scored| scored.tenant_id().0.as_str())
        .collect();
    assert_eq!(exported_ids, expected);
    expected.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(exported_ids, expected);
    assert!(!exported_ids.contains(&"HMO-006"));
}

#[test]
fn summary_and_insights_describe_the_fixture() {
    let run = screen(FIXTURE, ScoringConfig::default(), as_of()).expect("screening run");
    let scored = run.session.scored();

    let summary = DashboardSummary::compare(scored, scored);
    assert_eq!(summary.total_tenants, 7);
    assert_eq!(summary.tenant_delta, 0);
    assert_eq!(summary.average_score_delta, Some(0.0));
    assert_eq!(summary.reliable_payers, 2);

    let insights = ScreeningInsights::from_records(scored);
    let total: usize = insights.category_counts.iter().map(|entry| entry.count).sum();
    assert_eq!(total, 7);
    assert!(insights.employment_impact.is_some());
}
