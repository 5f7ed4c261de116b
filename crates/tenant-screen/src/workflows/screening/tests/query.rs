use super::common::*;
use chrono::NaiveDate;

use crate::workflows::screening::normalizer::normalize;
use crate::workflows::screening::query::{
    query, DateRange, FilterCriteria, NumericRange, PaymentFilter, QueryError, SortDirection,
    SortSpec,
};

fn sort_by(field: &str, direction: SortDirection) -> FilterCriteria {
    FilterCriteria {
        sort: Some(SortSpec {
            field: field.to_string(),
            direction,
        }),
        ..FilterCriteria::default()
    }
}

#[test]
fn default_query_orders_by_score_with_tenant_id_tie_break() {
    let scored = scored_sample();

    let result = query(&scored, &FilterCriteria::default()).expect("valid query");

    assert_eq!(
        ids(&result),
        vec!["T-001", "T-004", "T-002", "T-005", "T-006", "T-003"]
    );
}

#[test]
fn query_leaves_input_untouched() {
    let scored = scored_sample();
    let before = scored.clone();

    let _ = query(&scored, &sort_by("tenant_id", SortDirection::Descending));
    let _ = query(
        &scored,
        &FilterCriteria {
            score: Some(NumericRange::between(40.0, 20.0)),
            ..FilterCriteria::default()
        },
    );

    assert_eq!(scored, before);
}

#[test]
fn ties_stay_ascending_by_tenant_id_in_either_direction() {
    let scored = scored_sample();

    let ascending = query(&scored, &sort_by("quality_score", SortDirection::Ascending))
        .expect("valid query");
    assert_eq!(
        ids(&ascending),
        vec!["T-003", "T-006", "T-002", "T-005", "T-004", "T-001"]
    );
}

#[test]
fn score_range_is_inclusive() {
    let scored = scored_sample();
    let top = scored
        .iter()
        .map(|record| record.quality_score)
        .fold(f64::MIN, f64::max);

    let criteria = FilterCriteria {
        score: Some(NumericRange::between(top, 100.0)),
        ..FilterCriteria::default()
    };
    let result = query(&scored, &criteria).expect("valid query");

    assert_eq!(ids(&result), vec!["T-001"]);
}

#[test]
fn search_matches_tenant_id_or_name_case_insensitively() {
    let scored = scored_sample();

    let by_name = query(
        &scored,
        &FilterCriteria {
            search: Some("STONE".to_string()),
            ..FilterCriteria::default()
        },
    )
    .expect("valid query");
    assert_eq!(ids(&by_name), vec!["T-002", "T-005"]);

    let by_id = query(
        &scored,
        &FilterCriteria {
            search: Some("t-00".to_string()),
            ..FilterCriteria::default()
        },
    )
    .expect("valid query");
    assert_eq!(by_id.len(), 6);

    let blank = query(
        &scored,
        &FilterCriteria {
            search: Some("   ".to_string()),
            ..FilterCriteria::default()
        },
    )
    .expect("valid query");
    assert_eq!(blank.len(), 6);
}

#[test]
fn filters_are_and_combined() {
    let scored = scored_sample();

    let criteria = FilterCriteria {
        employment: vec!["part-time".to_string(), "Self-employed".to_string()],
        payment: PaymentFilter::OnTimeOnly,
        ..FilterCriteria::default()
    };
    let result = query(&scored, &criteria).expect("valid query");

    assert_eq!(ids(&result), vec!["T-004"]);
}

#[test]
fn payment_filter_distinguishes_late_payers() {
    let scored = scored_sample();

    let late = query(
        &scored,
        &FilterCriteria {
            payment: PaymentFilter::HasLatePayments,
            sort: Some(SortSpec {
                field: "tenant_id".to_string(),
                direction: SortDirection::Ascending,
            }),
            ..FilterCriteria::default()
        },
    )
    .expect("valid query");

    assert_eq!(ids(&late), vec!["T-002", "T-003", "T-005"]);
}

#[test]
fn category_filter_accepts_keys_and_labels() {
    let scored = scored_sample();

    let criteria = FilterCriteria {
        categories: vec!["Excellent (Premium)".to_string(), "poor".to_string()],
        ..FilterCriteria::default()
    };
    let result = query(&scored, &criteria).expect("valid query");

    assert_eq!(ids(&result), vec!["T-001", "T-004", "T-003"]);
}

#[test]
fn missing_values_fail_active_ranges() {
    let scored = scored_sample();

    let criteria = FilterCriteria {
        ranges: [("credit_score".to_string(), NumericRange::at_least(0.0))]
            .into_iter()
            .collect(),
        ..FilterCriteria::default()
    };
    let result = query(&scored, &criteria).expect("valid query");

    assert_eq!(result.len(), 5);
    assert!(!ids(&result).contains(&"T-006"));
}

#[test]
fn factor_names_range_over_sub_scores() {
    let scored = scored_sample();

    let criteria = FilterCriteria {
        ranges: [(
            "payment_reliability_score".to_string(),
            NumericRange::at_least(100.0),
        )]
        .into_iter()
        .collect(),
        ..FilterCriteria::default()
    };
    let result = query(&scored, &criteria).expect("valid query");

    assert_eq!(ids(&result), vec!["T-001", "T-004"]);
}

#[test]
fn tenancy_start_range_filters_by_date() {
    let scored = scored_sample();

    let criteria = FilterCriteria {
        tenancy_start: Some(DateRange {
            from: NaiveDate::from_ymd_opt(2023, 1, 1),
            to: NaiveDate::from_ymd_opt(2024, 1, 1),
        }),
        ..FilterCriteria::default()
    };
    let result = query(&scored, &criteria).expect("valid query");

    assert_eq!(ids(&result), vec!["T-002", "T-005", "T-006"]);
}

#[test]
fn missing_sort_values_go_last_in_both_directions() {
    let scored = scored_sample();

    let ascending = query(&scored, &sort_by("name", SortDirection::Ascending))
        .expect("valid query");
    assert_eq!(ids(&ascending).last(), Some(&"T-006"));
    assert_eq!(ids(&ascending).first(), Some(&"T-001"));

    let descending = query(&scored, &sort_by("credit_score", SortDirection::Descending))
        .expect("valid query");
    assert_eq!(ids(&descending).first(), Some(&"T-001"));
    assert_eq!(ids(&descending).last(), Some(&"T-006"));
}

#[test]
fn limit_applies_after_sorting() {
    let scored = scored_sample();

    let criteria = FilterCriteria {
        limit: Some(3),
        ..FilterCriteria::default()
    };
    let result = query(&scored, &criteria).expect("valid query");

    assert_eq!(ids(&result), vec!["T-001", "T-004", "T-002"]);
}

#[test]
fn invalid_criteria_are_rejected() {
    let scored = scored_sample();

    let unknown_sort = query(&scored, &sort_by("shoe_size", SortDirection::Ascending));
    assert!(matches!(
        unknown_sort,
        Err(QueryError::UnknownField {
            context: "sort",
            ..
        })
    ));

    let unknown_range = query(
        &scored,
        &FilterCriteria {
            ranges: [("shoe_size".to_string(), NumericRange::at_least(1.0))]
                .into_iter()
                .collect(),
            ..FilterCriteria::default()
        },
    );
    assert!(matches!(
        unknown_range,
        Err(QueryError::UnknownField {
            context: "range",
            ..
        })
    ));

    let inverted = query(
        &scored,
        &FilterCriteria {
            score: Some(NumericRange::between(80.0, 20.0)),
            ..FilterCriteria::default()
        },
    );
    assert!(matches!(inverted, Err(QueryError::MalformedRange { .. })));

    let not_a_number = query(
        &scored,
        &FilterCriteria {
            score: Some(NumericRange::at_least(f64::NAN)),
            ..FilterCriteria::default()
        },
    );
    assert!(matches!(not_a_number, Err(QueryError::MalformedRange { .. })));

    let unknown_category = query(
        &scored,
        &FilterCriteria {
            categories: vec!["platinum".to_string()],
            ..FilterCriteria::default()
        },
    );
    assert!(matches!(
        unknown_category,
        Err(QueryError::UnknownValue {
            field: "category",
            ..
        })
    ));
}

#[test]
fn criteria_deserialize_from_json() {
    let criteria: FilterCriteria = serde_json::from_value(serde_json::json!({
        "score": { "min": 60 },
        "payment": "on_time_only",
        "sort": { "field": "tenant_id", "direction": "ascending" },
        "limit": 2
    }))
    .expect("criteria parse");

    assert_eq!(criteria.score, Some(NumericRange::at_least(60.0)));
    assert_eq!(criteria.payment, PaymentFilter::OnTimeOnly);
    assert_eq!(
        criteria.sort.as_ref().map(|sort| sort.direction),
        Some(SortDirection::Ascending)
    );

    let result = query(&scored_sample(), &criteria).expect("valid query");
    assert_eq!(ids(&result), vec!["T-001", "T-004"]);
}

#[test]
fn payment_filter_reads_summary_columns_without_history() {
    let mut punctual = minimal_row("S-1");
    punctual.insert("rent_paid_on_time".to_string(), "yes".to_string());
    punctual.insert("late_payments".to_string(), "0".to_string());
    let mut slipped = minimal_row("S-2");
    slipped.insert("rent_paid_on_time".to_string(), "yes".to_string());
    slipped.insert("late_payments".to_string(), "2".to_string());
    let mut behind = minimal_row("S-3");
    behind.insert("rent_paid_on_time".to_string(), "no".to_string());
    let unknown = minimal_row("S-4");

    let dataset = normalize(&[punctual, slipped, behind, unknown]);
    let scored = engine().score_all(&dataset.records);
    let filtered = |payment| {
        let criteria = FilterCriteria {
            payment,
            sort: Some(SortSpec {
                field: "tenant_id".to_string(),
                direction: SortDirection::Ascending,
            }),
            ..FilterCriteria::default()
        };
        query(&scored, &criteria).expect("valid query")
    };

    assert_eq!(ids(&filtered(PaymentFilter::OnTimeOnly)), vec!["S-1", "S-2"]);
    assert_eq!(
        ids(&filtered(PaymentFilter::HasLatePayments)),
        vec!["S-2", "S-3"]
    );
}
