use std::collections::HashMap;
use std::sync::OnceLock;

/// Canonical input columns understood by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum TenantColumn {
    TenantId,
    Name,
    Age,
    EmploymentStatus,
    MonthlyIncome,
    AnnualIncome,
    CreditScore,
    RentAmount,
    PaymentHistory,
    PropertyCareRating,
    Cleanliness,
    DamageToProperty,
    NoiseComplaints,
    EvictionNotice,
    ReferenceScore,
    TenancyStart,
    TenancyEnd,
    TenancyMonths,
    RentPaidOnTime,
    LatePayments,
    EmploymentYears,
    ImputedMonthlyIncome,
    ImputedCreditScore,
}

impl TenantColumn {
    const ALL: [Self; 23] = [
        Self::TenantId,
        Self::Name,
        Self::Age,
        Self::EmploymentStatus,
        Self::MonthlyIncome,
        Self::AnnualIncome,
        Self::CreditScore,
        Self::RentAmount,
        Self::PaymentHistory,
        Self::PropertyCareRating,
        Self::Cleanliness,
        Self::DamageToProperty,
        Self::NoiseComplaints,
        Self::EvictionNotice,
        Self::ReferenceScore,
        Self::TenancyStart,
        Self::TenancyEnd,
        Self::TenancyMonths,
        Self::RentPaidOnTime,
        Self::LatePayments,
        Self::EmploymentYears,
        Self::ImputedMonthlyIncome,
        Self::ImputedCreditScore,
    ];

    pub(crate) const fn field(self) -> &'static str {
        match self {
            Self::TenantId => "tenant_id",
            Self::Name => "name",
            Self::Age => "age",
            Self::EmploymentStatus => "employment_status",
            Self::MonthlyIncome => "monthly_income",
            Self::AnnualIncome => "annual_income",
            Self::CreditScore => "credit_score",
            Self::RentAmount => "rent_amount",
            Self::PaymentHistory => "payment_history",
            Self::PropertyCareRating => "property_care_rating",
            Self::Cleanliness => "cleanliness",
            Self::DamageToProperty => "damage_to_property",
            Self::NoiseComplaints => "noise_complaints",
            Self::EvictionNotice => "eviction_notice",
            Self::ReferenceScore => "reference_score",
            Self::TenancyStart => "tenancy_start",
            Self::TenancyEnd => "tenancy_end",
            Self::TenancyMonths => "tenancy_months",
            Self::RentPaidOnTime => "rent_paid_on_time",
            Self::LatePayments => "late_payments",
            Self::EmploymentYears => "employment_years",
            Self::ImputedMonthlyIncome => "imputed_monthly_income",
            Self::ImputedCreditScore => "imputed_credit_score",
        }
    }
}

static COLUMN_ALIASES: OnceLock<HashMap<String, TenantColumn>> = OnceLock::new();

pub(crate) fn column_for_header(header: &str) -> Option<TenantColumn> {
    column_aliases().get(&normalize_header(header)).copied()
}

/// Folds header spellings together: strips BOM/zero-width marks, treats
/// underscores as spaces, collapses whitespace and lowercases.
pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "").replace('_', " ");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

fn column_aliases() -> &'static HashMap<String, TenantColumn> {
    COLUMN_ALIASES.get_or_init(|| {
        const ALIASES: &[(&str, TenantColumn)] = &[
            // Identity
            ("ID", TenantColumn::TenantId),
            ("Tenant", TenantColumn::TenantId),
            ("Tenant Ref", TenantColumn::TenantId),
            ("Tenant Reference", TenantColumn::TenantId),
            ("Tenant Name", TenantColumn::Name),
            ("Full Name", TenantColumn::Name),
            // Employment & finances
            ("Employment", TenantColumn::EmploymentStatus),
            ("Income", TenantColumn::MonthlyIncome),
            ("Monthly Salary", TenantColumn::MonthlyIncome),
            ("Monthly Salary (\u{a3})", TenantColumn::MonthlyIncome),
            ("Monthly Income (\u{a3})", TenantColumn::MonthlyIncome),
            ("Annual Income (\u{a3})", TenantColumn::AnnualIncome),
            ("Yearly Income", TenantColumn::AnnualIncome),
            ("Rent", TenantColumn::RentAmount),
            ("Monthly Rent", TenantColumn::RentAmount),
            ("Monthly Rent (\u{a3})", TenantColumn::RentAmount),
            ("Rent (\u{a3})", TenantColumn::RentAmount),
            ("Employment Duration (Years)", TenantColumn::EmploymentYears),
            ("Employment Duration", TenantColumn::EmploymentYears),
            ("Years Employed", TenantColumn::EmploymentYears),
            // Rental history
            ("Payments", TenantColumn::PaymentHistory),
            ("Pays On Time", TenantColumn::RentPaidOnTime),
            ("Late Payment Count", TenantColumn::LatePayments),
            ("Property Care", TenantColumn::PropertyCareRating),
            ("Care Rating", TenantColumn::PropertyCareRating),
            ("Room Cleanliness", TenantColumn::Cleanliness),
            ("Property Damage", TenantColumn::DamageToProperty),
            ("Reference Score (1-10)", TenantColumn::ReferenceScore),
            ("References", TenantColumn::ReferenceScore),
            // Tenancy dates
            ("Tenancy Start Date", TenantColumn::TenancyStart),
            ("Move In Date", TenantColumn::TenancyStart),
            ("Move-In Date", TenantColumn::TenancyStart),
            ("Tenancy End Date", TenantColumn::TenancyEnd),
            ("Move Out Date", TenantColumn::TenancyEnd),
            ("Move-Out Date", TenantColumn::TenancyEnd),
            ("Tenancy Duration (Months)", TenantColumn::TenancyMonths),
            ("Tenancy Duration", TenantColumn::TenancyMonths),
        ];

        let mut map = HashMap::with_capacity(TenantColumn::ALL.len() + ALIASES.len());
        for column in TenantColumn::ALL {
            map.insert(normalize_header(column.field()), column);
        }
        for (alias, column) in ALIASES {
            map.insert(normalize_header(alias), *column);
        }
        map
    })
}
