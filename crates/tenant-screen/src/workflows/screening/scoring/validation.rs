use super::super::domain::FactorKind;
use super::config::{DefaultValues, ScoringConfig};
use super::ScoringConfigError;

const MAX_PRECISION: u8 = 6;

/// Validated weight per factor, indexed by [`FactorKind::index`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FactorWeights {
    weights: [f64; FactorKind::COUNT],
    total: f64,
}

impl FactorWeights {
    pub(crate) fn get(&self, factor: FactorKind) -> f64 {
        self.weights[factor.index()]
    }

    pub(crate) fn total(&self) -> f64 {
        self.total
    }
}

/// Checks the whole configuration and resolves the weight table.
pub(crate) fn validate(config: &ScoringConfig) -> Result<FactorWeights, ScoringConfigError> {
    let mut weights = [0.0; FactorKind::COUNT];

    for (key, weight) in &config.weights {
        let factor = FactorKind::parse(key).ok_or_else(|| ScoringConfigError::UnknownFactor {
            key: key.clone(),
        })?;
        if !weight.is_finite() || *weight < 0.0 {
            return Err(ScoringConfigError::InvalidWeight {
                factor: factor.key(),
                weight: *weight,
            });
        }
        weights[factor.index()] = *weight;
    }

    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(ScoringConfigError::NoPositiveWeight);
    }

    validate_defaults(&config.defaults)?;

    check_setting(
        "target_income_ratio",
        config.target_income_ratio,
        |ratio| ratio > 1.0,
    )?;
    check_setting("credit_floor", config.credit_floor, |floor| floor >= 0.0)?;
    check_setting("credit_top_band", config.credit_top_band, |top| {
        top > config.credit_floor
    })?;
    check_setting("tenancy_cap_months", config.tenancy_cap_months, |cap| {
        cap > 0.0
    })?;
    if config.precision > MAX_PRECISION {
        return Err(ScoringConfigError::InvalidSetting {
            setting: "precision",
            value: f64::from(config.precision),
        });
    }

    Ok(FactorWeights { weights, total })
}

fn validate_defaults(defaults: &DefaultValues) -> Result<(), ScoringConfigError> {
    check_default("property_care_rating", defaults.property_care_rating, 0.0, 10.0)?;
    check_default("payment_reliability", defaults.payment_reliability, 0.0, 100.0)?;
    check_default("neutral_score", defaults.neutral_score, 0.0, 100.0)?;
    if let Some(income) = defaults.monthly_income {
        check_default("monthly_income", income, 0.0, f64::MAX)?;
    }
    if let Some(credit) = defaults.credit_score {
        check_default("credit_score", credit, 0.0, 999.0)?;
    }
    Ok(())
}

fn check_default(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ScoringConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ScoringConfigError::InvalidDefault { field, value })
    }
}

fn check_setting(
    setting: &'static str,
    value: f64,
    accept: impl Fn(f64) -> bool,
) -> Result<(), ScoringConfigError> {
    if value.is_finite() && accept(value) {
        Ok(())
    } else {
        Err(ScoringConfigError::InvalidSetting { setting, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let weights = validate(&ScoringConfig::default()).expect("defaults validate");
        assert_eq!(weights.total(), 100.0);
        assert_eq!(weights.get(FactorKind::PaymentReliability), 30.0);
    }

    #[test]
    fn unknown_factor_key_is_rejected() {
        let mut config = ScoringConfig::default();
        config.weights.insert("star_sign".to_string(), 10.0);

        match validate(&config) {
            Err(ScoringConfigError::UnknownFactor { key }) => assert_eq!(key, "star_sign"),
            other => panic!("expected unknown factor, got {other:?}"),
        }
    }

    #[test]
    fn negative_and_non_finite_weights_are_rejected() {
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let mut config = ScoringConfig::default();
            config.weights.insert("conduct".to_string(), bad);
            assert!(matches!(
                validate(&config),
                Err(ScoringConfigError::InvalidWeight {
                    factor: "conduct",
                    ..
                })
            ));
        }
    }

    #[test]
    fn all_zero_weights_are_rejected() {
        let mut config = ScoringConfig::default();
        for weight in config.weights.values_mut() {
            *weight = 0.0;
        }
        assert!(matches!(
            validate(&config),
            Err(ScoringConfigError::NoPositiveWeight)
        ));
    }

    #[test]
    fn missing_factors_carry_no_weight() {
        let mut config = ScoringConfig::default();
        config.weights.remove("references");
        let weights = validate(&config).expect("valid");
        assert_eq!(weights.get(FactorKind::References), 0.0);
        assert_eq!(weights.total(), 95.0);
    }

    #[test]
    fn out_of_range_defaults_and_settings_are_rejected() {
        let mut config = ScoringConfig::default();
        config.defaults.property_care_rating = 11.0;
        assert!(matches!(
            validate(&config),
            Err(ScoringConfigError::InvalidDefault {
                field: "property_care_rating",
                ..
            })
        ));

        let mut config = ScoringConfig::default();
        config.credit_top_band = config.credit_floor;
        assert!(matches!(
            validate(&config),
            Err(ScoringConfigError::InvalidSetting {
                setting: "credit_top_band",
                ..
            })
        ));

        let mut config = ScoringConfig::default();
        config.target_income_ratio = 1.0;
        assert!(matches!(
            validate(&config),
            Err(ScoringConfigError::InvalidSetting {
                setting: "target_income_ratio",
                ..
            })
        ));
    }
}
