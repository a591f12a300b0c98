use std::collections::HashMap;
use std::str::FromStr;

use tracing::debug;

use crate::core::{
    CarParams, EducationParams, FieldRule, HouseParams, LegacyLoanParams, ParameterSet,
};

/// Lenient reader over raw query-string values.
///
/// Every lookup falls back to the supplied default when the key is missing,
/// the text does not parse, or the parsed value breaks the field's rule, so
/// whatever comes out of [`resolve`] always validates.
pub struct QueryParams<'a> {
    raw: &'a HashMap<String, String>,
}

impl<'a> QueryParams<'a> {
    pub fn new(raw: &'a HashMap<String, String>) -> Self {
        Self { raw }
    }

    pub fn get_or<T>(&self, key: &'static str, default: T, rule: FieldRule) -> T
    where
        T: FromStr + Copy + Into<f64>,
    {
        let Some(text) = self.raw.get(key) else {
            return default;
        };
        match text.trim().parse::<T>() {
            Ok(value) if rule.accepts(value.into()) => value,
            Ok(_) => {
                debug!(key, raw = %text, "value out of range, using default");
                default
            }
            Err(_) => {
                debug!(key, raw = %text, "unparsable value, using default");
                default
            }
        }
    }
}

/// Build the parameter set for one request from its query string.
pub fn resolve(raw: &HashMap<String, String>) -> ParameterSet {
    let q = QueryParams::new(raw);
    let d = ParameterSet::default();

    ParameterSet {
        months: q.get_or("months", d.months, FieldRule::Horizon),
        starting_cash: q.get_or("startingCash", d.starting_cash, FieldRule::Finite),
        monthly_invest: q.get_or("monthlyInvest", d.monthly_invest, FieldRule::NonNegative),
        return_annual: q.get_or("returnAnnual", d.return_annual, FieldRule::Finite),
        legacy_loan: LegacyLoanParams {
            balance: q.get_or("loanBalance", d.legacy_loan.balance, FieldRule::NonNegative),
            rate_annual: q.get_or(
                "loanRateAnnual",
                d.legacy_loan.rate_annual,
                FieldRule::NonNegative,
            ),
            min_payment: q.get_or(
                "loanMinPayment",
                d.legacy_loan.min_payment,
                FieldRule::NonNegative,
            ),
            extra_payment: q.get_or(
                "loanExtraPayment",
                d.legacy_loan.extra_payment,
                FieldRule::NonNegative,
            ),
        },
        salary_annual: q.get_or("salaryAnnual", d.salary_annual, FieldRule::NonNegative),
        monthly_expenses: q.get_or("monthlyExpenses", d.monthly_expenses, FieldRule::NonNegative),
        house: HouseParams {
            buy_month: q.get_or("houseBuyMonth", d.house.buy_month, FieldRule::Trigger),
            price: q.get_or("homePrice", d.house.price, FieldRule::NonNegative),
            down_payment_percent: q.get_or(
                "downPaymentPercent",
                d.house.down_payment_percent,
                FieldRule::Share,
            ),
            mortgage_rate: q.get_or("mortgageRate", d.house.mortgage_rate, FieldRule::NonNegative),
            property_tax_rate: q.get_or(
                "propertyTaxRate",
                d.house.property_tax_rate,
                FieldRule::NonNegative,
            ),
            maintenance_percent: q.get_or(
                "homeMaintenancePercent",
                d.house.maintenance_percent,
                FieldRule::NonNegative,
            ),
            appreciation_annual: q.get_or(
                "homeAppreciationAnnual",
                d.house.appreciation_annual,
                FieldRule::Finite,
            ),
        },
        car: CarParams {
            buy_month: q.get_or("carBuyMonth", d.car.buy_month, FieldRule::Trigger),
            price: q.get_or("carPrice", d.car.price, FieldRule::NonNegative),
            down_payment_percent: q.get_or(
                "carDownPaymentPercent",
                d.car.down_payment_percent,
                FieldRule::Share,
            ),
            loan_rate: q.get_or("carLoanRate", d.car.loan_rate, FieldRule::NonNegative),
            loan_years: q.get_or("carLoanYears", d.car.loan_years, FieldRule::Term),
            insurance_monthly: q.get_or(
                "carInsuranceMonthly",
                d.car.insurance_monthly,
                FieldRule::NonNegative,
            ),
            gas_monthly: q.get_or("carGasMonthly", d.car.gas_monthly, FieldRule::NonNegative),
            maintenance_monthly: q.get_or(
                "carMaintenanceMonthly",
                d.car.maintenance_monthly,
                FieldRule::NonNegative,
            ),
        },
        education: EducationParams {
            start_month: q.get_or("collegeStartMonth", d.education.start_month, FieldRule::Trigger),
            college_cost: q.get_or("collegeCost", d.education.college_cost, FieldRule::NonNegative),
            loan_amount: q.get_or(
                "studentLoanAmount",
                d.education.loan_amount,
                FieldRule::NonNegative,
            ),
            loan_rate: q.get_or("studentLoanRate", d.education.loan_rate, FieldRule::NonNegative),
            loan_years: q.get_or("studentLoanYears", d.education.loan_years, FieldRule::Term),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{any, prop_assert, proptest};

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn field(params: &ParameterSet, key: &str) -> f64 {
        params
            .fields()
            .into_iter()
            .find(|(name, _, _)| *name == key)
            .map(|(_, value, _)| value)
            .unwrap_or_else(|| panic!("unknown field {key}"))
    }

    #[test]
    fn empty_query_resolves_to_defaults() {
        assert_eq!(resolve(&HashMap::new()), ParameterSet::default());
    }

    #[test]
    fn every_documented_key_is_read() {
        // 2 is acceptable under every rule and differs from every default.
        for (key, default, _) in ParameterSet::default().fields() {
            assert_ne!(default, 2.0, "{key} defaults to 2, pick another override value");
            let params = resolve(&query(&[(key, "2")]));
            assert_eq!(field(&params, key), 2.0, "{key} was not read");
        }
    }

    #[test]
    fn unparsable_values_fall_back() {
        let params = resolve(&query(&[
            ("months", "twelve"),
            ("startingCash", ""),
            ("carLoanYears", "4.5"),
            ("homePrice", "1e5"),
        ]));
        assert_eq!(params.months, 120);
        assert_eq!(params.starting_cash, 30_000.0);
        assert_eq!(params.car.loan_years, 5);
        assert_eq!(params.house.price, 100_000.0);
    }

    #[test]
    fn values_breaking_field_rules_fall_back() {
        let params = resolve(&query(&[
            ("months", "0"),
            ("downPaymentPercent", "150"),
            ("studentLoanYears", "0"),
            ("monthlyExpenses", "-10"),
            ("salaryAnnual", "NaN"),
            ("returnAnnual", "inf"),
        ]));
        let defaults = ParameterSet::default();
        assert_eq!(params.months, defaults.months);
        assert_eq!(params.house.down_payment_percent, defaults.house.down_payment_percent);
        assert_eq!(params.education.loan_years, defaults.education.loan_years);
        assert_eq!(params.monthly_expenses, defaults.monthly_expenses);
        assert_eq!(params.salary_annual, defaults.salary_annual);
        assert_eq!(params.return_annual, defaults.return_annual);
    }

    #[test]
    fn signed_fields_accept_negative_values() {
        let params = resolve(&query(&[
            ("startingCash", "-2500"),
            ("returnAnnual", "-3.5"),
            ("homeAppreciationAnnual", " -1 "),
        ]));
        assert_eq!(params.starting_cash, -2_500.0);
        assert_eq!(params.return_annual, -3.5);
        assert_eq!(params.house.appreciation_annual, -1.0);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let params = resolve(&query(&[("favouriteColour", "blue")]));
        assert_eq!(params, ParameterSet::default());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_resolved_parameters_always_validate(
            months in any::<String>(),
            cash in any::<f64>(),
            share in any::<f64>(),
            term in any::<i64>(),
            trigger in any::<i64>()
        ) {
            let (cash, share) = (cash.to_string(), share.to_string());
            let (term, trigger) = (term.to_string(), trigger.to_string());
            let raw = query(&[
                ("months", months.as_str()),
                ("startingCash", cash.as_str()),
                ("carDownPaymentPercent", share.as_str()),
                ("studentLoanYears", term.as_str()),
                ("houseBuyMonth", trigger.as_str()),
            ]);
            prop_assert!(resolve(&raw).validate().is_ok());
        }
    }
}
