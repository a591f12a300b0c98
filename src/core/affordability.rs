//! Debt-to-income house affordability.
//!
//! A monthly housing budget is capped twice: by the front-end ratio (housing
//! alone against gross pay) and by the back-end ratio (housing plus other debt
//! payments against gross pay). The tighter cap is turned into a maximum loan
//! by inverting the amortization formula, then into a maximum price through
//! the down payment. A grid over down-payment and rate options brackets the
//! answer for the caller.

use serde::Serialize;

use super::amortization::{max_principal, monthly_payment, round2};
use super::types::ParameterSet;

/// Limits and the option grid used by [`analyze`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordabilitySettings {
    /// Housing payment as a share of gross monthly pay, in percent.
    pub front_end_ratio: f64,
    /// All debt payments as a share of gross monthly pay, in percent.
    pub back_end_ratio: f64,
    pub mortgage_years: u32,
    pub down_payment_options: Vec<f64>,
    pub rate_options: Vec<f64>,
}

impl Default for AffordabilitySettings {
    fn default() -> Self {
        Self {
            front_end_ratio: 31.0,
            back_end_ratio: 43.0,
            mortgage_years: 30,
            down_payment_options: vec![5.0, 10.0, 15.0, 20.0, 25.0],
            rate_options: vec![5.5, 6.0, 6.5, 7.0, 7.5],
        }
    }
}

/// The most house one down-payment and rate combination allows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseAffordability {
    pub down_payment_percent: f64,
    pub mortgage_rate: f64,
    pub mortgage_years: u32,
    pub monthly_budget: f64,
    pub max_loan: f64,
    pub max_price: f64,
    pub down_payment: f64,
    /// Resulting housing share of gross pay, in percent.
    pub front_end_ratio: f64,
    /// Resulting total debt share of gross pay, in percent.
    pub back_end_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordabilityReport {
    pub settings: AffordabilitySettings,
    pub monthly_gross: f64,
    pub other_monthly_debts: f64,
    /// The caller's own down payment and mortgage rate.
    pub current: HouseAffordability,
    /// Every grid combination, cheapest first.
    pub options: Vec<HouseAffordability>,
    /// The middle of `options`.
    pub suggested: Option<HouseAffordability>,
}

/// Monthly payments already committed elsewhere: the existing loan's minimum
/// and the scheduled payments of a planned car or student loan.
pub fn other_monthly_debts(params: &ParameterSet) -> f64 {
    let mut total = 0.0;
    if params.legacy_loan.balance > 0.0 {
        total += params.legacy_loan.min_payment;
    }

    let car = &params.car;
    if car.buy_month > 0 && car.price > 0.0 {
        let principal = car.price * (1.0 - car.down_payment_percent / 100.0);
        total += monthly_payment(principal, car.loan_rate, car.loan_years * 12);
    }

    let education = &params.education;
    let principal = education.principal();
    if education.start_month > 0 && principal > 0.0 {
        total += monthly_payment(principal, education.loan_rate, education.loan_years * 12);
    }
    total
}

pub fn house_affordability(
    salary_annual: f64,
    down_payment_percent: f64,
    mortgage_rate: f64,
    other_debts: f64,
    settings: &AffordabilitySettings,
) -> HouseAffordability {
    let monthly_gross = salary_annual / 12.0;
    let housing_cap = monthly_gross * settings.front_end_ratio / 100.0;
    let total_cap = monthly_gross * settings.back_end_ratio / 100.0 - other_debts;
    let budget = housing_cap.min(total_cap).max(0.0);

    let max_loan = max_principal(budget, mortgage_rate, settings.mortgage_years * 12);
    let financed_share = 1.0 - down_payment_percent / 100.0;
    // An all-cash purchase has no mortgage to size.
    let max_price = if financed_share > 0.0 {
        max_loan / financed_share
    } else {
        0.0
    };

    let share_of_gross = |payment: f64| {
        if monthly_gross > 0.0 {
            (payment / monthly_gross * 1_000.0).round() / 10.0
        } else {
            0.0
        }
    };

    HouseAffordability {
        down_payment_percent,
        mortgage_rate,
        mortgage_years: settings.mortgage_years,
        monthly_budget: round2(budget),
        max_loan: max_loan.round(),
        max_price: max_price.round(),
        down_payment: (max_price * down_payment_percent / 100.0).round(),
        front_end_ratio: share_of_gross(budget),
        back_end_ratio: share_of_gross(budget + other_debts),
    }
}

pub fn analyze(params: &ParameterSet, settings: &AffordabilitySettings) -> AffordabilityReport {
    let salary = params.salary_annual;
    let other_debts = other_monthly_debts(params);

    let mut options: Vec<HouseAffordability> = settings
        .down_payment_options
        .iter()
        .flat_map(|&down| {
            settings
                .rate_options
                .iter()
                .map(move |&rate| house_affordability(salary, down, rate, other_debts, settings))
        })
        .collect();
    options.sort_by(|a, b| a.max_price.total_cmp(&b.max_price));
    let suggested = options.get(options.len() / 2).cloned();

    AffordabilityReport {
        settings: settings.clone(),
        monthly_gross: round2(salary / 12.0),
        other_monthly_debts: round2(other_debts),
        current: house_affordability(
            salary,
            params.house.down_payment_percent,
            params.house.mortgage_rate,
            other_debts,
            settings,
        ),
        options,
        suggested,
    }
}
