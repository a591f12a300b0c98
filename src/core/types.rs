use serde::Serialize;
use thiserror::Error;

/// Share of gross salary kept after the flat effective tax rate (24%).
pub const TAKE_HOME_FRACTION: f64 = 0.76;
/// Mortgages always amortize over 30 years.
pub const MORTGAGE_TERM_MONTHS: u32 = 360;
/// Longest horizon a single run accepts (100 years).
pub const MAX_MONTHS: u32 = 1_200;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSet {
    pub months: u32,
    pub starting_cash: f64,
    pub monthly_invest: f64,
    pub return_annual: f64,
    #[serde(flatten)]
    pub legacy_loan: LegacyLoanParams,
    pub salary_annual: f64,
    pub monthly_expenses: f64,
    #[serde(flatten)]
    pub house: HouseParams,
    #[serde(flatten)]
    pub car: CarParams,
    #[serde(flatten)]
    pub education: EducationParams,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyLoanParams {
    #[serde(rename = "loanBalance")]
    pub balance: f64,
    #[serde(rename = "loanRateAnnual")]
    pub rate_annual: f64,
    #[serde(rename = "loanMinPayment")]
    pub min_payment: f64,
    #[serde(rename = "loanExtraPayment")]
    pub extra_payment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HouseParams {
    #[serde(rename = "houseBuyMonth")]
    pub buy_month: u32,
    #[serde(rename = "homePrice")]
    pub price: f64,
    #[serde(rename = "downPaymentPercent")]
    pub down_payment_percent: f64,
    #[serde(rename = "mortgageRate")]
    pub mortgage_rate: f64,
    /// Annual property tax as a percentage of the purchase price.
    #[serde(rename = "propertyTaxRate")]
    pub property_tax_rate: f64,
    /// Annual upkeep as a percentage of the purchase price.
    #[serde(rename = "homeMaintenancePercent")]
    pub maintenance_percent: f64,
    #[serde(rename = "homeAppreciationAnnual")]
    pub appreciation_annual: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarParams {
    #[serde(rename = "carBuyMonth")]
    pub buy_month: u32,
    #[serde(rename = "carPrice")]
    pub price: f64,
    #[serde(rename = "carDownPaymentPercent")]
    pub down_payment_percent: f64,
    #[serde(rename = "carLoanRate")]
    pub loan_rate: f64,
    #[serde(rename = "carLoanYears")]
    pub loan_years: u32,
    #[serde(rename = "carInsuranceMonthly")]
    pub insurance_monthly: f64,
    #[serde(rename = "carGasMonthly")]
    pub gas_monthly: f64,
    #[serde(rename = "carMaintenanceMonthly")]
    pub maintenance_monthly: f64,
}

impl CarParams {
    pub fn running_costs(&self) -> f64 {
        self.insurance_monthly + self.gas_monthly + self.maintenance_monthly
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EducationParams {
    #[serde(rename = "collegeStartMonth")]
    pub start_month: u32,
    #[serde(rename = "collegeCost")]
    pub college_cost: f64,
    #[serde(rename = "studentLoanAmount")]
    pub loan_amount: f64,
    #[serde(rename = "studentLoanRate")]
    pub loan_rate: f64,
    #[serde(rename = "studentLoanYears")]
    pub loan_years: u32,
}

impl EducationParams {
    /// Amount financed: the requested loan, or the full college cost when no
    /// loan amount is set.
    pub fn principal(&self) -> f64 {
        if self.loan_amount > 0.0 {
            self.loan_amount
        } else {
            self.college_cost
        }
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            months: 120,
            starting_cash: 30_000.0,
            monthly_invest: 400.0,
            return_annual: 6.0,
            legacy_loan: LegacyLoanParams {
                balance: 0.0,
                rate_annual: 0.0,
                min_payment: 0.0,
                extra_payment: 0.0,
            },
            salary_annual: 60_000.0,
            monthly_expenses: 2_500.0,
            house: HouseParams {
                buy_month: 0,
                price: 350_000.0,
                down_payment_percent: 20.0,
                mortgage_rate: 6.5,
                property_tax_rate: 1.1,
                maintenance_percent: 1.0,
                appreciation_annual: 3.0,
            },
            car: CarParams {
                buy_month: 0,
                price: 30_000.0,
                down_payment_percent: 10.0,
                loan_rate: 7.0,
                loan_years: 5,
                insurance_monthly: 150.0,
                gas_monthly: 120.0,
                maintenance_monthly: 60.0,
            },
            education: EducationParams {
                start_month: 0,
                college_cost: 0.0,
                loan_amount: 50_000.0,
                loan_rate: 5.5,
                loan_years: 10,
            },
        }
    }
}

/// Acceptance rule for a single numeric input.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FieldRule {
    /// Any finite value (cash may start negative, returns may be negative).
    Finite,
    /// Finite and `>= 0`: prices, balances, payments, rates.
    NonNegative,
    /// A percentage share in `0..=100`.
    Share,
    /// Simulation horizon in `1..=MAX_MONTHS`.
    Horizon,
    /// Loan term in whole years, at least one.
    Term,
    /// Trigger month; `0` disables the event.
    Trigger,
}

impl FieldRule {
    pub fn check(self, field: &'static str, value: f64) -> Result<(), ParamError> {
        if !value.is_finite() {
            return Err(ParamError::NonFinite { field });
        }
        match self {
            FieldRule::Finite | FieldRule::Trigger => Ok(()),
            FieldRule::NonNegative if value < 0.0 => Err(ParamError::Negative { field, value }),
            FieldRule::Share if !(0.0..=100.0).contains(&value) => {
                Err(ParamError::ShareOutOfRange { field, value })
            }
            FieldRule::Horizon if value < 1.0 || value > MAX_MONTHS as f64 => {
                Err(ParamError::Horizon {
                    value,
                    max: MAX_MONTHS,
                })
            }
            FieldRule::Term if value < 1.0 => Err(ParamError::ZeroTerm { field }),
            _ => Ok(()),
        }
    }

    pub fn accepts(self, value: f64) -> bool {
        self.check("", value).is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
    #[error("{field} must be >= 0, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must be between 0 and 100 percent, got {value}")]
    ShareOutOfRange { field: &'static str, value: f64 },
    #[error("months must be between 1 and {max}, got {value}")]
    Horizon { value: f64, max: u32 },
    #[error("{field} must be at least 1 year")]
    ZeroTerm { field: &'static str },
}

impl ParameterSet {
    /// Every numeric input with the query key it is known by and its rule.
    pub fn fields(&self) -> Vec<(&'static str, f64, FieldRule)> {
        vec![
            ("months", self.months as f64, FieldRule::Horizon),
            ("startingCash", self.starting_cash, FieldRule::Finite),
            ("monthlyInvest", self.monthly_invest, FieldRule::NonNegative),
            ("returnAnnual", self.return_annual, FieldRule::Finite),
            ("loanBalance", self.legacy_loan.balance, FieldRule::NonNegative),
            ("loanRateAnnual", self.legacy_loan.rate_annual, FieldRule::NonNegative),
            ("loanMinPayment", self.legacy_loan.min_payment, FieldRule::NonNegative),
            ("loanExtraPayment", self.legacy_loan.extra_payment, FieldRule::NonNegative),
            ("salaryAnnual", self.salary_annual, FieldRule::NonNegative),
            ("monthlyExpenses", self.monthly_expenses, FieldRule::NonNegative),
            ("houseBuyMonth", self.house.buy_month as f64, FieldRule::Trigger),
            ("homePrice", self.house.price, FieldRule::NonNegative),
            ("downPaymentPercent", self.house.down_payment_percent, FieldRule::Share),
            ("mortgageRate", self.house.mortgage_rate, FieldRule::NonNegative),
            ("propertyTaxRate", self.house.property_tax_rate, FieldRule::NonNegative),
            ("homeMaintenancePercent", self.house.maintenance_percent, FieldRule::NonNegative),
            ("homeAppreciationAnnual", self.house.appreciation_annual, FieldRule::Finite),
            ("carBuyMonth", self.car.buy_month as f64, FieldRule::Trigger),
            ("carPrice", self.car.price, FieldRule::NonNegative),
            ("carDownPaymentPercent", self.car.down_payment_percent, FieldRule::Share),
            ("carLoanRate", self.car.loan_rate, FieldRule::NonNegative),
            ("carLoanYears", self.car.loan_years as f64, FieldRule::Term),
            ("carInsuranceMonthly", self.car.insurance_monthly, FieldRule::NonNegative),
            ("carGasMonthly", self.car.gas_monthly, FieldRule::NonNegative),
            ("carMaintenanceMonthly", self.car.maintenance_monthly, FieldRule::NonNegative),
            ("collegeStartMonth", self.education.start_month as f64, FieldRule::Trigger),
            ("collegeCost", self.education.college_cost, FieldRule::NonNegative),
            ("studentLoanAmount", self.education.loan_amount, FieldRule::NonNegative),
            ("studentLoanRate", self.education.loan_rate, FieldRule::NonNegative),
            ("studentLoanYears", self.education.loan_years as f64, FieldRule::Term),
        ]
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        self.fields()
            .into_iter()
            .try_for_each(|(field, value, rule)| rule.check(field, value))
    }

    pub fn mid_month(&self) -> u32 {
        (self.months / 2).max(1)
    }

    pub fn monthly_take_home(&self) -> f64 {
        self.salary_annual * TAKE_HOME_FRACTION / 12.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRecord {
    pub month: u32,
    pub cash: f64,
    pub portfolio: f64,
    pub debt: f64,
    pub net_worth: f64,
    pub home_equity: f64,
    pub car_value: f64,
    pub narrative: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LifeEvent {
    pub month: u32,
    pub description: String,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RecommendationKind {
    Favorable,
    Unfavorable,
    Informational,
}

impl RecommendationKind {
    pub fn label(self) -> &'static str {
        match self {
            RecommendationKind::Favorable => "Good",
            RecommendationKind::Unfavorable => "Caution",
            RecommendationKind::Informational => "Tip",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub text: String,
}
