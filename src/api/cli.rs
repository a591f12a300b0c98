use clap::{Args, Parser, Subcommand};

use super::ServerConfig;
use crate::core::{ParamError, ParameterSet};

#[derive(Parser, Debug)]
#[command(
    name = "lifeplan",
    about = "Life-event financial simulator (cash, investments and debt with house, car and college purchases)"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "info",
        help = "Default log filter when RUST_LOG is unset"
    )]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP API
    Serve(ServeArgs),
    /// Run one simulation and print the JSON document
    Simulate(SimulateArgs),
    /// Print the parameter documentation served at `/`
    Usage,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "LIFEPLAN_HOST", default_value = "0.0.0.0")]
    pub host: String,
    #[arg(short, long, env = "LIFEPLAN_PORT", default_value_t = 8080)]
    pub port: u16,
    #[arg(
        long,
        env = "LIFEPLAN_CORS_ORIGIN",
        help = "Allowed CORS origin; any origin when unset"
    )]
    pub cors_origin: Option<String>,
}

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            cors_origin: args.cors_origin,
        }
    }
}

/// Overrides for a local run; anything left unset keeps its default.
#[derive(Args, Debug, Clone, Default)]
pub struct SimulateArgs {
    #[arg(long, help = "Simulation length in months")]
    pub months: Option<u32>,
    #[arg(long, allow_negative_numbers = true)]
    pub starting_cash: Option<f64>,
    #[arg(long)]
    pub monthly_invest: Option<f64>,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Portfolio return in percent per year"
    )]
    pub return_annual: Option<f64>,

    #[arg(long, help = "Balance of an existing loan")]
    pub loan_balance: Option<f64>,
    #[arg(long, help = "Existing loan interest in percent per year")]
    pub loan_rate_annual: Option<f64>,
    #[arg(long)]
    pub loan_min_payment: Option<f64>,
    #[arg(long)]
    pub loan_extra_payment: Option<f64>,

    #[arg(long, help = "Gross salary per year")]
    pub salary_annual: Option<f64>,
    #[arg(long)]
    pub monthly_expenses: Option<f64>,

    #[arg(long, help = "Month to buy the house, 0 = never")]
    pub house_buy_month: Option<u32>,
    #[arg(long)]
    pub home_price: Option<f64>,
    #[arg(long)]
    pub down_payment_percent: Option<f64>,
    #[arg(long)]
    pub mortgage_rate: Option<f64>,
    #[arg(long, help = "Property tax in percent of price per year")]
    pub property_tax_rate: Option<f64>,
    #[arg(long, help = "Upkeep in percent of price per year")]
    pub home_maintenance_percent: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub home_appreciation_annual: Option<f64>,

    #[arg(long, help = "Month to buy the car, 0 = never")]
    pub car_buy_month: Option<u32>,
    #[arg(long)]
    pub car_price: Option<f64>,
    #[arg(long)]
    pub car_down_payment_percent: Option<f64>,
    #[arg(long)]
    pub car_loan_rate: Option<f64>,
    #[arg(long)]
    pub car_loan_years: Option<u32>,
    #[arg(long)]
    pub car_insurance_monthly: Option<f64>,
    #[arg(long)]
    pub car_gas_monthly: Option<f64>,
    #[arg(long)]
    pub car_maintenance_monthly: Option<f64>,

    #[arg(long, help = "Month college starts, 0 = never")]
    pub college_start_month: Option<u32>,
    #[arg(long)]
    pub college_cost: Option<f64>,
    #[arg(long)]
    pub student_loan_amount: Option<f64>,
    #[arg(long)]
    pub student_loan_rate: Option<f64>,
    #[arg(long)]
    pub student_loan_years: Option<u32>,

    #[arg(long, help = "Pretty-print the JSON document")]
    pub pretty: bool,
}

impl SimulateArgs {
    /// Merge the overrides onto the defaults and reject anything invalid.
    pub fn to_parameters(&self) -> Result<ParameterSet, ParamError> {
        let mut params = ParameterSet::default();

        if let Some(v) = self.months {
            params.months = v;
        }
        if let Some(v) = self.starting_cash {
            params.starting_cash = v;
        }
        if let Some(v) = self.monthly_invest {
            params.monthly_invest = v;
        }
        if let Some(v) = self.return_annual {
            params.return_annual = v;
        }

        let loan = &mut params.legacy_loan;
        if let Some(v) = self.loan_balance {
            loan.balance = v;
        }
        if let Some(v) = self.loan_rate_annual {
            loan.rate_annual = v;
        }
        if let Some(v) = self.loan_min_payment {
            loan.min_payment = v;
        }
        if let Some(v) = self.loan_extra_payment {
            loan.extra_payment = v;
        }

        if let Some(v) = self.salary_annual {
            params.salary_annual = v;
        }
        if let Some(v) = self.monthly_expenses {
            params.monthly_expenses = v;
        }

        let house = &mut params.house;
        if let Some(v) = self.house_buy_month {
            house.buy_month = v;
        }
        if let Some(v) = self.home_price {
            house.price = v;
        }
        if let Some(v) = self.down_payment_percent {
            house.down_payment_percent = v;
        }
        if let Some(v) = self.mortgage_rate {
            house.mortgage_rate = v;
        }
        if let Some(v) = self.property_tax_rate {
            house.property_tax_rate = v;
        }
        if let Some(v) = self.home_maintenance_percent {
            house.maintenance_percent = v;
        }
        if let Some(v) = self.home_appreciation_annual {
            house.appreciation_annual = v;
        }

        let car = &mut params.car;
        if let Some(v) = self.car_buy_month {
            car.buy_month = v;
        }
        if let Some(v) = self.car_price {
            car.price = v;
        }
        if let Some(v) = self.car_down_payment_percent {
            car.down_payment_percent = v;
        }
        if let Some(v) = self.car_loan_rate {
            car.loan_rate = v;
        }
        if let Some(v) = self.car_loan_years {
            car.loan_years = v;
        }
        if let Some(v) = self.car_insurance_monthly {
            car.insurance_monthly = v;
        }
        if let Some(v) = self.car_gas_monthly {
            car.gas_monthly = v;
        }
        if let Some(v) = self.car_maintenance_monthly {
            car.maintenance_monthly = v;
        }

        let education = &mut params.education;
        if let Some(v) = self.college_start_month {
            education.start_month = v;
        }
        if let Some(v) = self.college_cost {
            education.college_cost = v;
        }
        if let Some(v) = self.student_loan_amount {
            education.loan_amount = v;
        }
        if let Some(v) = self.student_loan_rate {
            education.loan_rate = v;
        }
        if let Some(v) = self.student_loan_years {
            education.loan_years = v;
        }

        params.validate()?;
        Ok(params)
    }
}
