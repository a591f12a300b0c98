use std::fmt::Write;

use crate::core::{FieldRule, ParameterSet};

const EXAMPLE_QUERY: &str = "/simulate?months=120&startingCash=50000&monthlyInvest=500&returnAnnual=7&salaryAnnual=70000&monthlyExpenses=2000&houseBuyMonth=12&homePrice=350000&carBuyMonth=24&carPrice=30000&collegeStartMonth=36&studentLoanAmount=50000";

const SECTIONS: &[(&str, &[&str])] = &[
    (
        "Basic parameters",
        &[
            "months",
            "startingCash",
            "monthlyInvest",
            "returnAnnual",
            "salaryAnnual",
            "monthlyExpenses",
        ],
    ),
    (
        "Existing loan",
        &[
            "loanBalance",
            "loanRateAnnual",
            "loanMinPayment",
            "loanExtraPayment",
        ],
    ),
    (
        "House",
        &[
            "houseBuyMonth",
            "homePrice",
            "downPaymentPercent",
            "mortgageRate",
            "propertyTaxRate",
            "homeMaintenancePercent",
            "homeAppreciationAnnual",
        ],
    ),
    (
        "Car",
        &[
            "carBuyMonth",
            "carPrice",
            "carDownPaymentPercent",
            "carLoanRate",
            "carLoanYears",
            "carInsuranceMonthly",
            "carGasMonthly",
            "carMaintenanceMonthly",
        ],
    ),
    (
        "Education",
        &[
            "collegeStartMonth",
            "collegeCost",
            "studentLoanAmount",
            "studentLoanRate",
            "studentLoanYears",
        ],
    ),
];

fn describe(key: &str) -> &'static str {
    match key {
        "months" => "Simulation length in months (1 to 1200)",
        "startingCash" => "Initial cash, may be negative",
        "monthlyInvest" => "Amount moved from cash into the portfolio each month",
        "returnAnnual" => "Portfolio return, % per year",
        "salaryAnnual" => "Gross yearly salary; 76% is kept after tax",
        "monthlyExpenses" => "Base living expenses per month",
        "loanBalance" => "Balance of a loan you already carry",
        "loanRateAnnual" => "Interest on that loan, % per year",
        "loanMinPayment" => "Minimum monthly payment",
        "loanExtraPayment" => "Extra monthly payment on top of the minimum",
        "houseBuyMonth" => "Month to buy the house (0 = never)",
        "homePrice" => "House price",
        "downPaymentPercent" => "Down payment, % of price",
        "mortgageRate" => "Mortgage interest, % per year, 30-year term",
        "propertyTaxRate" => "Property tax, % of price per year",
        "homeMaintenancePercent" => "Upkeep, % of price per year",
        "homeAppreciationAnnual" => "Home value growth, % per year",
        "carBuyMonth" => "Month to buy the car (0 = never)",
        "carPrice" => "Car price",
        "carDownPaymentPercent" => "Down payment, % of price",
        "carLoanRate" => "Car loan interest, % per year",
        "carLoanYears" => "Car loan term in years",
        "carInsuranceMonthly" => "Insurance per month",
        "carGasMonthly" => "Fuel per month",
        "carMaintenanceMonthly" => "Maintenance per month",
        "collegeStartMonth" => "Month college starts (0 = never)",
        "collegeCost" => "Total cost, financed in full when no loan amount is given",
        "studentLoanAmount" => "Student loan amount",
        "studentLoanRate" => "Student loan interest, % per year",
        "studentLoanYears" => "Student loan term in years",
        _ => "",
    }
}

fn kind(rule: FieldRule) -> &'static str {
    match rule {
        FieldRule::Horizon | FieldRule::Term | FieldRule::Trigger => "int",
        FieldRule::Finite | FieldRule::NonNegative | FieldRule::Share => "number",
    }
}

/// Plain-text documentation served at `/` and printed by `lifeplan usage`.
pub fn usage_text() -> String {
    let fields = ParameterSet::default().fields();
    let mut out = String::new();

    out.push_str("Life Event Financial Simulator API\n\n");
    out.push_str("Projects cash, investments and debt month by month, and shows how buying\n");
    out.push_str("a house, a car or paying for college changes what you can invest.\n\n");
    out.push_str("GET /simulate (also /api/simulate) with any of the parameters below.\n");
    out.push_str("Missing or invalid values fall back to the listed default.\n\n");
    out.push_str("Example with all three life events:\n");
    let _ = writeln!(out, "  {EXAMPLE_QUERY}\n");

    for (title, keys) in SECTIONS {
        let _ = writeln!(out, "{title}:");
        for key in *keys {
            if let Some((name, default, rule)) = fields.iter().find(|(name, _, _)| name == key) {
                let _ = writeln!(
                    out,
                    "  - {name} ({}): {} [default {default}]",
                    kind(*rule),
                    describe(name)
                );
            }
        }
        out.push('\n');
    }

    out.push_str("Each response includes affordability recommendations based on your salary,\n");
    out.push_str("and a house price grid (houseAffordability) sized by the 31% front-end and\n");
    out.push_str("43% back-end debt-to-income limits.\n");
    out
}
