use super::amortization::{monthly_rate, round2};
use super::events::{CarHolding, HouseHolding, MonthLedger, Phase, StudentDebt, advance};
use super::report::Checkpoint;
use super::types::{LegacyLoanParams, LifeEvent, MonthlyRecord, ParameterSet};

const NORMAL_MONTH: &str = "Normal month";

/// Everything that evolves from one month to the next. Owned by a single run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub cash: f64,
    pub portfolio: f64,
    pub legacy_loan_balance: f64,
    pub house: Phase<HouseHolding>,
    pub car: Phase<CarHolding>,
    pub education: Phase<StudentDebt>,
}

impl SimulationState {
    pub fn opening(params: &ParameterSet) -> Self {
        Self {
            cash: params.starting_cash,
            portfolio: 0.0,
            legacy_loan_balance: params.legacy_loan.balance.max(0.0),
            house: Phase::Inactive,
            car: Phase::Inactive,
            education: Phase::Inactive,
        }
    }

    pub fn home_equity(&self) -> f64 {
        self.house.active().map_or(0.0, HouseHolding::equity)
    }

    pub fn mortgage_balance(&self) -> f64 {
        self.house.active().map_or(0.0, |h| h.mortgage_balance)
    }

    pub fn car_value(&self) -> f64 {
        self.car.active().map_or(0.0, |c| c.value)
    }

    pub fn car_loan_balance(&self) -> f64 {
        self.car.active().map_or(0.0, |c| c.loan_balance)
    }

    pub fn student_loan_balance(&self) -> f64 {
        self.education.active().map_or(0.0, |d| d.balance)
    }

    /// All outstanding liabilities, the mortgage included.
    pub fn total_debt(&self) -> f64 {
        self.legacy_loan_balance
            + self.mortgage_balance()
            + self.car_loan_balance()
            + self.student_loan_balance()
    }

    /// The mortgage is already netted out of home equity.
    pub fn net_worth(&self) -> f64 {
        self.cash + self.portfolio + self.home_equity() + self.car_value()
            - self.legacy_loan_balance
            - self.car_loan_balance()
            - self.student_loan_balance()
    }

    fn record(&self, month: u32, narrative: String) -> MonthlyRecord {
        MonthlyRecord {
            month,
            cash: round2(self.cash),
            portfolio: round2(self.portfolio),
            debt: round2(self.total_debt()),
            net_worth: round2(self.net_worth()),
            home_equity: round2(self.home_equity()),
            car_value: round2(self.car_value()),
            narrative,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub state: SimulationState,
    pub record: MonthlyRecord,
    pub events: Vec<LifeEvent>,
}

/// Advance the simulation by one month.
pub fn step(state: SimulationState, params: &ParameterSet, month: u32) -> StepOutcome {
    let SimulationState {
        cash: opening_cash,
        mut portfolio,
        legacy_loan_balance,
        house,
        car,
        education,
    } = state;

    let mut ledger = MonthLedger::new(month, opening_cash);

    let house = advance(house, &params.house, &mut ledger);
    let car = advance(car, &params.car, &mut ledger);
    let education = advance(education, &params.education, &mut ledger);

    ledger.cash += params.monthly_take_home();
    ledger.cash -= params.monthly_expenses;

    invest(&mut ledger, &mut portfolio, params);
    let legacy_loan_balance = service_legacy_loan(legacy_loan_balance, &params.legacy_loan, &mut ledger);

    if opening_cash >= 0.0 && ledger.cash < 0.0 {
        ledger.note(format!("Cash went negative (${:.2})", ledger.cash));
    }

    let state = SimulationState {
        cash: ledger.cash,
        portfolio,
        legacy_loan_balance,
        house,
        car,
        education,
    };
    let narrative = if ledger.notes.is_empty() {
        NORMAL_MONTH.to_string()
    } else {
        ledger.notes.join("; ")
    };
    let record = state.record(month, narrative);

    StepOutcome {
        state,
        record,
        events: ledger.events,
    }
}

fn invest(ledger: &mut MonthLedger, portfolio: &mut f64, params: &ParameterSet) {
    if ledger.cash >= params.monthly_invest {
        *portfolio = *portfolio * (1.0 + monthly_rate(params.return_annual)) + params.monthly_invest;
        ledger.cash -= params.monthly_invest;
    } else {
        ledger.note(format!(
            "Skipped investing ${:.2}: insufficient cash",
            params.monthly_invest
        ));
    }
}

fn service_legacy_loan(balance: f64, loan: &LegacyLoanParams, ledger: &mut MonthLedger) -> f64 {
    let scheduled = loan.min_payment + loan.extra_payment;
    if balance <= 0.0 || scheduled <= 0.0 {
        return balance;
    }

    let interest = balance * monthly_rate(loan.rate_annual);
    let payoff = balance + interest;
    let payment = payoff.min(scheduled);
    ledger.cash -= payment;

    if payment >= payoff {
        ledger.note("Legacy loan paid off");
        return 0.0;
    }
    let principal = (payment - interest).max(0.0);
    (balance - principal).max(0.0)
}

/// The month-by-month series plus what was captured along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRun {
    pub records: Vec<MonthlyRecord>,
    pub mid: Option<Checkpoint>,
    pub life_events: Vec<LifeEvent>,
}

pub fn run_simulation(params: &ParameterSet) -> SimulationRun {
    let mid_month = params.mid_month();
    let mut state = SimulationState::opening(params);
    let mut records = Vec::with_capacity(params.months as usize);
    let mut life_events = Vec::new();
    let mut mid = None;

    for month in 1..=params.months {
        let outcome = step(state, params, month);
        if month == mid_month {
            mid = Some(Checkpoint::from(&outcome.record));
        }
        life_events.extend(outcome.events);
        records.push(outcome.record);
        state = outcome.state;
    }

    tracing::debug!(
        months = params.months,
        life_events = life_events.len(),
        final_net_worth = state.net_worth(),
        "simulation finished"
    );

    SimulationRun {
        records,
        mid,
        life_events,
    }
}
