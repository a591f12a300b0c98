//! Life-event state machines.
//!
//! Each purchase (house, car, education) is a [`Phase`] that moves from
//! `Inactive` to `Active` exactly once, in the month equal to its configured
//! trigger month. After activation the holding is carried every month:
//! loans are serviced, assets appreciate or depreciate, and cash pays for it.

use super::amortization::{monthly_payment, monthly_rate, service};
use super::types::{
    CarParams, EducationParams, HouseParams, LifeEvent, MORTGAGE_TERM_MONTHS,
};

const EARLY_CAR_DEPRECIATION: f64 = 0.985;
const LATE_CAR_DEPRECIATION: f64 = 0.992;
const EARLY_CAR_MONTHS: u32 = 12;

#[derive(Debug, Clone, PartialEq)]
pub enum Phase<T> {
    Inactive,
    Active(T),
}

impl<T> Phase<T> {
    pub fn active(&self) -> Option<&T> {
        match self {
            Phase::Active(holding) => Some(holding),
            Phase::Inactive => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Phase::Active(_))
    }
}

/// Scratch space for one month: the running cash balance plus whatever the
/// month wants to say about itself.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthLedger {
    pub month: u32,
    pub cash: f64,
    pub notes: Vec<String>,
    pub events: Vec<LifeEvent>,
}

impl MonthLedger {
    pub fn new(month: u32, cash: f64) -> Self {
        Self {
            month,
            cash,
            notes: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    fn record_event(&mut self, description: String) {
        tracing::debug!(month = self.month, %description, "life event activated");
        self.notes.push(description.clone());
        self.events.push(LifeEvent {
            month: self.month,
            description,
        });
    }
}

/// A purchase that can be triggered once and then carried month by month.
pub trait Purchase {
    type Holding;

    fn trigger_month(&self) -> u32;

    /// One-off purchase: pay the down payment, open the loan, log the event.
    fn activate(&self, ledger: &mut MonthLedger) -> Self::Holding;

    /// Recurring effects for a month in which the holding is active,
    /// including the activation month itself.
    fn carry(&self, holding: &mut Self::Holding, ledger: &mut MonthLedger);
}

/// Advance one event's state machine by a month.
pub fn advance<P: Purchase>(
    phase: Phase<P::Holding>,
    params: &P,
    ledger: &mut MonthLedger,
) -> Phase<P::Holding> {
    match phase {
        Phase::Inactive => {
            let trigger = params.trigger_month();
            if trigger == 0 || trigger != ledger.month {
                return Phase::Inactive;
            }
            let mut holding = params.activate(ledger);
            params.carry(&mut holding, ledger);
            Phase::Active(holding)
        }
        Phase::Active(mut holding) => {
            params.carry(&mut holding, ledger);
            Phase::Active(holding)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HouseHolding {
    pub purchase_month: u32,
    pub value: f64,
    pub mortgage_balance: f64,
    pub mortgage_payment: f64,
    /// Property tax plus maintenance, fixed at purchase.
    pub carrying_cost: f64,
}

impl HouseHolding {
    pub fn equity(&self) -> f64 {
        self.value - self.mortgage_balance
    }

    /// Mortgage plus carrying costs, the figure quoted at purchase.
    pub fn monthly_housing_cost(&self) -> f64 {
        self.mortgage_payment + self.carrying_cost
    }
}

impl Purchase for HouseParams {
    type Holding = HouseHolding;

    fn trigger_month(&self) -> u32 {
        self.buy_month
    }

    fn activate(&self, ledger: &mut MonthLedger) -> HouseHolding {
        let down_payment = self.price * self.down_payment_percent / 100.0;
        ledger.cash -= down_payment;
        let principal = self.price - down_payment;
        let mortgage_payment = monthly_payment(principal, self.mortgage_rate, MORTGAGE_TERM_MONTHS);
        let carrying_cost =
            self.price * (self.property_tax_rate + self.maintenance_percent) / 100.0 / 12.0;
        let holding = HouseHolding {
            purchase_month: ledger.month,
            value: self.price,
            mortgage_balance: principal,
            mortgage_payment,
            carrying_cost,
        };
        ledger.record_event(format!(
            "Bought a ${:.2} home with ${:.2} down; mortgage ${:.2} at {:.2}% for 30 years, housing cost ${:.2}/mo",
            self.price,
            down_payment,
            principal,
            self.mortgage_rate,
            holding.monthly_housing_cost(),
        ));
        holding
    }

    fn carry(&self, holding: &mut HouseHolding, ledger: &mut MonthLedger) {
        // Ownership costs start the month after closing.
        if ledger.month <= holding.purchase_month {
            return;
        }

        holding.value *= 1.0 + monthly_rate(self.appreciation_annual);

        if holding.mortgage_balance > 0.0 {
            let step = service(
                holding.mortgage_balance,
                monthly_rate(self.mortgage_rate),
                holding.mortgage_payment,
            );
            holding.mortgage_balance = (holding.mortgage_balance - step.principal).max(0.0);
            if holding.mortgage_balance == 0.0 {
                ledger.note("Mortgage paid off");
            }
        }
        // The housing cost quoted at purchase is charged in full, payoff or not.
        ledger.cash -= holding.monthly_housing_cost();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CarHolding {
    pub purchase_month: u32,
    pub value: f64,
    pub loan_balance: f64,
    pub loan_payment: f64,
    /// Loan payment plus insurance, gas and maintenance, fixed at purchase.
    pub monthly_cost: f64,
}

impl Purchase for CarParams {
    type Holding = CarHolding;

    fn trigger_month(&self) -> u32 {
        self.buy_month
    }

    fn activate(&self, ledger: &mut MonthLedger) -> CarHolding {
        let down_payment = self.price * self.down_payment_percent / 100.0;
        ledger.cash -= down_payment;
        let principal = self.price - down_payment;
        let loan_payment = monthly_payment(principal, self.loan_rate, self.loan_years * 12);
        let holding = CarHolding {
            purchase_month: ledger.month,
            value: self.price,
            loan_balance: principal,
            loan_payment,
            monthly_cost: loan_payment + self.running_costs(),
        };
        ledger.record_event(format!(
            "Bought a ${:.2} car with ${:.2} down; loan ${:.2} at {:.2}% for {} years, car cost ${:.2}/mo",
            self.price,
            down_payment,
            principal,
            self.loan_rate,
            self.loan_years,
            holding.monthly_cost,
        ));
        holding
    }

    fn carry(&self, holding: &mut CarHolding, ledger: &mut MonthLedger) {
        let months_owned = ledger.month - holding.purchase_month;
        if months_owned > 0 {
            holding.value *= if months_owned <= EARLY_CAR_MONTHS {
                EARLY_CAR_DEPRECIATION
            } else {
                LATE_CAR_DEPRECIATION
            };
        }

        let running = self.running_costs();
        let mut outflow = running;
        if holding.loan_balance > 0.0 {
            // Running costs are netted out of the loan payment before it
            // reaches principal, on top of being paid separately.
            let step = service(
                holding.loan_balance,
                monthly_rate(self.loan_rate),
                holding.loan_payment - running,
            );
            holding.loan_balance = (holding.loan_balance - step.principal).max(0.0);
            outflow += step.total();
            if holding.loan_balance == 0.0 {
                ledger.note("Car loan paid off");
            }
        }
        ledger.cash -= outflow;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentDebt {
    pub start_month: u32,
    pub balance: f64,
    pub payment: f64,
}

impl Purchase for EducationParams {
    type Holding = StudentDebt;

    fn trigger_month(&self) -> u32 {
        self.start_month
    }

    fn activate(&self, ledger: &mut MonthLedger) -> StudentDebt {
        let principal = self.principal();
        let payment = monthly_payment(principal, self.loan_rate, self.loan_years * 12);
        ledger.record_event(format!(
            "Started college with a ${:.2} student loan at {:.2}% for {} years, payment ${:.2}/mo",
            principal, self.loan_rate, self.loan_years, payment,
        ));
        StudentDebt {
            start_month: ledger.month,
            balance: principal,
            payment,
        }
    }

    fn carry(&self, debt: &mut StudentDebt, ledger: &mut MonthLedger) {
        if debt.balance > 0.0 {
            let step = service(debt.balance, monthly_rate(self.loan_rate), debt.payment);
            debt.balance = (debt.balance - step.principal).max(0.0);
            if debt.balance == 0.0 {
                ledger.note("Student loan paid off");
            }
        }
        ledger.cash -= debt.payment;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ParameterSet;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn house(buy_month: u32) -> HouseParams {
        let mut house = ParameterSet::default().house;
        house.buy_month = buy_month;
        house.price = 300_000.0;
        house.down_payment_percent = 20.0;
        house.mortgage_rate = 0.0;
        house.property_tax_rate = 1.2;
        house.maintenance_percent = 1.0;
        house.appreciation_annual = 0.0;
        house
    }

    fn car(buy_month: u32) -> CarParams {
        let mut car = ParameterSet::default().car;
        car.buy_month = buy_month;
        car.price = 24_000.0;
        car.down_payment_percent = 0.0;
        car.loan_rate = 0.0;
        car.loan_years = 2;
        car.insurance_monthly = 0.0;
        car.gas_monthly = 0.0;
        car.maintenance_monthly = 0.0;
        car
    }

    fn run<P: Purchase>(params: &P, months: u32, cash: f64) -> (Phase<P::Holding>, Vec<MonthLedger>) {
        let mut phase = Phase::Inactive;
        let mut ledgers = Vec::new();
        let mut cash = cash;
        for month in 1..=months {
            let mut ledger = MonthLedger::new(month, cash);
            phase = advance(phase, params, &mut ledger);
            cash = ledger.cash;
            ledgers.push(ledger);
        }
        (phase, ledgers)
    }

    #[test]
    fn house_activates_once_at_trigger_month() {
        let (phase, ledgers) = run(&house(12), 30, 100_000.0);
        let events: Vec<_> = ledgers.iter().flat_map(|l| l.events.iter()).collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].month, 12);
        assert!(phase.is_active());
        assert!(ledgers[..11].iter().all(|l| l.notes.is_empty()));
    }

    #[test]
    fn zero_trigger_month_never_fires() {
        let (phase, ledgers) = run(&house(0), 24, 100_000.0);
        assert_eq!(phase, Phase::Inactive);
        assert!(ledgers.iter().all(|l| l.events.is_empty()));
    }

    #[test]
    fn zero_rate_mortgage_has_straight_line_payment() {
        let params = house(1);
        let mut ledger = MonthLedger::new(1, 100_000.0);
        let holding = params.activate(&mut ledger);
        assert_approx(holding.mortgage_payment, 666.67);
        assert_approx(holding.mortgage_balance, 240_000.0);
        // 300k * 2.2% / 12 = 550 of tax and maintenance.
        assert_approx(holding.monthly_housing_cost(), 666.67 + 550.0);
        assert_approx(ledger.cash, 40_000.0);
        assert_approx(holding.equity(), 60_000.0);
    }

    #[test]
    fn mortgage_service_starts_the_month_after_purchase() {
        let (phase, ledgers) = run(&house(2), 3, 100_000.0);
        // Month 2: only the down payment.
        assert_approx(ledgers[1].cash, 40_000.0);
        // Month 3: full housing cost.
        assert_approx(ledgers[2].cash, 40_000.0 - 666.67 - 550.0);
        let holding = phase.active().expect("house is active");
        assert_approx(holding.mortgage_balance, 240_000.0 - 666.67);
    }

    #[test]
    fn home_appreciates_only_after_purchase_month() {
        let mut params = house(1);
        params.appreciation_annual = 12.0;
        let (phase, _) = run(&params, 3, 100_000.0);
        let holding = phase.active().expect("house is active");
        assert_approx(holding.value, 300_000.0 * 1.01 * 1.01);
    }

    #[test]
    fn housing_cost_is_charged_in_full_through_and_after_payoff() {
        let mut params = house(1);
        params.property_tax_rate = 0.0;
        params.maintenance_percent = 0.0;
        let mut ledger = MonthLedger::new(1, 0.0);
        let mut holding = params.activate(&mut ledger);
        holding.mortgage_balance = 0.5;

        let mut payoff = MonthLedger::new(2, 0.0);
        params.carry(&mut holding, &mut payoff);
        assert_approx(holding.mortgage_balance, 0.0);
        assert_approx(payoff.cash, -666.67);
        assert!(payoff.notes.iter().any(|n| n == "Mortgage paid off"));

        let mut after = MonthLedger::new(3, 0.0);
        params.carry(&mut holding, &mut after);
        assert_approx(holding.mortgage_balance, 0.0);
        assert_approx(after.cash, -666.67);
        assert!(after.notes.is_empty());
    }

    #[test]
    fn small_zero_rate_mortgage_keeps_fixed_cost_past_term() {
        let mut params = house(1);
        params.price = 1_000.0;
        params.down_payment_percent = 0.0;
        params.property_tax_rate = 0.0;
        params.maintenance_percent = 0.0;
        let (phase, ledgers) = run(&params, 363, 10_000.0);

        // 1000 / 360 rounds to 2.78, so the loan is retired early.
        let holding = phase.active().expect("house is active");
        assert_approx(holding.mortgage_payment, 2.78);
        assert_approx(holding.mortgage_balance, 0.0);
        for month in [360usize, 361, 362, 363] {
            let delta = ledgers[month - 1].cash - ledgers[month - 2].cash;
            assert_approx(delta, -2.78);
        }
    }

    #[test]
    fn car_depreciation_switches_rate_after_first_year() {
        let (phase, _) = run(&car(1), 14, 0.0);
        let holding = phase.active().expect("car is active");
        let expected = 24_000.0 * EARLY_CAR_DEPRECIATION.powi(12) * LATE_CAR_DEPRECIATION;
        assert_approx(holding.value, expected);
    }

    #[test]
    fn car_loan_is_serviced_in_purchase_month() {
        let (phase, ledgers) = run(&car(1), 1, 5_000.0);
        let holding = phase.active().expect("car is active");
        assert_approx(holding.loan_payment, 1_000.0);
        assert_approx(holding.loan_balance, 23_000.0);
        assert_approx(ledgers[0].cash, 4_000.0);
    }

    #[test]
    fn car_running_costs_are_netted_out_of_principal() {
        let mut params = car(1);
        params.insurance_monthly = 100.0;
        params.gas_monthly = 50.0;
        params.maintenance_monthly = 50.0;
        let (phase, ledgers) = run(&params, 1, 5_000.0);
        let holding = phase.active().expect("car is active");
        assert_approx(holding.monthly_cost, 1_200.0);
        // Principal is the payment net of the 200 of running costs.
        assert_approx(holding.loan_balance, 24_000.0 - 800.0);
        // Cash pays principal + interest + running costs.
        assert_approx(ledgers[0].cash, 5_000.0 - 800.0 - 200.0);
    }

    #[test]
    fn student_loan_charges_full_payment_every_active_month() {
        let mut params = ParameterSet::default().education;
        params.start_month = 1;
        params.loan_amount = 1_200.0;
        params.loan_rate = 0.0;
        params.loan_years = 1;
        let (phase, ledgers) = run(&params, 14, 0.0);
        assert_approx(ledgers[0].cash, -100.0);
        assert_approx(ledgers[11].cash, -1_200.0);
        assert_approx(ledgers[13].cash, -1_400.0);
        assert!(ledgers[12].notes.is_empty());
        assert!(ledgers[11].notes.iter().any(|n| n == "Student loan paid off"));
        let debt = phase.active().expect("loan is active");
        assert_approx(debt.balance, 0.0);
    }

    #[test]
    fn activation_logs_description_in_notes_and_events() {
        let mut ledger = MonthLedger::new(7, 50_000.0);
        let _ = advance(Phase::Inactive, &car(7), &mut ledger);
        assert_eq!(ledger.events.len(), 1);
        assert_eq!(ledger.events[0].month, 7);
        assert!(ledger.events[0].description.contains("$24000.00 car"));
        assert_eq!(ledger.notes[0], ledger.events[0].description);
    }
}
