/// Fixed monthly payment that retires `principal` over `term_months` at
/// `annual_rate_percent`, rounded to the cent.
///
/// A zero rate degenerates to straight-line repayment. `term_months` must be
/// positive; parameter validation guarantees that before a run starts.
pub fn monthly_payment(principal: f64, annual_rate_percent: f64, term_months: u32) -> f64 {
    let r = monthly_rate(annual_rate_percent);
    let n = term_months as f64;
    if r == 0.0 {
        return round2(principal / n);
    }

    let growth = (1.0 + r).powf(n);
    round2(principal * r * growth / (growth - 1.0))
}

/// Largest principal a fixed `payment` retires over `term_months` at
/// `annual_rate_percent`; the inverse of [`monthly_payment`] before rounding.
pub fn max_principal(payment: f64, annual_rate_percent: f64, term_months: u32) -> f64 {
    let r = monthly_rate(annual_rate_percent);
    let n = term_months as f64;
    if r == 0.0 {
        return payment * n;
    }

    let growth = (1.0 + r).powf(n);
    payment * (growth - 1.0) / (r * growth)
}

pub fn monthly_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 100.0 / 12.0
}

/// Round to two decimals, ties away from zero (`f64::round`), for both signs.
pub fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    // Normalise -0.0 so serialized output never shows "-0.0".
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Split of one scheduled payment into interest and principal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Installment {
    pub interest: f64,
    pub principal: f64,
}

impl Installment {
    pub fn total(self) -> f64 {
        self.interest + self.principal
    }
}

/// Service one month of a loan: accrue interest on `balance`, apply whatever
/// part of `available` exceeds the interest to principal, never beyond payoff.
pub fn service(balance: f64, monthly_rate: f64, available: f64) -> Installment {
    let interest = balance * monthly_rate;
    let principal = (available - interest).clamp(0.0, balance.max(0.0));
    Installment {
        interest,
        principal,
    }
}
