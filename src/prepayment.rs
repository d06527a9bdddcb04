use chrono::{Months, NaiveDate};
use log::{debug, trace, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::PrepayError;

// balance at or below this is treated as fully repaid
const BALANCE_EPSILON: f64 = 1e-6;

// a schedule may run this many months past its term before it is abandoned
const OVERRUN_MONTHS: u32 = 600;

/// How often the extra payment is added on top of the regular monthly payment.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum PaymentFrequency {
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl PaymentFrequency {
    /// Number of monthly payments between two extra payments.
    pub fn months_between(&self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 1,
            PaymentFrequency::Quarterly => 3,
            PaymentFrequency::Yearly => 12,
        }
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentFrequency::Monthly => "monthly",
            PaymentFrequency::Quarterly => "quarterly",
            PaymentFrequency::Yearly => "yearly",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for PaymentFrequency {
    type Err = PrepayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(PaymentFrequency::Monthly),
            "quarterly" => Ok(PaymentFrequency::Quarterly),
            "yearly" | "annually" => Ok(PaymentFrequency::Yearly),
            _ => Err(PrepayError::UnknownFrequency(s.to_string())),
        }
    }
}

/// Loan terms plus the extra payment plan to compare against them.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PrepaymentInput {
    pub principal: f64,     // amount borrowed
    pub annual_rate: f64,   // nominal annual rate as percent (i.e., 6.0, 7.25)
    pub term_years: f64,    // original term of the loan in years
    pub extra_payment: f64, // added to the regular payment at each frequency hit
    pub frequency: PaymentFrequency,
}

impl PrepaymentInput {
    pub fn new(
        principal: f64,
        annual_rate: f64,
        term_years: f64,
        extra_payment: f64,
        frequency: PaymentFrequency,
    ) -> Self {
        Self {
            principal,
            annual_rate,
            term_years,
            extra_payment,
            frequency,
        }
    }

    /// Boundary check for callers that want to reject input the simulator
    /// would otherwise absorb into a degenerate result.
    pub fn validate(&self) -> Result<(), PrepayError> {
        let fields = [
            ("principal", self.principal),
            ("annual_rate", self.annual_rate),
            ("term_years", self.term_years),
            ("extra_payment", self.extra_payment),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(PrepayError::NonFinite {
                    field: field.to_string(),
                });
            }
        }

        if self.principal < 0. {
            return Err(PrepayError::invalid("principal", "must not be negative"));
        }
        if self.annual_rate < 0. {
            return Err(PrepayError::invalid("annual_rate", "must not be negative"));
        }
        if self.term_years <= 0. {
            return Err(PrepayError::invalid("term_years", "must be greater than zero"));
        }
        if self.extra_payment < 0. {
            return Err(PrepayError::invalid(
                "extra_payment",
                "must not be negative",
            ));
        }
        Ok(())
    }

    fn get_monthly_rate(&self) -> f64 {
        self.annual_rate / 12. / 100.
    }

    fn get_term_months(&self) -> u32 {
        // NaN terms fall through max() to a single month
        (self.term_years * 12.).round().max(1.) as u32
    }
}

/// Aggregate totals of one simulated repayment schedule.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoanScenario {
    pub total_interest: f64,
    pub total_months: u32,
    pub total_paid: f64,
}

impl LoanScenario {
    /// Date of the last payment, counting the first payment as month one.
    pub fn payoff_date(&self, first_pmt_date: NaiveDate) -> Option<NaiveDate> {
        if self.total_months == 0 {
            return None;
        }
        first_pmt_date.checked_add_months(Months::new(self.total_months - 1))
    }
}

impl fmt::Display for LoanScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} payments, interest paid ${:.2}, total paid ${:.2}",
            self.total_months, self.total_interest, self.total_paid
        )
    }
}

/// Baseline and prepayment schedules side by side, with the savings between them.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PrepaymentResult {
    pub normal: LoanScenario,
    pub prepay: LoanScenario,
    pub interest_saved: f64,
    pub interest_reduction_percent: f64,
    pub months_saved: u32,
    pub term_reduction_percent: f64,
    pub years_saved: f64,
    pub monthly_payment: f64, // regular payment with no prepayment
}

impl PrepaymentResult {
    /// Last payment dates of the baseline and prepayment schedules.
    pub fn payoff_dates(&self, first_pmt_date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        Some((
            self.normal.payoff_date(first_pmt_date)?,
            self.prepay.payoff_date(first_pmt_date)?,
        ))
    }
}

impl fmt::Display for PrepaymentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "monthly payment ${:.2}", self.monthly_payment)?;
        writeln!(f, "without prepayment: {}", self.normal)?;
        writeln!(f, "with prepayment: {}", self.prepay)?;
        writeln!(
            f,
            "interest saved ${:.2} ({:.2}%)",
            self.interest_saved, self.interest_reduction_percent
        )?;
        write!(
            f,
            "payments saved {} ({:.2} years, {:.2}%)",
            self.months_saved, self.years_saved, self.term_reduction_percent
        )
    }
}

/// Runs the loan with and without the extra payments and compares the two.
///
/// Never fails: zero or negative principal yields two empty scenarios and all
/// savings figures are clamped at zero.
pub fn calculate_prepayment_savings(input: &PrepaymentInput) -> PrepaymentResult {
    let monthly_rate = input.get_monthly_rate();
    let term_months = input.get_term_months();
    let pmt_amount = get_pmt_amount(input.principal, monthly_rate, term_months);
    debug!(
        "{} months at {} per month, regular payment {}",
        term_months, monthly_rate, pmt_amount
    );

    let normal = simulate_schedule(
        input.principal,
        monthly_rate,
        term_months,
        pmt_amount,
        |_| 0.,
    );
    let prepay = simulate_schedule(
        input.principal,
        monthly_rate,
        term_months,
        pmt_amount,
        |pmt_number| get_extra_due(input.extra_payment, input.frequency, pmt_number),
    );
    debug!("without prepayment: {}", normal);
    debug!("with prepayment: {}", prepay);

    compare_scenarios(normal, prepay, pmt_amount)
}

// fixed payment that clears principal over total_pmts periods
fn get_pmt_amount(principal: f64, periodic_rate: f64, total_pmts: u32) -> f64 {
    if principal <= 0. || total_pmts == 0 {
        return 0.;
    }
    if periodic_rate == 0. {
        return principal / total_pmts as f64;
    }

    // (1 + r)^n and (1 + r)^n - 1 via ln_1p/exp_m1 to keep precision for small rates
    let growth = total_pmts as f64 * periodic_rate.ln_1p();
    principal * periodic_rate * growth.exp() / growth.exp_m1()
}

fn get_extra_due(extra_payment: f64, frequency: PaymentFrequency, pmt_number: u32) -> f64 {
    if extra_payment > 0. && pmt_number % frequency.months_between() == 0 {
        extra_payment
    } else {
        0.
    }
}

// month-by-month repayment; extra_due gives the additional amount paid in a
// given 1-based month on top of pmt_amount
fn simulate_schedule<F>(
    principal: f64,
    periodic_rate: f64,
    term_months: u32,
    pmt_amount: f64,
    extra_due: F,
) -> LoanScenario
where
    F: Fn(u32) -> f64,
{
    let mut scenario = LoanScenario::default();
    if !(principal > 0.) || !(pmt_amount > 0.) {
        return scenario;
    }

    let max_months = term_months.saturating_add(OVERRUN_MONTHS);
    let mut balance = principal;

    while balance > BALANCE_EPSILON && scenario.total_months < max_months {
        scenario.total_months += 1;

        let interest = balance * periodic_rate;
        let mut pmt_amt = pmt_amount + extra_due(scenario.total_months);
        let mut principal_paid = pmt_amt - interest;

        // a payment that doesn't cover interest settles the loan outright,
        // and the last payment never takes the balance below zero
        if principal_paid <= 0. || principal_paid > balance {
            principal_paid = balance;
            pmt_amt = interest + balance;
        }

        balance -= principal_paid;
        scenario.total_interest += interest;
        scenario.total_paid += pmt_amt;
        trace!(
            "pmt # {}, payment {}, interest {}, end bal {}",
            scenario.total_months,
            pmt_amt,
            interest,
            balance
        );
    }

    if balance > BALANCE_EPSILON {
        warn!(
            "schedule stopped after {} payments with {} still outstanding",
            scenario.total_months, balance
        );
    }
    scenario
}

fn compare_scenarios(
    normal: LoanScenario,
    prepay: LoanScenario,
    monthly_payment: f64,
) -> PrepaymentResult {
    let interest_saved = (normal.total_interest - prepay.total_interest).max(0.);
    let months_saved = normal.total_months.saturating_sub(prepay.total_months);

    PrepaymentResult {
        normal,
        prepay,
        interest_saved,
        interest_reduction_percent: get_percent(interest_saved, normal.total_interest),
        months_saved,
        term_reduction_percent: get_percent(months_saved as f64, normal.total_months as f64),
        years_saved: months_saved as f64 / 12.,
        monthly_payment,
    }
}

fn get_percent(part: f64, whole: f64) -> f64 {
    if whole > 0. {
        (part / whole * 100.).max(0.)
    } else {
        0.
    }
}
