use tracing::debug;

use super::types::{
    DerivedLoan, FinancingInputs, Forecast, LoanTerms, MonthStep, PayoffOutcome, UnboundedReason,
    YearlyScheduleRow,
};

/// Simulation horizon shared by every loop: 100 years.
pub const MAX_MONTHS: u32 = 1200;

const MONTHS_PER_YEAR: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Step {
    Amortized(MonthStep),
    NonAmortizing,
}

pub fn run_forecast(inputs: &FinancingInputs) -> Forecast {
    let loan = derive_loan(inputs);
    let payment = monthly_payment(
        loan.principal,
        inputs.annual_interest_rate,
        inputs.annual_repayment_rate,
    );

    let remaining_balance = remaining_balance_after(
        loan.principal,
        inputs.annual_interest_rate,
        payment,
        inputs.annual_extra_repayment,
        f64::from(inputs.fixed_period_years),
    );
    let payoff = simulate_to_payoff(
        loan.principal,
        inputs.annual_interest_rate,
        payment,
        inputs.annual_extra_repayment,
    );
    let schedule = build_yearly_schedule(
        loan.principal,
        inputs.annual_interest_rate,
        payment,
        inputs.annual_extra_repayment,
    );

    if let PayoffOutcome::Unbounded { reason } = payoff {
        debug!(
            principal = loan.principal,
            monthly_payment = payment,
            ?reason,
            "loan is not payable under these terms"
        );
    }

    Forecast {
        inputs: *inputs,
        loan,
        monthly_payment: payment,
        remaining_balance,
        payoff,
        total_repayment: total_repayment(loan.principal, payoff),
        schedule,
    }
}

pub fn derive_loan(inputs: &FinancingInputs) -> DerivedLoan {
    let ancillary_costs = inputs.purchase_price * (inputs.ancillary_percent / 100.0);
    DerivedLoan {
        ancillary_costs,
        principal: inputs.purchase_price + ancillary_costs - inputs.equity,
    }
}

/// Fixed instalment sized from the initial interest and repayment rates.
///
/// The payment is computed once and never re-derived as the balance shrinks,
/// so the share going to repayment grows every month. This is the usual
/// "interest plus initial repayment" annuity convention, not a present-value
/// annuity over a fixed term.
pub fn monthly_payment(
    principal: f64,
    annual_interest_rate: f64,
    annual_repayment_rate: f64,
) -> f64 {
    let i = annual_interest_rate / 100.0;
    let t = annual_repayment_rate / 100.0;
    let annual_payment = principal * (i + t);
    annual_payment / 12.0
}

/// Principal plus interest paid until payoff. Unbounded payoffs have no total.
pub fn total_repayment(principal: f64, payoff: PayoffOutcome) -> Option<f64> {
    let interest = payoff.total_interest()?;
    if principal <= 0.0 {
        Some(interest)
    } else {
        Some(principal + interest)
    }
}

/// Advances the balance by one month.
///
/// `month_index` is zero-based; the annual extra repayment lands after every
/// twelfth month while a positive balance remains, and never exceeds it.
pub(crate) fn step_month(balance: f64, terms: &LoanTerms, month_index: u32) -> Step {
    let interest = balance * terms.monthly_rate;
    let principal_portion = terms.monthly_payment - interest;
    if principal_portion <= 0.0 {
        return Step::NonAmortizing;
    }

    let mut closing = balance - principal_portion;
    let mut extra_repayment = 0.0;
    if terms.annual_extra_repayment > 0.0
        && (month_index + 1) % MONTHS_PER_YEAR == 0
        && closing > 0.0
    {
        extra_repayment = terms.annual_extra_repayment.min(closing);
        closing -= extra_repayment;
    }

    Step::Amortized(MonthStep {
        opening_balance: balance,
        interest,
        principal_portion,
        extra_repayment,
        // f64::max would turn NaN into 0.
        closing_balance: if closing < 0.0 { 0.0 } else { closing },
    })
}

pub fn simulate_to_payoff(
    principal: f64,
    annual_interest_rate: f64,
    monthly_payment: f64,
    annual_extra_repayment: f64,
) -> PayoffOutcome {
    if principal <= 0.0 {
        return PayoffOutcome::PaidOff {
            total_months: 0,
            total_interest: 0.0,
        };
    }

    let terms = LoanTerms::new(annual_interest_rate, monthly_payment, annual_extra_repayment);
    let mut balance = principal;
    let mut total_interest = 0.0;
    let mut months = 0;

    while balance > 0.0 && months < MAX_MONTHS {
        match step_month(balance, &terms, months) {
            Step::NonAmortizing => {
                return PayoffOutcome::Unbounded {
                    reason: UnboundedReason::NonAmortizing,
                };
            }
            Step::Amortized(step) => {
                total_interest += step.interest;
                balance = step.closing_balance;
                months += 1;
            }
        }
    }

    if balance > 0.0 {
        PayoffOutcome::Unbounded {
            reason: UnboundedReason::HorizonExceeded,
        }
    } else {
        PayoffOutcome::PaidOff {
            total_months: months,
            total_interest,
        }
    }
}

pub fn build_yearly_schedule(
    principal: f64,
    annual_interest_rate: f64,
    monthly_payment: f64,
    annual_extra_repayment: f64,
) -> Vec<YearlyScheduleRow> {
    let mut schedule = Vec::new();
    if principal <= 0.0 {
        return schedule;
    }

    let terms = LoanTerms::new(annual_interest_rate, monthly_payment, annual_extra_repayment);
    let mut balance = principal;
    let mut month = 0;

    while balance > 0.0 && month < MAX_MONTHS {
        let year = month / MONTHS_PER_YEAR + 1;
        let start_debt = balance;
        let mut interest_sum = 0.0;
        let mut repayment_sum = 0.0;

        for _ in 0..MONTHS_PER_YEAR {
            if balance <= 0.0 || month >= MAX_MONTHS {
                break;
            }
            let step = match step_month(balance, &terms, month) {
                Step::Amortized(step) => step,
                // The unfinished year is dropped rather than padded.
                Step::NonAmortizing => return schedule,
            };
            interest_sum += step.interest;
            repayment_sum += step.principal_portion + step.extra_repayment;
            balance = step.closing_balance;
            month += 1;
        }

        schedule.push(YearlyScheduleRow {
            year,
            start_debt,
            interest_sum,
            repayment_sum,
            end_debt: balance,
        });
    }

    schedule
}

/// Balance left after `elapsed_years`, rounded to whole months.
///
/// Unlike [`simulate_to_payoff`], a non-amortizing payment does not yield a
/// sentinel here: the balance reached at that point is returned as is.
/// Horizons beyond [`MAX_MONTHS`] (100 years) are truncated to it.
pub fn remaining_balance_after(
    principal: f64,
    annual_interest_rate: f64,
    monthly_payment: f64,
    annual_extra_repayment: f64,
    elapsed_years: f64,
) -> f64 {
    if principal <= 0.0 {
        return 0.0;
    }

    let terms = LoanTerms::new(annual_interest_rate, monthly_payment, annual_extra_repayment);
    let horizon = (elapsed_years * 12.0)
        .round()
        .clamp(0.0, f64::from(MAX_MONTHS)) as u32;
    let mut balance = principal;

    for month in 0..horizon {
        match step_month(balance, &terms, month) {
            Step::NonAmortizing => return balance,
            Step::Amortized(step) => balance = step.closing_balance,
        }
        if balance <= 0.0 {
            return 0.0;
        }
    }

    balance
}
