mod engine;
mod types;

pub use engine::{
    MAX_MONTHS, build_yearly_schedule, derive_loan, monthly_payment, remaining_balance_after,
    run_forecast, simulate_to_payoff, total_repayment,
};
pub use types::{
    DerivedLoan, FinancingInputs, Forecast, PayoffOutcome, UnboundedReason, YearlyScheduleRow,
};
