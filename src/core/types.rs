use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancingInputs {
    pub purchase_price: f64,
    pub equity: f64,
    /// Percent of the purchase price, e.g. 10 for 10 %.
    pub ancillary_percent: f64,
    pub annual_interest_rate: f64,
    pub annual_repayment_rate: f64,
    pub fixed_period_years: u32,
    pub annual_extra_repayment: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedLoan {
    pub ancillary_costs: f64,
    pub principal: f64,
}

/// The part of the financing that stays constant across every simulated month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanTerms {
    pub monthly_rate: f64,
    pub monthly_payment: f64,
    pub annual_extra_repayment: f64,
}

impl LoanTerms {
    pub fn new(
        annual_interest_rate: f64,
        monthly_payment: f64,
        annual_extra_repayment: f64,
    ) -> Self {
        Self {
            monthly_rate: annual_interest_rate / 100.0 / 12.0,
            monthly_payment,
            annual_extra_repayment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthStep {
    pub opening_balance: f64,
    pub interest: f64,
    pub principal_portion: f64,
    pub extra_repayment: f64,
    pub closing_balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyScheduleRow {
    pub year: u32,
    pub start_debt: f64,
    pub interest_sum: f64,
    pub repayment_sum: f64,
    pub end_debt: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum UnboundedReason {
    /// The payment does not cover the interest accruing on the balance.
    NonAmortizing,
    /// Still amortizing when the simulation horizon ran out.
    HorizonExceeded,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PayoffOutcome {
    PaidOff { total_months: u32, total_interest: f64 },
    Unbounded { reason: UnboundedReason },
}

impl PayoffOutcome {
    pub fn is_payable(self) -> bool {
        matches!(self, PayoffOutcome::PaidOff { .. })
    }

    pub fn total_months(self) -> Option<u32> {
        match self {
            PayoffOutcome::PaidOff { total_months, .. } => Some(total_months),
            PayoffOutcome::Unbounded { .. } => None,
        }
    }

    pub fn total_interest(self) -> Option<f64> {
        match self {
            PayoffOutcome::PaidOff { total_interest, .. } => Some(total_interest),
            PayoffOutcome::Unbounded { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Forecast {
    pub inputs: FinancingInputs,
    pub loan: DerivedLoan,
    pub monthly_payment: f64,
    /// Balance left when the fixed-rate period ends.
    pub remaining_balance: f64,
    pub payoff: PayoffOutcome,
    /// Principal plus total interest; `None` whenever the payoff is unbounded.
    pub total_repayment: Option<f64>,
    pub schedule: Vec<YearlyScheduleRow>,
}
