use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL};

use super::format::{format_duration, format_euro};
use crate::core::{Forecast, PayoffOutcome};

pub fn render_report(forecast: &Forecast) -> String {
    let mut out = String::new();

    let summary = [
        ("Ancillary costs", format_euro(forecast.loan.ancillary_costs)),
        ("Loan amount", format_euro(forecast.loan.principal)),
        ("Monthly payment", format_euro(forecast.monthly_payment)),
        (
            "Remaining balance after fixed period",
            format!(
                "{} ({} years)",
                format_euro(forecast.remaining_balance),
                forecast.inputs.fixed_period_years
            ),
        ),
        ("Term until full repayment", payoff_duration(forecast.payoff)),
        (
            "Interest until full repayment",
            format_optional_euro(forecast.payoff.total_interest()),
        ),
        (
            "Total repayment (loan + interest)",
            format_optional_euro(forecast.total_repayment),
        ),
    ];
    for (label, value) in summary {
        out.push_str(&format!("{label}: {value}\n"));
    }

    if !forecast.payoff.is_payable() {
        out.push_str(
            "\nWarning: this loan cannot be repaid with the given payment \
             (the payment does not cover the interest).\n",
        );
    }

    out.push('\n');
    if forecast.schedule.is_empty() {
        out.push_str("No repayment schedule available.\n");
        return out;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Year",
        "Start balance",
        "Interest",
        "Repayment",
        "End balance",
    ]);
    for row in &forecast.schedule {
        table.add_row(vec![
            Cell::new(row.year),
            money_cell(row.start_debt),
            money_cell(row.interest_sum),
            money_cell(row.repayment_sum),
            money_cell(row.end_debt),
        ]);
    }
    out.push_str(&table.to_string());
    out.push('\n');
    out
}

fn payoff_duration(payoff: PayoffOutcome) -> String {
    match payoff {
        PayoffOutcome::PaidOff { total_months, .. } => format_duration(total_months),
        PayoffOutcome::Unbounded { .. } => super::NOT_PAYABLE_TEXT.to_string(),
    }
}

fn format_optional_euro(value: Option<f64>) -> String {
    value.map_or_else(|| "–".to_string(), format_euro)
}

fn money_cell(value: f64) -> Cell {
    Cell::new(format_euro(value)).set_alignment(CellAlignment::Right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FinancingInputs, run_forecast};

    fn sample_inputs() -> FinancingInputs {
        FinancingInputs {
            purchase_price: 400_000.0,
            equity: 80_000.0,
            ancillary_percent: 10.0,
            annual_interest_rate: 3.5,
            annual_repayment_rate: 2.0,
            fixed_period_years: 10,
            annual_extra_repayment: 0.0,
        }
    }

    #[test]
    fn render_report_lists_summary_and_schedule() {
        let report = render_report(&run_forecast(&sample_inputs()));
        assert!(report.contains("Ancillary costs: 40.000 €"));
        assert!(report.contains("Loan amount: 360.000 €"));
        assert!(report.contains("Monthly payment: 1.650 €"));
        assert!(report.contains("Term until full repayment: 29 years"));
        assert!(report.contains("(10 years)"));
        assert!(report.contains("Start balance"));
        assert!(!report.contains("Warning"));
    }

    #[test]
    fn render_report_warns_when_not_payable() {
        let mut inputs = sample_inputs();
        inputs.annual_repayment_rate = -0.5;
        let report = render_report(&run_forecast(&inputs));
        assert!(report.contains("Warning"));
        assert!(report.contains("Interest until full repayment: –"));
        assert!(report.contains("Total repayment (loan + interest): –"));
        assert!(report.contains("No repayment schedule available."));
    }
}
