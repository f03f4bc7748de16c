//! Rendering conversion results as text, JSON or CSV.
//!
//! Every renderer shows amounts rounded half-up to cents; the engine's full
//! precision values are never printed.

use std::io::Write;

use clap::ValueEnum;
use rust_decimal::Decimal;
use salary_core::{ConversionError, ConversionRequest, Direction, SalaryBreakdown, TaxPolicy};
use serde::Serialize;

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

/// One conversion, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionReport {
    pub tax_year: i32,
    pub direction: Direction,
    pub relief_category: String,
    pub supplementary_pension: bool,
    /// Pay periods the amounts cover (1 = one month).
    pub periods: u32,
    pub breakdown: SalaryBreakdown,
    /// Share of gross lost to tax and employee contributions, in percent.
    pub effective_deduction_pct: Decimal,
}

impl ConversionReport {
    pub fn new(
        policy: &TaxPolicy,
        request: &ConversionRequest,
        breakdown: &SalaryBreakdown,
        periods: u32,
    ) -> Self {
        let relief_category = request
            .relief_category
            .clone()
            .unwrap_or_else(|| policy.default_relief_category().to_string());

        Self {
            tax_year: policy.tax_year(),
            direction: request.direction,
            relief_category,
            supplementary_pension: request.supplementary_pension,
            periods,
            breakdown: breakdown.annualized(periods).rounded(),
            effective_deduction_pct: (breakdown.effective_deduction_rate() * Decimal::ONE_HUNDRED)
                .round_dp(2),
        }
    }
}

/// Outcome of one batch row. `row` is 1-based.
#[derive(Debug)]
pub struct BatchOutcome {
    pub row: usize,
    pub result: Result<ConversionReport, ConversionError>,
}

pub fn render_text(report: &ConversionReport) -> String {
    let b = &report.breakdown;
    let c = &b.employee_contributions;
    let period = match report.periods {
        1 => "monthly".to_string(),
        12 => "annual".to_string(),
        n => format!("{n} periods"),
    };

    let rows: [(&str, Decimal); 11] = [
        ("Gross salary", b.gross),
        ("Relief applied", b.relief_applied),
        ("Taxable base", b.taxable_base),
        ("Income tax", b.income_tax),
        ("Capped contribution", c.capped_portion),
        ("Primary contribution", c.uncapped_portion),
        ("Supplementary pension", c.supplementary_portion),
        ("Employee contributions", c.total()),
        ("Net salary", b.net),
        ("Employer contribution", b.employer_contribution),
        ("Total employment cost", b.total_employment_cost),
    ];

    let mut out = format!(
        "Tax year {} ({period}), relief '{}', supplementary pension {}\n",
        report.tax_year,
        report.relief_category,
        if report.supplementary_pension { "yes" } else { "no" }
    );
    for (label, value) in rows {
        out.push_str(&format!("  {label:<24}{value:>14.2}\n"));
    }
    out.push_str(&format!(
        "  {:<24}{:>13.2}%\n",
        "Effective deduction", report.effective_deduction_pct
    ));
    out
}

pub fn render_json(report: &ConversionReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[derive(Serialize)]
struct BatchJsonRow<'a> {
    row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a ConversionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn render_batch_json(outcomes: &[BatchOutcome]) -> Result<String, serde_json::Error> {
    let rows: Vec<_> = outcomes
        .iter()
        .map(|outcome| BatchJsonRow {
            row: outcome.row,
            report: outcome.result.as_ref().ok(),
            error: outcome.result.as_ref().err().map(ToString::to_string),
        })
        .collect();
    serde_json::to_string_pretty(&rows)
}

pub fn render_batch_text(outcomes: &[BatchOutcome]) -> String {
    let mut out = String::new();
    for outcome in outcomes {
        out.push_str(&format!("Row {}\n", outcome.row));
        match &outcome.result {
            Ok(report) => out.push_str(&render_text(report)),
            Err(error) => out.push_str(&format!("  error: {error}\n")),
        }
    }
    out
}

const BATCH_CSV_HEADER: [&str; 15] = [
    "row",
    "direction",
    "relief_category",
    "supplementary_pension",
    "gross",
    "net",
    "relief_applied",
    "taxable_base",
    "income_tax",
    "employee_capped",
    "employee_primary",
    "employee_supplementary",
    "employer_contribution",
    "total_employment_cost",
    "error",
];

/// Writes one CSV line per outcome. Failed rows keep their row number and
/// carry the error message with empty amount columns.
pub fn write_batch_csv<W: Write>(
    outcomes: &[BatchOutcome],
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(BATCH_CSV_HEADER)?;

    for outcome in outcomes {
        let row = outcome.row.to_string();
        let record: Vec<String> = match &outcome.result {
            Ok(report) => {
                let b = &report.breakdown;
                let c = &b.employee_contributions;
                let mut record = vec![
                    row,
                    report.direction.as_str().to_string(),
                    report.relief_category.clone(),
                    report.supplementary_pension.to_string(),
                ];
                record.extend(
                    [
                        b.gross,
                        b.net,
                        b.relief_applied,
                        b.taxable_base,
                        b.income_tax,
                        c.capped_portion,
                        c.uncapped_portion,
                        c.supplementary_portion,
                        b.employer_contribution,
                        b.total_employment_cost,
                    ]
                    .iter()
                    .map(|value| format!("{value:.2}")),
                );
                record.push(String::new());
                record
            }
            Err(error) => {
                let mut record = vec![String::new(); BATCH_CSV_HEADER.len()];
                record[0] = row;
                record[BATCH_CSV_HEADER.len() - 1] = error.to_string();
                record
            }
        };
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}
