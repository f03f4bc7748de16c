use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use salary_core::{ConversionRequest, PolicyRegistry, SalaryConverter, TaxPolicy};
use salary_data::logging::init_logging;
use salary_data::report::{
    BatchOutcome, ConversionReport, OutputFormat, render_batch_json, render_batch_text,
    render_json, render_text, write_batch_csv,
};
use salary_data::{PolicyLoader, batch, parse_amount};
use tracing::{info, warn};

/// Convert monthly salaries between gross and net under a tax-year policy.
///
/// Without `--policy` or `--policy-dir` the built-in reference policy is
/// used.
#[derive(Parser, Debug)]
#[command(name = "salary-calc")]
#[command(version, about, long_about = None)]
struct Cli {
    /// A single policy TOML file
    #[arg(long, global = true, conflicts_with = "policy_dir")]
    policy: Option<PathBuf>,

    /// A directory of policy TOML files, one per tax year
    #[arg(long, global = true)]
    policy_dir: Option<PathBuf>,

    /// Tax year to use (defaults to the most recent loaded)
    #[arg(short, long, global = true)]
    year: Option<i32>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Append log output to this file as well as stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Gross to net: take-home pay for a gross salary
    Net {
        /// Monthly gross salary, e.g. 2,304.50
        #[arg(value_parser = parse_amount, allow_negative_numbers = true)]
        gross: Decimal,

        #[command(flatten)]
        options: ConversionOptions,
    },

    /// Net to gross: the gross salary that yields a take-home pay
    Gross {
        /// Monthly net salary, e.g. 1,550.31
        #[arg(value_parser = parse_amount, allow_negative_numbers = true)]
        net: Decimal,

        #[command(flatten)]
        options: ConversionOptions,
    },

    /// Convert every row of a CSV file (amount,direction,relief_category,supplementary_pension)
    Batch {
        file: PathBuf,

        /// Multiply reported amounts by this many pay periods (12 = annual)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        periods: u32,
    },

    /// List the loaded policies
    Policies,
}

#[derive(Args, Debug)]
struct ConversionOptions {
    /// Relief category (defaults to the policy's default category)
    #[arg(short, long)]
    relief: Option<String>,

    /// Elect the supplementary pension contribution
    #[arg(long)]
    pension: bool,

    /// Multiply reported amounts by this many pay periods (12 = annual)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    periods: u32,
}

impl ConversionOptions {
    fn apply(
        &self,
        request: ConversionRequest,
    ) -> ConversionRequest {
        let request = request.with_supplementary_pension(self.pension);
        match &self.relief {
            Some(category) => request.with_relief_category(category.clone()),
            None => request,
        }
    }
}

fn load_registry(cli: &Cli) -> Result<PolicyRegistry> {
    if let Some(path) = &cli.policy {
        let policy = PolicyLoader::from_file(path)
            .with_context(|| format!("Failed to load policy: {}", path.display()))?;
        let mut registry = PolicyRegistry::new();
        registry.register(policy);
        return Ok(registry);
    }

    if let Some(dir) = &cli.policy_dir {
        return PolicyLoader::load_dir(dir)
            .with_context(|| format!("Failed to load policies from: {}", dir.display()));
    }

    let mut registry = PolicyRegistry::new();
    registry.register(PolicyLoader::reference().context("Built-in policy is invalid")?);
    Ok(registry)
}

fn select_policy<'a>(
    registry: &'a PolicyRegistry,
    year: Option<i32>,
) -> Result<&'a TaxPolicy> {
    let policy = match year {
        Some(year) => registry.get(year)?,
        None => registry.latest()?,
    };
    info!(tax_year = policy.tax_year(), "using policy");
    Ok(policy)
}

fn convert_one(
    policy: &TaxPolicy,
    request: ConversionRequest,
    periods: u32,
    output: OutputFormat,
) -> Result<()> {
    let breakdown = SalaryConverter::new(policy)
        .convert(&request)
        .with_context(|| format!("Failed to convert {}", request.amount))?;
    let report = ConversionReport::new(policy, &request, &breakdown, periods);

    match output {
        OutputFormat::Text => print!("{}", render_text(&report)),
        OutputFormat::Json => println!("{}", render_json(&report)?),
        OutputFormat::Csv => write_batch_csv(
            &[BatchOutcome {
                row: 1,
                result: Ok(report),
            }],
            io::stdout().lock(),
        )?,
    }
    Ok(())
}

fn convert_batch(
    policy: &TaxPolicy,
    file: &Path,
    periods: u32,
    output: OutputFormat,
) -> Result<()> {
    let requests = batch::load_from_file(file)
        .with_context(|| format!("Failed to load batch file: {}", file.display()))?;
    info!(rows = requests.len(), path = %file.display(), "loaded batch requests");

    let converter = SalaryConverter::new(policy);
    let outcomes: Vec<BatchOutcome> = requests
        .iter()
        .enumerate()
        .map(|(idx, request)| BatchOutcome {
            row: idx + 1,
            result: converter
                .convert(request)
                .map(|breakdown| ConversionReport::new(policy, request, &breakdown, periods)),
        })
        .collect();

    match output {
        OutputFormat::Text => print!("{}", render_batch_text(&outcomes)),
        OutputFormat::Json => println!("{}", render_batch_json(&outcomes)?),
        OutputFormat::Csv => write_batch_csv(&outcomes, io::stdout().lock())?,
    }

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    if failed > 0 {
        warn!(failed, total = outcomes.len(), "some batch rows failed");
        bail!("{failed} of {} rows failed", outcomes.len());
    }
    Ok(())
}

fn list_policies(registry: &PolicyRegistry) -> Result<()> {
    for year in registry.available_years() {
        let policy = registry.get(year)?;
        let categories: Vec<_> = policy.relief_categories().collect();
        println!(
            "{year}: {} brackets, top rate {}, contribution cap {}, relief categories [{}] (default '{}')",
            policy.brackets().len(),
            policy.highest_marginal_rate(),
            policy.contribution_cap(),
            categories.join(", "),
            policy.default_relief_category(),
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let registry = load_registry(&cli)?;

    match &cli.command {
        Command::Net { gross, options } => convert_one(
            select_policy(&registry, cli.year)?,
            options.apply(ConversionRequest::gross_to_net(*gross)),
            options.periods,
            cli.output,
        ),
        Command::Gross { net, options } => convert_one(
            select_policy(&registry, cli.year)?,
            options.apply(ConversionRequest::net_to_gross(*net)),
            options.periods,
            cli.output,
        ),
        Command::Batch { file, periods } => convert_batch(
            select_policy(&registry, cli.year)?,
            file,
            *periods,
            cli.output,
        ),
        Command::Policies => list_policies(&registry),
    }
}
