use anyhow::Result;
use clap::Parser;
use fitprime_billing::domain::report::generate_report;
use fitprime_billing::domain::types::ChargeAmount;
use fitprime_billing::BillingConfig;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "billing-report")]
#[command(about = "FitPrime Billing - plan overage evaluation and operator reports")]
struct Args {
    /// Plan identifier as recorded for the tenant; fuzzy SKU forms such
    /// as "FitPrime_BR_Starter" are accepted
    #[arg(short, long, required_unless_present = "gen_config")]
    plan: Option<String>,

    /// Active students this billing cycle
    #[arg(short, long, required_unless_present = "gen_config")]
    students: Option<u32>,

    /// Tenant's base subscription price, used for the upgrade advisory
    #[arg(long, required_unless_present = "gen_config")]
    plan_price: Option<Decimal>,

    /// Unbilled overage carried from previous cycles
    #[arg(long, default_value = "0")]
    prior_balance: Decimal,

    #[arg(short, long, help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[arg(long, help = "Generate sample configuration file")]
    gen_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fitprime_billing=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if args.gen_config {
        let config = BillingConfig::default();
        let toml = toml::to_string_pretty(&config)?;
        println!("{}", toml);
        return Ok(());
    }

    let (Some(plan), Some(students), Some(plan_price)) =
        (args.plan, args.students, args.plan_price)
    else {
        anyhow::bail!("--plan, --students and --plan-price are required");
    };

    let config = BillingConfig::load(args.config)?;
    let calculator = config.calculator()?;

    info!(plan = %plan, students, "evaluating period overage");

    let calculation = calculator.calculate(
        &plan,
        students,
        ChargeAmount::from_decimal(args.prior_balance),
    )?;
    let report = generate_report(calculator.catalog(), &calculation, plan_price)?;

    println!("{}", report);
    Ok(())
}
