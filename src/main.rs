use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};
use prepay::{calculate_prepayment_savings, PaymentFrequency, PrepaymentInput};
use simple_logger::SimpleLogger;
use std::{error::Error, process};

/// Compare a loan's regular schedule against one with recurring extra payments
#[derive(Parser, Debug)]
#[command(name = "prepay", version)]
struct Cli {
    /// Amount borrowed
    #[arg(long)]
    principal: f64,

    /// Nominal annual interest rate in percent (i.e., 6.5)
    #[arg(long)]
    rate: f64,

    /// Original term of the loan in years
    #[arg(long)]
    years: f64,

    /// Extra amount paid on top of the regular payment
    #[arg(long, default_value_t = 0.)]
    extra: f64,

    /// How often the extra amount is paid: monthly, quarterly or yearly
    #[arg(long, default_value = "monthly")]
    frequency: PaymentFrequency,

    /// Date of the first payment, used to report payoff dates (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    SimpleLogger::new()
        .with_level(cli.log_level.into())
        .init()
        .map_err(|e| e.to_string())?;

    let input = PrepaymentInput::new(cli.principal, cli.rate, cli.years, cli.extra, cli.frequency);
    input.validate()?;
    info!("{:?}", input);

    let result = calculate_prepayment_savings(&input);
    println!("{}", result);

    if let Some(start) = cli.start {
        match result.payoff_dates(start) {
            Some((normal, prepay)) => {
                println!("paid off {} without prepayment, {} with prepayment", normal, prepay)
            }
            None => println!("no payments due"),
        }
    }
    Ok(())
}

// verifies that types can implement the gated traits below
#[cfg(test)]
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    is_normal::<PrepaymentInput>();
    is_normal::<prepay::PrepaymentResult>();
    is_normal::<prepay::PrepayError>();
}

#[test]
fn parses_arguments() {
    let cli = Cli::try_parse_from([
        "prepay",
        "--principal",
        "200000",
        "--rate",
        "6",
        "--years",
        "20",
        "--extra",
        "200",
        "--frequency",
        "quarterly",
        "--start",
        "2024-04-01",
    ])
    .unwrap();

    assert_eq!(cli.principal, 200000.);
    assert_eq!(cli.extra, 200.);
    assert_eq!(cli.frequency, PaymentFrequency::Quarterly);
    assert_eq!(cli.start, NaiveDate::from_ymd_opt(2024, 4, 1));
    assert!(matches!(cli.log_level, LogLevel::Warn));

    assert!(Cli::try_parse_from([
        "prepay",
        "--principal",
        "1",
        "--rate",
        "1",
        "--years",
        "1",
        "--frequency",
        "weekly",
    ])
    .is_err());
}
