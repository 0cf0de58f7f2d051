//! lending-engine CLI
//!
//! Inspect amortization schedules and run portfolio simulations from the
//! command line.
//!
//! # Usage
//!
//! ```bash
//! # Print an amortization plan
//! lending-engine schedule --principal 1200 --rate 12 --months 12
//!
//! # Same plan as JSON
//! lending-engine schedule --principal 1200 --rate 12 --months 12 --format json
//!
//! # Drive a random portfolio through the full lifecycle
//! lending-engine simulate --loans 25 --payments 6
//! ```

use chrono::{NaiveDate, Utc};
use lending_engine::core::installment::Installment;
use lending_engine::lifecycle::engine::LoanEngine;
use lending_engine::schedule::generator::ScheduleGenerator;
use lending_engine::simulation::portfolio::{run_portfolio, PortfolioConfig};
use lending_engine::store::InMemoryStore;
use rust_decimal::Decimal;
use std::process;

fn print_usage() {
    eprintln!(
        r#"lending-engine — loan accounting engine: schedules, payments, reconciliation

USAGE:
    lending-engine <COMMAND> [OPTIONS]

COMMANDS:
    schedule    Generate and print an amortization schedule
    simulate    Originate and repay a random loan portfolio (for testing)
    help        Show this message

OPTIONS (schedule):
    --principal <AMOUNT>  Principal amount (required)
    --rate <PERCENT>      Annual interest rate in percent (required)
    --months <N>          Term in months (required)
    --start <DATE>        Start date, YYYY-MM-DD (default: today)
    --format <FORMAT>     Output format: text (default) or json

OPTIONS (simulate):
    --loans <N>           Number of loans (default: 25)
    --payments <N>        Payments per loan (default: 6)
    --format <FORMAT>     Output format: text (default) or json

EXAMPLES:
    lending-engine schedule --principal 1200 --rate 12 --months 12
    lending-engine schedule --principal 250000 --rate 6.5 --months 360 --format json
    lending-engine simulate --loans 50 --payments 12"#
    );
}

/// JSON output schema for a generated schedule.
#[derive(serde::Serialize)]
struct ScheduleOutput {
    principal: String,
    annual_rate_percent: String,
    term_months: u32,
    total_interest: String,
    installments: Vec<Installment>,
}

fn parse_decimal(value: Option<&String>, flag: &str) -> Decimal {
    let raw = value.unwrap_or_else(|| {
        eprintln!("{} requires a value", flag);
        process::exit(1);
    });
    raw.parse().unwrap_or_else(|e| {
        eprintln!("Invalid amount '{}' for {}: {}", raw, flag, e);
        process::exit(1);
    })
}

fn cmd_schedule(args: &[String]) {
    let mut principal = None;
    let mut rate = None;
    let mut months: Option<u32> = None;
    let mut start = Utc::now().date_naive();
    let mut format = "text".to_string();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--principal" => {
                i += 1;
                principal = Some(parse_decimal(args.get(i), "--principal"));
            }
            "--rate" => {
                i += 1;
                rate = Some(parse_decimal(args.get(i), "--rate"));
            }
            "--months" => {
                i += 1;
                months = args.get(i).and_then(|s| s.parse().ok());
                if months.is_none() {
                    eprintln!("--months requires a positive integer");
                    process::exit(1);
                }
            }
            "--start" => {
                i += 1;
                let raw = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--start requires a date (YYYY-MM-DD)");
                    process::exit(1);
                });
                start = NaiveDate::parse_from_str(&raw, "%Y-%m-%d").unwrap_or_else(|e| {
                    eprintln!("Invalid date '{}': {}", raw, e);
                    process::exit(1);
                });
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let principal = principal.unwrap_or_else(|| {
        eprintln!("Error: --principal <AMOUNT> is required");
        process::exit(1);
    });
    let rate = rate.unwrap_or_else(|| {
        eprintln!("Error: --rate <PERCENT> is required");
        process::exit(1);
    });
    let months = months.unwrap_or_else(|| {
        eprintln!("Error: --months <N> is required");
        process::exit(1);
    });

    let schedule = ScheduleGenerator::generate(principal, rate, months, start).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    let total_interest: Decimal = schedule.iter().map(|i| i.interest_component).sum();

    if format == "json" {
        let output = ScheduleOutput {
            principal: principal.to_string(),
            annual_rate_percent: rate.to_string(),
            term_months: months,
            total_interest: total_interest.to_string(),
            installments: schedule,
        };
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing schedule: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!(
            "Amortization: {} at {}% over {} months from {}\n",
            principal, rate, months, start
        );
        println!(
            "{:>4}  {:>12}  {:>12}  {:>12}  {:>12}  {:>12}",
            "#", "Due", "Payment", "Principal", "Interest", "Balance"
        );
        for installment in &schedule {
            println!(
                "{:>4}  {:>12}  {:>12}  {:>12}  {:>12}  {:>12}",
                installment.number,
                installment.due_date.to_string(),
                installment.payment_amount.to_string(),
                installment.principal_component.to_string(),
                installment.interest_component.to_string(),
                installment.remaining_balance.to_string(),
            );
        }
        println!("\nTotal interest: {}", total_interest);
    }
}

fn cmd_simulate(args: &[String]) {
    let mut loans = 25usize;
    let mut payments = 6usize;
    let mut format = "text".to_string();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--loans" => {
                i += 1;
                loans = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--loans requires a number");
                    process::exit(1);
                });
            }
            "--payments" => {
                i += 1;
                payments = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--payments requires a number");
                    process::exit(1);
                });
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let engine = LoanEngine::new(InMemoryStore::new());
    let config = PortfolioConfig {
        loan_count: loans,
        ..Default::default()
    };

    let summary = run_portfolio(&engine, &config, payments).unwrap_or_else(|e| {
        eprintln!("Simulation failed: {}", e);
        process::exit(1);
    });

    if format == "json" {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing summary: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("{}", summary);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "schedule" => cmd_schedule(rest),
        "simulate" => cmd_simulate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
