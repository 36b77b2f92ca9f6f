//! Court Reserve CLI - books the month's courts on the first Monday

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::Parser;
use colored::Colorize;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use court_reserve::core::is_first_monday;
use court_reserve::{
    Config, Dispatcher, Orchestrator, PortalClient, RunEvent, RunSettings, RunSummary,
};

#[derive(Parser)]
#[command(name = "court-reserve")]
#[command(author, version, about = "Monthly court reservation bot", long_about = None)]
struct Cli {
    /// Target year (default: current year)
    #[arg(long)]
    year: Option<i32>,

    /// Target month 1-12 (default: current month)
    #[arg(long)]
    month: Option<u32>,

    /// Run even when today is not the first Monday of the month
    #[arg(long)]
    force: bool,

    /// Delay between reservation requests in milliseconds
    #[arg(long, default_value = "1000")]
    delay_ms: u64,

    /// Print the final summary as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let config = Config::from_env().context("Failed to load configuration")?;
    let dispatcher = Dispatcher::from_config(&config).context("Failed to set up notifications")?;

    let today = Local::now().date_naive();
    if !cli.force && !is_first_monday(today) {
        dispatcher.emit(RunEvent::NotFirstMonday { date: today }).await;
        return Ok(());
    }

    let year = cli.year.unwrap_or_else(|| today.year());
    let month = cli.month.unwrap_or_else(|| today.month());
    if !(1..=12).contains(&month) {
        anyhow::bail!("Month must be 1-12, got {}", month);
    }

    println!(
        "{}: {}-{:02}",
        "Reserving courts".cyan().bold(),
        year,
        month
    );

    let portal = PortalClient::new(config.portal.clone()).context("Failed to create HTTP session")?;
    let settings = RunSettings::new(year, month, config.credentials.clone())
        .with_submit_delay(Duration::from_millis(cli.delay_ms));

    let mut orchestrator = Orchestrator::new(&portal, &dispatcher, settings);
    match orchestrator.run().await {
        Ok(summary) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
            Ok(())
        }
        Err(e) => {
            println!("{}: {}", "Run failed".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("{}", "Discovered slots".yellow().bold());
    println!("{}", "-".repeat(40));
    for (group, family) in &summary.families {
        let prefixes: Vec<String> = family.iter().map(|id| id.prefix.to_string()).collect();
        println!("  {:<10} {}", group.to_string(), prefixes.join(", "));
    }

    println!();
    println!("{}", "Reservations".yellow().bold());
    println!("{}", "-".repeat(40));
    println!("  Attempted:        {}", summary.attempted);
    println!("  Accepted:         {}", summary.accepted.to_string().green());
    println!(
        "  Already taken:    {}",
        summary.accepted_with_exclusion.to_string().yellow()
    );
    println!("  Failed:           {}", summary.failed.to_string().red());
    println!(
        "\n{}: {} of {} succeeded",
        "Complete".green(),
        summary.succeeded(),
        summary.attempted
    );
}
