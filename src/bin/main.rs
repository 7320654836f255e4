use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use kpi_report::{pipeline, Grain};

/// A cli interface to the revenue reporting pipeline
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// The path to the transactions CSV file
    input: PathBuf,

    /// The time bucket width for aggregation
    #[arg(long, default_value = "day")]
    grain: Grain,

    /// Keep refund rows (negative quantities) in the revenue sums
    #[arg(long)]
    include_negative_amounts: bool,

    /// Where to write the tabular report
    #[arg(long, default_value = "outputs/report.csv")]
    report: PathBuf,

    /// Where to write the trend chart
    #[arg(long, default_value = "outputs/plot.png")]
    chart: PathBuf,

    /// Force a field delimiter instead of sniffing it from the header line
    #[arg(long, value_parser = parse_delimiter)]
    delimiter: Option<u8>,
}

/// Parses a `--delimiter` value, a single ASCII character
fn parse_delimiter(value: &str) -> Result<u8, String> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(delimiter), None) if delimiter.is_ascii() => Ok(delimiter as u8),
        _ => Err("the delimiter must be a single ASCII character".to_owned()),
    }
}

fn main() -> anyhow::Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();

    let series = pipeline::run(
        &args.input,
        args.delimiter,
        args.grain,
        args.include_negative_amounts,
        &args.report,
        &args.chart,
    )?;

    println!(
        "Report generated successfully: {} buckets -> {} and {}",
        series.len(),
        args.report.display(),
        args.chart.display(),
    );

    Ok(())
}
