use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::report;
use crate::revenue::{self, Grain, RevenuePeriod};
use crate::table::RawTable;
use crate::validate;

/// Runs the full batch pipeline over one input file
///
/// Loads the delimited input, validates it and aggregates revenue at `grain`;
/// the report and the chart are only written once aggregation has succeeded,
/// and the report is removed again if the chart cannot be rendered, so a
/// failing run never leaves a partial report behind. Returns the aggregated
/// series.
pub fn run(
    input: impl AsRef<Path>,
    delimiter: Option<u8>,
    grain: Grain,
    include_negative_amounts: bool,
    report_path: impl AsRef<Path>,
    chart_path: impl AsRef<Path>,
) -> Result<Vec<RevenuePeriod>> {
    let table = RawTable::from_path(input, delimiter)?;
    let validated = validate::validate(&table)?;
    let series = revenue::aggregate(&validated.items, grain, include_negative_amounts);

    for path in [report_path.as_ref(), chart_path.as_ref()] {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
    }

    report::export_csv_path(&series, report_path.as_ref())?;
    if let Err(error) = report::plot(&series, chart_path.as_ref()) {
        let _ = fs::remove_file(report_path.as_ref());
        return Err(error);
    }

    info!(
        "wrote {} buckets at {grain} grain to {}",
        series.len(),
        report_path.as_ref().display()
    );

    Ok(series)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn runs_end_to_end_and_report_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("transactions.csv");
        let report_path = dir.path().join("out/report.csv");
        let chart_path = dir.path().join("out/plot.png");

        let mut file = std::fs::File::create(&input).unwrap();
        write!(
            file,
            "Invoice,Price,Quantity,InvoiceDate,Customer ID\n\
             1,10,2,2024-01-01 10:00:00,c1\n\
             2,5,-1,2024-01-01 15:00:00,c2\n\
             3,4,1,2024-01-03 09:00:00,\n"
        )
        .unwrap();

        let series = run(&input, None, Grain::Day, false, &report_path, &chart_path).unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].revenue, dec!(20));

        let reread = report::read_csv(std::fs::File::open(&report_path).unwrap()).unwrap();
        assert_eq!(reread, series);
        assert!(chart_path.exists());
    }

    #[test]
    fn a_failing_run_emits_no_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("transactions.csv");
        let report_path = dir.path().join("out/report.csv");
        let chart_path = dir.path().join("out/plot.png");

        let mut file = std::fs::File::create(&input).unwrap();
        write!(file, "price,quantity,invoicedate\n10,2,2024-01-01\n").unwrap();

        let result = run(&input, None, Grain::Day, false, &report_path, &chart_path);

        assert!(result.is_err());
        assert!(!report_path.exists());
        assert!(!chart_path.exists());
    }

    #[test]
    fn a_chart_failure_removes_the_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("transactions.csv");
        let report_path = dir.path().join("out/report.csv");
        // a directory at the chart path makes the PNG unwritable
        let chart_path = dir.path().join("out/plot.png");
        std::fs::create_dir_all(&chart_path).unwrap();

        let mut file = std::fs::File::create(&input).unwrap();
        write!(
            file,
            "price,quantity,invoicedate,customer_id\n10,2,2024-01-01,c1\n"
        )
        .unwrap();

        let result = run(&input, None, Grain::Day, false, &report_path, &chart_path);

        assert!(result.is_err());
        assert!(!report_path.exists());
    }
}
