use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use plotters::prelude::*;
use plotters::style::FontTransform;
use rust_decimal::prelude::ToPrimitive;
use tracing::info;

use crate::error::{Error, Result};
use crate::revenue::RevenuePeriod;

const CHART_SIZE: (u32, u32) = (1000, 600);
const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Writes the aggregated series as delimited text
///
/// One row per bucket under an `invoicedate,revenue` header, in input order.
/// The header is written even for an empty series.
pub fn export_csv(series: &[RevenuePeriod], writer: impl Write) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    if series.is_empty() {
        writer.write_record(["invoicedate", "revenue"])?;
    }
    for period in series {
        writer.serialize(period)?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the series to a file at `path`
pub fn export_csv_path(series: &[RevenuePeriod], path: impl AsRef<Path>) -> Result<()> {
    export_csv(series, File::create(path)?)
}

/// Reads a previously exported series back from delimited text
pub fn read_csv(reader: impl Read) -> Result<Vec<RevenuePeriod>> {
    let mut reader = csv::Reader::from_reader(reader);

    let mut series = Vec::new();
    for period in reader.deserialize() {
        series.push(period?);
    }

    Ok(series)
}

/// Renders the revenue series as a line chart PNG
///
/// X axis carries the bucket starts with rotated labels, y axis the revenue.
/// An empty series produces a blank canvas instead of failing.
pub fn plot(series: &[RevenuePeriod], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    if series.is_empty() {
        root.present().map_err(chart_error)?;
        return Ok(());
    }

    let points: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .map(|(index, period)| (index as f64, period.revenue.to_f64().unwrap_or(0.0)))
        .collect();
    let labels: Vec<String> = series
        .iter()
        .map(|period| period.invoicedate.format("%Y-%m-%d %H:%M").to_string())
        .collect();

    let (y_min, y_max) = value_range(&points);
    let x_max = (series.len() - 1) as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption("Revenue by invoice date", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(110)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5..x_max + 0.5, y_min..y_max)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .x_desc("Invoice Date")
        .y_desc("Revenue")
        .x_labels(labels.len().min(12))
        .x_label_formatter(&|x| {
            let index = x.round();
            if index < 0.0 {
                return String::new();
            }
            labels.get(index as usize).cloned().unwrap_or_default()
        })
        .x_label_style(("sans-serif", 13).into_font().transform(FontTransform::Rotate90))
        .draw()
        .map_err(chart_error)?;

    chart
        .draw_series(LineSeries::new(points, &LINE_COLOR))
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    info!("chart written to {}", path.display());

    Ok(())
}

fn chart_error(error: impl std::fmt::Display) -> Error {
    Error::Chart {
        message: error.to_string(),
    }
}

fn value_range(points: &[(f64, f64)]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for &(_, y) in points {
        min = min.min(y);
        max = max.max(y);
    }

    // pad so a flat series still spans a visible band
    let padding = ((max - min) * 0.05).max(1.0);
    (min - padding, max + padding)
}
