use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use tracing::info;

use crate::error::{Error, Result};
use crate::table::RawTable;

/// One validated transaction row
///
/// Every field is guaranteed non-null and well-typed, and `total_price` is
/// always `price * quantity`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineItem {
    pub price: Decimal,
    /// May be negative for refunds
    pub quantity: Decimal,
    pub invoicedate: NaiveDateTime,
    pub customer_id: String,
    /// Derived line total
    pub total_price: Decimal,
}

/// The outcome of a validation pass
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validated {
    /// The surviving rows, in input order
    pub items: Vec<LineItem>,
    /// Rows dropped for holding a null in any column
    pub dropped_nulls: usize,
    /// Fully identical rows dropped beyond their first occurrence
    pub dropped_duplicates: usize,
    /// Surviving rows with a negative quantity
    pub refunds: usize,
}

/// Cleans a raw table into typed line items
///
/// Requires the columns `price`, `quantity`, `invoicedate` and `customer_id`.
/// Rows with a null in any column are dropped first, then fully duplicated
/// rows beyond their first occurrence. Refund rows (negative quantity) are
/// counted but kept. The input table is not modified; an output with zero
/// surviving rows is valid.
pub fn validate(table: &RawTable) -> Result<Validated> {
    let price_idx = required_index(table, "price")?;
    let quantity_idx = required_index(table, "quantity")?;
    let date_idx = required_index(table, "invoicedate")?;
    let customer_idx = required_index(table, "customer_id")?;

    // null rows go before duplicate detection, so a null row is never
    // counted twice
    let mut seen = HashSet::new();
    let mut dropped_nulls = 0;
    let mut dropped_duplicates = 0;
    let mut kept = Vec::new();

    for row in table.rows() {
        if row.iter().any(|cell| cell.trim().is_empty()) {
            dropped_nulls += 1;
            continue;
        }
        if !seen.insert(row) {
            dropped_duplicates += 1;
            continue;
        }
        kept.push(row);
    }

    info!("dropping {dropped_nulls} rows with missing values");
    info!("dropping {dropped_duplicates} duplicated rows");

    let mut items = Vec::with_capacity(kept.len());
    let mut refunds = 0;

    for row in kept {
        let price = parse_decimal("price", &row[price_idx])?;
        let quantity = parse_decimal("quantity", &row[quantity_idx])?;
        let invoicedate = parse_invoice_date(&row[date_idx]).ok_or_else(|| Error::InvalidDate {
            value: row[date_idx].clone(),
        })?;

        if quantity < Decimal::ZERO {
            refunds += 1;
        }

        items.push(LineItem {
            price,
            quantity,
            invoicedate,
            customer_id: row[customer_idx].trim().to_owned(),
            total_price: price * quantity,
        });
    }

    info!("{refunds} rows carry a negative quantity");

    Ok(Validated {
        items,
        dropped_nulls,
        dropped_duplicates,
        refunds,
    })
}

fn required_index(table: &RawTable, column: &'static str) -> Result<usize> {
    table
        .column_index(column)
        .ok_or(Error::MissingColumn { column })
}

fn parse_decimal(column: &'static str, value: &str) -> Result<Decimal> {
    value.trim().parse().map_err(|_| Error::InvalidNumber {
        column,
        value: value.to_owned(),
    })
}

/// Parses an `invoicedate` cell over the date-time shapes seen in retail
/// exports, falling back to date-only forms at midnight
fn parse_invoice_date(value: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: [&str; 5] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];
    const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

    let value = value.trim();

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, format) {
            return Some(parsed.and_time(NaiveTime::MIN));
        }
    }

    None
}
