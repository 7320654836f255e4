use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::validate::LineItem;

/// The width of one aggregation bucket
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grain {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Grain {
    /// Truncates a timestamp to the start of its bucket
    ///
    /// Weeks start on Monday; months and years on their first day.
    pub fn bucket_start(self, timestamp: NaiveDateTime) -> NaiveDateTime {
        let date = timestamp.date();
        let time = timestamp.time();

        match self {
            Grain::Second => date
                .and_hms_opt(time.hour(), time.minute(), time.second())
                .unwrap(),
            Grain::Minute => date.and_hms_opt(time.hour(), time.minute(), 0).unwrap(),
            Grain::Hour => date.and_hms_opt(time.hour(), 0, 0).unwrap(),
            Grain::Day => date.and_time(NaiveTime::MIN),
            Grain::Week => date
                .week(Weekday::Mon)
                .first_day()
                .and_time(NaiveTime::MIN),
            Grain::Month => date.with_day(1).unwrap().and_time(NaiveTime::MIN),
            Grain::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1)
                .unwrap()
                .and_time(NaiveTime::MIN),
        }
    }
}

impl FromStr for Grain {
    type Err = Error;

    /// Accepts the grain name or its single-letter code, case-insensitive
    fn from_str(token: &str) -> Result<Self> {
        match token.to_ascii_lowercase().as_str() {
            "second" | "s" => Ok(Grain::Second),
            "minute" | "min" => Ok(Grain::Minute),
            "hour" | "h" => Ok(Grain::Hour),
            "day" | "d" => Ok(Grain::Day),
            "week" | "w" => Ok(Grain::Week),
            "month" | "m" => Ok(Grain::Month),
            "year" | "y" => Ok(Grain::Year),
            _ => Err(Error::UnknownGrain {
                token: token.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Grain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Grain::Second => "second",
            Grain::Minute => "minute",
            Grain::Hour => "hour",
            Grain::Day => "day",
            Grain::Week => "week",
            Grain::Month => "month",
            Grain::Year => "year",
        };
        f.write_str(name)
    }
}

/// Revenue summed over one time bucket
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RevenuePeriod {
    /// Start of the bucket
    pub invoicedate: NaiveDateTime,
    /// Sum of line totals within the bucket
    pub revenue: Decimal,
}

/// Buckets line items by `grain` and sums their line totals
///
/// When `include_negative_amounts` is false, refund rows are excluded before
/// summing. Empty buckets are omitted; the output is ordered ascending by
/// bucket start. The input is not modified.
pub fn aggregate(
    items: &[LineItem],
    grain: Grain,
    include_negative_amounts: bool,
) -> Vec<RevenuePeriod> {
    let mut buckets: BTreeMap<NaiveDateTime, Decimal> = BTreeMap::new();

    for item in items {
        if !include_negative_amounts && item.quantity < Decimal::ZERO {
            continue;
        }

        *buckets
            .entry(grain.bucket_start(item.invoicedate))
            .or_insert(Decimal::ZERO) += item.total_price;
    }

    buckets
        .into_iter()
        .map(|(invoicedate, revenue)| RevenuePeriod {
            invoicedate,
            revenue,
        })
        .collect()
}
