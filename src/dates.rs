use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};

use crate::error::{PriceError, Result};

/// Vendor date format: 8-digit YYYYMMDD.
const VENDOR_FORMAT: &str = "%Y%m%d";

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_yyyymmdd(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PriceError::InvalidDate(text.to_string()));
    }
    NaiveDate::parse_from_str(text, VENDOR_FORMAT)
        .map_err(|_| PriceError::InvalidDate(text.to_string()))
}

pub fn format_yyyymmdd(date: NaiveDate) -> String {
    date.format(VENDOR_FORMAT).to_string()
}

/// Most recent weekday on or before `today`: Saturday and Sunday roll back to Friday.
pub fn most_recent_weekday(today: NaiveDate) -> NaiveDate {
    match today.weekday() {
        Weekday::Sat => today - Duration::days(1),
        Weekday::Sun => today - Duration::days(2),
        _ => today,
    }
}

fn weeks_before(end: NaiveDate, weeks: i64) -> Result<NaiveDate> {
    Duration::try_weeks(weeks)
        .and_then(|span| end.checked_sub_signed(span))
        .ok_or(PriceError::InvalidLookback { weeks, end })
}

/// Optional start/end bounds of a price request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Fails when both bounds are given and `end` is earlier than `start`.
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self> {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(PriceError::InvalidRange { start, end });
            }
        }
        Ok(Self { start, end })
    }

    /// Range with no bounds.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: Some(date),
            end: Some(date),
        }
    }

    /// Parse YYYYMMDD bounds.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        let start = start.map(parse_yyyymmdd).transpose()?;
        let end = end.map(parse_yyyymmdd).transpose()?;
        Self::new(start, end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }

    /// Fill missing bounds: end defaults to `today`, start to `lookback_weeks`
    /// before the end. A lookback reaching outside the calendar is an error.
    pub fn resolve(&self, today: NaiveDate, lookback_weeks: i64) -> Result<(NaiveDate, NaiveDate)> {
        let end = self.end.unwrap_or(today);
        let start = match self.start {
            Some(start) => start,
            None => weeks_before(end, lookback_weeks)?,
        };
        if end < start {
            return Err(PriceError::InvalidRange { start, end });
        }
        Ok((start, end))
    }
}
