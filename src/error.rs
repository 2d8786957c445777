use chrono::NaiveDate;
use thiserror::Error;

use crate::api_client::ApiError;
use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, PriceError>;

#[derive(Debug, Error)]
pub enum PriceError {
    /// A symbol was looked up in a price table that has no such column.
    #[error("symbol '{symbol}' not found in {table}{hint}")]
    SymbolNotFound {
        symbol: String,
        table: String,
        hint: &'static str,
    },

    #[error("end date {end} is earlier than start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid date '{0}': expected YYYYMMDD")]
    InvalidDate(String),

    #[error("a lookback of {weeks} weeks before {end} falls outside the calendar")]
    InvalidLookback { weeks: i64, end: NaiveDate },

    #[error("vendor integration unavailable: {0}")]
    VendorUnavailable(String),

    #[error("no workbook loaded; open one before requesting workbook prices")]
    WorkbookNotLoaded,

    #[error("column '{column}' has {actual} rows, index has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("need at least {needed} observations, have {actual}")]
    InsufficientData { needed: usize, actual: usize },

    #[error("no price for '{symbol}' on {date}")]
    NoPrice { symbol: String, date: NaiveDate },

    #[error("no market proxy known for '{0}'")]
    UnknownMarket(String),

    #[error("failed to read workbook: {0}")]
    Workbook(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PriceError {
    pub fn symbol_not_found(symbol: &str, table: &str) -> Self {
        PriceError::SymbolNotFound {
            symbol: symbol.to_string(),
            table: table.to_string(),
            hint: "",
        }
    }
}

/// Extra advice for a symbol missing from a workbook sheet, whose columns
/// carry bare tickers rather than vendor security names.
pub(crate) fn workbook_symbol_hint(symbol: &str) -> &'static str {
    if symbol.ends_with(" Equity") {
        "; workbook columns use the bare ticker, drop the trailing \"Equity\""
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_not_found_message_names_symbol() {
        let err = PriceError::symbol_not_found("XYZ CN", "sheet 'Prices'");
        assert_eq!(err.to_string(), "symbol 'XYZ CN' not found in sheet 'Prices'");
    }

    #[test]
    fn test_symbol_not_found_carries_no_hint_by_default() {
        let err = PriceError::symbol_not_found("SPY US Equity", "price frame");
        assert_eq!(err.to_string(), "symbol 'SPY US Equity' not found in price frame");
    }

    #[test]
    fn test_workbook_hint_only_for_vendor_names() {
        assert!(workbook_symbol_hint("XYZ CN Equity").contains("drop the trailing \"Equity\""));
        assert_eq!(workbook_symbol_hint("XYZ CN"), "");
    }
}
