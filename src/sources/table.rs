use std::path::Path;

use super::PriceSource;
use crate::dates::DateRange;
use crate::error::{workbook_symbol_hint, PriceError, Result};
use crate::models::PriceFrame;
use crate::workbook::open_price_file;

/// Columns `symbols` of `table`, restricted to the range's explicit bounds.
fn lookup(table: &PriceFrame, label: &str, symbols: &[&str], range: &DateRange) -> Result<PriceFrame> {
    for symbol in symbols {
        if !table.has_column(symbol) {
            return Err(PriceError::SymbolNotFound {
                symbol: symbol.to_string(),
                table: label.to_string(),
                hint: workbook_symbol_hint(symbol),
            });
        }
    }
    Ok(table.select(symbols)?.filter_dates(range))
}

/// Static lookup by column name in a sheet loaded from a price workbook.
///
/// The sheet is read once, when the source is opened; later lookups never
/// touch the file again.
#[derive(Debug, Clone)]
pub struct WorkbookSource {
    sheet: String,
    table: PriceFrame,
}

impl WorkbookSource {
    pub fn open(path: &Path, sheet: &str) -> Result<Self> {
        let table = open_price_file(path, sheet)?;
        tracing::info!(
            "Loaded sheet '{}' with {} symbols over {} rows",
            sheet,
            table.columns().len(),
            table.len()
        );
        Ok(Self::from_table(sheet, table))
    }

    pub fn from_table(sheet: &str, table: PriceFrame) -> Self {
        Self {
            sheet: sheet.to_string(),
            table,
        }
    }

    pub fn table(&self) -> &PriceFrame {
        &self.table
    }
}

impl PriceSource for WorkbookSource {
    fn fetch(&self, symbol: &str, range: &DateRange) -> Result<PriceFrame> {
        lookup(&self.table, &self.describe(), &[symbol], range)
    }

    fn fetch_many(&self, symbols: &[&str], range: &DateRange) -> Result<PriceFrame> {
        lookup(&self.table, &self.describe(), symbols, range)
    }

    fn describe(&self) -> String {
        format!("sheet '{}'", self.sheet)
    }
}

/// Lookup in a price table the caller already holds.
#[derive(Debug, Clone, Copy)]
pub struct MemorySource<'a> {
    table: &'a PriceFrame,
}

impl<'a> MemorySource<'a> {
    pub fn new(table: &'a PriceFrame) -> Self {
        Self { table }
    }
}

impl PriceSource for MemorySource<'_> {
    fn fetch(&self, symbol: &str, range: &DateRange) -> Result<PriceFrame> {
        lookup(self.table, &self.describe(), &[symbol], range)
    }

    fn fetch_many(&self, symbols: &[&str], range: &DateRange) -> Result<PriceFrame> {
        lookup(self.table, &self.describe(), symbols, range)
    }

    fn describe(&self) -> String {
        "in-memory price table".to_string()
    }
}
