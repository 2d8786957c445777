// Price source adapters
// Every source produces the same shape: a date-indexed frame with one column per symbol

pub mod table;
pub mod vendor;

pub use table::{MemorySource, WorkbookSource};
pub use vendor::VendorSource;

use crate::dates::DateRange;
use crate::error::Result;
use crate::models::PriceFrame;

/// Something that can produce historical closing prices.
pub trait PriceSource {
    /// Closing prices of one symbol, in a single column named after it.
    fn fetch(&self, symbol: &str, range: &DateRange) -> Result<PriceFrame>;

    /// Closing prices of several symbols, one column each in the order
    /// requested, on a shared date index.
    fn fetch_many(&self, symbols: &[&str], range: &DateRange) -> Result<PriceFrame>;

    /// Short description for logs and error messages.
    fn describe(&self) -> String;
}
