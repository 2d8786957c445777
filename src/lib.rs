//! Historical security prices and the indicators derived from them.
//!
//! Prices come from a market-data vendor, a price workbook or a table the
//! caller already holds ([`sources`]); [`indicators`] derives log returns, a
//! 200-day moving average and a 14-period RSI from them.

pub mod api_client;
pub mod config;
pub mod dates;
pub mod error;
pub mod indicators;
pub mod models;
pub mod services;
pub mod sources;
pub mod state;
pub mod workbook;

pub use api_client::{ApiClient, ApiError, FieldValue, HistoricalData, QuoteVendor, ReferenceData, PX_LAST};
pub use config::{Config, ConfigError};
pub use dates::DateRange;
pub use error::{PriceError, Result};
pub use indicators::{calc_beta, calc_indicators, calc_returns, get_prev_price, log_returns, mavg_column};
pub use models::{Column, PriceFrame};
pub use services::price_service::{PriceService, Source};
pub use sources::{MemorySource, PriceSource, VendorSource, WorkbookSource};
pub use state::{Capabilities, VendorCapability};
