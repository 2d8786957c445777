use std::fmt;
use std::time::Duration;

use crate::api_client::{ApiClient, QuoteVendor};
use crate::config::Config;
use crate::error::{PriceError, Result};

/// Whether the vendor integration can be used in this process.
///
/// Decided once at startup by [`Capabilities::detect`] and handed to the
/// call sites that need it.
pub enum VendorCapability {
    Available(Box<dyn QuoteVendor>),
    Unavailable { reason: String },
}

impl VendorCapability {
    pub fn is_available(&self) -> bool {
        matches!(self, VendorCapability::Available(_))
    }

    pub fn vendor(&self) -> Result<&dyn QuoteVendor> {
        match self {
            VendorCapability::Available(vendor) => Ok(vendor.as_ref()),
            VendorCapability::Unavailable { reason } => Err(PriceError::VendorUnavailable(reason.clone())),
        }
    }
}

impl fmt::Debug for VendorCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VendorCapability::Available(_) => write!(f, "Available"),
            VendorCapability::Unavailable { reason } => write!(f, "Unavailable({})", reason),
        }
    }
}

/// Process-wide capabilities, produced once at startup.
#[derive(Debug)]
pub struct Capabilities {
    pub vendor: VendorCapability,
}

impl Capabilities {
    /// Probe the vendor integration. Failure downgrades to workbook-only
    /// retrieval rather than aborting.
    pub fn detect(config: &Config) -> Self {
        let vendor = match &config.vendor_url {
            None => VendorCapability::Unavailable {
                reason: "no vendor_url configured".to_string(),
            },
            Some(url) => match ApiClient::new(url, Duration::from_secs(config.timeout_secs)) {
                Ok(client) => {
                    tracing::info!("Vendor integration loaded ({})", client.base_url());
                    VendorCapability::Available(Box::new(client))
                }
                Err(e) => VendorCapability::Unavailable {
                    reason: e.to_string(),
                },
            },
        };

        if let VendorCapability::Unavailable { reason } = &vendor {
            tracing::warn!("Vendor integration unavailable, workbook prices only: {}", reason);
        }

        Self { vendor }
    }

    /// Workbook and in-memory retrieval only.
    pub fn workbook_only(reason: &str) -> Self {
        Self {
            vendor: VendorCapability::Unavailable {
                reason: reason.to_string(),
            },
        }
    }
}
