//! Price table and quote calculation.

use crate::quoting::types::{Quote, QuoteLine, QuoteRequest, Service, SsdSize};

/// Prices are in Serbian dinars.
pub const CURRENCY: &str = "RSD";

/// List price of a single service.
pub fn price_of(service: Service) -> u32 {
    match service {
        Service::Ssd(SsdSize::Gb240) => 3500,
        Service::Ssd(SsdSize::Gb480) => 5500,
        Service::Ssd(SsdSize::Gb960) => 9000,
        Service::Windows => 2000,
        Service::DeepClean => 2500,
        Service::GpuService => 1800,
        Service::DataRescue => 4500,
    }
}

/// Price every selected option and sum them.
pub fn quote(request: &QuoteRequest) -> Quote {
    let lines: Vec<QuoteLine> = request
        .services()
        .into_iter()
        .map(|item| QuoteLine {
            item,
            price: price_of(item),
        })
        .collect();

    Quote {
        currency: CURRENCY.to_string(),
        total: lines.iter().map(|l| l.price).sum(),
        lines,
    }
}
