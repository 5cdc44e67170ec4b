//! Quote calculator types.

use serde::{Deserialize, Serialize};

/// SSD upgrade capacities offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SsdSize {
    #[serde(rename = "240")]
    Gb240,
    #[serde(rename = "480")]
    Gb480,
    #[serde(rename = "960")]
    Gb960,
}

/// A priced line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Service {
    Ssd(SsdSize),
    Windows,
    DeepClean,
    GpuService,
    DataRescue,
}

/// Options picked in the calculator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteRequest {
    pub ssd: Option<SsdSize>,
    pub windows: bool,
    pub deep_clean: bool,
    pub gpu_service: bool,
    pub data_rescue: bool,
}

impl QuoteRequest {
    /// Selected services in display order.
    pub fn services(&self) -> Vec<Service> {
        let mut services = Vec::with_capacity(5);
        if let Some(size) = self.ssd {
            services.push(Service::Ssd(size));
        }
        for (picked, service) in [
            (self.windows, Service::Windows),
            (self.deep_clean, Service::DeepClean),
            (self.gpu_service, Service::GpuService),
            (self.data_rescue, Service::DataRescue),
        ] {
            if picked {
                services.push(service);
            }
        }
        services
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteLine {
    pub item: Service,
    pub price: u32,
}

/// Estimated total for a set of options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub currency: String,
    pub total: u32,
    pub lines: Vec<QuoteLine>,
}
