//! Compute instance bandwidth specs
//!
//! Static table keyed by add-on product id. Lookups never fail: unknown or
//! missing ids resolve to the micro instance.

use serde::Serialize;

/// Product id used when a project has no compute add-on
pub const DEFAULT_INSTANCE_PRODUCT_ID: &str = "addon_instance_micro";

/// Display name used when a project has no compute add-on
pub const DEFAULT_INSTANCE_NAME: &str = "Micro";

/// Minutes per day an instance may burst above its baseline
pub const DAILY_BURST_LIMIT_MINS: u32 = 30;

/// Disk I/O bandwidth limits of a compute instance, in Mbps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComputeInstanceSpec {
    pub product_id: &'static str,
    pub name: &'static str,
    /// Burst limit
    pub max_bandwidth: u32,
    /// Sustained limit once the daily burst is used up
    pub base_bandwidth: u32,
}

pub const MICRO_INSTANCE: ComputeInstanceSpec = ComputeInstanceSpec {
    product_id: DEFAULT_INSTANCE_PRODUCT_ID,
    name: DEFAULT_INSTANCE_NAME,
    max_bandwidth: 2085,
    base_bandwidth: 87,
};

pub static COMPUTE_INSTANCE_SPECS: &[ComputeInstanceSpec] = &[
    MICRO_INSTANCE,
    ComputeInstanceSpec {
        product_id: "addon_instance_small",
        name: "Small",
        max_bandwidth: 2085,
        base_bandwidth: 174,
    },
    ComputeInstanceSpec {
        product_id: "addon_instance_medium",
        name: "Medium",
        max_bandwidth: 2085,
        base_bandwidth: 347,
    },
    ComputeInstanceSpec {
        product_id: "addon_instance_large",
        name: "Large",
        max_bandwidth: 4750,
        base_bandwidth: 630,
    },
    ComputeInstanceSpec {
        product_id: "addon_instance_xlarge",
        name: "XL",
        max_bandwidth: 4750,
        base_bandwidth: 1188,
    },
    ComputeInstanceSpec {
        product_id: "addon_instance_2xlarge",
        name: "2XL",
        max_bandwidth: 4750,
        base_bandwidth: 2375,
    },
    ComputeInstanceSpec {
        product_id: "addon_instance_4xlarge",
        name: "4XL",
        max_bandwidth: 4750,
        base_bandwidth: 4750,
    },
    ComputeInstanceSpec {
        product_id: "addon_instance_8xlarge",
        name: "8XL",
        max_bandwidth: 9500,
        base_bandwidth: 9500,
    },
    ComputeInstanceSpec {
        product_id: "addon_instance_12xlarge",
        name: "12XL",
        max_bandwidth: 14250,
        base_bandwidth: 14250,
    },
    ComputeInstanceSpec {
        product_id: "addon_instance_16xlarge",
        name: "16XL",
        max_bandwidth: 19000,
        base_bandwidth: 19000,
    },
];

/// Exact lookup by product id
pub fn find(product_id: &str) -> Option<&'static ComputeInstanceSpec> {
    COMPUTE_INSTANCE_SPECS
        .iter()
        .find(|spec| spec.product_id == product_id)
}

/// Resolve the spec for an optional product id, falling back to micro
pub fn resolve(product_id: Option<&str>) -> &'static ComputeInstanceSpec {
    product_id.and_then(find).unwrap_or(&MICRO_INSTANCE)
}
