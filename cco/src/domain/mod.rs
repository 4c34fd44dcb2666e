//! Domain records exchanged between pipeline stages
//!
//! Each record can be built leniently from model JSON (`from_object` /
//! `from_value`) and round-trips through serde for persistence.

mod billing;
pub mod coerce;
mod profile;
mod recommendation;
mod report;

pub use billing::{BillingRecord, OTHER_SERVICE};
pub use profile::{ProjectProfile, TechStack, UNKNOWN_PROJECT};
pub use recommendation::{Level, Recommendation};
pub use report::{CostSummary, Report, ServiceCost};
