#[cfg(feature = "network")]
pub mod api;
pub mod catalog;
pub mod error;
pub mod pricing;
pub mod share;
pub mod tokens;

pub use catalog::{Catalog, ModelPricing};
pub use error::CalcError;
pub use pricing::{compute_cost, PricingRequest, PricingResult};
pub use tokens::{TokenCountRequest, TokenCountResult};
