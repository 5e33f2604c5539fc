// Publicly exported modules
pub mod errors;
pub mod fetchers;
pub mod models;
pub mod normalize;
pub mod sinks;

// Kept public to support the main program; in library use these are
// internal wiring
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod services;
#[doc(hidden)]
pub mod util;

// Re-export common types for convenience
pub use errors::{PriceHubError, Result};
pub use models::price::{PriceRow, PriceTable};
pub use models::raw::RawTable;
