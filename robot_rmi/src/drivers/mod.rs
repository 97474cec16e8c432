#[cfg(feature="driver")]
mod driver;
#[cfg(feature="driver")]
pub use driver::*;

#[cfg(feature="driver")]
mod requests;

mod models;
pub use models::*;

mod driver_config;
pub use driver_config::*;
