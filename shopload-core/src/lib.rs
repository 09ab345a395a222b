mod config;
mod constants;
mod metrics;
mod records;
mod stats;

pub use config::*;
pub use constants::*;
pub use metrics::*;
pub use records::*;
pub use stats::*;
