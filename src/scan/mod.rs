//! Scanner invocation
//!
//! Parameter model, process runner, and exit-code classification for the
//! external scanning utility.

mod error;
mod params;
mod runner;

pub use error::ScanError;
pub use params::ScanParams;
pub use runner::{ScanImageRunner, ScanRunner};
