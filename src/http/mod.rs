//! HTTP protocol layer module
//!
//! Response builders and request body decoding, decoupled from the scan logic.

pub mod form;
pub mod response;

// Re-export commonly used types
pub use form::read_form;
pub use response::{
    build_404_response, build_405_response, build_500_response, build_504_response,
    build_json_response, FEEDER_EMPTY_MESSAGE,
};
