//! Request handler module
//!
//! Routes requests and turns scan outcomes into HTTP responses.

pub mod router;
pub mod scan;

// Re-export main entry point
pub use router::handle_request;
