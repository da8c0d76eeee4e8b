pub mod error_handling;
pub mod request_logging;

pub use request_logging::RequestLogging;
