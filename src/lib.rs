pub mod cli;
pub mod config;
pub mod error;
pub mod file;
pub mod inject;
pub mod logger;
pub mod substitute;
pub mod variant;

pub use error::Error;
pub use inject::{Options, Report, inject};
pub use variant::Variant;
