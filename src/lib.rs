// Module declarations
pub mod batch;
pub mod browser;
pub mod commands;
pub mod error;
pub mod export;
pub mod intelligence;
pub mod logging;
pub mod platform;
pub mod settings;

#[cfg(test)]
mod test_support;

pub use commands::{Commands, Report, Sink};
pub use error::AppError;
