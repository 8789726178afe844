pub mod config;
pub mod dataset;
pub mod error;

pub use config::Config;
pub use dataset::{Dataset, Record};
pub use error::{DatasetError, Result};
