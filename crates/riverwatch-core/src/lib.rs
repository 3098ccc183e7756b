pub mod config;
pub mod error;
pub mod http;
pub mod feed;
pub mod ai;
pub mod digest;
pub mod notify;
pub mod pipeline;
pub mod scheduler;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use pipeline::{RunOutcome, RunReport, TriagePipeline};

#[cfg(test)]
mod testing;
