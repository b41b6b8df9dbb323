//! CLI library components for eICU sequence preparation.

pub mod logging;
pub mod pipeline;
pub mod progress;
pub mod types;
