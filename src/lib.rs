pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::LinuxI2cBus;
pub use config::{cli::LocalSink, CliConfig};
pub use core::{engine::SampleEngine, pipeline::SenseHatPipeline};
pub use utils::error::{Result, SenseError};
