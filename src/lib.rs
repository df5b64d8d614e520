pub mod batch;
pub mod config;
pub mod config_processors;
pub mod errors;
pub mod evaluation;
pub mod io;
pub mod matrix;
pub mod metrics;
pub mod ranking;
pub mod scoring;
