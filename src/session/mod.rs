pub mod config;
pub mod exporter;
