pub mod aggregator;
pub mod config;
pub mod error;
pub mod export;
pub mod generator;
pub mod state;
pub mod types;
