pub mod chart;
pub mod config;
pub mod lanes;
pub mod record;
