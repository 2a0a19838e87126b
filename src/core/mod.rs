pub mod aggregator;
pub mod config;
pub mod credentials;
pub mod formatter;
pub mod models;
pub mod process;
pub mod providers;
pub mod scheduler;
