pub mod api;
pub mod clock;
pub mod config;
pub mod expiry;
pub mod models;
pub mod redirect;
pub mod registry;
pub mod stats;
pub mod storage;
pub mod telemetry;
