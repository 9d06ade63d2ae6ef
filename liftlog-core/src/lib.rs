pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod logging;
pub mod stats;
pub mod store;
pub mod views;
