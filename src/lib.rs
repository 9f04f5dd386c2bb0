pub mod catalog;
pub mod config;
pub mod errors;
pub mod models;
pub mod queue;
pub mod rate_limit;
pub mod strategies;
pub mod suggestions;
pub mod utils;
pub mod web;
pub mod worker;
