//! Daily ticker mention counts from a forum, joined with closing prices.

pub mod cli;
pub mod commands;
pub mod constants;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
pub mod utils;
