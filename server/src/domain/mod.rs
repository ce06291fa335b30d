//! Domain types and rules

pub mod command;
pub mod listing;
pub mod types;
