//! Core domain types and logic.

pub mod allocation;
pub mod config_validation;
pub mod error;
pub mod precision;
pub mod record;
pub mod returns;
pub mod search;
pub mod simulator;
pub mod statistics;
pub mod universe;
pub mod writeback;
