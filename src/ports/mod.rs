//! Port traits the domain depends on.

pub mod config_port;
pub mod result_port;
pub mod returns_port;
