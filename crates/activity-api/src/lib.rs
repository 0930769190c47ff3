//! HTTP surface for the employee activity log.

pub mod config;
pub mod server;
