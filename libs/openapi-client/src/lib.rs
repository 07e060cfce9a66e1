//! Wire models for the Device API task service

pub mod models;

pub use models::*;
