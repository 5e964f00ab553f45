//! Shared helpers for the BDD step definitions

pub mod rule_loader;
pub mod tables;
