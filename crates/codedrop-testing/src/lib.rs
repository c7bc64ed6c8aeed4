//! Test utilities for Codedrop services.
//!
//! Provides `MockOperator` identity headers and `TestDatabase`.
//! Import from dev-dependencies only, never in production code.

pub mod auth;
pub mod db;
