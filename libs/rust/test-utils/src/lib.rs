//! Shared test utilities for todo-platform Rust services.
//!
//! This crate provides:
//! - Proptest generators for auth domain types
//! - Test doubles for the clock and the document store
//! - Fixtures with sample client and token records

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use generators::*;
