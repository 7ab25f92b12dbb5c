//! saxotrade: typed integration layer for the Saxo OpenAPI
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod bookings;
pub mod config;
pub mod openapi;
pub mod types;
