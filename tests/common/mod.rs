//! Common test utilities and fixtures for integration tests.
//!
//! # Modules
//!
//! - `fixtures`: Provider sets, request samples, fixture file loaders
//! - `log_capture`: In-memory tracing layer for asserting on log events

pub mod fixtures;
pub mod log_capture;
