//! Utility functions.

pub mod format;

pub use format::{format_cost, format_latency, format_percent, format_tokens, format_uptime};
