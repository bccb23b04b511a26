//! AVMo Common
//!
//! Shared error types for the AVMo AI service crates.

pub mod error;

pub use error::{AvmoError, Result};
