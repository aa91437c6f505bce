//! Genesis CLI - submit test definitions and follow their runs
//!
//! This library uploads a test definition to the test execution service,
//! starts one run per test and tracks the runs until they finish.

pub mod api;
pub mod cli;
pub mod commands;
pub mod common;
pub mod definition;
pub mod naming;
pub mod report;
pub mod run;
pub mod tracker;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use run::{RunOptions, Submitted};
