//! Client side of the remote test execution service

mod client;
pub mod types;

pub use client::HttpBackend;
pub use types::{RunId, RunMeta, RunStatus};

use async_trait::async_trait;

use crate::common::Result;

/// Operations the CLI needs from the remote service
#[async_trait]
pub trait Backend: Send + Sync {
    /// Upload the raw file and its canonical definition, returning the
    /// definition ID
    async fn upload_files(
        &self,
        org: &str,
        file_name: &str,
        raw: Vec<u8>,
        definition: Vec<u8>,
    ) -> Result<String>;

    /// Start one run per test of an uploaded definition
    ///
    /// IDs come back in test order.
    async fn run_test(
        &self,
        org: &str,
        definition_id: &str,
        meta: &RunMeta,
        dns: &[String],
    ) -> Result<Vec<RunId>>;

    /// Fetch the current status of a run
    async fn run_status(&self, run: &RunId) -> Result<RunStatus>;
}
