//! Request and response payloads of the test execution API

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one submitted test run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RunId {
    fn from(s: &str) -> Self {
        RunId(s.to_string())
    }
}

/// Metadata forwarded with a run request
///
/// The client never interprets these values.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunMeta {
    /// Keep failed networks around longer for inspection
    pub debug_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_token: Option<String>,
}

/// Body of a run request
#[derive(Debug, Serialize)]
pub struct RunRequest<'a> {
    pub meta: &'a RunMeta,
    pub dns: &'a [String],
}

/// Response to a file upload
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    #[serde(alias = "definitionID", alias = "definitionId")]
    pub id: String,
}

/// Response to a run request
///
/// Older servers answer with a bare list of IDs.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RunResponse {
    Ids(Vec<RunId>),
    Wrapped {
        #[serde(rename = "testIDs", alias = "testIds")]
        test_ids: Vec<RunId>,
    },
}

impl RunResponse {
    pub fn into_ids(self) -> Vec<RunId> {
        match self {
            RunResponse::Ids(ids) | RunResponse::Wrapped { test_ids: ids } => ids,
        }
    }
}

/// Snapshot of a run's progress as reported by the server
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunStatus {
    /// Whether the run has stopped, successfully or not
    #[serde(default)]
    pub finished: bool,
    /// Steps completed so far
    #[serde(default)]
    pub steps: u64,
    /// Server-side step total, when known
    #[serde(default)]
    pub total: Option<u64>,
    /// Human-readable description of the current step
    #[serde(default)]
    pub message: Option<String>,
    /// Failure reason; a run with an error is over
    #[serde(default)]
    pub error: Option<String>,
}

impl RunStatus {
    /// Whether this snapshot ends tracking of the run
    pub fn is_terminal(&self) -> bool {
        self.finished || self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_response_shapes() {
        let bare: RunResponse = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(bare.into_ids(), vec![RunId::from("a"), RunId::from("b")]);

        let wrapped: RunResponse = serde_json::from_str(r#"{"testIDs":["c"]}"#).unwrap();
        assert_eq!(wrapped.into_ids(), vec![RunId::from("c")]);
    }

    #[test]
    fn test_meta_omits_missing_credentials() {
        let meta = RunMeta {
            debug_mode: true,
            docker_username: Some("ci".to_string()),
            ..RunMeta::default()
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json, serde_json::json!({"debugMode": true, "dockerUsername": "ci"}));
    }

    #[test]
    fn test_status_defaults_and_terminal() {
        let status: RunStatus = serde_json::from_str(r#"{"steps": 3}"#).unwrap();
        assert_eq!(status.steps, 3);
        assert!(!status.is_terminal());

        let failed: RunStatus = serde_json::from_str(r#"{"error": "oom"}"#).unwrap();
        assert!(failed.is_terminal());
    }
}
