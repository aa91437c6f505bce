//! Test definition loading and processing
//!
//! A definition file lists the services a test network is built from and
//! the tests to run against them. Only the parts the client needs are
//! modelled: the remote service owns the full grammar.

pub mod compose;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::common::{Error, Result};

/// Upper bound on provisioned instances per test
pub const MAX_INSTANCES: usize = 1_000;

/// Upper bound on replicas of one service in a test system
pub const MAX_COUNT: usize = 10_000;

/// Canonical, parsed test definition
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Definition {
    /// Container images a test system can be built from
    #[serde(default)]
    pub services: Vec<Service>,

    /// Named scripts referenced by test phases
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub task_runners: Vec<TaskRunner>,

    /// Tests, in submission order
    #[serde(default)]
    pub tests: Vec<TestSpec>,
}

/// A service image and how to start it
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Service {
    pub name: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

/// A script run as a phase task
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TaskRunner {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
}

/// One test: the system to provision and the phases to run on it
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TestSpec {
    pub name: String,

    /// How many copies of the system to provision
    #[serde(default = "default_instances")]
    pub instances: usize,

    #[serde(default)]
    pub system: Vec<SystemComponent>,

    #[serde(default)]
    pub phases: Vec<Phase>,
}

fn default_instances() -> usize {
    1
}

/// A service used in a test system, with its replica count
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SystemComponent {
    #[serde(rename = "type")]
    pub service: String,
    #[serde(default = "default_count")]
    pub count: usize,
}

fn default_count() -> usize {
    1
}

/// A phase of a test
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Phase {
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// A task run during a phase
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Task {
    #[serde(rename = "type")]
    pub runner: String,
}

impl TestSpec {
    /// Number of instances provisioned for this test
    pub fn instances(&self) -> usize {
        self.instances
    }

    /// Estimate how many steps the remote side reports for this test
    ///
    /// Per instance: one provisioning step, one per container, and one per
    /// phase plus one per task. One teardown step closes the run.
    pub fn guess_steps(&self) -> u64 {
        let containers = self
            .system
            .iter()
            .fold(0u64, |acc, c| acc.saturating_add(c.count as u64));
        let phases = self
            .phases
            .iter()
            .fold(0u64, |acc, p| acc.saturating_add(1 + p.tasks.len() as u64));
        (self.instances as u64)
            .saturating_mul(containers.saturating_add(phases).saturating_add(1))
            .saturating_add(1)
    }
}

impl Definition {
    /// Parse and validate canonical definition bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let def: Definition =
            serde_yaml::from_slice(data).map_err(|e| Error::Definition(e.to_string()))?;
        def.validate()?;
        Ok(def)
    }

    /// Serialize back to canonical YAML
    pub fn to_yaml(&self) -> Result<Vec<u8>> {
        serde_yaml::to_string(self)
            .map(String::into_bytes)
            .map_err(|e| Error::Definition(e.to_string()))
    }

    /// Check the references the client relies on
    pub fn validate(&self) -> Result<()> {
        if self.tests.is_empty() {
            return Err(Error::Definition("no tests defined".to_string()));
        }

        let services: HashSet<&str> = self.services.iter().map(|s| s.name.as_str()).collect();
        let runners: HashSet<&str> = self.task_runners.iter().map(|r| r.name.as_str()).collect();
        let mut names = HashSet::new();

        for (i, test) in self.tests.iter().enumerate() {
            if test.name.trim().is_empty() {
                return Err(Error::Definition(format!("test {} has no name", i)));
            }
            if !names.insert(test.name.as_str()) {
                return Err(Error::Definition(format!(
                    "duplicate test name '{}'",
                    test.name
                )));
            }
            if test.instances == 0 {
                return Err(Error::Definition(format!(
                    "test '{}' must have at least one instance",
                    test.name
                )));
            }
            if test.instances > MAX_INSTANCES {
                return Err(Error::Definition(format!(
                    "test '{}' asks for {} instances, the limit is {}",
                    test.name, test.instances, MAX_INSTANCES
                )));
            }
            for component in &test.system {
                if component.count > MAX_COUNT {
                    return Err(Error::Definition(format!(
                        "test '{}' asks for {} replicas of '{}', the limit is {}",
                        test.name, component.count, component.service, MAX_COUNT
                    )));
                }
                if !services.contains(component.service.as_str()) {
                    return Err(Error::Definition(format!(
                        "test '{}' uses undefined service '{}'",
                        test.name, component.service
                    )));
                }
            }
            for phase in &test.phases {
                for task in &phase.tasks {
                    if !runners.contains(task.runner.as_str()) {
                        return Err(Error::Definition(format!(
                            "phase '{}' of test '{}' uses undefined task runner '{}'",
                            phase.name, test.name, task.runner
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Definition file read from disk, in both raw and canonical form
#[derive(Debug, Clone)]
pub struct LoadedDefinition {
    /// Bytes exactly as read from disk
    pub raw: Vec<u8>,
    /// Canonical definition bytes (converted when the input was compose)
    pub canonical: Vec<u8>,
}

/// Read a definition file, converting it from docker compose if asked
pub fn load(path: &Path, is_compose: bool) -> Result<LoadedDefinition> {
    let raw = std::fs::read(path).map_err(|e| Error::FileRead {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;

    let canonical = if is_compose {
        tracing::debug!(path = %path.display(), "converting docker compose file");
        compose::schema_yaml_from_compose(&raw, &compose::test_name_for(path))?
    } else {
        raw.clone()
    };

    Ok(LoadedDefinition { raw, canonical })
}

/// Parse canonical bytes into the ordered tests and the whole definition
pub fn process(data: &[u8]) -> Result<(Vec<TestSpec>, Definition)> {
    let def = Definition::from_bytes(data)?;
    Ok((def.tests.clone(), def))
}
