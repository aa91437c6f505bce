//! Docker compose conversion
//!
//! Turns a compose file into a definition with one test that runs every
//! compose service once.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use super::{Definition, Phase, Service, SystemComponent, TestSpec};
use crate::common::{Error, Result};

/// The subset of a compose file the conversion understands
#[derive(Debug, Deserialize)]
struct ComposeFile {
    #[serde(default)]
    services: BTreeMap<String, ComposeService>,
}

#[derive(Debug, Deserialize)]
struct ComposeService {
    image: Option<String>,
    #[serde(default)]
    command: Option<Command>,
    #[serde(default)]
    environment: Option<Environment>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Command {
    Line(String),
    Args(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Environment {
    Map(BTreeMap<String, Option<serde_yaml::Value>>),
    List(Vec<String>),
}

impl Command {
    fn into_args(self) -> Vec<String> {
        match self {
            Command::Line(line) => line.split_whitespace().map(str::to_string).collect(),
            Command::Args(args) => args,
        }
    }
}

impl Environment {
    fn into_map(self) -> BTreeMap<String, String> {
        match self {
            Environment::Map(map) => map
                .into_iter()
                .map(|(k, v)| (k, v.map(yaml_scalar).unwrap_or_default()))
                .collect(),
            Environment::List(entries) => entries
                .into_iter()
                .map(|entry| match entry.split_once('=') {
                    Some((k, v)) => (k.to_string(), v.to_string()),
                    None => (entry, String::new()),
                })
                .collect(),
        }
    }
}

fn yaml_scalar(value: serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => String::new(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Name of the generated test, taken from the file stem
pub fn test_name_for(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("compose")
        .to_string()
}

/// Convert compose bytes into a definition
pub fn definition_from_compose(data: &[u8], test_name: &str) -> Result<Definition> {
    let compose: ComposeFile =
        serde_yaml::from_slice(data).map_err(|e| Error::Conversion(e.to_string()))?;

    if compose.services.is_empty() {
        return Err(Error::Conversion("no services defined".to_string()));
    }

    let mut services = Vec::with_capacity(compose.services.len());
    for (name, svc) in compose.services {
        let image = svc.image.ok_or_else(|| {
            Error::Conversion(format!(
                "service '{}' has no image; build contexts are not supported",
                name
            ))
        })?;
        services.push(Service {
            name,
            image,
            args: svc.command.map(Command::into_args).unwrap_or_default(),
            environment: svc.environment.map(Environment::into_map).unwrap_or_default(),
        });
    }

    let system = services
        .iter()
        .map(|s| SystemComponent {
            service: s.name.clone(),
            count: 1,
        })
        .collect();

    Ok(Definition {
        services,
        task_runners: Vec::new(),
        tests: vec![TestSpec {
            name: test_name.to_string(),
            instances: 1,
            system,
            phases: vec![Phase {
                name: "run".to_string(),
                tasks: Vec::new(),
            }],
        }],
    })
}

/// Convert compose bytes into canonical definition YAML
pub fn schema_yaml_from_compose(data: &[u8], test_name: &str) -> Result<Vec<u8>> {
    definition_from_compose(data, test_name)?
        .to_yaml()
        .map_err(|e| Error::Conversion(e.to_string()))
}
