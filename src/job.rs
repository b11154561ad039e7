//! Job files
//!
//! A job is an ordered list of algorithm steps, each with property values
//! given as YAML scalars or lists:
//!
//! ```yaml
//! name: normalise-run
//! steps:
//!   - algorithm: CreateDataset
//!     properties:
//!       OutputDataset: raw
//!       DataY: [1, 2, 3, 4]
//!   - algorithm: Normalise
//!     version: 1
//!     properties:
//!       InputDataset: raw
//!       OutputDataset: norm
//! ```
//!
//! Values are turned into text and applied with `set_property_value`, in the
//! order they appear in the file.

use std::path::Path;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::AlgoError;
use crate::framework::Framework;
use crate::handle::AlgorithmHandle;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Job {
    #[serde(default)]
    pub name: Option<String>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    pub algorithm: String,
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub properties: Mapping,
}

impl Job {
    pub fn from_yaml(yaml: &str) -> Result<Self, AlgoError> {
        let job: Job = serde_yaml::from_str(yaml)?;
        if job.steps.is_empty() {
            return Err(AlgoError::Config("job has no steps".into()));
        }
        Ok(job)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AlgoError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            AlgoError::Config(format!("cannot read job '{}': {e}", path.display()))
        })?;
        Self::from_yaml(&yaml)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("job")
    }
}

impl Step {
    /// Property values as `(name, text)` pairs, in file order
    pub fn property_texts(&self) -> Result<Vec<(String, String)>, AlgoError> {
        self.properties
            .iter()
            .map(|(key, value)| {
                let name = key.as_str().ok_or_else(|| {
                    AlgoError::Config(format!(
                        "step '{}': property names must be strings",
                        self.algorithm
                    ))
                })?;
                let text = value_text(value).map_err(|reason| {
                    AlgoError::validation(name, reason)
                })?;
                Ok((name.to_string(), text))
            })
            .collect()
    }

    /// Create the managed instance and apply every property
    pub fn prepare(&self, framework: &Framework) -> Result<AlgorithmHandle, AlgoError> {
        let handle = framework.create(&self.algorithm, self.version)?;
        for (name, text) in self.property_texts()? {
            debug!(algorithm = %self.algorithm, property = %name, value = %text, "set property");
            handle.set_property_value(&name, &text)?;
        }
        Ok(handle)
    }
}

fn value_text(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(if *b { "1" } else { "0" }.to_string()),
        Value::Null => Ok(String::new()),
        Value::Sequence(items) => items
            .iter()
            .map(|item| match item {
                Value::Sequence(_) | Value::Mapping(_) => {
                    Err("nested lists and maps are not supported".to_string())
                }
                other => value_text(other),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|parts| parts.join(",")),
        Value::Mapping(_) => Err("maps are not supported as property values".to_string()),
        Value::Tagged(tagged) => value_text(&tagged.value),
    }
}
