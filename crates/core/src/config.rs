//! Loading of the YAML refactoring plan.
//!
//! A plan is a document with a single `operations` list. Each entry keeps its
//! untyped field map until batch dispatch, where the matching operation
//! validates it into a typed spec.
//!
//! ```yaml
//! operations:
//!   - type: move
//!     target: com.example.app.task.model
//!     sources:
//!       - com.example.app.model.Task*
//!
//!   - type: extract-interface
//!     class: com.example.app.task.service.TaskService
//!     interface: com.example.app.task.port.TaskPort
//!     methods: [findAll, findById, createTask]
//! ```

use crate::error::{Error, Result};
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// One raw entry from the plan, before validation into a typed spec.
#[derive(Debug, Clone)]
pub struct RawOperation {
    pub op_type: String,
    pub fields: Mapping,
}

pub fn parse_config_file(path: &Path) -> Result<Vec<RawOperation>> {
    let contents = std::fs::read_to_string(path)?;
    parse_config_str(&contents)
}

pub fn parse_config_str(contents: &str) -> Result<Vec<RawOperation>> {
    let doc: Value = serde_yaml::from_str(contents)
        .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))?;

    let operations = doc
        .as_mapping()
        .and_then(|m| m.get("operations"))
        .and_then(Value::as_sequence)
        .ok_or_else(|| Error::ConfigError("Config must contain 'operations' list".to_string()))?;

    operations
        .iter()
        .map(|entry| {
            let fields = entry
                .as_mapping()
                .ok_or_else(|| Error::ConfigError("Each operation must be a map".to_string()))?;

            let op_type = fields
                .get("type")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    Error::ConfigError("Each operation must have a 'type' field".to_string())
                })?;

            Ok(RawOperation {
                op_type: op_type.to_string(),
                fields: fields.clone(),
            })
        })
        .collect()
}
