//! Typed operation specs, validated out of raw plan entries.
//!
//! The three operation kinds form a closed sum; dispatch is a match on the
//! variant rather than a runtime registry. Validation happens once per batch,
//! before any mutation, so a malformed entry aborts the run early.

use crate::config::RawOperation;
use crate::error::{Error, Result};
use serde_yaml::Value;

pub const KNOWN_OPERATION_TYPES: &[&str] = &["move", "extract-interface", "replace-dependency"];

/// Move classes matching the source patterns into the target package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveSpec {
    pub target: String,
    pub sources: Vec<String>,
}

/// Extract the named methods of a class into a new interface and make the
/// class implement it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractInterfaceSpec {
    pub source_class: String,
    pub interface_name: String,
    pub methods: Vec<String>,
}

/// Retype references to one dependency inside a class to another type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceDependencySpec {
    pub in_class: String,
    pub replace: String,
    pub with: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationSpec {
    Move(MoveSpec),
    ExtractInterface(ExtractInterfaceSpec),
    ReplaceDependency(ReplaceDependencySpec),
}

impl OperationSpec {
    pub fn parse(raw: &RawOperation) -> Result<Self> {
        match raw.op_type.as_str() {
            "move" => Ok(OperationSpec::Move(MoveSpec {
                target: required_string(raw, "target")?,
                sources: required_string_list(raw, "sources")?,
            })),
            "extract-interface" => Ok(OperationSpec::ExtractInterface(ExtractInterfaceSpec {
                source_class: required_string(raw, "class")?,
                interface_name: required_string(raw, "interface")?,
                methods: required_string_list(raw, "methods")?,
            })),
            "replace-dependency" => Ok(OperationSpec::ReplaceDependency(ReplaceDependencySpec {
                in_class: required_string(raw, "in")?,
                replace: required_string(raw, "replace")?,
                with: required_string(raw, "with")?,
            })),
            other => Err(Error::UnknownOperation {
                given: other.to_string(),
                known: KNOWN_OPERATION_TYPES,
            }),
        }
    }
}

fn required_string(raw: &RawOperation, field: &str) -> Result<String> {
    raw.fields
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            Error::ConfigError(format!(
                "{} operation requires '{}' field",
                raw.op_type, field
            ))
        })
}

fn required_string_list(raw: &RawOperation, field: &str) -> Result<Vec<String>> {
    let seq = raw
        .fields
        .get(field)
        .and_then(Value::as_sequence)
        .ok_or_else(|| {
            Error::ConfigError(format!(
                "{} operation requires '{}' list",
                raw.op_type, field
            ))
        })?;

    seq.iter()
        .map(|value| {
            value.as_str().map(str::to_string).ok_or_else(|| {
                Error::ConfigError(format!(
                    "{} operation: '{}' entries must be strings",
                    raw.op_type, field
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Mapping;

    fn raw(op_type: &str, yaml_fields: &str) -> RawOperation {
        let fields: Mapping = serde_yaml::from_str(yaml_fields).unwrap();
        RawOperation {
            op_type: op_type.to_string(),
            fields,
        }
    }

    #[test]
    fn parses_move_spec() {
        let spec = OperationSpec::parse(&raw(
            "move",
            "target: com.example.target\nsources: [com.example.A, com.example.b.*]",
        ))
        .unwrap();

        assert_eq!(
            spec,
            OperationSpec::Move(MoveSpec {
                target: "com.example.target".into(),
                sources: vec!["com.example.A".into(), "com.example.b.*".into()],
            })
        );
    }

    #[test]
    fn move_without_target_is_an_error() {
        let err = OperationSpec::parse(&raw("move", "sources: [a.B]")).unwrap_err();
        assert!(err.to_string().contains("requires 'target' field"));
    }

    #[test]
    fn move_without_sources_is_an_error() {
        let err = OperationSpec::parse(&raw("move", "target: a.b")).unwrap_err();
        assert!(err.to_string().contains("requires 'sources' list"));
    }

    #[test]
    fn move_with_non_string_source_is_an_error() {
        let err = OperationSpec::parse(&raw("move", "target: a.b\nsources: [a.B, 42]"))
            .unwrap_err();
        assert!(err.to_string().contains("entries must be strings"));
    }

    #[test]
    fn parses_extract_interface_spec() {
        let spec = OperationSpec::parse(&raw(
            "extract-interface",
            "class: com.example.TaskService\ninterface: com.example.TaskPort\nmethods: [findAll, findById]",
        ))
        .unwrap();

        assert_eq!(
            spec,
            OperationSpec::ExtractInterface(ExtractInterfaceSpec {
                source_class: "com.example.TaskService".into(),
                interface_name: "com.example.TaskPort".into(),
                methods: vec!["findAll".into(), "findById".into()],
            })
        );
    }

    #[test]
    fn extract_interface_missing_fields_are_errors() {
        let err = OperationSpec::parse(&raw("extract-interface", "class: a.B")).unwrap_err();
        assert!(err.to_string().contains("requires 'interface' field"));

        let err = OperationSpec::parse(&raw(
            "extract-interface",
            "class: a.B\ninterface: a.I",
        ))
        .unwrap_err();
        assert!(err.to_string().contains("requires 'methods' list"));
    }

    #[test]
    fn parses_replace_dependency_spec() {
        let spec = OperationSpec::parse(&raw(
            "replace-dependency",
            "in: com.example.Consumer\nreplace: com.example.Impl\nwith: com.example.Port",
        ))
        .unwrap();

        assert_eq!(
            spec,
            OperationSpec::ReplaceDependency(ReplaceDependencySpec {
                in_class: "com.example.Consumer".into(),
                replace: "com.example.Impl".into(),
                with: "com.example.Port".into(),
            })
        );
    }

    #[test]
    fn unknown_type_error_enumerates_known_types() {
        let err = OperationSpec::parse(&raw("rename", "target: a")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Unknown operation type: 'rename'"));
        for known in KNOWN_OPERATION_TYPES {
            assert!(msg.contains(known));
        }
    }
}
