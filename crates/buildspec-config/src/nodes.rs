// Helper functions for extracting values from KDL nodes

use kdl::{KdlNode, KdlValue};

use crate::{ConfigError, ConfigResult};

pub(crate) fn first_arg(node: &KdlNode) -> Option<&KdlValue> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .map(|e| e.value())
}

pub(crate) fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    first_arg(node)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

pub(crate) fn get_all_string_args(node: &KdlNode) -> Vec<String> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .filter_map(|e| e.value().as_string())
        .map(|s| s.to_string())
        .collect()
}

/// First argument as a string, failing with the node name as field.
pub(crate) fn require_string(node: &KdlNode) -> ConfigResult<String> {
    let field = node.name().value();
    match first_arg(node) {
        Some(value) => value
            .as_string()
            .map(|s| s.to_string())
            .ok_or_else(|| ConfigError::invalid(field, format!("expected a string, got {}", value))),
        None => Err(ConfigError::MissingField(format!("value for {}", field))),
    }
}

/// First argument as a boolean, failing with the node name as field.
pub(crate) fn require_bool(node: &KdlNode) -> ConfigResult<bool> {
    let field = node.name().value();
    match first_arg(node) {
        Some(value) => value
            .as_bool()
            .ok_or_else(|| ConfigError::invalid(field, format!("expected a boolean, got {}", value))),
        None => Err(ConfigError::MissingField(format!("value for {}", field))),
    }
}

/// Convert a KDL integer into a non-negative level.
pub(crate) fn as_level(field: &str, value: &KdlValue) -> ConfigResult<Option<u32>> {
    match value.as_integer() {
        Some(n) => u32::try_from(n)
            .map(Some)
            .map_err(|_| ConfigError::invalid(field, format!("{} is out of range", n))),
        None => Ok(None),
    }
}
