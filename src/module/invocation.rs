//! Module invocation input
//!
//! Arguments arrive as a JSON or YAML mapping, either bare or wrapped in
//! `ANSIBLE_MODULE_ARGS`. Ansible's internal `_ansible_*` keys are stripped;
//! the check and diff flags among them become [`RunOptions`].

use super::RunOptions;
use crate::error::{Error, Result};
use crate::params::parse_bool;
use serde_json::{Map, Value};

const WRAPPER_KEY: &str = "ANSIBLE_MODULE_ARGS";
const INTERNAL_PREFIX: &str = "_ansible_";

/// Parsed module arguments plus execution flags
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invocation {
    pub args: Map<String, Value>,
    pub options: RunOptions,
}

impl Invocation {
    /// Parse argument text; empty input means no arguments
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(_) => serde_yaml::from_str(text)
                .map_err(|e| Error::config(format!("failed to parse module arguments: {}", e)))?,
        };

        let mut args = match value {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            _ => return Err(Error::config("module arguments must be a mapping")),
        };

        if let Some(Value::Object(inner)) = args.remove(WRAPPER_KEY) {
            args = inner;
        }

        let mut options = RunOptions::default();
        let internal: Vec<String> = args
            .keys()
            .filter(|k| k.starts_with(INTERNAL_PREFIX))
            .cloned()
            .collect();
        for key in internal {
            let Some(value) = args.remove(&key) else {
                continue;
            };
            match key.as_str() {
                "_ansible_check_mode" => options.check_mode = is_true(&value),
                "_ansible_diff" => options.diff_mode = is_true(&value),
                _ => {}
            }
        }

        Ok(Self { args, options })
    }
}

fn is_true(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => parse_bool(s).unwrap_or(false),
        Value::Number(n) => n.as_i64() == Some(1),
        _ => false,
    }
}
